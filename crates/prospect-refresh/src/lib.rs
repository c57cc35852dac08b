//! Refresh orchestration: run a producer for one company and fold its output
//! into the matching content store.
//!
//! A refresh walks `Validating → Invoking → AwaitingOutput → Merging →
//! Persisting → Done`. Any failure is terminal for the request and is
//! reported as a [`RefreshError`]; nothing is retried here.

pub mod error;
pub mod producer;

pub use error::RefreshError;

use std::{fmt, future::Future, io::ErrorKind, pin::Pin, sync::Arc};

use chrono::{Local, NaiveDate};
use prospect_core::{
  document::ProducerOutput,
  merge::{MergeStats, merge_company_record},
  record::DataType,
  store::ContentStore,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::Instrument as _;
use uuid::Uuid;

use producer::{Invocation, ProducerConfig, ProducerError, stderr_is_noise};

// ─── Request / outcome ────────────────────────────────────────────────────────

/// A refresh request as it arrives on the wire. Every field is optional here;
/// [`RefreshRequest::validate`] decides what is acceptable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
  pub company_name: Option<String>,
  pub data_type:    Option<String>,
  /// Display label of the look-back window (e.g. `"30d"`), echoed back.
  pub period:       Option<String>,
  pub days:         Option<u32>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRefresh {
  pub company:   String,
  pub data_type: DataType,
  pub period:    String,
  pub days:      u32,
}

impl RefreshRequest {
  pub fn validate(self) -> Result<ValidRefresh, RefreshError> {
    let missing = || RefreshError::InvalidRequest("Missing required parameters".into());

    let company = self.company_name.filter(|s| !s.trim().is_empty()).ok_or_else(missing)?;
    let data_type = self.data_type.filter(|s| !s.is_empty()).ok_or_else(missing)?;
    let period = self.period.filter(|s| !s.trim().is_empty()).ok_or_else(missing)?;
    let days = self.days.filter(|&d| d > 0).ok_or_else(missing)?;

    let data_type = data_type.parse::<DataType>().map_err(|_| {
      RefreshError::InvalidRequest(
        "Invalid dataType. Must be 'news' or 'interviews'".into(),
      )
    })?;

    Ok(ValidRefresh { company, data_type, period, days })
  }
}

/// What a successful refresh reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
  pub company:   String,
  pub data_type: DataType,
  pub period:    String,
  pub days:      u32,
  pub stats:     MergeStats,
}

// ─── Phases ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Validating,
  Invoking,
  AwaitingOutput,
  Merging,
  Persisting,
  Done,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Phase::Validating => "validating",
      Phase::Invoking => "invoking",
      Phase::AwaitingOutput => "awaiting_output",
      Phase::Merging => "merging",
      Phase::Persisting => "persisting",
      Phase::Done => "done",
    })
  }
}

// ─── Refresher ────────────────────────────────────────────────────────────────

/// Runs refreshes against a [`ContentStore`].
///
/// Cloning is cheap. Producer runs are serialised per data type because each
/// producer writes one fixed output file; store writes are serialised by the
/// store itself.
pub struct Refresher<S> {
  store:     Arc<S>,
  producers: Arc<ProducerConfig>,
  running:   Arc<[Mutex<()>; 2]>,
  today:     fn() -> NaiveDate,
}

impl<S> Clone for Refresher<S> {
  fn clone(&self) -> Self {
    Self {
      store:     self.store.clone(),
      producers: self.producers.clone(),
      running:   self.running.clone(),
      today:     self.today,
    }
  }
}

impl<S> Refresher<S>
where
  S: ContentStore,
{
  pub fn new(store: Arc<S>, producers: ProducerConfig) -> Self {
    Self {
      store,
      producers: Arc::new(producers),
      running: Arc::new([Mutex::new(()), Mutex::new(())]),
      today: || Local::now().date_naive(),
    }
  }

  /// Override the clock used for `search_date`.
  pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
    self.today = today;
    self
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn producers(&self) -> &ProducerConfig { &self.producers }

  /// Run one refresh end to end.
  pub async fn refresh(
    &self,
    request: RefreshRequest,
  ) -> Result<RefreshOutcome, RefreshError> {
    let refresh_id = Uuid::new_v4();
    let span = tracing::info_span!(
      "refresh",
      %refresh_id,
      company = request.company_name.as_deref().unwrap_or_default(),
      data_type = request.data_type.as_deref().unwrap_or_default(),
    );

    async move {
      let mut phase = Phase::Validating;
      match self.run(request, &mut phase).await {
        Ok(outcome) => {
          tracing::info!(
            new = outcome.stats.new_items_count,
            existing = outcome.stats.existing_items_count,
            total = outcome.stats.total_items_count,
            "refresh complete"
          );
          Ok(outcome)
        }
        Err(e) => {
          tracing::error!(%phase, kind = e.kind(), error = %e, "refresh failed");
          Err(e)
        }
      }
    }
    .instrument(span)
    .await
  }

  async fn run(
    &self,
    request: RefreshRequest,
    phase: &mut Phase,
  ) -> Result<RefreshOutcome, RefreshError> {
    let req = request.validate()?;
    let data_type = req.data_type;

    *phase = Phase::Invoking;
    let script = self.producers.script_path(data_type);
    let script_name = script
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();
    // Absolute, since the child runs in `working_dir`.
    let script = match tokio::fs::canonicalize(&script).await {
      Ok(abs) => abs,
      Err(_) => return Err(RefreshError::ProducerNotFound { script: script_name }),
    };
    let program = self
      .producers
      .program_path()
      .map_err(|e| RefreshError::ProducerExecution(ProducerError::Spawn(e)))?;

    let running = self.running_lock(data_type).lock().await;
    // A run that writes nothing must not pick up the previous run's file.
    match tokio::fs::remove_file(self.producers.output_path(data_type)).await {
      Ok(()) => tracing::debug!("removed previous producer output"),
      Err(e) if e.kind() == ErrorKind::NotFound => {}
      Err(e) => return Err(RefreshError::ProducerExecution(ProducerError::Io(e))),
    }
    tracing::info!(script = %script_name, days = req.days, "running producer");
    let run = Invocation {
      program:          &program,
      script:           &script,
      working_dir:      &self.producers.working_dir,
      company:          &req.company,
      days:             req.days,
      timeout:          self.producers.timeout(),
      max_output_bytes: self.producers.max_output_bytes,
    }
    .run()
    .await?;
    tracing::debug!(stdout = %run.stdout, elapsed_ms = run.elapsed.as_millis() as u64, "producer finished");
    if !stderr_is_noise(&run.stderr) {
      tracing::warn!(stderr = %run.stderr, "producer wrote to stderr");
    }

    *phase = Phase::AwaitingOutput;
    let mut output = self.read_output(data_type).await?;
    drop(running);

    *phase = Phase::Merging;
    let incoming = output.take_company(&req.company).map_err(|e| match e {
      prospect_core::Error::MissingCompanyData(company) => {
        RefreshError::MissingCompanyData(company)
      }
      other => RefreshError::ProducerOutputMissing { reason: other.to_string() },
    })?;

    *phase = Phase::Persisting;
    let today = (self.today)();
    let company = req.company.clone();
    // Boxed so the refresh future stays `Send` when spawned.
    let persist: Pin<Box<dyn Future<Output = Result<MergeStats, S::Error>> + Send + '_>> =
      Box::pin(self.store.update_record(data_type, &req.company, move |existing| {
        let merged =
          merge_company_record(existing.as_ref(), &incoming, data_type, &company, today);
        (merged.record, merged.stats)
      }));
    let stats = persist.await.map_err(RefreshError::persistence)?;

    *phase = Phase::Done;
    Ok(RefreshOutcome {
      company: req.company,
      data_type,
      period: req.period,
      days: req.days,
      stats,
    })
  }

  async fn read_output(&self, data_type: DataType) -> Result<ProducerOutput, RefreshError> {
    let path = self.producers.output_path(data_type);
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
      RefreshError::ProducerOutputMissing {
        reason: format!("output file could not be read: {}", e.kind()),
      }
    })?;
    ProducerOutput::from_slice(&bytes).map_err(|e| RefreshError::ProducerOutputMissing {
      reason: format!("output file is not a valid document: {e}"),
    })
  }

  fn running_lock(&self, data_type: DataType) -> &Mutex<()> {
    match data_type {
      DataType::News => &self.running[0],
      DataType::Interviews => &self.running[1],
    }
  }
}
