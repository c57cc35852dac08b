//! The refresh error taxonomy.
//!
//! Every failure of a refresh lands in exactly one variant. [`RefreshError::summary`]
//! and [`RefreshError::details`] are what callers get to see; neither carries
//! filesystem paths. The `Display` form is for logs.

use std::error::Error as StdError;

use thiserror::Error;

use crate::producer::ProducerError;

#[derive(Debug, Error)]
pub enum RefreshError {
  /// Missing or malformed request parameters.
  #[error("invalid request: {0}")]
  InvalidRequest(String),

  /// The configured producer script does not exist.
  #[error("producer script not found: {script}")]
  ProducerNotFound { script: String },

  /// Timeout, non-zero exit, oversized output or spawn failure.
  #[error("producer execution failed: {0}")]
  ProducerExecution(#[from] ProducerError),

  /// The producer exited cleanly but left no usable output file.
  #[error("producer output unusable: {reason}")]
  ProducerOutputMissing { reason: String },

  /// The producer output has no entry for the requested company.
  #[error("no data found for company: {0}")]
  MissingCompanyData(String),

  /// Reading or writing the store failed.
  #[error("store error: {0}")]
  Persistence(#[source] Box<dyn StdError + Send + Sync>),
}

impl RefreshError {
  /// Stable label for logs and metrics.
  pub fn kind(&self) -> &'static str {
    match self {
      RefreshError::InvalidRequest(_) => "invalid_request",
      RefreshError::ProducerNotFound { .. } => "producer_not_found",
      RefreshError::ProducerExecution(_) => "producer_execution",
      RefreshError::ProducerOutputMissing { .. } => "producer_output_missing",
      RefreshError::MissingCompanyData(_) => "missing_company_data",
      RefreshError::Persistence(_) => "persistence",
    }
  }

  /// Caller-facing headline.
  pub fn summary(&self) -> String {
    match self {
      RefreshError::InvalidRequest(msg) => msg.clone(),
      RefreshError::ProducerNotFound { script } => format!("Script not found: {script}"),
      RefreshError::ProducerExecution(_) => "Failed to refresh data".to_string(),
      RefreshError::ProducerOutputMissing { .. } => {
        "Script ran but produced no usable output".to_string()
      }
      RefreshError::MissingCompanyData(_) => {
        "Script ran but found no data for this company".to_string()
      }
      RefreshError::Persistence(_) => {
        "Script ran but failed to update frontend data".to_string()
      }
    }
  }

  /// Optional debugging detail.
  pub fn details(&self) -> Option<String> {
    match self {
      RefreshError::InvalidRequest(_) | RefreshError::ProducerNotFound { .. } => None,
      RefreshError::ProducerExecution(e) => Some(e.to_string()),
      RefreshError::ProducerOutputMissing { reason } => Some(reason.clone()),
      RefreshError::MissingCompanyData(company) => {
        Some(format!("No data found for company: {company}"))
      }
      RefreshError::Persistence(e) => Some(root_cause(e.as_ref())),
    }
  }

  pub(crate) fn persistence<E>(e: E) -> Self
  where
    E: StdError + Send + Sync + 'static,
  {
    RefreshError::Persistence(Box::new(e))
  }
}

/// The innermost error message; store errors wrap paths at the outer levels.
fn root_cause(e: &(dyn StdError + 'static)) -> String {
  let mut current = e;
  while let Some(next) = current.source() {
    current = next;
  }
  current.to_string()
}
