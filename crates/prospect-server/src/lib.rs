//! Configuration and wiring for the Prospect server binary.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use prospect_refresh::{Refresher, producer::ProducerConfig};
use prospect_store_json::{INTERVIEWS_FILE, JsonFileStore, NEWS_FILE};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PROSPECT_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  /// Directory holding the content stores.
  #[serde(default = "default_data_dir")]
  pub data_dir:         PathBuf,
  #[serde(default = "default_news_store")]
  pub news_store:       PathBuf,
  #[serde(default = "default_interviews_store")]
  pub interviews_store: PathBuf,
  #[serde(default)]
  pub producer:         ProducerConfig,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 3000 }
fn default_data_dir() -> PathBuf { PathBuf::from("public") }
fn default_news_store() -> PathBuf { PathBuf::from(NEWS_FILE) }
fn default_interviews_store() -> PathBuf { PathBuf::from(INTERVIEWS_FILE) }

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `PROSPECT_*` environment
  /// variables (nested keys separated by `__`, e.g.
  /// `PROSPECT_PRODUCER__TIMEOUT_SECS`).
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    let mut cfg: ServerConfig = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("PROSPECT").separator("__"))
      .build()?
      .try_deserialize()?;
    for path in [
      &mut cfg.data_dir,
      &mut cfg.news_store,
      &mut cfg.interviews_store,
      &mut cfg.producer.working_dir,
      &mut cfg.producer.program,
      &mut cfg.producer.news.script,
      &mut cfg.producer.news.output,
      &mut cfg.producer.interviews.script,
      &mut cfg.producer.interviews.output,
    ] {
      *path = expand_tilde(path);
    }
    Ok(cfg)
  }

  pub fn news_store_path(&self) -> PathBuf { self.data_dir.join(&self.news_store) }

  pub fn interviews_store_path(&self) -> PathBuf {
    self.data_dir.join(&self.interviews_store)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// Build the refresher this configuration describes.
  pub fn refresher(&self) -> Refresher<JsonFileStore> {
    let store =
      JsonFileStore::with_paths(self.news_store_path(), self.interviews_store_path());
    Refresher::new(Arc::new(store), self.producer.clone())
  }
}

/// The full application: API routes plus request tracing.
pub fn app(refresher: Refresher<JsonFileStore>) -> Router {
  prospect_api::api_router(refresher).layer(TraceLayer::new_for_http())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
