//! Error types for `prospect-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown data type: {0:?} (expected \"news\" or \"interviews\")")]
  UnknownDataType(String),

  /// Producer output has no entry for the requested company.
  #[error("no data found for company: {0}")]
  MissingCompanyData(String),

  #[error("document is not a JSON object keyed by company name")]
  NotAnObject,

  #[error("record for {company:?} has an unexpected shape: {source}")]
  InvalidRecord {
    company: String,
    #[source]
    source:  serde_json::Error,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
