//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure leaves as `{ "error": ..., "details"?: ... }`.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use prospect_refresh::RefreshError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Refresh(#[from] RefreshError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    ApiError::Store(Box::new(e))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Refresh(RefreshError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
      ApiError::Refresh(RefreshError::ProducerNotFound { .. }) => StatusCode::NOT_FOUND,
      ApiError::Refresh(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = match &self {
      ApiError::NotFound(m) | ApiError::BadRequest(m) => json!({ "error": m }),
      ApiError::Refresh(e) => match e.details() {
        Some(details) => json!({ "error": e.summary(), "details": details }),
        None => json!({ "error": e.summary() }),
      },
      ApiError::Store(e) => {
        tracing::error!(error = %e, "failed to read store");
        json!({ "error": "Failed to read stored data" })
      }
    };
    (status, Json(body)).into_response()
  }
}
