//! Handler for `POST /refresh-data`.
//!
//! Body: `{"companyName":"Acme Co","dataType":"news","period":"30d","days":30}`

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use prospect_core::{merge::MergeStats, store::ContentStore};
use prospect_refresh::{RefreshError, RefreshOutcome, RefreshRequest, Refresher};
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
  pub success: bool,
  pub message: String,
  pub period:  String,
  pub days:    u32,
  pub stats:   MergeStats,
}

impl From<RefreshOutcome> for RefreshResponse {
  fn from(outcome: RefreshOutcome) -> Self {
    Self {
      success: true,
      message: format!(
        "Successfully refreshed {} for {}",
        outcome.data_type, outcome.company
      ),
      period:  outcome.period,
      days:    outcome.days,
      stats:   outcome.stats,
    }
  }
}

/// `POST /refresh-data`
pub async fn handler<S>(
  State(refresher): State<Refresher<S>>,
  body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<RefreshResponse>, ApiError>
where
  S: ContentStore + 'static,
{
  let Json(request) = body.map_err(|rejection| {
    ApiError::Refresh(RefreshError::InvalidRequest(rejection.body_text()))
  })?;
  let outcome = refresher.refresh(request).await?;
  Ok(Json(outcome.into()))
}
