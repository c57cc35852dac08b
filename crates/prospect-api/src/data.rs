//! Read handlers for the content stores.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/data/{dataType}` | Whole store |
//! | `GET`  | `/data/{dataType}/{company}` | 404 if the company has no record |
//!
//! Both answer `If-None-Match` with `304 Not Modified`.

use axum::{
  extract::{Path, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use prospect_core::{record::DataType, store::ContentStore};
use prospect_refresh::Refresher;

use crate::{
  error::ApiError,
  etag::{compute_etag, if_none_match},
};

fn parse_data_type(raw: &str) -> Result<DataType, ApiError> {
  raw.parse().map_err(|_| {
    ApiError::BadRequest("Invalid dataType. Must be 'news' or 'interviews'".into())
  })
}

/// `GET /data/{dataType}`
pub async fn store<S>(
  State(refresher): State<Refresher<S>>,
  Path(data_type): Path<String>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: ContentStore + 'static,
{
  let data_type = parse_data_type(&data_type)?;
  let doc = refresher.store().load(data_type).await.map_err(ApiError::store)?;
  let body = serde_json::to_vec(doc.as_map()).map_err(ApiError::store)?;
  Ok(conditional(&headers, body))
}

/// `GET /data/{dataType}/{company}`
pub async fn company<S>(
  State(refresher): State<Refresher<S>>,
  Path((data_type, company)): Path<(String, String)>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: ContentStore + 'static,
{
  let data_type = parse_data_type(&data_type)?;
  let doc = refresher.store().load(data_type).await.map_err(ApiError::store)?;
  let record = doc
    .get_raw(&company)
    .ok_or_else(|| ApiError::NotFound(format!("No data found for company: {company}")))?;
  let body = serde_json::to_vec(record).map_err(ApiError::store)?;
  Ok(conditional(&headers, body))
}

fn conditional(headers: &HeaderMap, body: Vec<u8>) -> Response {
  let etag = compute_etag(&body);
  let matched = headers
    .get(header::IF_NONE_MATCH)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| if_none_match(v, &etag));

  if matched {
    return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response();
  }
  (
    StatusCode::OK,
    [(header::ETAG, etag)],
    [
      (header::CONTENT_TYPE, "application/json"),
      (header::CACHE_CONTROL, "no-cache"),
    ],
    body,
  )
    .into_response()
}
