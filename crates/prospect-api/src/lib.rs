//! JSON HTTP API for Prospect.
//!
//! Exposes an axum [`Router`] backed by a [`Refresher`] over any
//! [`prospect_core::store::ContentStore`]. TLS, auth and tracing layers are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = prospect_api::api_router(refresher).layer(TraceLayer::new_for_http());
//! ```

pub mod data;
pub mod error;
pub mod etag;
pub mod refresh;

use axum::{
  Router,
  routing::{get, post},
};
use prospect_core::store::ContentStore;
use prospect_refresh::Refresher;

pub use error::ApiError;

/// Build a fully-materialised API router for `refresher`.
pub fn api_router<S>(refresher: Refresher<S>) -> Router<()>
where
  S: ContentStore + 'static,
{
  Router::new()
    .route("/refresh-data", post(refresh::handler::<S>))
    .route("/data/{data_type}", get(data::store::<S>))
    .route("/data/{data_type}/{company}", get(data::company::<S>))
    .route("/health", get(|| async { "ok" }))
    .with_state(refresher)
}
