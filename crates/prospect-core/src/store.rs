//! The `ContentStore` trait.
//!
//! Implemented by storage backends (e.g. `prospect-store-json`). The refresh
//! orchestrator and the HTTP layer depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::{
  document::StoreDocument,
  record::{CompanyRecord, DataType},
};

/// Abstraction over the per-data-type company stores.
///
/// Each [`DataType`] is one independently persisted document. Backends must
/// make [`update_record`](ContentStore::update_record) atomic with respect to
/// other updates of the same document: no concurrent update may be lost.
pub trait ContentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Load the whole document for `data_type`.
  ///
  /// A document that does not exist yet, or cannot be parsed, reads as empty.
  fn load(
    &self,
    data_type: DataType,
  ) -> impl Future<Output = Result<StoreDocument, Self::Error>> + Send + '_;

  /// Read-modify-write one company's record.
  ///
  /// `update` receives the stored record (if any) and returns the record to
  /// store plus a value handed back to the caller. The backend holds its write
  /// lock for the whole cycle and persists the full document before
  /// returning.
  fn update_record<'a, F, T>(
    &'a self,
    data_type: DataType,
    company: &'a str,
    update: F,
  ) -> impl Future<Output = Result<T, Self::Error>> + Send + 'a
  where
    F: FnOnce(Option<CompanyRecord>) -> (CompanyRecord, T) + Send + 'a,
    T: Send + 'a;
}
