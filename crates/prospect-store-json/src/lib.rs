//! JSON-file backend for the Prospect content stores.
//!
//! One pretty-printed JSON document per data type. Updates hold a per-file
//! async lock across the whole read-merge-write cycle and replace the file
//! atomically, so concurrent refreshes never lose each other's writes and
//! readers never observe a half-written file.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{INTERVIEWS_FILE, JsonFileStore, NEWS_FILE};

#[cfg(test)]
mod tests;
