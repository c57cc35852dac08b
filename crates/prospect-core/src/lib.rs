//! Core types and merge logic for the Prospect content stores.
//!
//! This crate is deliberately free of HTTP, process and filesystem
//! dependencies. Everything here is a pure transform over typed records; the
//! [`store::ContentStore`] trait is the only seam to persistence.

pub mod document;
pub mod error;
pub mod executives;
pub mod identity;
pub mod merge;
pub mod reconcile;
pub mod record;
pub mod store;

pub use error::{Error, Result};
