//! Record identity — which two records describe the same real-world entity.
//!
//! Keys are compared verbatim: no trimming, no case folding, no URL
//! normalisation. Two URLs differing only by a trailing slash are distinct.
//! An absent key is the empty string, so all key-less records collide.

use crate::record::{ExecutiveProfile, InterviewItem, NewsItem};

/// A record with a stable identity key.
pub trait Identity {
  fn identity_key(&self) -> &str;
}

impl Identity for NewsItem {
  fn identity_key(&self) -> &str { self.url.as_deref().unwrap_or("") }
}

impl Identity for InterviewItem {
  fn identity_key(&self) -> &str { self.url.as_deref().unwrap_or("") }
}

impl Identity for ExecutiveProfile {
  fn identity_key(&self) -> &str { self.name.as_deref().unwrap_or("") }
}
