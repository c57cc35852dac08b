//! Record types — the typed shape of one company's refreshed content.
//!
//! Producer output and the persisted stores share one JSON shape. Every field
//! is optional so partially-populated producer runs still validate, and every
//! struct carries a flattened `extra` map so keys this crate does not model
//! (curated annotations, `raw_response`, producer diagnostics) survive a merge
//! byte-for-byte.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::{Error, identity::Identity};

// ─── Data type ───────────────────────────────────────────────────────────────

/// Which content store a refresh targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
  News,
  Interviews,
}

impl DataType {
  pub const ALL: [DataType; 2] = [DataType::News, DataType::Interviews];

  /// The record field holding this type's content items.
  pub fn items_key(self) -> &'static str {
    match self {
      DataType::News => "news_items",
      DataType::Interviews => "management_items",
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      DataType::News => "news",
      DataType::Interviews => "interviews",
    }
  }
}

impl fmt::Display for DataType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for DataType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "news" => Ok(DataType::News),
      "interviews" => Ok(DataType::Interviews),
      other => Err(Error::UnknownDataType(other.to_string())),
    }
  }
}

// ─── Content items ───────────────────────────────────────────────────────────

/// A news article about a company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title:            Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source:           Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub url:              Option<String>,
  /// ISO 8601 date or date-time.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub published_date:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub summary:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub relevance_score:  Option<Number>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub relevance_reason: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub key_insights:     Option<Vec<String>>,
  /// Signal category, e.g. `catalog_expansion`. Left open: producers add
  /// categories faster than consumers learn them.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub category:         Option<String>,
  #[serde(flatten)]
  pub extra:            Map<String, Value>,
}

/// An interview, podcast, keynote or similar piece featuring an executive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterviewItem {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title:            Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source:           Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub url:              Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub published_date:   Option<String>,
  /// `interview`, `podcast`, `keynote`, `article`, `panel`, ...
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub format:           Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub executive_name:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub executive_title:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub summary:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub key_quotes:       Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub topics_discussed: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub relevance_score:  Option<Number>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub relevance_reason: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sales_insights:   Option<Vec<String>>,
  #[serde(flatten)]
  pub extra:            Map<String, Value>,
}

/// A dated content item the reconciler can order.
pub trait ContentItem: Identity + Clone {
  fn published_date(&self) -> Option<&str>;
}

impl ContentItem for NewsItem {
  fn published_date(&self) -> Option<&str> { self.published_date.as_deref() }
}

impl ContentItem for InterviewItem {
  fn published_date(&self) -> Option<&str> { self.published_date.as_deref() }
}

// ─── Executives ──────────────────────────────────────────────────────────────

/// An executive surfaced by interview content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveProfile {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub relevance:     Option<String>,
  /// Number of content items featuring this executive, summed across
  /// refreshes.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub content_count: Option<u64>,
  #[serde(flatten)]
  pub extra:         Map<String, Value>,
}

// ─── Company record ──────────────────────────────────────────────────────────

/// Everything known about one company for one [`DataType`].
///
/// Only one of `news_items` / `management_items` is populated in practice,
/// matching the store the record lives in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub company_name:              Option<String>,
  /// `YYYY-MM-DD` of the last successful refresh.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub search_date:               Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub news_items:                Option<Vec<NewsItem>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub management_items:          Option<Vec<InterviewItem>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub key_executives_identified: Option<Vec<ExecutiveProfile>>,
  /// Opaque score and free-text assessment produced by the scraper.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub overall_assessment:        Option<Value>,
  /// Opaque run metadata (timestamp, model, flags) of the newest producer run.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub scrape_metadata:           Option<Value>,
  #[serde(flatten)]
  pub extra:                     Map<String, Value>,
}

impl CompanyRecord {
  /// Number of content items held for `data_type`.
  pub fn item_count(&self, data_type: DataType) -> usize {
    match data_type {
      DataType::News => self.news_items.as_ref().map_or(0, Vec::len),
      DataType::Interviews => self.management_items.as_ref().map_or(0, Vec::len),
    }
  }
}
