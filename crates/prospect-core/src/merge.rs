//! Company-record merge: fold one producer run into the stored record.
//!
//! The stored record is the base of the result, so every field the refresh
//! does not touch survives unchanged. Only the items list, `company_name`,
//! `search_date`, `scrape_metadata`, `overall_assessment` and (for interviews)
//! `key_executives_identified` are rewritten.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  executives::reconcile_executives,
  reconcile::{Reconciled, reconcile},
  record::{CompanyRecord, DataType},
};

/// Item counts reported back to the caller of a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeStats {
  pub new_items_count:      usize,
  pub existing_items_count: usize,
  pub total_items_count:    usize,
}

/// The merged record plus its stats.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
  pub record: CompanyRecord,
  pub stats:  MergeStats,
}

/// Merge `incoming` (this run's producer output for `company`) into
/// `existing` (the stored record, if any).
///
/// `today` becomes the record's `search_date`. Pure: the caller decides
/// where the result goes.
pub fn merge_company_record(
  existing: Option<&CompanyRecord>,
  incoming: &CompanyRecord,
  data_type: DataType,
  company: &str,
  today: NaiveDate,
) -> MergeOutcome {
  let mut merged = existing.cloned().unwrap_or_default();

  let stats = match data_type {
    DataType::News => {
      let r = reconcile(
        existing.and_then(|e| e.news_items.as_deref()).unwrap_or_default(),
        incoming.news_items.as_deref().unwrap_or_default(),
      );
      let stats = stats_of(&r);
      merged.news_items = Some(r.items);
      stats
    }
    DataType::Interviews => {
      let r = reconcile(
        existing.and_then(|e| e.management_items.as_deref()).unwrap_or_default(),
        incoming.management_items.as_deref().unwrap_or_default(),
      );
      let stats = stats_of(&r);
      merged.management_items = Some(r.items);
      stats
    }
  };

  merged.company_name = non_empty(&incoming.company_name)
    .or_else(|| existing.and_then(|e| non_empty(&e.company_name)))
    .unwrap_or(company)
    .to_string()
    .into();
  merged.search_date = Some(today.format("%Y-%m-%d").to_string());

  if incoming.scrape_metadata.is_some() {
    merged.scrape_metadata = incoming.scrape_metadata.clone();
  }
  if incoming.overall_assessment.is_some() {
    merged.overall_assessment = incoming.overall_assessment.clone();
  }

  if data_type == DataType::Interviews {
    let executives = reconcile_executives(
      existing
        .and_then(|e| e.key_executives_identified.as_deref())
        .unwrap_or_default(),
      incoming.key_executives_identified.as_deref().unwrap_or_default(),
    );
    // An empty result leaves the stored list (or its absence) in place.
    if !executives.is_empty() {
      merged.key_executives_identified = Some(executives);
    }
  }

  MergeOutcome { record: merged, stats }
}

fn stats_of<T>(r: &Reconciled<T>) -> MergeStats {
  MergeStats {
    new_items_count:      r.new_count,
    existing_items_count: r.existing_count,
    total_items_count:    r.items.len(),
  }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
  s.as_deref().filter(|s| !s.is_empty())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
