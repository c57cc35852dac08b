//! Content-item reconciliation: union by identity, newest first.
//!
//! Existing items are authoritative. An incoming item whose URL is already
//! known is dropped, never used to update the stored copy.

use std::{cmp::Reverse, collections::HashSet};

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::record::ContentItem;

/// The merged list together with the counts reported back to callers.
#[derive(Debug, Clone)]
pub struct Reconciled<T> {
  pub items:          Vec<T>,
  /// Incoming items that were not already present.
  pub new_count:      usize,
  /// Items present before the merge.
  pub existing_count: usize,
}

/// Merge `incoming` into `existing`.
///
/// The result holds every existing item once, followed by every incoming item
/// with an unseen key (first occurrence wins, including repeats inside
/// `incoming`), stably sorted by [`published_timestamp`] descending. Items
/// without a usable date sort last.
pub fn reconcile<T: ContentItem>(existing: &[T], incoming: &[T]) -> Reconciled<T> {
  let mut seen: HashSet<&str> =
    existing.iter().map(|item| item.identity_key()).collect();

  let fresh: Vec<&T> = incoming
    .iter()
    .filter(|item| seen.insert(item.identity_key()))
    .collect();
  let new_count = fresh.len();

  let mut items: Vec<T> = existing
    .iter()
    .chain(fresh)
    .cloned()
    .collect();

  // `Option` orders `None` first, so reversing puts undated items last.
  items.sort_by_cached_key(|item| {
    Reverse(item.published_date().and_then(published_timestamp))
  });

  Reconciled {
    items,
    new_count,
    existing_count: existing.len(),
  }
}

/// Parse a `published_date` into milliseconds since the Unix epoch (UTC).
///
/// Accepts RFC 3339 date-times, naive `YYYY-MM-DDTHH:MM:SS[.f]` date-times
/// (read as UTC), and the date-only forms `YYYY-MM-DD`, `YYYY-MM` and `YYYY`
/// (midnight UTC on the first day of the period), plus `March 15, 2024` and
/// `Mar 15, 2024`. Anything else is `None`.
pub fn published_timestamp(raw: &str) -> Option<i64> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }

  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.timestamp_millis());
  }

  for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
      return Some(dt.and_utc().timestamp_millis());
    }
  }

  for fmt in ["%B %d, %Y", "%b %d, %Y"] {
    if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
      return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp_millis());
    }
  }

  let date = match raw.len() {
    4 => NaiveDate::parse_from_str(&format!("{raw}-01-01"), "%Y-%m-%d"),
    7 => NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d"),
    _ => NaiveDate::parse_from_str(raw, "%Y-%m-%d"),
  };
  date
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|dt| dt.and_utc().timestamp_millis())
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{identity::Identity, record::NewsItem};

  fn item(url: &str, date: Option<&str>) -> NewsItem {
    NewsItem {
      url:            Some(url.into()),
      published_date: date.map(str::to_string),
      ..Default::default()
    }
  }

  fn urls(items: &[NewsItem]) -> Vec<&str> {
    items.iter().map(|i| i.identity_key()).collect()
  }

  #[test]
  fn first_refresh_takes_everything() {
    let incoming = vec![item("u1", Some("2024-05-01"))];
    let r = reconcile(&[], &incoming);
    assert_eq!(urls(&r.items), ["u1"]);
    assert_eq!(r.new_count, 1);
    assert_eq!(r.existing_count, 0);
  }

  #[test]
  fn known_url_is_suppressed_and_newer_item_leads() {
    let existing = vec![item("u1", Some("2024-05-01"))];
    let incoming = vec![
      item("u1", Some("2024-05-01")),
      item("u2", Some("2024-06-01")),
    ];
    let r = reconcile(&existing, &incoming);
    assert_eq!(urls(&r.items), ["u2", "u1"]);
    assert_eq!(r.new_count, 1);
    assert_eq!(r.existing_count, 1);
  }

  #[test]
  fn existing_copy_wins_over_incoming_duplicate() {
    let mut stored = item("u1", Some("2024-05-01"));
    stored.summary = Some("curated".into());
    let mut rescraped = item("u1", Some("2024-05-01"));
    rescraped.summary = Some("fresh".into());

    let r = reconcile(&[stored], &[rescraped]);
    assert_eq!(r.items.len(), 1);
    assert_eq!(r.items[0].summary.as_deref(), Some("curated"));
  }

  #[test]
  fn repeated_incoming_url_is_kept_once() {
    let incoming = vec![
      item("u1", Some("2024-05-01")),
      item("u1", Some("2024-07-01")),
    ];
    let r = reconcile(&[], &incoming);
    assert_eq!(r.items.len(), 1);
    assert_eq!(r.items[0].published_date.as_deref(), Some("2024-05-01"));
    assert_eq!(r.new_count, 1);
  }

  #[test]
  fn undated_and_garbage_dates_sort_last_in_input_order() {
    let existing = vec![
      item("none", None),
      item("old", Some("2023-01-01")),
      item("junk", Some("last tuesday")),
    ];
    let incoming = vec![item("new", Some("2024-02-01T08:30:00Z"))];
    let r = reconcile(&existing, &incoming);
    assert_eq!(urls(&r.items), ["new", "old", "none", "junk"]);
  }

  #[test]
  fn month_name_dates_sort_with_iso_dates() {
    let existing = vec![item("old", Some("2020-01-01")), item("mid", Some("Jan 5, 2023"))];
    let incoming = vec![
      item("new", Some("March 15, 2024")),
      item("iso", Some("2023-06-01")),
    ];
    let r = reconcile(&existing, &incoming);
    assert_eq!(urls(&r.items), ["new", "iso", "mid", "old"]);
    assert_eq!(
      published_timestamp("March 15, 2024"),
      published_timestamp("2024-03-15")
    );
  }

  #[test]
  fn equal_timestamps_keep_input_order() {
    let existing = vec![item("a", Some("2024-05-01")), item("b", Some("2024-05-01"))];
    let incoming = vec![item("c", Some("2024-05-01T00:00:00Z"))];
    let r = reconcile(&existing, &incoming);
    assert_eq!(urls(&r.items), ["a", "b", "c"]);
  }

  #[test]
  fn reconciling_twice_is_idempotent() {
    let existing = vec![item("u1", Some("2024-05-01"))];
    let incoming = vec![item("u2", Some("2024-06-01")), item("u3", None)];
    let once = reconcile(&existing, &incoming);
    let twice = reconcile(&once.items, &incoming);
    assert_eq!(twice.items, once.items);
    assert_eq!(twice.new_count, 0);
  }

  #[test]
  fn result_is_sorted_for_valid_dates() {
    let existing = vec![
      item("a", Some("2022-03-04")),
      item("b", Some("2024-11-30")),
    ];
    let incoming = vec![
      item("c", Some("2023-07-15T12:00:00+02:00")),
      item("d", Some("2024-01")),
      item("e", Some("2021")),
    ];
    let r = reconcile(&existing, &incoming);
    let stamps: Vec<i64> = r
      .items
      .iter()
      .map(|i| published_timestamp(i.published_date.as_deref().unwrap()).unwrap())
      .collect();
    assert!(stamps.windows(2).all(|w| w[0] >= w[1]), "{stamps:?}");
  }

  #[test]
  fn timestamp_forms() {
    let day = published_timestamp("2024-05-01").unwrap();
    assert_eq!(published_timestamp("2024-05-01T00:00:00Z"), Some(day));
    assert_eq!(published_timestamp("2024-05-01T00:00:00"), Some(day));
    assert_eq!(published_timestamp("2024-05-01T02:00:00+02:00"), Some(day));
    assert_eq!(published_timestamp("2024-05"), Some(day));
    assert!(published_timestamp("2024").unwrap() < day);
    assert_eq!(published_timestamp(""), None);
    assert_eq!(published_timestamp("2024-13-01"), None);
    assert_eq!(published_timestamp("May 1st"), None);
  }
}
