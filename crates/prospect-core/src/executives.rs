//! Executive aggregation: field-level upsert keyed by name.

use std::collections::HashMap;

use crate::{identity::Identity, record::ExecutiveProfile};

/// Fold `incoming` profiles into `existing`.
///
/// A matching name keeps the existing profile and refreshes it: `title` and
/// `relevance` take the incoming value unless it is empty, `content_count`
/// becomes the sum of both sides (absent counts as 0). Unmatched profiles are
/// appended unchanged. Existing profiles keep their position; new names follow
/// in incoming order.
pub fn reconcile_executives(
  existing: &[ExecutiveProfile],
  incoming: &[ExecutiveProfile],
) -> Vec<ExecutiveProfile> {
  let mut merged: Vec<ExecutiveProfile> = Vec::with_capacity(existing.len());
  let mut index: HashMap<String, usize> = HashMap::new();
  for exec in existing {
    // A name stored twice keeps its first position and its last profile.
    match index.get(exec.identity_key()) {
      Some(&pos) => merged[pos] = exec.clone(),
      None => {
        index.insert(exec.identity_key().to_string(), merged.len());
        merged.push(exec.clone());
      }
    }
  }

  for exec in incoming {
    match index.get(exec.identity_key()) {
      Some(&pos) => refresh(&mut merged[pos], exec),
      None => {
        index.insert(exec.identity_key().to_string(), merged.len());
        merged.push(exec.clone());
      }
    }
  }

  tracing::debug!(
    total = merged.len(),
    incoming = incoming.len(),
    "merged executives"
  );
  merged
}

fn refresh(current: &mut ExecutiveProfile, update: &ExecutiveProfile) {
  if let Some(title) = non_empty(&update.title) {
    current.title = Some(title.to_string());
  }
  if let Some(relevance) = non_empty(&update.relevance) {
    current.relevance = Some(relevance.to_string());
  }
  let total = current
    .content_count
    .unwrap_or(0)
    .saturating_add(update.content_count.unwrap_or(0));
  current.content_count = Some(total);
}

fn non_empty(s: &Option<String>) -> Option<&str> {
  s.as_deref().filter(|s| !s.is_empty())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
