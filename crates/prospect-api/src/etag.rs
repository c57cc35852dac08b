//! Strong ETags over served JSON bytes.

use sha2::{Digest, Sha256};

/// Compute a quoted ETag for `body`.
pub fn compute_etag(body: &[u8]) -> String {
  format!("\"{}\"", hex::encode(Sha256::digest(body)))
}

/// Whether an `If-None-Match` header value matches `etag`.
///
/// Handles `*`, comma-separated lists and weak validators.
pub fn if_none_match(header: &str, etag: &str) -> bool {
  header
    .split(',')
    .map(str::trim)
    .any(|tag| tag == "*" || tag.trim_start_matches("W/") == etag)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn etag_is_quoted_sha256() {
    let tag = compute_etag(b"{}");
    assert_eq!(tag.len(), 64 + 2);
    assert!(tag.starts_with('"') && tag.ends_with('"'));
    assert_eq!(tag, compute_etag(b"{}"));
    assert_ne!(tag, compute_etag(b"{ }"));
  }

  #[test]
  fn if_none_match_forms() {
    let tag = compute_etag(b"[]");
    assert!(if_none_match(&tag, &tag));
    assert!(if_none_match("*", &tag));
    assert!(if_none_match(&format!("\"other\", W/{tag}"), &tag));
    assert!(!if_none_match("\"other\"", &tag));
  }
}
