//! Store documents — the `{ companyName: record }` JSON object shared by
//! store files and producer output.
//!
//! Records are kept as raw JSON until someone asks for one, so a record this
//! crate cannot type (hand-edited, written by an older scraper) is carried
//! through a write untouched instead of poisoning the whole file.

use serde_json::{Map, Value};

use crate::{Error, Result, record::CompanyRecord};

/// A parsed store file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreDocument {
  records: Map<String, Value>,
}

impl StoreDocument {
  pub fn new() -> Self { Self::default() }

  /// Parse a document. The top level must be a JSON object.
  pub fn from_slice(bytes: &[u8]) -> Result<Self> {
    match serde_json::from_slice::<Value>(bytes)? {
      Value::Object(records) => Ok(Self { records }),
      _ => Err(Error::NotAnObject),
    }
  }

  /// Serialise with two-space indentation.
  pub fn to_pretty_json(&self) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(&self.records)?)
  }

  /// The typed record for `company`, or `None` if absent.
  pub fn get(&self, company: &str) -> Result<Option<CompanyRecord>> {
    self
      .records
      .get(company)
      .map(|raw| typed(company, raw.clone()))
      .transpose()
  }

  /// The raw JSON for `company`.
  pub fn get_raw(&self, company: &str) -> Option<&Value> {
    self.records.get(company)
  }

  /// Insert or replace the record for `company`. Other entries keep their
  /// position.
  pub fn insert(&mut self, company: &str, record: &CompanyRecord) -> Result<()> {
    let value = serde_json::to_value(record)?;
    self.records.insert(company.to_string(), value);
    Ok(())
  }

  pub fn companies(&self) -> impl Iterator<Item = &str> {
    self.records.keys().map(String::as_str)
  }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  pub fn as_map(&self) -> &Map<String, Value> { &self.records }
}

// ─── Producer output ─────────────────────────────────────────────────────────

/// The file a producer run leaves behind: same shape as a store document,
/// usually holding a single company.
#[derive(Debug, Clone)]
pub struct ProducerOutput(StoreDocument);

impl ProducerOutput {
  pub fn from_slice(bytes: &[u8]) -> Result<Self> {
    StoreDocument::from_slice(bytes).map(Self)
  }

  /// Remove and type the entry for `company` (exact match).
  ///
  /// Fails with [`Error::MissingCompanyData`] when the producer wrote nothing
  /// for that name.
  pub fn take_company(&mut self, company: &str) -> Result<CompanyRecord> {
    let raw = self
      .0
      .records
      .remove(company)
      .ok_or_else(|| Error::MissingCompanyData(company.to_string()))?;
    typed(company, raw)
  }

  pub fn companies(&self) -> impl Iterator<Item = &str> { self.0.companies() }
}

fn typed(company: &str, raw: Value) -> Result<CompanyRecord> {
  serde_json::from_value(raw).map_err(|source| Error::InvalidRecord {
    company: company.to_string(),
    source,
  })
}
