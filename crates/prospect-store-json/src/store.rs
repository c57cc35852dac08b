//! [`JsonFileStore`] — the JSON-file implementation of [`ContentStore`].

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
  sync::Arc,
};

use prospect_core::{
  document::StoreDocument,
  record::{CompanyRecord, DataType},
  store::ContentStore,
};
use tokio::sync::Mutex;

use crate::{Error, Result};

/// Default file name of the news store.
pub const NEWS_FILE: &str = "news_data.json";
/// Default file name of the management-interviews store.
pub const INTERVIEWS_FILE: &str = "management_interviews.json";

// ─── Store ───────────────────────────────────────────────────────────────────

/// Company stores backed by one JSON file per [`DataType`].
///
/// Cloning is cheap — clones share the files and their write locks.
#[derive(Clone)]
pub struct JsonFileStore {
  news:       Arc<StoreFile>,
  interviews: Arc<StoreFile>,
}

struct StoreFile {
  path: PathBuf,
  /// Held for the full read-merge-write cycle of an update.
  lock: Mutex<()>,
}

impl StoreFile {
  fn new(path: PathBuf) -> Arc<Self> {
    Arc::new(Self { path, lock: Mutex::new(()) })
  }
}

impl JsonFileStore {
  /// Stores named [`NEWS_FILE`] and [`INTERVIEWS_FILE`] inside `dir`.
  pub fn in_dir(dir: impl AsRef<Path>) -> Self {
    let dir = dir.as_ref();
    Self::with_paths(dir.join(NEWS_FILE), dir.join(INTERVIEWS_FILE))
  }

  /// Stores at explicit paths.
  pub fn with_paths(news: impl Into<PathBuf>, interviews: impl Into<PathBuf>) -> Self {
    Self {
      news:       StoreFile::new(news.into()),
      interviews: StoreFile::new(interviews.into()),
    }
  }

  /// The file backing `data_type`.
  pub fn path(&self, data_type: DataType) -> &Path { &self.file(data_type).path }

  fn file(&self, data_type: DataType) -> &StoreFile {
    match data_type {
      DataType::News => &self.news,
      DataType::Interviews => &self.interviews,
    }
  }
}

impl ContentStore for JsonFileStore {
  type Error = Error;

  async fn load(&self, data_type: DataType) -> Result<StoreDocument> {
    read_document(&self.file(data_type).path).await
  }

  async fn update_record<'a, F, T>(
    &'a self,
    data_type: DataType,
    company: &'a str,
    update: F,
  ) -> Result<T>
  where
    F: FnOnce(Option<CompanyRecord>) -> (CompanyRecord, T) + Send + 'a,
    T: Send + 'a,
  {
    let file = self.file(data_type);
    let _guard = file.lock.lock().await;

    let mut doc = read_document(&file.path).await?;
    let existing = doc.get(company)?;
    let (record, out) = update(existing);
    doc.insert(company, &record)?;

    write_atomic(&file.path, &doc.to_pretty_json()?).await?;
    tracing::debug!(
      path = %file.path.display(),
      %data_type,
      company,
      companies = doc.len(),
      "store written"
    );
    Ok(out)
  }
}

// ─── File helpers ────────────────────────────────────────────────────────────

/// Read a store document. Missing and unparseable files read as empty.
async fn read_document(path: &Path) -> Result<StoreDocument> {
  let bytes = match tokio::fs::read(path).await {
    Ok(bytes) => bytes,
    Err(e) if e.kind() == ErrorKind::NotFound => {
      tracing::info!(path = %path.display(), "no existing store, starting empty");
      return Ok(StoreDocument::new());
    }
    Err(source) => {
      return Err(Error::Read { path: path.to_path_buf(), source });
    }
  };

  match StoreDocument::from_slice(&bytes) {
    Ok(doc) => Ok(doc),
    Err(e) => {
      tracing::warn!(
        path = %path.display(),
        error = %e,
        "existing store is not a valid document, treating it as empty"
      );
      Ok(StoreDocument::new())
    }
  }
}

/// Write `bytes` to a sibling temp file, then rename it over `path`.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
  let write_err = |source| Error::Write { path: path.to_path_buf(), source };

  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
  }

  let file_name = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default();
  let tmp = path.with_file_name(format!(".{file_name}.tmp"));

  tokio::fs::write(&tmp, bytes).await.map_err(write_err)?;
  if let Err(source) = tokio::fs::rename(&tmp, path).await {
    let _ = tokio::fs::remove_file(&tmp).await;
    return Err(write_err(source));
  }
  Ok(())
}
