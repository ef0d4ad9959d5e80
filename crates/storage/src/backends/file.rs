//! File-backed backend.
//!
//! All entries live in one JSON object on disk. Every write rewrites the
//! whole document into a sibling temporary file and renames it over the
//! original, so a multi-key write is never observed half-applied.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::core::KeyValueStore;
use crate::error::{StorageError, StorageResult};

type Document = BTreeMap<String, String>;

/// A [`KeyValueStore`] persisted as a JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Creates a store at `path`. The file is created lazily on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StorageResult<Document> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(Document::new());
        }

        serde_json::from_str(&contents)
            .map_err(|e| StorageError::parse(self.path.display().to_string(), e))
    }

    /// Loads the document for modification. A corrupt file is replaced.
    fn load_for_write(&self) -> StorageResult<Document> {
        match self.load() {
            Ok(doc) => Ok(doc),
            Err(e) if e.is_parse() => {
                warn!(path = %self.path.display(), error = %e, "Discarding corrupt store file");
                Ok(Document::new())
            }
            Err(e) => Err(e),
        }
    }

    fn persist(&self, doc: &Document) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.temp_path();
        let bytes = serde_json::to_vec_pretty(doc)?;
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), keys = doc.len(), "Store file written");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl KeyValueStore for FileStore {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, String)]) -> StorageResult<()> {
        let _guard = self.write_lock.lock();
        let mut doc = self.load_for_write()?;
        for (key, value) in entries {
            doc.insert((*key).to_string(), value.clone());
        }
        self.persist(&doc)
    }

    fn remove_many(&self, keys: &[&str]) -> StorageResult<()> {
        let _guard = self.write_lock.lock();
        let mut doc = self.load_for_write()?;
        let before = doc.len();
        for key in keys {
            doc.remove(*key);
        }
        if doc.len() == before && self.path.exists() {
            return Ok(());
        }
        self.persist(&doc)
    }
}
