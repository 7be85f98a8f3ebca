//! Key-value persistence surfaces for the session.
//!
//! # Design
//! `KeyValueStore` is the equivalent of browser local storage: string keys,
//! string values. The multi-key `set_many` / `remove_many` operations are the
//! primitive the session store builds its atomic save and clear on, so each
//! implementation must apply them as a single step.
//!
//! - `MemoryStore` keeps entries in a shared map; clones observe the same
//!   entries, which lets tests inspect what a session store wrote.
//! - `FileStore` keeps all entries in one JSON object file and rewrites it
//!   through a temp file plus rename, so a reader never sees half a write.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, error};

/// Errors raised by a persistence backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String-keyed persistence surface.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write every entry in one step.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError>;

    /// Remove every key in one step. Missing keys are ignored.
    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.remove_many(&[key])
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// In-process store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with raw entries, bypassing any session invariant.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Arc::new(Mutex::new(map)),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut map = self.lock();
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut map = self.lock();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// Store backed by a single JSON object file.
///
/// A missing file reads as empty. A file that cannot be decoded also reads
/// as empty and is overwritten by the next write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "discarding unreadable store file");
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let encoded = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, encoded).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        debug!(path = %self.path.display(), keys = entries.len(), "store file written");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut current = self.read_entries()?;
        for (key, value) in entries {
            current.insert((*key).to_string(), (*value).to_string());
        }
        self.write_entries(&current)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut current = self.read_entries()?;
        let before = current.len();
        for key in keys {
            current.remove(*key);
        }
        if current.len() == before && !self.path.exists() {
            return Ok(());
        }
        self.write_entries(&current)
    }
}
