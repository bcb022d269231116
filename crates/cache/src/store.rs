//! Flat string key-value stores.
//!
//! [`MemoryStore`] lives only as long as the process. [`JsonFileStore`]
//! keeps the whole map in memory and writes it through to a single JSON
//! file on every mutation, so a crash loses at most the write in flight.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use tc_domain::error::{Error, Result};

/// Last-write-wins string storage, the analogue of browser `localStorage`.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-memory store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries.write().insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// JSON file store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Key-value store backed by one JSON object on disk.
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Load the store at `path`, creating parent directories as needed.
    ///
    /// An unreadable or corrupt file is treated as empty: the cache is
    /// disposable and the next write replaces it.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(Error::Io)?;
        }

        let entries: HashMap<String, String> = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(Error::Io)?;
            match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "cache file is corrupt, starting empty"
                    );
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        tracing::debug!(
            keys = entries.len(),
            path = %path.display(),
            "cache store loaded"
        );

        Ok(Self {
            path: path.to_owned(),
            entries: RwLock::new(entries),
        })
    }

    /// Persist the current map to disk.
    pub fn flush(&self) -> Result<()> {
        let json = {
            let entries = self.entries.read();
            serde_json::to_string_pretty(&*entries)
                .map_err(|e| Error::Storage(format!("serializing cache: {e}")))?
        };
        std::fs::write(&self.path, json).map_err(Error::Io)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries.write().insert(key.to_owned(), value);
        self.flush()
    }

    fn remove(&self, key: &str) -> Result<()> {
        let removed = self.entries.write().remove(key).is_some();
        if removed {
            self.flush()?;
        }
        Ok(())
    }
}
