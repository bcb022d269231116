use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Local cache storage
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// JSON file backing the key-value cache. Defaults to
    /// `~/.tripchat/storage.json`.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Keep everything in memory; nothing survives a restart.
    #[serde(default)]
    pub in_memory: bool,
}

impl StorageConfig {
    /// The file the cache should live in, if one can be determined.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path
            .clone()
            .or_else(|| dirs::home_dir().map(|h| h.join(".tripchat").join("storage.json")))
    }
}
