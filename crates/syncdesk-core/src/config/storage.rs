//! Local storage configuration.

use serde::{Deserialize, Serialize};

/// Where the daemon keeps its runtime state on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for all runtime data.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// Directory holding encrypted chunk blobs awaiting upload.
    #[serde(default = "default_chunk_cache_dir")]
    pub chunk_cache_dir: String,
    /// JSON snapshot of the version database.
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            chunk_cache_dir: default_chunk_cache_dir(),
            database_file: default_database_file(),
        }
    }
}

fn default_data_root() -> String {
    "./data".to_string()
}

fn default_chunk_cache_dir() -> String {
    "./data/cache".to_string()
}

fn default_database_file() -> String {
    "./data/index.json".to_string()
}
