//! Indexer configuration: chunking, path filters, and recursion bounds.

use serde::{Deserialize, Serialize};

/// How file contents are split into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingStrategy {
    /// Fixed-size blocks of `chunk_size_bytes`.
    #[default]
    Fixed,
    /// FastCDC content-defined boundaries.
    ContentDefined,
}

/// Index request pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Chunking strategy.
    #[serde(default)]
    pub chunking: ChunkingStrategy,
    /// Block size for fixed-size chunking (default 512 KiB).
    #[serde(default = "default_chunk_size")]
    pub chunk_size_bytes: u32,
    /// Minimum chunk size for content-defined chunking.
    #[serde(default = "default_cdc_min")]
    pub cdc_min_size: u32,
    /// Average chunk size for content-defined chunking.
    #[serde(default = "default_cdc_avg")]
    pub cdc_avg_size: u32,
    /// Maximum chunk size for content-defined chunking.
    #[serde(default = "default_cdc_max")]
    pub cdc_max_size: u32,
    /// Exact file names that are never indexed.
    #[serde(default = "default_ignore_names")]
    pub ignore_names: Vec<String>,
    /// Name prefixes that are never indexed (editor lock files, etc.).
    #[serde(default = "default_ignore_prefixes")]
    pub ignore_prefixes: Vec<String>,
    /// Name suffixes that are never indexed.
    #[serde(default = "default_ignore_suffixes")]
    pub ignore_suffixes: Vec<String>,
    /// Characters that make a name unsyncable.
    #[serde(default = "default_illegal_characters")]
    pub illegal_characters: String,
    /// Deepest folder nesting a recursive move or delete will descend.
    #[serde(default = "default_max_tree_depth")]
    pub max_tree_depth: usize,
    /// How many times a request waiting for its parent folder is re-queued.
    #[serde(default = "default_max_deferrals")]
    pub max_deferrals: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkingStrategy::default(),
            chunk_size_bytes: default_chunk_size(),
            cdc_min_size: default_cdc_min(),
            cdc_avg_size: default_cdc_avg(),
            cdc_max_size: default_cdc_max(),
            ignore_names: default_ignore_names(),
            ignore_prefixes: default_ignore_prefixes(),
            ignore_suffixes: default_ignore_suffixes(),
            illegal_characters: default_illegal_characters(),
            max_tree_depth: default_max_tree_depth(),
            max_deferrals: default_max_deferrals(),
        }
    }
}

fn default_chunk_size() -> u32 {
    512 * 1024
}

fn default_cdc_min() -> u32 {
    64 * 1024
}

fn default_cdc_avg() -> u32 {
    256 * 1024
}

fn default_cdc_max() -> u32 {
    1024 * 1024
}

fn default_ignore_names() -> Vec<String> {
    vec![
        ".DS_Store".to_string(),
        "Thumbs.db".to_string(),
        "desktop.ini".to_string(),
    ]
}

fn default_ignore_prefixes() -> Vec<String> {
    vec![".ignore".to_string(), "~$".to_string(), ".~lock".to_string()]
}

fn default_ignore_suffixes() -> Vec<String> {
    vec![".swp".to_string(), ".tmp".to_string()]
}

fn default_illegal_characters() -> String {
    "\\:*?\"<>|".to_string()
}

fn default_max_tree_depth() -> usize {
    64
}

fn default_max_deferrals() -> u32 {
    5
}
