//! Content-addressed chunk entities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lookup key of a chunk: content checksum plus the encryption context it
/// was packed under.
///
/// The same bytes stored in two workspaces are two chunks, because their
/// packed blobs differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkKey {
    /// SHA-256 of the plaintext, lowercase hex.
    pub checksum: String,
    /// Encryption context id.
    pub context: String,
}

impl ChunkKey {
    /// Create a key.
    pub fn new(checksum: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            checksum: checksum.into(),
            context: context.into(),
        }
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.context, self.checksum)
    }
}

/// Whether the packed blob is present in the local chunk cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CacheStatus {
    /// The packed blob is in the local cache.
    #[default]
    Cached,
    /// Only the server holds the blob.
    Remote,
}

impl CacheStatus {
    /// Return the status as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cached => "CACHED",
            Self::Remote => "REMOTE",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A deduplicated block of file content, referenced by any number of
/// versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Lookup key.
    pub key: ChunkKey,
    /// Local cache state.
    pub cache_status: CacheStatus,
}

impl Chunk {
    /// A freshly cached chunk.
    pub fn cached(key: ChunkKey) -> Self {
        Self {
            key,
            cache_status: CacheStatus::Cached,
        }
    }

    /// Return the plaintext checksum.
    pub fn checksum(&self) -> &str {
        &self.key.checksum
    }
}
