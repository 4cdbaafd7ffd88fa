//! File chunking.
//!
//! A [`Chunker`] turns a file into a [`ChunkStream`]: a lazy, finite
//! sequence of [`FileChunk`]s numbered from 1. The last chunk carries the
//! SHA-256 of the whole file. Chunking the same bytes again yields the same
//! sequence, which is what makes chunk-level dedup work.

mod stream;

use std::fs::File;
use std::path::Path;

use bytes::Bytes;
use sha2::{Digest, Sha256};

use syncdesk_core::config::{ChunkingStrategy, IndexConfig};
use syncdesk_core::error::AppError;
use syncdesk_core::result::AppResult;

pub use stream::ChunkStream;

/// One chunk of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChunk {
    /// Position in the file, starting at 1.
    pub number: u64,
    /// SHA-256 of `contents`, lowercase hex.
    pub checksum: String,
    /// The chunk bytes.
    pub contents: Bytes,
    /// SHA-256 of the whole file, set on the last chunk only.
    pub file_checksum: Option<String>,
}

impl FileChunk {
    /// Whether this is the last chunk of the file.
    pub fn is_last(&self) -> bool {
        self.file_checksum.is_some()
    }
}

/// Boundary selection for a [`Chunker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundaries {
    /// Fixed-size blocks.
    Fixed {
        /// Block size in bytes.
        size: u32,
    },
    /// FastCDC content-defined boundaries.
    ContentDefined {
        /// Minimum chunk size.
        min: u32,
        /// Average chunk size.
        avg: u32,
        /// Maximum chunk size.
        max: u32,
    },
}

/// Creates chunk streams for files.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    boundaries: Boundaries,
}

impl Chunker {
    /// Create a chunker with explicit boundaries.
    pub fn new(boundaries: Boundaries) -> Self {
        Self { boundaries }
    }

    /// Create a chunker from the index configuration.
    pub fn from_config(config: &IndexConfig) -> Self {
        let boundaries = match config.chunking {
            ChunkingStrategy::Fixed => Boundaries::Fixed {
                size: config.chunk_size_bytes,
            },
            ChunkingStrategy::ContentDefined => Boundaries::ContentDefined {
                min: config.cdc_min_size,
                avg: config.cdc_avg_size,
                max: config.cdc_max_size,
            },
        };
        Self::new(boundaries)
    }

    /// Boundaries in use.
    pub fn boundaries(&self) -> Boundaries {
        self.boundaries
    }

    /// Open `path` and return a fresh chunk stream over it.
    ///
    /// The stream holds the file open until it is exhausted, closed or
    /// dropped.
    pub fn create_chunks(&self, path: &Path) -> AppResult<ChunkStream> {
        let file = File::open(path)
            .map_err(|e| AppError::io(format_args!("Failed to open {}", path.display()), e))?;
        Ok(ChunkStream::new(file, self.boundaries))
    }
}

/// SHA-256 of `data`, lowercase hex.
pub fn checksum(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
