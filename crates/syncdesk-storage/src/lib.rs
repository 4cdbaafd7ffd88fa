//! # syncdesk-storage
//!
//! Local content handling for SyncDesk: splitting files into chunks,
//! packing chunks under an encryption context, and the on-disk chunk cache
//! the uploader reads from.

pub mod cache;
pub mod chunker;
pub mod crypto;

pub use cache::{ChunkCache, WriteOutcome};
pub use chunker::{ChunkStream, Chunker, FileChunk};
pub use crypto::{EncryptionMode, KeyRing};
