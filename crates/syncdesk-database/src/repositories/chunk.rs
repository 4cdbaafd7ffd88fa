//! Chunk repository.

use async_trait::async_trait;

use syncdesk_core::result::AppResult;
use syncdesk_entity::file::{CacheStatus, Chunk, ChunkKey};

/// Chunk records keyed by checksum and context.
#[async_trait]
pub trait ChunkRepository: Send + Sync + 'static {
    /// Return the chunk for `key`, creating it with `cache_status` if absent.
    ///
    /// Idempotent: concurrent calls with the same key observe one record.
    async fn get_or_create(&self, key: &ChunkKey, cache_status: CacheStatus) -> AppResult<Chunk>;

    /// Find a chunk by key.
    async fn find(&self, key: &ChunkKey) -> AppResult<Option<Chunk>>;

    /// Number of chunk records.
    async fn count(&self) -> AppResult<usize>;
}
