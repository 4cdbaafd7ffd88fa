//! Account quota boundary.

use async_trait::async_trait;

use crate::result::AppResult;

/// Snapshot of the account's storage allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaSnapshot {
    /// Total bytes the account may store.
    pub quota: u64,
    /// Bytes already in use.
    pub used: u64,
}

impl QuotaSnapshot {
    /// Bytes still available, zero when over quota.
    pub fn available(&self) -> u64 {
        self.quota.saturating_sub(self.used)
    }

    /// Whether a file of `size` bytes fits into the remaining quota.
    pub fn fits(&self, size: u64) -> bool {
        size <= self.available()
    }
}

/// Source of the account quota as of read time.
///
/// Values may be stale; the indexer only needs eventual consistency.
#[async_trait]
pub trait QuotaProvider: Send + Sync + 'static {
    /// Read the current quota and usage.
    async fn snapshot(&self) -> AppResult<QuotaSnapshot>;
}
