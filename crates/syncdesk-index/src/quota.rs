//! Quota provider backed by the configured account snapshot.

use std::sync::RwLock;

use async_trait::async_trait;

use syncdesk_core::config::AccountConfig;
use syncdesk_core::result::AppResult;
use syncdesk_core::traits::{QuotaProvider, QuotaSnapshot};

/// Account quota as last reported by the server.
#[derive(Debug)]
pub struct AccountQuota {
    snapshot: RwLock<QuotaSnapshot>,
}

impl AccountQuota {
    /// Create a provider with fixed values.
    pub fn new(quota: u64, used: u64) -> Self {
        Self {
            snapshot: RwLock::new(QuotaSnapshot { quota, used }),
        }
    }

    /// Create a provider from the account configuration.
    pub fn from_config(config: &AccountConfig) -> Self {
        Self::new(config.quota_bytes, config.quota_used_bytes)
    }

    /// Replace the snapshot with fresh server values.
    pub fn update(&self, quota: u64, used: u64) {
        let mut snapshot = self
            .snapshot
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *snapshot = QuotaSnapshot { quota, used };
    }
}

#[async_trait]
impl QuotaProvider for AccountQuota {
    async fn snapshot(&self) -> AppResult<QuotaSnapshot> {
        Ok(*self
            .snapshot
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner))
    }
}
