//! Account profile, sync roots, and registered workspaces.

use serde::{Deserialize, Serialize};

use crate::types::WorkspaceId;

/// The local account profile the daemon indexes for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Numeric profile identifier.
    #[serde(default = "default_profile_id")]
    pub id: u32,
    /// Name recorded as `client_name` on every version this machine creates.
    #[serde(default = "default_machine_name")]
    pub machine_name: String,
    /// Account quota as last reported by the server.
    #[serde(default)]
    pub account: AccountConfig,
    /// Chunk encryption settings.
    #[serde(default)]
    pub encryption: EncryptionConfig,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            id: default_profile_id(),
            machine_name: default_machine_name(),
            account: AccountConfig::default(),
            encryption: EncryptionConfig::default(),
        }
    }
}

/// Quota snapshot for the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Total quota in bytes.
    #[serde(default = "default_quota")]
    pub quota_bytes: u64,
    /// Bytes already used on the server.
    #[serde(default)]
    pub quota_used_bytes: u64,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            quota_bytes: default_quota(),
            quota_used_bytes: 0,
        }
    }
}

/// Chunk encryption settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptionConfig {
    /// Cipher: `"aes256gcm"` or `"none"`.
    #[serde(default = "default_cipher")]
    pub cipher: String,
    /// Master secret from which per-context keys are derived.
    #[serde(default)]
    pub secret: String,
}

impl Default for EncryptionConfig {
    fn default() -> Self {
        Self {
            cipher: default_cipher(),
            secret: String::new(),
        }
    }
}

/// A local folder synchronized by this profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootConfig {
    /// Remote identifier of the root.
    pub id: String,
    /// Absolute local path of the root folder.
    pub local_path: String,
}

/// A shared folder registered with the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Workspace UUID as assigned by the server.
    pub id: WorkspaceId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Root-relative path of the shared folder, e.g. `/shared`.
    pub path: String,
}

fn default_profile_id() -> u32 {
    1
}

fn default_machine_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string())
}

fn default_quota() -> u64 {
    5_368_709_120 // 5 GB
}

fn default_cipher() -> String {
    "aes256gcm".to_string()
}
