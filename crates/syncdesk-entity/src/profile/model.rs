//! Profile entity model.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use syncdesk_core::config::{ProfileConfig, RootConfig};
use syncdesk_core::types::path::segments;
use syncdesk_core::types::{ProfileId, RootId};

/// A local folder synchronized by a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRoot {
    /// Remote identifier of the root.
    pub id: RootId,
    /// Owning profile.
    pub profile_id: ProfileId,
    /// Absolute local folder.
    pub local_path: PathBuf,
}

impl SyncRoot {
    /// Create a root from its configuration.
    pub fn from_config(profile_id: ProfileId, config: &RootConfig) -> Self {
        Self {
            id: RootId(config.id.clone()),
            profile_id,
            local_path: PathBuf::from(&config.local_path),
        }
    }

    /// Local filesystem location of a cleaned root-relative path.
    pub fn local_file(&self, path: &str) -> PathBuf {
        segments(path).fold(self.local_path.clone(), |acc, s| acc.join(s))
    }

    /// Root-relative path of a local file, `None` when outside the root.
    pub fn relative_path(&self, local: &Path) -> Option<String> {
        let rest = local.strip_prefix(&self.local_path).ok()?;
        let parts: Vec<String> = rest
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        Some(format!("/{}", parts.join("/")))
    }
}

/// The account profile the daemon indexes for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Profile identifier.
    pub id: ProfileId,
    /// Machine name recorded on created versions.
    pub machine_name: String,
    /// Sync roots of this profile.
    pub roots: Vec<SyncRoot>,
}

impl Profile {
    /// Build a profile from configuration.
    pub fn from_config(config: &ProfileConfig, roots: &[RootConfig]) -> Self {
        let id = ProfileId(config.id);
        Self {
            id,
            machine_name: config.machine_name.clone(),
            roots: roots.iter().map(|r| SyncRoot::from_config(id, r)).collect(),
        }
    }

    /// Find a root by id.
    pub fn root(&self, id: &RootId) -> Option<&SyncRoot> {
        self.roots.iter().find(|r| &r.id == id)
    }
}
