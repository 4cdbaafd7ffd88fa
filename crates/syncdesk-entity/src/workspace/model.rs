//! Workspace entity model.

use serde::{Deserialize, Serialize};

use syncdesk_core::config::WorkspaceConfig;
use syncdesk_core::types::WorkspaceId;
use syncdesk_core::types::path::clean_path;

/// A shared folder registered with the account.
///
/// Every path at or below [`Workspace::path`] belongs to the workspace
/// unless a nearer workspace encloses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Unique workspace identifier.
    pub id: WorkspaceId,
    /// Display name.
    pub name: String,
    /// Cleaned root-relative path of the shared folder.
    pub path: String,
}

impl Workspace {
    /// Create a workspace, cleaning the path.
    pub fn new(id: WorkspaceId, name: impl Into<String>, path: &str) -> Self {
        Self {
            id,
            name: name.into(),
            path: clean_path(path),
        }
    }
}

impl From<&WorkspaceConfig> for Workspace {
    fn from(config: &WorkspaceConfig) -> Self {
        Self::new(config.id, config.name.clone(), &config.path)
    }
}
