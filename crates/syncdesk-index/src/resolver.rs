//! Workspace resolution by upward path search.

use std::sync::Arc;

use tracing::debug;

use syncdesk_core::result::AppResult;
use syncdesk_core::types::path::ancestors;
use syncdesk_database::WorkspaceRepository;
use syncdesk_entity::workspace::Workspace;

/// Finds the nearest registered workspace enclosing a path.
#[derive(Clone)]
pub struct WorkspaceResolver {
    workspaces: Arc<dyn WorkspaceRepository>,
}

impl WorkspaceResolver {
    /// Create a resolver over the workspace repository.
    pub fn new(workspaces: Arc<dyn WorkspaceRepository>) -> Self {
        Self { workspaces }
    }

    /// Try `path`, then each ancestor down to `/`; the first registered
    /// workspace wins. `None` when the path is outside every workspace.
    pub async fn resolve(&self, path: &str) -> AppResult<Option<Workspace>> {
        for candidate in ancestors(path) {
            if let Some(workspace) = self.workspaces.find_at_path(&candidate).await? {
                debug!(path, workspace = %workspace.id, "Resolved workspace");
                return Ok(Some(workspace));
            }
        }
        Ok(None)
    }
}

impl std::fmt::Debug for WorkspaceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceResolver").finish_non_exhaustive()
    }
}
