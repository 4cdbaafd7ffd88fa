//! Workspace repository.

use async_trait::async_trait;

use syncdesk_core::result::AppResult;
use syncdesk_entity::workspace::Workspace;

/// Registered shared workspaces.
#[async_trait]
pub trait WorkspaceRepository: Send + Sync + 'static {
    /// Workspace whose path equals `path` exactly.
    async fn find_at_path(&self, path: &str) -> AppResult<Option<Workspace>>;

    /// All registered workspaces.
    async fn list(&self) -> AppResult<Vec<Workspace>>;

    /// Register or replace a workspace by id.
    async fn register(&self, workspace: &Workspace) -> AppResult<()>;
}
