//! File version repository.

use async_trait::async_trait;

use syncdesk_core::result::AppResult;
use syncdesk_core::types::{FileId, ProfileId, RootId};
use syncdesk_entity::file::{FileVersion, VersionKey};

/// Query and merge access to the version history.
///
/// "Live" lookups only consider the latest version of each history and
/// skip histories whose latest version records a deletion.
#[async_trait]
pub trait VersionRepository: Send + Sync + 'static {
    /// Latest live version at `path`.
    async fn find_by_path(
        &self,
        profile_id: ProfileId,
        root_id: &RootId,
        path: &str,
    ) -> AppResult<Option<FileVersion>>;

    /// Latest live folder version at `path`.
    async fn find_folder(
        &self,
        profile_id: ProfileId,
        root_id: &RootId,
        path: &str,
    ) -> AppResult<Option<FileVersion>> {
        Ok(self
            .find_by_path(profile_id, root_id, path)
            .await?
            .filter(|v| v.is_folder))
    }

    /// Latest live versions whose parent link points into the history of
    /// `parent`.
    async fn find_children(&self, parent: &FileVersion) -> AppResult<Vec<FileVersion>>;

    /// A specific version.
    async fn find_version(&self, key: &VersionKey) -> AppResult<Option<FileVersion>>;

    /// All versions of a history in ascending order.
    async fn history(&self, profile_id: ProfileId, file_id: FileId) -> AppResult<Vec<FileVersion>>;

    /// Latest version of a history, deleted or not.
    async fn latest_version(
        &self,
        profile_id: ProfileId,
        file_id: FileId,
    ) -> AppResult<Option<FileVersion>> {
        Ok(self.history(profile_id, file_id).await?.pop())
    }

    /// First version of a history.
    async fn first_version(
        &self,
        profile_id: ProfileId,
        file_id: FileId,
    ) -> AppResult<Option<FileVersion>> {
        Ok(self.history(profile_id, file_id).await?.into_iter().next())
    }

    /// The version immediately before `version`.
    async fn previous_version(&self, version: &FileVersion) -> AppResult<Option<FileVersion>> {
        match version.previous_key() {
            Some(key) => self.find_version(&key).await,
            None => Ok(None),
        }
    }

    /// Latest live versions of a root, ordered by path.
    async fn list_live(&self, profile_id: ProfileId, root_id: &RootId)
    -> AppResult<Vec<FileVersion>>;

    /// Insert or replace a version by identity.
    async fn merge(&self, version: &FileVersion) -> AppResult<()>;

    /// Remove a version and, recursively, every version whose parent link
    /// is that exact version. Returns the number of removed records.
    async fn remove(&self, key: &VersionKey) -> AppResult<usize>;
}
