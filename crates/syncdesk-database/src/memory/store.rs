//! In-memory implementation of every repository trait.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::debug;

use syncdesk_core::result::AppResult;
use syncdesk_core::types::{FileId, ProfileId, RootId};
use syncdesk_entity::file::{CacheStatus, Chunk, ChunkKey, FileVersion, VersionKey};
use syncdesk_entity::workspace::Workspace;

use super::snapshot::Snapshot;
use super::table::VersionTable;
use crate::repositories::{ChunkRepository, VersionRepository, WorkspaceRepository};

/// Version, chunk and workspace tables held in memory.
///
/// Optionally bound to a snapshot file that [`MemoryDatabase::save`]
/// writes to.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    versions: RwLock<VersionTable>,
    chunks: DashMap<ChunkKey, Chunk>,
    workspaces: RwLock<Vec<Workspace>>,
    snapshot_path: Option<PathBuf>,
}

impl MemoryDatabase {
    /// Create an empty database that is never persisted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the database from `path`, starting empty if it does not exist.
    pub async fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let snapshot = Snapshot::read(&path).await?;
        let db = Self::from_snapshot(snapshot);
        Ok(Self {
            snapshot_path: Some(path),
            ..db
        })
    }

    /// Build a database from a snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut table = VersionTable::default();
        for version in snapshot.versions {
            table.insert(version);
        }
        let chunks = DashMap::new();
        for chunk in snapshot.chunks {
            chunks.insert(chunk.key.clone(), chunk);
        }
        Self {
            versions: RwLock::new(table),
            chunks,
            workspaces: RwLock::new(snapshot.workspaces),
            snapshot_path: None,
        }
    }

    /// Capture every table.
    pub async fn snapshot(&self) -> Snapshot {
        let versions = self.versions.read().await.all().cloned().collect();
        let chunks = self.chunks.iter().map(|e| e.value().clone()).collect();
        let workspaces = self.workspaces.read().await.clone();
        Snapshot {
            saved_at: Some(Utc::now()),
            versions,
            chunks,
            workspaces,
        }
    }

    /// Write the snapshot file, if the database is bound to one.
    pub async fn save(&self) -> AppResult<()> {
        match &self.snapshot_path {
            Some(path) => self.snapshot().await.write(path).await,
            None => {
                debug!("Database has no snapshot file, skipping save");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl VersionRepository for MemoryDatabase {
    async fn find_by_path(
        &self,
        profile_id: ProfileId,
        root_id: &RootId,
        path: &str,
    ) -> AppResult<Option<FileVersion>> {
        Ok(self
            .versions
            .read()
            .await
            .live_at(profile_id, root_id, path)
            .cloned())
    }

    async fn find_children(&self, parent: &FileVersion) -> AppResult<Vec<FileVersion>> {
        let table = self.versions.read().await;
        let mut children: Vec<FileVersion> = table
            .live()
            .filter(|v| {
                v.profile_id == parent.profile_id
                    && v.parent
                        .as_ref()
                        .is_some_and(|p| p.file_id == parent.file_id)
            })
            .cloned()
            .collect();
        children.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(children)
    }

    async fn find_version(&self, key: &VersionKey) -> AppResult<Option<FileVersion>> {
        Ok(self.versions.read().await.get(key).cloned())
    }

    async fn history(&self, profile_id: ProfileId, file_id: FileId) -> AppResult<Vec<FileVersion>> {
        Ok(self.versions.read().await.history(profile_id, file_id))
    }

    async fn list_live(
        &self,
        profile_id: ProfileId,
        root_id: &RootId,
    ) -> AppResult<Vec<FileVersion>> {
        let table = self.versions.read().await;
        let mut live: Vec<FileVersion> = table
            .live()
            .filter(|v| v.profile_id == profile_id && &v.root_id == root_id)
            .cloned()
            .collect();
        live.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(live)
    }

    async fn merge(&self, version: &FileVersion) -> AppResult<()> {
        self.versions.write().await.insert(version.clone());
        debug!(
            file_id = %version.file_id,
            version = version.version,
            path = %version.path,
            "Merged version"
        );
        Ok(())
    }

    async fn remove(&self, key: &VersionKey) -> AppResult<usize> {
        let removed = self.versions.write().await.remove_cascade(key);
        debug!(key = %key, removed, "Removed version");
        Ok(removed)
    }
}

#[async_trait]
impl ChunkRepository for MemoryDatabase {
    async fn get_or_create(&self, key: &ChunkKey, cache_status: CacheStatus) -> AppResult<Chunk> {
        let chunk = self
            .chunks
            .entry(key.clone())
            .or_insert_with(|| Chunk {
                key: key.clone(),
                cache_status,
            })
            .value()
            .clone();
        Ok(chunk)
    }

    async fn find(&self, key: &ChunkKey) -> AppResult<Option<Chunk>> {
        Ok(self.chunks.get(key).map(|c| c.value().clone()))
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.chunks.len())
    }
}

#[async_trait]
impl WorkspaceRepository for MemoryDatabase {
    async fn find_at_path(&self, path: &str) -> AppResult<Option<Workspace>> {
        Ok(self
            .workspaces
            .read()
            .await
            .iter()
            .find(|w| w.path == path)
            .cloned())
    }

    async fn list(&self) -> AppResult<Vec<Workspace>> {
        Ok(self.workspaces.read().await.clone())
    }

    async fn register(&self, workspace: &Workspace) -> AppResult<()> {
        let mut workspaces = self.workspaces.write().await;
        match workspaces.iter_mut().find(|w| w.id == workspace.id) {
            Some(existing) => *existing = workspace.clone(),
            None => workspaces.push(workspace.clone()),
        }
        Ok(())
    }
}
