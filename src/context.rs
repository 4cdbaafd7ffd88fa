//! Wiring of the index pipeline from configuration.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use syncdesk_core::config::AppConfig;
use syncdesk_core::error::AppError;
use syncdesk_core::result::AppResult;
use syncdesk_core::types::RootId;
use syncdesk_database::{MemoryDatabase, WorkspaceRepository};
use syncdesk_entity::file::FileVersion;
use syncdesk_entity::profile::Profile;
use syncdesk_entity::workspace::Workspace;
use syncdesk_index::{
    AccountQuota, ChannelUploadQueue, IndexServices, Indexer, StatusNotifier,
};
use syncdesk_storage::{ChunkCache, EncryptionMode, KeyRing};

/// Everything a command needs to run index requests.
pub struct IndexContext {
    /// Effective configuration.
    pub config: AppConfig,
    /// Version database, bound to the snapshot file.
    pub database: Arc<MemoryDatabase>,
    /// The indexer.
    pub indexer: Arc<Indexer>,
    /// Versions handed to the upload queue.
    pub uploads: UnboundedReceiver<FileVersion>,
}

impl IndexContext {
    /// Open the database and build the pipeline.
    pub async fn build(config: AppConfig) -> AppResult<Self> {
        for dir in [&config.storage.data_root, &config.storage.chunk_cache_dir] {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                AppError::configuration(format!("Failed to create dir '{dir}': {e}"))
            })?;
        }

        let database = Arc::new(MemoryDatabase::open(&config.storage.database_file).await?);
        for workspace in &config.workspaces {
            database.register(&Workspace::from(workspace)).await?;
        }

        let mode: EncryptionMode = config.profile.encryption.cipher.parse()?;
        let cache = ChunkCache::new(&config.storage.chunk_cache_dir, mode.packer());
        let (uploads, receiver) = ChannelUploadQueue::new();
        let profile = Profile::from_config(&config.profile, &config.roots);

        info!(
            profile = %profile.id,
            roots = profile.roots.len(),
            workspaces = config.workspaces.len(),
            cipher = mode.as_str(),
            "Index pipeline ready"
        );

        let services = IndexServices {
            profile: Arc::new(profile),
            versions: database.clone(),
            chunks: database.clone(),
            workspaces: database.clone(),
            cache: Arc::new(cache),
            keys: KeyRing::new(&config.profile.encryption.secret),
            quota: Arc::new(AccountQuota::from_config(&config.profile.account)),
            uploads: Arc::new(uploads),
            notifier: StatusNotifier::default(),
        };
        let indexer = Arc::new(Indexer::new(services, &config.index));

        Ok(Self {
            config,
            database,
            indexer,
            uploads: receiver,
        })
    }

    /// The root named on the command line, or the only configured root.
    pub fn root(&self, requested: Option<&str>) -> AppResult<RootId> {
        match requested {
            Some(id) => {
                let id = RootId::from(id);
                self.indexer
                    .profile()
                    .root(&id)
                    .map(|r| r.id.clone())
                    .ok_or_else(|| AppError::validation(format!("Unknown sync root '{id}'")))
            }
            None => match self.indexer.profile().roots.as_slice() {
                [only] => Ok(only.id.clone()),
                [] => Err(AppError::configuration("No sync roots configured")),
                _ => Err(AppError::validation(
                    "Several sync roots configured, pass --root",
                )),
            },
        }
    }

    /// Drain versions queued for upload so far.
    pub fn drain_uploads(&mut self) -> Vec<FileVersion> {
        let mut queued = Vec::new();
        while let Ok(version) = self.uploads.try_recv() {
            queued.push(version);
        }
        queued
    }

    /// Persist the database snapshot.
    pub async fn save(&self) -> AppResult<()> {
        self.database.save().await?;
        info!(file = %self.config.storage.database_file, "Saved database snapshot");
        Ok(())
    }
}
