//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tempfile::TempDir;

use syncdesk_core::config::IndexConfig;
use syncdesk_core::error::AppError;
use syncdesk_core::result::AppResult;
use syncdesk_core::types::path::segments;
use syncdesk_core::types::{FileId, ProfileId, RootId, WorkspaceId};
use syncdesk_database::{ChunkRepository, MemoryDatabase, VersionRepository, WorkspaceRepository};
use syncdesk_entity::file::FileVersion;
use syncdesk_entity::profile::{Profile, SyncRoot};
use syncdesk_entity::workspace::Workspace;
use syncdesk_index::{
    AccountQuota, IndexOutcome, IndexRequest, IndexServices, Indexer, StatusNotifier, UploadQueue,
};
use syncdesk_storage::{ChunkCache, EncryptionMode, KeyRing};

/// Root id used by every test.
pub const ROOT: &str = "root-1";

/// Upload queue that remembers every version it was handed.
///
/// Paths registered with [`RecordingUploadQueue::reject`] fail to queue.
#[derive(Debug, Default)]
pub struct RecordingUploadQueue {
    queued: Mutex<Vec<FileVersion>>,
    rejected: Mutex<HashSet<String>>,
}

impl RecordingUploadQueue {
    /// Versions queued so far.
    pub fn queued(&self) -> Vec<FileVersion> {
        self.queued.lock().expect("upload queue lock").clone()
    }

    /// Make every later upload of `path` fail.
    pub fn reject(&self, path: &str) {
        self.rejected
            .lock()
            .expect("upload queue lock")
            .insert(path.to_string());
    }
}

#[async_trait]
impl UploadQueue for RecordingUploadQueue {
    async fn queue(&self, version: &FileVersion) -> AppResult<()> {
        if self
            .rejected
            .lock()
            .expect("upload queue lock")
            .contains(&version.path)
        {
            return Err(AppError::storage(format!(
                "Upload queue refused {}",
                version.path
            )));
        }
        self.queued
            .lock()
            .expect("upload queue lock")
            .push(version.clone());
        Ok(())
    }
}

/// Test indexing context over a temporary sync root
pub struct TestIndexer {
    /// Keeps the temp dir alive
    pub dir: TempDir,
    /// Local folder of the sync root
    pub local: PathBuf,
    /// Version database
    pub db: Arc<MemoryDatabase>,
    /// The indexer under test
    pub indexer: Arc<Indexer>,
    /// Recording upload queue
    pub uploads: Arc<RecordingUploadQueue>,
    /// Account quota
    pub quota: Arc<AccountQuota>,
    /// Chunk cache
    pub cache: Arc<ChunkCache>,
    clock: AtomicU64,
}

impl TestIndexer {
    /// Create a test indexer with small fixed-size chunks
    pub fn new() -> Self {
        Self::with_config(IndexConfig {
            chunk_size_bytes: 1024,
            ..IndexConfig::default()
        })
    }

    /// Create a test indexer with a custom index configuration
    pub fn with_config(config: IndexConfig) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let local = dir.path().join("sync");
        std::fs::create_dir_all(&local).expect("Failed to create sync root");

        let db = Arc::new(MemoryDatabase::new());
        let uploads = Arc::new(RecordingUploadQueue::default());
        let quota = Arc::new(AccountQuota::new(1 << 30, 0));
        let cache = Arc::new(ChunkCache::new(
            dir.path().join("cache"),
            EncryptionMode::Aes256Gcm.packer(),
        ));

        let profile = Profile {
            id: ProfileId(1),
            machine_name: "test-desk".into(),
            roots: vec![SyncRoot {
                id: RootId::from(ROOT),
                profile_id: ProfileId(1),
                local_path: local.clone(),
            }],
        };
        let services = IndexServices {
            profile: Arc::new(profile),
            versions: db.clone(),
            chunks: db.clone(),
            workspaces: db.clone(),
            cache: cache.clone(),
            keys: KeyRing::new("test-secret"),
            quota: quota.clone(),
            uploads: uploads.clone(),
            notifier: StatusNotifier::default(),
        };

        Self {
            local,
            indexer: Arc::new(Indexer::new(services, &config)),
            db,
            uploads,
            quota,
            cache,
            dir,
            clock: AtomicU64::new(0),
        }
    }

    /// Local filesystem location of a root-relative path
    pub fn local_path(&self, path: &str) -> PathBuf {
        segments(path).fold(self.local.clone(), |acc, s| acc.join(s))
    }

    /// Write a file, creating parent folders.
    ///
    /// Every write gets a distinct modification time so that rewrites of
    /// the same size are never mistaken for an already indexed version.
    pub fn write_file(&self, path: &str, contents: &[u8]) {
        let local = self.local_path(path);
        if let Some(parent) = local.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(&local, contents).expect("Failed to write file");

        let tick = self.clock.fetch_add(1, Ordering::SeqCst);
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + tick * 10);
        std::fs::File::options()
            .write(true)
            .open(&local)
            .and_then(|f| f.set_modified(mtime))
            .expect("Failed to set mtime");
    }

    /// Create a folder
    pub fn mkdir(&self, path: &str) {
        std::fs::create_dir_all(self.local_path(path)).expect("Failed to create dir");
    }

    /// Rename a path on disk
    pub fn rename(&self, from: &str, to: &str) {
        let target = self.local_path(to);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::rename(self.local_path(from), target).expect("Failed to rename");
    }

    /// Remove a file or folder tree on disk
    pub fn remove(&self, path: &str) {
        let local = self.local_path(path);
        if local.is_dir() {
            std::fs::remove_dir_all(local).expect("Failed to remove dir");
        } else {
            std::fs::remove_file(local).expect("Failed to remove file");
        }
    }

    /// Process a request and return its outcome
    pub async fn process(&self, request: IndexRequest) -> IndexOutcome {
        self.indexer
            .process(request)
            .await
            .expect("Index request returned an internal error")
    }

    /// Write a file and index it as new
    pub async fn add_file(&self, path: &str, contents: &[u8]) -> IndexOutcome {
        self.write_file(path, contents);
        self.process(IndexRequest::new_file(ROOT, path)).await
    }

    /// Create a folder and index it as new
    pub async fn add_folder(&self, path: &str) -> IndexOutcome {
        self.mkdir(path);
        self.process(IndexRequest::new_file(ROOT, path)).await
    }

    /// Latest live version at a path
    pub async fn find(&self, path: &str) -> Option<FileVersion> {
        self.db
            .find_by_path(ProfileId(1), &RootId::from(ROOT), path)
            .await
            .expect("Failed to query version")
    }

    /// Latest live version at a path, which must exist
    pub async fn get(&self, path: &str) -> FileVersion {
        self.find(path)
            .await
            .unwrap_or_else(|| panic!("No live version at {path}"))
    }

    /// Version numbers of a history
    pub async fn versions_of(&self, file_id: FileId) -> Vec<u64> {
        self.db
            .history(ProfileId(1), file_id)
            .await
            .expect("Failed to query history")
            .iter()
            .map(|v| v.version)
            .collect()
    }

    /// Versions handed to the upload queue
    pub fn uploaded(&self) -> Vec<FileVersion> {
        self.uploads.queued()
    }

    /// Live versions of the test root, ordered by path
    pub async fn live(&self) -> Vec<FileVersion> {
        self.db
            .list_live(ProfileId(1), &RootId::from(ROOT))
            .await
            .expect("Failed to list live versions")
    }

    /// Number of chunk records
    pub async fn chunk_records(&self) -> usize {
        self.db.count().await.expect("Failed to count chunks")
    }

    /// Register a shared workspace at a root-relative path
    pub async fn register_workspace(&self, path: &str) -> WorkspaceId {
        let workspace = Workspace::new(WorkspaceId::new(), "Shared", path);
        self.db
            .register(&workspace)
            .await
            .expect("Failed to register workspace");
        workspace.id
    }

    /// Number of blob files stored under a cache context
    pub fn blobs_in(&self, context: &str) -> usize {
        count_files(&self.cache.root().join(context))
    }
}

fn count_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() { count_files(&path) } else { 1 }
        })
        .sum()
}

/// Deterministic pseudo-random bytes
pub fn varied(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xff) as u8
        })
        .collect()
}
