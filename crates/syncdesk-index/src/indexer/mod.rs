//! The index request pipeline.
//!
//! Every request follows the same protocol: ignore check, existence check,
//! lookup, version derivation, parent linking, quota and name checks,
//! content processing, persist, enqueue. Structural misses (ignored,
//! vanished, unknown source, missing parent) are outcomes, not errors.
//! Errors while processing a single item are logged, published on the
//! status notifier and turned into [`IndexOutcome::Failed`]; only
//! internal errors escape [`Indexer::process`].

mod content;
mod delete;
mod moves;

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{Instrument, error, info, info_span};

use syncdesk_core::config::IndexConfig;
use syncdesk_core::error::{AppError, ErrorKind};
use syncdesk_core::events::{IndexEvent, StatusIcon, WithholdReason};
use syncdesk_core::result::AppResult;
use syncdesk_core::traits::QuotaProvider;
use syncdesk_core::types::path::{ROOT_PATH, parent_path};
use syncdesk_core::types::{RequestId, RootId};
use syncdesk_database::{ChunkRepository, VersionRepository, WorkspaceRepository};
use syncdesk_entity::file::{FileVersion, SyncStatus, VersionKey};
use syncdesk_entity::profile::{Profile, SyncRoot};
use syncdesk_storage::{ChunkCache, Chunker, KeyRing};

use crate::filter::PathFilter;
use crate::request::{IndexOutcome, IndexRequest};
use crate::resolver::WorkspaceResolver;
use crate::status::StatusNotifier;
use crate::upload::UploadQueue;

/// Collaborators the indexer works with.
#[derive(Clone)]
pub struct IndexServices {
    /// The profile whose roots are indexed.
    pub profile: Arc<Profile>,
    /// Version history.
    pub versions: Arc<dyn VersionRepository>,
    /// Chunk records.
    pub chunks: Arc<dyn ChunkRepository>,
    /// Registered workspaces.
    pub workspaces: Arc<dyn WorkspaceRepository>,
    /// Local chunk cache.
    pub cache: Arc<ChunkCache>,
    /// Encryption key derivation.
    pub keys: KeyRing,
    /// Account quota.
    pub quota: Arc<dyn QuotaProvider>,
    /// Upload hand-off.
    pub uploads: Arc<dyn UploadQueue>,
    /// Status signal.
    pub notifier: StatusNotifier,
}

/// Processes index requests against the version history.
pub struct Indexer {
    profile: Arc<Profile>,
    versions: Arc<dyn VersionRepository>,
    chunks: Arc<dyn ChunkRepository>,
    resolver: WorkspaceResolver,
    cache: Arc<ChunkCache>,
    keys: KeyRing,
    quota: Arc<dyn QuotaProvider>,
    uploads: Arc<dyn UploadQueue>,
    notifier: StatusNotifier,
    chunker: Chunker,
    filter: PathFilter,
    max_tree_depth: usize,
}

/// Filesystem facts about a path at processing time.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LocalEntry {
    pub(crate) is_dir: bool,
    pub(crate) size: u64,
    pub(crate) modified: DateTime<Utc>,
}

/// Where a new version hangs in the folder tree.
#[derive(Debug)]
pub(crate) enum ParentLink {
    /// Directly below the sync root.
    Root,
    /// Below an indexed folder.
    Folder(VersionKey),
    /// The parent folder is not indexed yet.
    Missing,
}

/// Emits `Updating` on creation and `UpToDate` on drop.
struct StatusScope<'a> {
    notifier: &'a StatusNotifier,
    request_id: RequestId,
}

impl<'a> StatusScope<'a> {
    fn begin(notifier: &'a StatusNotifier, request_id: RequestId) -> Self {
        notifier.status(request_id, StatusIcon::Updating);
        Self {
            notifier,
            request_id,
        }
    }
}

impl Drop for StatusScope<'_> {
    fn drop(&mut self) {
        self.notifier.status(self.request_id, StatusIcon::UpToDate);
    }
}

impl Indexer {
    /// Create an indexer.
    pub fn new(services: IndexServices, config: &IndexConfig) -> Self {
        Self {
            profile: services.profile,
            versions: services.versions,
            chunks: services.chunks,
            resolver: WorkspaceResolver::new(services.workspaces),
            cache: services.cache,
            keys: services.keys,
            quota: services.quota,
            uploads: services.uploads,
            notifier: services.notifier,
            chunker: Chunker::from_config(config),
            filter: PathFilter::from_config(config),
            max_tree_depth: config.max_tree_depth,
        }
    }

    /// The profile being indexed.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// The status notifier.
    pub fn notifier(&self) -> &StatusNotifier {
        &self.notifier
    }

    /// Process one request start to finish.
    ///
    /// Paths are cleaned first; a path that cannot be cleaned fails the
    /// request.
    pub async fn process(&self, request: IndexRequest) -> AppResult<IndexOutcome> {
        let request_id = RequestId::new();
        let span = info_span!("index", request_id = %request_id, kind = request.kind());

        async move {
            info!(request = %request, "Processing index request");
            let result = match request.normalized() {
                Ok(cleaned) => self.dispatch(request_id, &cleaned).await,
                Err(e) => Err(e),
            };

            let outcome = match result {
                Ok(outcome) => outcome,
                Err(e) => self.absorb(request.primary_path(), e)?,
            };
            info!(outcome = %outcome, "Index request finished");
            Ok(outcome)
        }
        .instrument(span)
        .await
    }

    async fn dispatch(
        &self,
        request_id: RequestId,
        request: &IndexRequest,
    ) -> AppResult<IndexOutcome> {
        match request {
            IndexRequest::New {
                root_id,
                path,
                checksum,
            } => {
                self.index_content(request_id, root_id, path, checksum.as_deref(), false)
                    .await
            }
            IndexRequest::Changed { root_id, path } => {
                self.index_content(request_id, root_id, path, None, true).await
            }
            IndexRequest::Moved {
                from_root,
                from_path,
                to_root,
                to_path,
            } => {
                self.index_move(request_id, from_root, from_path, to_root, to_path)
                    .await
            }
            IndexRequest::Deleted { root_id, path } => {
                self.index_delete(request_id, root_id, path).await
            }
        }
    }

    /// Turn a per-item error into a `Failed` outcome; internal errors
    /// propagate.
    fn absorb(&self, path: &str, err: AppError) -> AppResult<IndexOutcome> {
        if err.kind == ErrorKind::Internal {
            return Err(err);
        }
        error!(path, error = %err, "Could not index item, skipping it");
        let message = err.to_string();
        self.notifier.notify(IndexEvent::Failed {
            path: path.to_string(),
            message: message.clone(),
        });
        Ok(IndexOutcome::Failed { message })
    }

    fn root(&self, id: &RootId) -> AppResult<&SyncRoot> {
        self.profile
            .root(id)
            .ok_or_else(|| AppError::validation(format!("Unknown sync root '{id}'")))
    }

    async fn parent_link(&self, root_id: &RootId, path: &str) -> AppResult<ParentLink> {
        let Some(parent) = parent_path(path) else {
            return Ok(ParentLink::Root);
        };
        if parent == ROOT_PATH {
            return Ok(ParentLink::Root);
        }
        Ok(
            match self
                .versions
                .find_folder(self.profile.id, root_id, &parent)
                .await?
            {
                Some(folder) => ParentLink::Folder(folder.key()),
                None => ParentLink::Missing,
            },
        )
    }

    /// Why `version` must not be uploaded, if at all. Quota is checked
    /// first and only when `check_quota` is set.
    async fn withhold_reason(
        &self,
        version: &FileVersion,
        check_quota: bool,
    ) -> AppResult<Option<WithholdReason>> {
        if check_quota && !version.is_folder {
            let quota = self.quota.snapshot().await?;
            if !quota.fits(version.size) {
                return Ok(Some(WithholdReason::QuotaExceeded));
            }
        }
        if self.filter.is_illegal(&version.path) {
            return Ok(Some(WithholdReason::IllegalName));
        }
        Ok(None)
    }

    /// Drop the superseded record, then merge `version`.
    async fn persist(&self, version: &mut FileVersion, supersedes: Option<VersionKey>) -> AppResult<()> {
        if let Some(key) = supersedes {
            let removed = self.versions.remove(&key).await?;
            info!(superseded = %key, removed, "Replaced unsynced version");
        }
        version.updated = Utc::now();
        self.versions.merge(version).await
    }

    async fn persist_withheld(
        &self,
        version: &mut FileVersion,
        supersedes: Option<VersionKey>,
        reason: WithholdReason,
    ) -> AppResult<IndexOutcome> {
        version.sync_status = SyncStatus::Unsync;
        self.persist(version, supersedes).await?;
        info!(
            file_id = %version.file_id,
            version = version.version,
            path = %version.path,
            reason = %reason,
            "Version withheld from upload"
        );
        self.notifier.notify(IndexEvent::Withheld {
            file_id: version.file_id,
            version: version.version,
            path: version.path.clone(),
            reason,
        });
        Ok(IndexOutcome::Withheld {
            file_id: version.file_id,
            version: version.version,
            reason,
        })
    }

    /// Queue a persisted version for upload.
    async fn enqueue(&self, version: &FileVersion) -> AppResult<IndexOutcome> {
        if !version.is_withheld() {
            self.uploads.queue(version).await?;
        }
        info!(
            file_id = %version.file_id,
            version = version.version,
            path = %version.path,
            status = %version.status,
            chunks = version.chunks.len(),
            "Version indexed"
        );
        self.notifier.notify(IndexEvent::Indexed {
            file_id: version.file_id,
            version: version.version,
            path: version.path.clone(),
        });
        Ok(IndexOutcome::Indexed {
            file_id: version.file_id,
            version: version.version,
        })
    }
}

impl std::fmt::Debug for Indexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Indexer")
            .field("profile", &self.profile.id)
            .field("chunker", &self.chunker)
            .field("max_tree_depth", &self.max_tree_depth)
            .finish_non_exhaustive()
    }
}

/// Stat a local path; `None` when it does not exist.
pub(crate) async fn stat(local: &Path) -> AppResult<Option<LocalEntry>> {
    match tokio::fs::metadata(local).await {
        Ok(meta) => Ok(Some(LocalEntry {
            is_dir: meta.is_dir(),
            size: if meta.is_dir() { 0 } else { meta.len() },
            modified: meta
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now()),
        })),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to stat {}", local.display()),
            e,
        )),
    }
}
