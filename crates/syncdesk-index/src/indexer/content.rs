//! New and Changed requests: version derivation and chunking.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use syncdesk_core::AppError;
use syncdesk_core::result::AppResult;
use syncdesk_core::types::{RequestId, RootId};
use syncdesk_entity::file::{CacheStatus, ChunkKey, CreateFileVersion, FileVersion};
use syncdesk_storage::FileChunk;
use syncdesk_storage::chunker::checksum;

use super::{Indexer, LocalEntry, ParentLink, StatusScope, stat};
use crate::request::{IndexOutcome, IndexRequest};
use crate::versioning::derive_content;

/// Chunks buffered between the reading thread and the indexer.
const CHUNK_BUFFER: usize = 4;

impl Indexer {
    pub(super) async fn index_content(
        &self,
        request_id: RequestId,
        root_id: &RootId,
        path: &str,
        known_checksum: Option<&str>,
        changed: bool,
    ) -> AppResult<IndexOutcome> {
        if self.filter.is_ignored(path) {
            debug!(path, "Path matches an ignore rule");
            return Ok(IndexOutcome::Ignored);
        }

        let root = self.root(root_id)?;
        let local = root.local_file(path);
        let Some(entry) = stat(&local).await? else {
            warn!(path, "Path vanished before it could be indexed");
            return Ok(IndexOutcome::Vanished);
        };

        let prior = self
            .versions
            .find_by_path(self.profile.id, root_id, path)
            .await?;

        if changed && prior.is_none() {
            warn!(path, "No indexed version for changed path, indexing as new");
            return Ok(IndexOutcome::Redispatched(Box::new(IndexRequest::New {
                root_id: root_id.clone(),
                path: path.to_string(),
                checksum: None,
            })));
        }

        if let Some(prior) = &prior {
            if is_duplicate(prior, &entry, known_checksum) {
                debug!(path, version = prior.version, "Already indexed this version");
                return Ok(IndexOutcome::Skipped);
            }
        }

        let parent = match self.parent_link(root_id, path).await? {
            ParentLink::Root => None,
            ParentLink::Folder(key) => Some(key),
            ParentLink::Missing => {
                warn!(path, "Parent folder is not indexed yet, deferring");
                return Ok(IndexOutcome::Deferred);
            }
        };

        let _status = StatusScope::begin(&self.notifier, request_id);

        let derived = derive_content(
            prior.as_ref(),
            CreateFileVersion {
                profile_id: self.profile.id,
                root_id: root_id.clone(),
                path: path.to_string(),
                is_folder: entry.is_dir,
                size: entry.size,
                last_modified: entry.modified,
                client_name: self.profile.machine_name.clone(),
            },
        );
        let supersedes = derived.supersedes;
        let mut version = derived.version;
        version.parent = parent;
        version.workspace_id = self.resolver.resolve(path).await?.map(|w| w.id);

        if let Some(reason) = self.withhold_reason(&version, true).await? {
            return self.persist_withheld(&mut version, supersedes, reason).await;
        }

        if !version.is_folder {
            if let Err(e) = self.process_content(&mut version, &local).await {
                if e.is_not_found() {
                    warn!(path, "File vanished while chunking");
                    return Ok(IndexOutcome::Vanished);
                }
                return Err(e);
            }
        }

        self.persist(&mut version, supersedes).await?;
        self.enqueue(&version).await
    }

    /// Chunk the file at `local` into `version`.
    ///
    /// Every chunk is recorded and written to the cache under the context
    /// of the version's workspace, then attached at its ordinal. Keys left
    /// over from a longer previous content are dropped. The chunk stream is
    /// closed on every exit path: the reading thread stops as soon as the
    /// receiver is dropped.
    pub(super) async fn process_content(
        &self,
        version: &mut FileVersion,
        local: &Path,
    ) -> AppResult<()> {
        let context = self.keys.for_workspace(version.workspace_id.as_ref());
        let mut chunks = self.spawn_chunker(local.to_path_buf());
        let mut produced = 0usize;
        let mut file_checksum = None;

        while let Some(item) = chunks.recv().await {
            let chunk = item?;
            let key = ChunkKey::new(chunk.checksum.as_str(), context.id.as_str());
            let record = self.chunks.get_or_create(&key, CacheStatus::Cached).await?;
            let written = self
                .cache
                .write_if_absent(&record.key, &chunk.contents, &context)
                .await?;
            debug!(
                file_id = %version.file_id,
                number = chunk.number,
                chunk = %record.key,
                outcome = ?written,
                "Chunk stored"
            );

            let ordinal = usize::try_from(chunk.number - 1)
                .map_err(|_| AppError::internal("Chunk number does not fit in memory"))?;
            version.attach_chunk(ordinal, record.key);
            produced += 1;
            if let Some(sum) = chunk.file_checksum {
                file_checksum = Some(sum);
            }
        }

        version.truncate_chunks(produced);
        version.checksum = match file_checksum {
            Some(sum) => Some(sum),
            None if produced == 0 && version.size == 0 => Some(checksum(&[])),
            None if produced == 0 => {
                return Err(AppError::storage(format!(
                    "No chunks produced for {} ({} bytes)",
                    version.path, version.size
                )));
            }
            None => {
                return Err(AppError::storage(format!(
                    "Chunk stream for {} ended without a file checksum",
                    version.path
                )));
            }
        };
        Ok(())
    }

    /// Read chunks of `local` on the blocking pool and stream them back.
    fn spawn_chunker(&self, local: PathBuf) -> mpsc::Receiver<AppResult<FileChunk>> {
        let (tx, rx) = mpsc::channel(CHUNK_BUFFER);
        let chunker = self.chunker;

        tokio::task::spawn_blocking(move || {
            let mut stream = match chunker.create_chunks(&local) {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = tx.blocking_send(Err(e));
                    return;
                }
            };
            for item in stream.by_ref() {
                if tx.blocking_send(item).is_err() {
                    break;
                }
            }
            stream.close();
        });

        rx
    }
}

/// Whether the prior version already describes what is on disk.
fn is_duplicate(prior: &FileVersion, entry: &LocalEntry, known_checksum: Option<&str>) -> bool {
    if prior.is_withheld() || prior.is_folder != entry.is_dir {
        return false;
    }
    if prior.is_folder {
        return true;
    }
    if let (Some(known), Some(recorded)) = (known_checksum, prior.checksum.as_deref()) {
        if known == recorded {
            return true;
        }
    }
    prior.size == entry.size && prior.last_modified == entry.modified
}
