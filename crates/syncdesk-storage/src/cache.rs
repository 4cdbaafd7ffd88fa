//! On-disk cache of packed chunks.
//!
//! Layout: `{root}/{context}/{checksum[..2]}/{checksum}`. A blob is written
//! through a temp file and hard-linked into place, so two writers racing on
//! the same key produce one blob and both observe success.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use syncdesk_core::error::{AppError, ErrorKind};
use syncdesk_core::result::AppResult;
use syncdesk_core::traits::{ChunkPacker, EncryptionContext};
use syncdesk_entity::file::ChunkKey;

/// What [`ChunkCache::write_if_absent`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// A new blob was created.
    Written,
    /// An existing blob of a different length was overwritten.
    Replaced,
    /// A blob of the expected length was already present.
    Present,
}

/// Local store of packed chunk blobs, shared by all requests.
#[derive(Debug)]
pub struct ChunkCache {
    root: PathBuf,
    packer: Arc<dyn ChunkPacker>,
    locks: DashMap<ChunkKey, Arc<Mutex<()>>>,
}

impl ChunkCache {
    /// Create a cache rooted at `root` using `packer` for blobs.
    pub fn new(root: impl Into<PathBuf>, packer: Arc<dyn ChunkPacker>) -> Self {
        Self {
            root: root.into(),
            packer,
            locks: DashMap::new(),
        }
    }

    /// Cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The packer blobs are written with.
    pub fn packer(&self) -> &Arc<dyn ChunkPacker> {
        &self.packer
    }

    /// Canonical location of a chunk blob.
    pub fn chunk_path(&self, key: &ChunkKey) -> PathBuf {
        let prefix = key.checksum.get(..2).unwrap_or("__");
        self.root
            .join(&key.context)
            .join(prefix)
            .join(&key.checksum)
    }

    /// Whether a blob exists for `key`.
    pub async fn exists(&self, key: &ChunkKey) -> AppResult<bool> {
        tokio::fs::try_exists(self.chunk_path(key))
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to stat chunk", e))
    }

    /// Pack `plaintext` under `context` and store it unless a blob of the
    /// same packed length is already present.
    ///
    /// Only lengths are compared. A different blob of identical length
    /// is left in place.
    pub async fn write_if_absent(
        &self,
        key: &ChunkKey,
        plaintext: &[u8],
        context: &EncryptionContext,
    ) -> AppResult<WriteOutcome> {
        let lock = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let outcome = {
            let _guard = lock.lock().await;
            self.write_locked(key, plaintext, context).await
        };

        drop(lock);
        self.locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);

        outcome
    }

    /// Read and unpack a blob.
    pub async fn read(&self, key: &ChunkKey, context: &EncryptionContext) -> AppResult<Vec<u8>> {
        let path = self.chunk_path(key);
        let packed = tokio::fs::read(&path)
            .await
            .map_err(|e| AppError::io(format_args!("Failed to read chunk {key}"), e))?;
        self.packer.unpack(&packed, context)
    }

    async fn write_locked(
        &self,
        key: &ChunkKey,
        plaintext: &[u8],
        context: &EncryptionContext,
    ) -> AppResult<WriteOutcome> {
        let packed = self.packer.pack(plaintext, context)?;
        let path = self.chunk_path(key);

        let existing = existing_len(&path).await?;
        if existing == Some(packed.len() as u64) {
            debug!(chunk = %key, "Chunk already cached");
            return Ok(WriteOutcome::Present);
        }

        let dir = path
            .parent()
            .ok_or_else(|| AppError::internal(format!("Chunk path has no parent: {key}")))?;
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create chunk directory {}", dir.display()),
                e,
            )
        })?;

        let tmp = dir.join(format!(".{}.{}.tmp", key.checksum, Uuid::new_v4()));
        tokio::fs::write(&tmp, &packed).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to write chunk temp file", e)
        })?;

        let outcome = if existing.is_some() {
            warn!(
                chunk = %key,
                expected = packed.len(),
                found = existing,
                "Cached chunk has unexpected length, replacing"
            );
            self.replace(&tmp, &path).await
        } else {
            self.link_new(&tmp, &path, packed.len() as u64).await
        };

        if let Err(e) = tokio::fs::remove_file(&tmp).await
            && e.kind() != IoErrorKind::NotFound
        {
            debug!(error = %e, "Failed to remove chunk temp file");
        }

        outcome
    }

    async fn link_new(&self, tmp: &Path, path: &Path, expected: u64) -> AppResult<WriteOutcome> {
        match tokio::fs::hard_link(tmp, path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Chunk written");
                Ok(WriteOutcome::Written)
            }
            Err(e) if e.kind() == IoErrorKind::AlreadyExists => {
                if existing_len(path).await? == Some(expected) {
                    Ok(WriteOutcome::Present)
                } else {
                    self.replace(tmp, path).await
                }
            }
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to link chunk {}", path.display()),
                e,
            )),
        }
    }

    async fn replace(&self, tmp: &Path, path: &Path) -> AppResult<WriteOutcome> {
        tokio::fs::rename(tmp, path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to replace chunk {}", path.display()),
                e,
            )
        })?;
        Ok(WriteOutcome::Replaced)
    }
}

async fn existing_len(path: &Path) -> AppResult<Option<u64>> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(Some(meta.len())),
        Err(e) if e.kind() == IoErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to stat chunk {}", path.display()),
            e,
        )),
    }
}
