//! File version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use syncdesk_core::types::path::{clean_path, file_name};
use syncdesk_core::types::{FileId, ProfileId, RootId, WorkspaceId};
use syncdesk_core::{AppError, AppResult};

use super::chunk::ChunkKey;
use super::mime::{FOLDER_MIME_TYPE, mime_from_path};
use super::status::{FileStatus, SyncStatus};

/// Composite identity of a persisted version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VersionKey {
    /// History the version belongs to.
    pub file_id: FileId,
    /// Position in the history, starting at 1.
    pub version: u64,
    /// Owning profile.
    pub profile_id: ProfileId,
    /// Sync root the path is relative to.
    pub root_id: RootId,
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}@{}/{}",
            self.file_id, self.version, self.profile_id, self.root_id
        )
    }
}

/// One immutable version of a file or folder.
///
/// A version is mutated only while the request that created it is being
/// processed; after it is merged into the repository it is history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileVersion {
    /// Stable id of the whole history.
    pub file_id: FileId,
    /// Version number, gapless from 1 for a history without withheld drafts.
    pub version: u64,
    /// Owning profile.
    pub profile_id: ProfileId,
    /// Sync root.
    pub root_id: RootId,
    /// Last path segment.
    pub name: String,
    /// Cleaned root-relative path.
    pub path: String,
    /// Size in bytes (zero for folders).
    pub size: u64,
    /// Modification time of the source file.
    pub last_modified: DateTime<Utc>,
    /// When this record was last mutated.
    pub updated: DateTime<Utc>,
    /// SHA-256 of the whole content, hex.
    pub checksum: Option<String>,
    /// Whether this is a folder.
    pub is_folder: bool,
    /// MIME type, if known.
    pub mime_type: Option<String>,
    /// Machine that produced the version.
    pub client_name: String,
    /// What happened in this version.
    pub status: FileStatus,
    /// Upload state.
    pub sync_status: SyncStatus,
    /// Whether the server acknowledged the upload.
    pub server_uploaded_ack: bool,
    /// When the server acknowledged the upload.
    pub server_uploaded_time: Option<DateTime<Utc>>,
    /// Chunk keys in byte order.
    #[serde(default)]
    pub chunks: Vec<ChunkKey>,
    /// Version of the enclosing folder at the time this one was created.
    pub parent: Option<VersionKey>,
    /// Shared workspace the path belongs to.
    pub workspace_id: Option<WorkspaceId>,
}

/// Data required to create the first version of a path.
#[derive(Debug, Clone)]
pub struct CreateFileVersion {
    /// Owning profile.
    pub profile_id: ProfileId,
    /// Sync root.
    pub root_id: RootId,
    /// Root-relative path, cleaned on construction.
    pub path: String,
    /// Whether this is a folder.
    pub is_folder: bool,
    /// Size in bytes.
    pub size: u64,
    /// Modification time of the source.
    pub last_modified: DateTime<Utc>,
    /// Machine name.
    pub client_name: String,
}

impl FileVersion {
    /// Create version 1 of a new history.
    pub fn new(create: CreateFileVersion) -> Self {
        let now = Utc::now();
        let mut version = Self {
            file_id: FileId::generate(),
            version: 1,
            profile_id: create.profile_id,
            root_id: create.root_id,
            name: String::new(),
            path: String::new(),
            size: if create.is_folder { 0 } else { create.size },
            last_modified: create.last_modified,
            updated: now,
            checksum: None,
            is_folder: create.is_folder,
            mime_type: None,
            client_name: create.client_name,
            status: FileStatus::New,
            sync_status: SyncStatus::Local,
            server_uploaded_ack: false,
            server_uploaded_time: None,
            chunks: Vec::new(),
            parent: None,
            workspace_id: None,
        };
        version.set_path(&create.path);
        version
    }

    /// Composite key of this version.
    pub fn key(&self) -> VersionKey {
        VersionKey {
            file_id: self.file_id,
            version: self.version,
            profile_id: self.profile_id,
            root_id: self.root_id.clone(),
        }
    }

    /// Key of the preceding version, `None` for version 1.
    pub fn previous_key(&self) -> Option<VersionKey> {
        (self.version > 1).then(|| VersionKey {
            version: self.version - 1,
            ..self.key()
        })
    }

    /// Clone this version as the start of its successor.
    ///
    /// Scalars are copied and chunk, parent and workspace keys are carried
    /// over as references. The upload acknowledgement is reset because the
    /// new version has not reached the server.
    pub fn next_version(&self) -> Self {
        let mut next = self.clone();
        next.version = self.version + 1;
        next.updated = Utc::now();
        next.server_uploaded_ack = false;
        next.server_uploaded_time = None;
        next
    }

    /// Set the path, deriving name and MIME type.
    pub fn set_path(&mut self, path: &str) {
        self.path = clean_path(path);
        self.name = file_name(&self.path).to_string();
        self.mime_type = if self.is_folder {
            Some(FOLDER_MIME_TYPE.to_string())
        } else {
            mime_from_path(&self.path)
        };
    }

    /// Whether the version is withheld from upload.
    pub fn is_withheld(&self) -> bool {
        self.sync_status == SyncStatus::Unsync
    }

    /// Whether the version records a deletion.
    pub fn is_deleted(&self) -> bool {
        self.status == FileStatus::Deleted
    }

    /// Append a chunk key.
    pub fn add_chunk(&mut self, key: ChunkKey) {
        self.chunks.push(key);
    }

    /// Replace the chunk key at `index`.
    pub fn set_chunk(&mut self, index: usize, key: ChunkKey) -> AppResult<()> {
        let len = self.chunks.len();
        let slot = self.chunks.get_mut(index).ok_or_else(|| {
            AppError::validation(format!(
                "Chunk index {index} out of range for {len} chunks"
            ))
        })?;
        *slot = key;
        Ok(())
    }

    /// Place `key` at the zero-based `ordinal`.
    ///
    /// Appends when `ordinal` is at or past the end, replaces when the
    /// stored key differs. Returns whether the list changed.
    pub fn attach_chunk(&mut self, ordinal: usize, key: ChunkKey) -> bool {
        match self.chunks.get_mut(ordinal) {
            Some(existing) if *existing == key => false,
            Some(existing) => {
                *existing = key;
                true
            }
            None => {
                self.chunks.push(key);
                true
            }
        }
    }

    /// Drop the last `count` chunk keys.
    pub fn remove_chunks(&mut self, count: usize) {
        let keep = self.chunks.len().saturating_sub(count);
        self.chunks.truncate(keep);
    }

    /// Keep only the first `len` chunk keys.
    pub fn truncate_chunks(&mut self, len: usize) {
        self.chunks.truncate(len);
    }

    /// Forget all content of the version.
    pub fn clear_content(&mut self) {
        self.chunks.clear();
        self.checksum = None;
    }
}

impl PartialEq for FileVersion {
    fn eq(&self, other: &Self) -> bool {
        self.file_id == other.file_id && self.version == other.version
    }
}

impl Eq for FileVersion {}

impl Hash for FileVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.file_id.hash(state);
        self.version.hash(state);
    }
}
