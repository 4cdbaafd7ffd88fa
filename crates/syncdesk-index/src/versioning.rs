//! Version derivation rules.
//!
//! These functions decide which version record a request produces from
//! the prior version of a path. They never touch the repository; the
//! indexer persists what they return.

use chrono::{DateTime, Utc};

use syncdesk_core::types::RootId;
use syncdesk_entity::file::{
    CreateFileVersion, FileStatus, FileVersion, SyncStatus, VersionKey,
};

/// A drafted version and the record it replaces.
#[derive(Debug, Clone)]
pub struct Derived {
    /// Draft of the new version, not yet persisted.
    pub version: FileVersion,
    /// Prior record to delete before persisting the draft.
    pub supersedes: Option<VersionKey>,
}

/// What a Deleted request turns into.
#[derive(Debug, Clone)]
pub enum Deletion {
    /// The history never reached the server; drop the record.
    Remove(VersionKey),
    /// Record the deletion as a new version.
    Record(Derived),
}

/// Whether `prior` is an unsynced draft that a new version replaces
/// instead of succeeding.
fn is_replaceable_draft(prior: &FileVersion) -> bool {
    prior.sync_status == SyncStatus::Unsync && prior.status != FileStatus::Renamed
}

/// Derive the version for new or changed content at a path.
///
/// - No prior version: version 1, `NEW`.
/// - Unsynced, not renamed, version 1: the prior record is dropped and a
///   fresh history starts at version 1.
/// - Unsynced, not renamed, later version: successor `CHANGED` with an
///   empty chunk list, the prior record is dropped.
/// - Otherwise: successor `CHANGED` with an empty chunk list.
pub fn derive_content(prior: Option<&FileVersion>, create: CreateFileVersion) -> Derived {
    let Some(prior) = prior else {
        return Derived {
            version: FileVersion::new(create),
            supersedes: None,
        };
    };

    if is_replaceable_draft(prior) && prior.version == 1 {
        return Derived {
            version: FileVersion::new(create),
            supersedes: Some(prior.key()),
        };
    }

    let supersedes = is_replaceable_draft(prior).then(|| prior.key());
    let mut next = prior.next_version();
    next.status = FileStatus::Changed;
    next.sync_status = SyncStatus::Local;
    next.is_folder = create.is_folder;
    next.size = if create.is_folder { 0 } else { create.size };
    next.last_modified = create.last_modified;
    next.client_name = create.client_name;
    next.set_path(&create.path);
    next.clear_content();

    Derived {
        version: next,
        supersedes,
    }
}

/// Derive the version recording that `prior` was moved to `to_path`.
///
/// The history continues: same file id, next version number, `RENAMED`
/// and `UPTODATE`. Chunk keys stay linked until content is re-chunked.
pub fn derive_move(
    prior: &FileVersion,
    to_root: &RootId,
    to_path: &str,
    size: u64,
    last_modified: DateTime<Utc>,
    client_name: &str,
) -> FileVersion {
    let mut next = prior.next_version();
    next.root_id = to_root.clone();
    next.set_path(to_path);
    next.size = if next.is_folder { 0 } else { size };
    next.last_modified = last_modified;
    next.status = FileStatus::Renamed;
    next.sync_status = SyncStatus::UpToDate;
    next.client_name = client_name.to_string();
    next
}

/// Derive what deleting `prior` produces.
pub fn derive_deletion(prior: &FileVersion, client_name: &str) -> Deletion {
    if is_replaceable_draft(prior) && prior.version == 1 {
        return Deletion::Remove(prior.key());
    }

    let supersedes = is_replaceable_draft(prior).then(|| prior.key());
    let mut next = prior.next_version();
    next.status = FileStatus::Deleted;
    next.sync_status = SyncStatus::Local;
    next.client_name = client_name.to_string();
    next.clear_content();

    Deletion::Record(Derived {
        version: next,
        supersedes,
    })
}
