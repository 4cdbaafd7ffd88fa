//! Moved requests.
//!
//! A move continues the history of the source: the moved version has the
//! same file id, the next version number and `RENAMED` status. Folder
//! contents follow through an explicit work-list so depth is bounded and a
//! failing child does not stop its siblings.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use syncdesk_core::result::AppResult;
use syncdesk_core::types::path::rebase;
use syncdesk_core::types::{RequestId, RootId};
use syncdesk_entity::file::{FileVersion, VersionKey};

use super::{Indexer, ParentLink, StatusScope, stat};
use crate::request::{IndexOutcome, IndexRequest};
use crate::versioning::derive_move;

/// A folder whose children still have to follow it.
struct PendingFolder {
    source: FileVersion,
    moved: FileVersion,
    depth: usize,
}

impl Indexer {
    pub(super) async fn index_move(
        &self,
        request_id: RequestId,
        from_root: &RootId,
        from_path: &str,
        to_root: &RootId,
        to_path: &str,
    ) -> AppResult<IndexOutcome> {
        if self.filter.is_ignored(from_path) || self.filter.is_ignored(to_path) {
            debug!(from_path, to_path, "Move endpoint matches an ignore rule");
            return Ok(IndexOutcome::Ignored);
        }

        self.root(from_root)?;
        let destination = self.root(to_root)?;
        if stat(&destination.local_file(to_path)).await?.is_none() {
            warn!(to_path, "Move destination vanished before it could be indexed");
            return Ok(IndexOutcome::Vanished);
        }

        let Some(source) = self
            .versions
            .find_by_path(self.profile.id, from_root, from_path)
            .await?
        else {
            warn!(from_path, to_path, "Move source is not indexed, indexing destination as new");
            return Ok(IndexOutcome::Redispatched(Box::new(IndexRequest::New {
                root_id: to_root.clone(),
                path: to_path.to_string(),
                checksum: None,
            })));
        };

        let parent = match self.parent_link(to_root, to_path).await? {
            ParentLink::Root => None,
            ParentLink::Folder(key) => Some(key),
            ParentLink::Missing => {
                warn!(to_path, "Destination folder is not indexed yet, deferring");
                return Ok(IndexOutcome::Deferred);
            }
        };

        let _status = StatusScope::begin(&self.notifier, request_id);

        let (outcome, moved) = self.move_entry(&source, to_root, to_path, parent).await?;
        if let Some(moved) = moved.filter(|m| m.is_folder) {
            self.move_children(source, moved).await?;
        }
        Ok(outcome)
    }

    /// Walk the subtree of a moved folder and move every child after it.
    async fn move_children(&self, source: FileVersion, moved: FileVersion) -> AppResult<()> {
        let mut pending = VecDeque::from([PendingFolder {
            source,
            moved,
            depth: 1,
        }]);
        let mut count = 0usize;

        while let Some(folder) = pending.pop_front() {
            if folder.depth > self.max_tree_depth {
                warn!(
                    path = %folder.moved.path,
                    max_depth = self.max_tree_depth,
                    "Folder nesting too deep, contents not moved"
                );
                continue;
            }

            for child in self.versions.find_children(&folder.source).await? {
                let Some(to_path) = rebase(&child.path, &folder.source.path, &folder.moved.path)
                else {
                    warn!(
                        child = %child.path,
                        folder = %folder.source.path,
                        "Child path is outside its folder, skipping"
                    );
                    continue;
                };

                let to_root = folder.moved.root_id.clone();
                let result = self
                    .move_entry(&child, &to_root, &to_path, Some(folder.moved.key()))
                    .await;
                match result {
                    Ok((_, Some(moved))) => {
                        count += 1;
                        if moved.is_folder {
                            pending.push_back(PendingFolder {
                                source: child,
                                moved,
                                depth: folder.depth + 1,
                            });
                        }
                    }
                    Ok((_, None)) => {}
                    Err(e) => {
                        self.absorb(&child.path, e)?;
                    }
                }
            }
        }

        info!(moved = count, "Moved folder contents");
        Ok(())
    }

    /// Record `source` at its new location. Returns the persisted version,
    /// or `None` when the destination no longer exists.
    ///
    /// A different history live at the destination was overwritten on disk
    /// and is deleted first, so one path never has two live histories.
    async fn move_entry(
        &self,
        source: &FileVersion,
        to_root: &RootId,
        to_path: &str,
        parent: Option<VersionKey>,
    ) -> AppResult<(IndexOutcome, Option<FileVersion>)> {
        let local = self.root(to_root)?.local_file(to_path);
        let Some(entry) = stat(&local).await? else {
            warn!(from = %source.path, to_path, "Moved entry vanished, skipping");
            return Ok((IndexOutcome::Vanished, None));
        };

        if let Some(occupant) = self
            .versions
            .find_by_path(self.profile.id, to_root, to_path)
            .await?
            && occupant.file_id != source.file_id
        {
            info!(
                file_id = %occupant.file_id,
                path = %occupant.path,
                replaced_by = %source.file_id,
                "Move overwrites an indexed entry, deleting it"
            );
            self.delete_tree(&occupant).await?;
        }

        let mut moved = derive_move(
            source,
            to_root,
            to_path,
            entry.size,
            entry.modified,
            &self.profile.machine_name,
        );
        moved.parent = parent;
        moved.workspace_id = self.resolver.resolve(to_path).await?.map(|w| w.id);

        if let Some(reason) = self.withhold_reason(&moved, false).await? {
            let outcome = self.persist_withheld(&mut moved, None, reason).await?;
            return Ok((outcome, Some(moved)));
        }

        if !moved.is_folder {
            if let Err(e) = self.process_content(&mut moved, &local).await {
                if e.is_not_found() {
                    warn!(to_path, "Moved file vanished while chunking");
                    return Ok((IndexOutcome::Vanished, None));
                }
                return Err(e);
            }
        }

        self.persist(&mut moved, None).await?;
        info!(
            file_id = %moved.file_id,
            from = %source.path,
            to = %moved.path,
            "Recorded move"
        );
        let outcome = self.enqueue(&moved).await?;
        Ok((outcome, Some(moved)))
    }
}
