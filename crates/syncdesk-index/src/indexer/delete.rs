//! Deleted requests.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use syncdesk_core::result::AppResult;
use syncdesk_core::types::{RequestId, RootId};
use syncdesk_entity::file::FileVersion;

use super::{Indexer, StatusScope, stat};
use crate::request::IndexOutcome;
use crate::versioning::{Deletion, derive_deletion};

impl Indexer {
    pub(super) async fn index_delete(
        &self,
        request_id: RequestId,
        root_id: &RootId,
        path: &str,
    ) -> AppResult<IndexOutcome> {
        if self.filter.is_ignored(path) {
            debug!(path, "Path matches an ignore rule");
            return Ok(IndexOutcome::Ignored);
        }

        let root = self.root(root_id)?;
        if stat(&root.local_file(path)).await?.is_some() {
            warn!(path, "Deleted path exists again, skipping");
            return Ok(IndexOutcome::Skipped);
        }

        let Some(prior) = self
            .versions
            .find_by_path(self.profile.id, root_id, path)
            .await?
        else {
            debug!(path, "Deleted path was never indexed");
            return Ok(IndexOutcome::Skipped);
        };

        let _status = StatusScope::begin(&self.notifier, request_id);
        self.delete_tree(&prior).await
    }

    /// Delete `prior` and, for a folder, everything below it. A descendant
    /// that fails is logged and skipped.
    pub(super) async fn delete_tree(&self, prior: &FileVersion) -> AppResult<IndexOutcome> {
        let descendants = if prior.is_folder {
            self.collect_descendants(prior).await?
        } else {
            Vec::new()
        };

        let outcome = self.delete_entry(prior).await?;

        for child in descendants {
            if self.versions.find_version(&child.key()).await?.is_none() {
                continue;
            }
            if let Err(e) = self.delete_entry(&child).await {
                self.absorb(&child.path, e)?;
            }
        }
        Ok(outcome)
    }

    /// Live versions below `folder`, parents before children.
    async fn collect_descendants(&self, folder: &FileVersion) -> AppResult<Vec<FileVersion>> {
        let mut pending = VecDeque::from([(folder.clone(), 1usize)]);
        let mut found = Vec::new();

        while let Some((current, depth)) = pending.pop_front() {
            if depth > self.max_tree_depth {
                warn!(
                    path = %current.path,
                    max_depth = self.max_tree_depth,
                    "Folder nesting too deep, contents not deleted"
                );
                continue;
            }
            for child in self.versions.find_children(&current).await? {
                if child.is_folder {
                    pending.push_back((child.clone(), depth + 1));
                }
                found.push(child);
            }
        }
        Ok(found)
    }

    async fn delete_entry(&self, prior: &FileVersion) -> AppResult<IndexOutcome> {
        match derive_deletion(prior, &self.profile.machine_name) {
            Deletion::Remove(key) => {
                let removed = self.versions.remove(&key).await?;
                info!(
                    file_id = %key.file_id,
                    path = %prior.path,
                    removed,
                    "Removed unsynced version"
                );
                Ok(IndexOutcome::Removed {
                    file_id: key.file_id,
                })
            }
            Deletion::Record(derived) => {
                let mut version = derived.version;
                self.persist(&mut version, derived.supersedes).await?;
                self.enqueue(&version).await
            }
        }
    }
}
