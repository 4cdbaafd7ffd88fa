//! Version table with a live-path index.

use std::collections::{BTreeMap, HashMap};

use syncdesk_core::types::{FileId, ProfileId, RootId};
use syncdesk_entity::file::{FileVersion, VersionKey};

type HistoryKey = (ProfileId, FileId);
type PathKey = (ProfileId, RootId, String);

/// All versions grouped by history, plus an index from live path to the
/// history currently occupying it.
#[derive(Debug, Default)]
pub(crate) struct VersionTable {
    histories: HashMap<HistoryKey, BTreeMap<u64, FileVersion>>,
    live_paths: HashMap<PathKey, FileId>,
    live_of: HashMap<HistoryKey, PathKey>,
}

impl VersionTable {
    pub(crate) fn insert(&mut self, version: FileVersion) {
        let hk = (version.profile_id, version.file_id);
        self.histories
            .entry(hk)
            .or_default()
            .insert(version.version, version);
        self.reindex(hk);
    }

    pub(crate) fn get(&self, key: &VersionKey) -> Option<&FileVersion> {
        self.histories
            .get(&(key.profile_id, key.file_id))?
            .get(&key.version)
            .filter(|v| v.root_id == key.root_id)
    }

    pub(crate) fn history(&self, profile_id: ProfileId, file_id: FileId) -> Vec<FileVersion> {
        self.histories
            .get(&(profile_id, file_id))
            .map(|h| h.values().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn live_at(&self, profile_id: ProfileId, root_id: &RootId, path: &str) -> Option<&FileVersion> {
        let file_id = self
            .live_paths
            .get(&(profile_id, root_id.clone(), path.to_string()))?;
        self.latest(&(profile_id, *file_id))
    }

    pub(crate) fn live(&self) -> impl Iterator<Item = &FileVersion> {
        self.live_of.keys().filter_map(|hk| self.latest(hk))
    }

    pub(crate) fn all(&self) -> impl Iterator<Item = &FileVersion> {
        self.histories.values().flat_map(|h| h.values())
    }

    /// Remove `key` and every version parented to a removed version.
    pub(crate) fn remove_cascade(&mut self, key: &VersionKey) -> usize {
        let mut pending = vec![key.clone()];
        let mut removed = 0;

        while let Some(key) = pending.pop() {
            let hk = (key.profile_id, key.file_id);
            let Some(history) = self.histories.get_mut(&hk) else {
                continue;
            };
            let matches_root = history
                .get(&key.version)
                .is_some_and(|v| v.root_id == key.root_id);
            if !matches_root {
                continue;
            }
            history.remove(&key.version);
            removed += 1;
            self.reindex(hk);

            pending.extend(
                self.all()
                    .filter(|v| v.parent.as_ref() == Some(&key))
                    .map(FileVersion::key),
            );
        }

        removed
    }

    fn latest(&self, hk: &HistoryKey) -> Option<&FileVersion> {
        self.histories.get(hk)?.values().next_back()
    }

    fn reindex(&mut self, hk: HistoryKey) {
        if let Some(old) = self.live_of.remove(&hk)
            && self.live_paths.get(&old) == Some(&hk.1)
        {
            self.live_paths.remove(&old);
        }

        if self.histories.get(&hk).is_some_and(BTreeMap::is_empty) {
            self.histories.remove(&hk);
            return;
        }

        let live = self
            .latest(&hk)
            .filter(|v| !v.is_deleted())
            .map(|v| (hk.0, v.root_id.clone(), v.path.clone()));
        if let Some(path_key) = live {
            self.live_paths.insert(path_key.clone(), hk.1);
            self.live_of.insert(hk, path_key);
        }
    }
}
