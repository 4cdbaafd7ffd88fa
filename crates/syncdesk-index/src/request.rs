//! Index requests and their outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

use syncdesk_core::error::AppError;
use syncdesk_core::events::WithholdReason;
use syncdesk_core::result::AppResult;
use syncdesk_core::types::path::{clean_path, first_segment};
use syncdesk_core::types::{FileId, RootId};

/// A discrete filesystem change reported by the watcher.
///
/// Paths are root-relative. Requests decoded from the watcher may carry
/// raw paths; [`IndexRequest::normalized`] cleans them before indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndexRequest {
    /// A path appeared.
    New {
        /// Sync root.
        root_id: RootId,
        /// Root-relative path.
        path: String,
        /// Content checksum already known to the caller, if any.
        #[serde(default)]
        checksum: Option<String>,
    },
    /// The content of a known file changed.
    Changed {
        /// Sync root.
        root_id: RootId,
        /// Root-relative path.
        path: String,
    },
    /// A path was moved or renamed.
    Moved {
        /// Root of the source path.
        from_root: RootId,
        /// Source path.
        from_path: String,
        /// Root of the destination path.
        to_root: RootId,
        /// Destination path.
        to_path: String,
    },
    /// A path was deleted.
    Deleted {
        /// Sync root.
        root_id: RootId,
        /// Root-relative path.
        path: String,
    },
}

impl IndexRequest {
    /// New request for `path`.
    pub fn new_file(root_id: impl Into<RootId>, path: &str) -> Self {
        Self::New {
            root_id: root_id.into(),
            path: clean_path(path),
            checksum: None,
        }
    }

    /// Changed request for `path`.
    pub fn changed(root_id: impl Into<RootId>, path: &str) -> Self {
        Self::Changed {
            root_id: root_id.into(),
            path: clean_path(path),
        }
    }

    /// Move request within one root.
    pub fn moved(root_id: impl Into<RootId>, from: &str, to: &str) -> Self {
        let root_id = root_id.into();
        Self::Moved {
            from_root: root_id.clone(),
            from_path: clean_path(from),
            to_root: root_id,
            to_path: clean_path(to),
        }
    }

    /// Deleted request for `path`.
    pub fn deleted(root_id: impl Into<RootId>, path: &str) -> Self {
        Self::Deleted {
            root_id: root_id.into(),
            path: clean_path(path),
        }
    }

    /// Short name of the request kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::New { .. } => "new",
            Self::Changed { .. } => "changed",
            Self::Moved { .. } => "moved",
            Self::Deleted { .. } => "deleted",
        }
    }

    /// The path whose state the request changes first: the source of a
    /// move, the only path otherwise.
    pub fn primary_path(&self) -> &str {
        match self {
            Self::New { path, .. } | Self::Changed { path, .. } | Self::Deleted { path, .. } => {
                path
            }
            Self::Moved { from_path, .. } => from_path,
        }
    }

    /// The same request with every path cleaned.
    ///
    /// Fails on a path with a `..` segment: it would name something outside
    /// the sync root or a different entry than the watcher saw.
    pub fn normalized(&self) -> AppResult<Self> {
        Ok(match self {
            Self::New {
                root_id,
                path,
                checksum,
            } => Self::New {
                root_id: root_id.clone(),
                path: checked_path(path)?,
                checksum: checksum.clone(),
            },
            Self::Changed { root_id, path } => Self::Changed {
                root_id: root_id.clone(),
                path: checked_path(path)?,
            },
            Self::Moved {
                from_root,
                from_path,
                to_root,
                to_path,
            } => Self::Moved {
                from_root: from_root.clone(),
                from_path: checked_path(from_path)?,
                to_root: to_root.clone(),
                to_path: checked_path(to_path)?,
            },
            Self::Deleted { root_id, path } => Self::Deleted {
                root_id: root_id.clone(),
                path: checked_path(path)?,
            },
        })
    }

    /// Key used to keep related requests in arrival order: the root and
    /// the first segment of the primary path.
    pub fn ordering_key(&self) -> String {
        let root = match self {
            Self::New { root_id, .. }
            | Self::Changed { root_id, .. }
            | Self::Deleted { root_id, .. } => root_id,
            Self::Moved { from_root, .. } => from_root,
        };
        format!("{root}/{}", first_segment(&clean_path(self.primary_path())))
    }
}

fn checked_path(raw: &str) -> AppResult<String> {
    if raw.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(AppError::validation(format!(
            "Path '{raw}' must not contain '..' segments"
        )));
    }
    Ok(clean_path(raw))
}

impl fmt::Display for IndexRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Moved {
                from_root,
                from_path,
                to_root,
                to_path,
            } => write!(f, "moved {from_root}:{from_path} -> {to_root}:{to_path}"),
            Self::New { root_id, path, .. }
            | Self::Changed { root_id, path }
            | Self::Deleted { root_id, path } => write!(f, "{} {root_id}:{path}", self.kind()),
        }
    }
}

/// Result of processing one request.
///
/// Only [`IndexOutcome::Failed`] reports a problem; the other variants are
/// the normal results of racing a live filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    /// A version was persisted and queued for upload.
    Indexed {
        /// History id.
        file_id: FileId,
        /// New version number.
        version: u64,
    },
    /// A version was persisted but withheld from upload.
    Withheld {
        /// History id.
        file_id: FileId,
        /// New version number.
        version: u64,
        /// Why it was withheld.
        reason: WithholdReason,
    },
    /// A never-uploaded history was removed instead of versioned.
    Removed {
        /// History id.
        file_id: FileId,
    },
    /// The path matches an ignore rule.
    Ignored,
    /// The path no longer exists on disk.
    Vanished,
    /// The request must be processed as a different request.
    Redispatched(Box<IndexRequest>),
    /// The parent folder is not indexed yet; retry later.
    Deferred,
    /// Nothing to do.
    Skipped,
    /// Processing this item failed and was abandoned.
    Failed {
        /// Error message.
        message: String,
    },
}

impl IndexOutcome {
    /// Short name of the outcome, for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indexed { .. } => "indexed",
            Self::Withheld { .. } => "withheld",
            Self::Removed { .. } => "removed",
            Self::Ignored => "ignored",
            Self::Vanished => "vanished",
            Self::Redispatched(_) => "redispatched",
            Self::Deferred => "deferred",
            Self::Skipped => "skipped",
            Self::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for IndexOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
