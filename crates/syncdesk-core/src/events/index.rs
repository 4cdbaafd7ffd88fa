//! Index pipeline events.

use serde::{Deserialize, Serialize};

use crate::types::id::{FileId, RequestId};

/// Sync status shown to the user while requests are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusIcon {
    /// A request is being processed.
    Updating,
    /// The indexer is idle and everything is recorded.
    UpToDate,
}

/// Why a version was recorded but withheld from upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithholdReason {
    /// The file does not fit into the remaining account quota.
    QuotaExceeded,
    /// The name or path contains characters the server rejects.
    IllegalName,
}

impl std::fmt::Display for WithholdReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaExceeded => write!(f, "quota exceeded"),
            Self::IllegalName => write!(f, "illegal name"),
        }
    }
}

/// Events related to index request processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IndexEvent {
    /// The status icon changed.
    Status {
        /// The request that caused the change.
        request_id: RequestId,
        /// The new icon.
        icon: StatusIcon,
    },
    /// A version was persisted and handed to the upload queue.
    Indexed {
        /// The file history.
        file_id: FileId,
        /// The new version number.
        version: u64,
        /// Root-relative path.
        path: String,
    },
    /// A version was persisted with `UNSYNC` and will not be uploaded.
    Withheld {
        /// The file history.
        file_id: FileId,
        /// The withheld version number.
        version: u64,
        /// Root-relative path.
        path: String,
        /// Why it was withheld.
        reason: WithholdReason,
    },
    /// Processing a single item failed and was skipped.
    Failed {
        /// Root-relative path.
        path: String,
        /// The error message.
        message: String,
    },
}
