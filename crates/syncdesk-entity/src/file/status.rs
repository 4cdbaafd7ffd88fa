//! Version status enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use syncdesk_core::AppError;

/// What happened to the file in this version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileStatus {
    /// Not yet classified.
    #[default]
    Unknown,
    /// First version of a new file or folder.
    New,
    /// Content changed.
    Changed,
    /// Moved or renamed.
    Renamed,
    /// Deleted locally.
    Deleted,
}

impl FileStatus {
    /// Return the status as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::New => "NEW",
            Self::Changed => "CHANGED",
            Self::Renamed => "RENAMED",
            Self::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FileStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "UNKNOWN" => Ok(Self::Unknown),
            "NEW" => Ok(Self::New),
            "CHANGED" => Ok(Self::Changed),
            "RENAMED" => Ok(Self::Renamed),
            "DELETED" => Ok(Self::Deleted),
            _ => Err(AppError::validation(format!("Invalid file status: '{s}'"))),
        }
    }
}

/// Where the version stands relative to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    /// Not yet classified.
    #[default]
    Unknown,
    /// Recorded locally, waiting for upload.
    Local,
    /// Upload in progress.
    Syncing,
    /// The server has this version.
    #[serde(rename = "UPTODATE")]
    UpToDate,
    /// Diverged from a concurrent remote change.
    Conflict,
    /// Known from the server only.
    Remote,
    /// Intentionally withheld from upload.
    Unsync,
}

impl SyncStatus {
    /// Return the status as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Local => "LOCAL",
            Self::Syncing => "SYNCING",
            Self::UpToDate => "UPTODATE",
            Self::Conflict => "CONFLICT",
            Self::Remote => "REMOTE",
            Self::Unsync => "UNSYNC",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
