//! On-disk JSON snapshot of the in-memory database.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use syncdesk_core::error::{AppError, ErrorKind};
use syncdesk_core::result::AppResult;
use syncdesk_entity::file::{Chunk, FileVersion};
use syncdesk_entity::workspace::Workspace;

/// Serialized form of every table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the snapshot was written.
    pub saved_at: Option<DateTime<Utc>>,
    /// Every persisted version.
    #[serde(default)]
    pub versions: Vec<FileVersion>,
    /// Every chunk record.
    #[serde(default)]
    pub chunks: Vec<Chunk>,
    /// Registered workspaces.
    #[serde(default)]
    pub workspaces: Vec<Workspace>,
}

impl Snapshot {
    /// Read a snapshot, returning an empty one when the file does not exist.
    pub async fn read(path: &Path) -> AppResult<Self> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No database snapshot, starting empty");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to read snapshot {}", path.display()),
                    e,
                ));
            }
        };
        let snapshot: Self = serde_json::from_slice(&bytes)?;
        info!(
            path = %path.display(),
            versions = snapshot.versions.len(),
            chunks = snapshot.chunks.len(),
            "Loaded database snapshot"
        );
        Ok(snapshot)
    }

    /// Write the snapshot next to `path` and rename it into place.
    pub async fn write(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to create {}", parent.display()),
                    e,
                )
            })?;
        }

        let bytes = serde_json::to_vec_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to write snapshot", e)
        })?;
        tokio::fs::rename(&tmp, path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to replace snapshot", e)
        })?;

        info!(path = %path.display(), versions = self.versions.len(), "Saved database snapshot");
        Ok(())
    }
}
