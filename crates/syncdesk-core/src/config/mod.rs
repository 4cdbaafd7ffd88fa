//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field has a default so an empty file is valid.

pub mod index;
pub mod logging;
pub mod profile;
pub mod storage;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::index::{ChunkingStrategy, IndexConfig};
pub use self::logging::{LogFormat, LoggingConfig};
pub use self::profile::{
    AccountConfig, EncryptionConfig, ProfileConfig, RootConfig, WorkspaceConfig,
};
pub use self::storage::StorageConfig;
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Account profile settings.
    #[serde(default)]
    pub profile: ProfileConfig,
    /// Sync roots indexed by this profile.
    #[serde(default)]
    pub roots: Vec<RootConfig>,
    /// Shared workspaces registered with the account.
    #[serde(default)]
    pub workspaces: Vec<WorkspaceConfig>,
    /// Index pipeline settings.
    #[serde(default)]
    pub index: IndexConfig,
    /// Local storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Index worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// The file is optional; environment variables prefixed with
    /// `SYNCDESK__` override individual keys (`SYNCDESK__WORKER__LANES=2`).
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("SYNCDESK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        app.validate()?;
        Ok(app)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.index.chunk_size_bytes == 0 {
            return Err(AppError::configuration("index.chunk_size_bytes must be > 0"));
        }
        if !(self.index.cdc_min_size <= self.index.cdc_avg_size
            && self.index.cdc_avg_size <= self.index.cdc_max_size)
        {
            return Err(AppError::configuration(
                "index.cdc sizes must satisfy min <= avg <= max",
            ));
        }
        // FastCDC rejects sizes outside these bounds with a panic.
        if !(64..=1_048_576).contains(&self.index.cdc_min_size)
            || !(256..=4_194_304).contains(&self.index.cdc_avg_size)
            || !(1024..=16_777_216).contains(&self.index.cdc_max_size)
        {
            return Err(AppError::configuration(
                "index.cdc sizes out of range (min 64..1MiB, avg 256..4MiB, max 1KiB..16MiB)",
            ));
        }
        if self.worker.lanes == 0 {
            return Err(AppError::configuration("worker.lanes must be > 0"));
        }
        let mut seen = std::collections::HashSet::new();
        for root in &self.roots {
            if !seen.insert(root.id.as_str()) {
                return Err(AppError::configuration(format!(
                    "duplicate root id '{}'",
                    root.id
                )));
            }
        }
        Ok(())
    }
}
