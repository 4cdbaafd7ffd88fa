//! `syncdesk history`: show the version history of a path.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use syncdesk_core::config::AppConfig;
use syncdesk_core::error::AppError;
use syncdesk_core::types::path::clean_path;
use syncdesk_database::VersionRepository;
use syncdesk_entity::file::FileVersion;

use crate::context::IndexContext;
use crate::output::{self, OutputFormat, Printer};

/// Arguments for the history command
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Root-relative path
    pub path: String,

    /// Sync root id (defaults to the only configured root)
    #[arg(short, long)]
    pub root: Option<String>,
}

/// One row of the history table
#[derive(Debug, Serialize, Tabled)]
struct VersionRow {
    #[tabled(rename = "Version")]
    version: u64,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Sync")]
    sync_status: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Size")]
    size: u64,
    #[tabled(rename = "Chunks")]
    chunks: usize,
    #[tabled(rename = "Checksum")]
    checksum: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl From<&FileVersion> for VersionRow {
    fn from(v: &FileVersion) -> Self {
        Self {
            version: v.version,
            status: v.status.to_string(),
            sync_status: v.sync_status.to_string(),
            path: v.path.clone(),
            size: v.size,
            chunks: v.chunks.len(),
            checksum: v
                .checksum
                .as_deref()
                .map(|c| c.chars().take(12).collect())
                .unwrap_or_else(|| "-".to_string()),
            updated: v.updated.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Execute the history command
pub async fn execute(
    args: &HistoryArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let ctx = IndexContext::build(config).await?;
    let root_id = ctx.root(args.root.as_deref())?;
    let profile_id = ctx.indexer.profile().id;
    let path = clean_path(&args.path);

    let current = ctx
        .database
        .find_by_path(profile_id, &root_id, &path)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No live version at '{path}'")))?;

    let history = ctx.database.history(profile_id, current.file_id).await?;
    output::field("File id", &current.file_id.to_string());
    let rows: Vec<VersionRow> = history.iter().map(VersionRow::from).collect();
    Printer::new(format).rows(&rows)
}
