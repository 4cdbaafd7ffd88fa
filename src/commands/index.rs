//! `syncdesk index`: index a folder tree as new paths.

use std::collections::VecDeque;

use clap::Args;
use serde::Serialize;
use tracing::{info, warn};

use syncdesk_core::config::AppConfig;
use syncdesk_core::error::AppError;
use syncdesk_core::types::path::{ROOT_PATH, clean_path, join_path};
use syncdesk_index::{IndexOutcome, IndexRequest};
use syncdesk_worker::{IndexExecutionError, IndexExecutor};

use crate::context::IndexContext;
use crate::output::{OutputFormat, Printer};

/// Arguments for the index command
#[derive(Debug, Args)]
pub struct IndexArgs {
    /// Root-relative path to index, folders recursively
    #[arg(default_value = "/")]
    pub path: String,

    /// Sync root id (defaults to the only configured root)
    #[arg(short, long)]
    pub root: Option<String>,
}

/// Counts of what indexing a tree did
#[derive(Debug, Default, Serialize)]
struct IndexReport {
    visited: u64,
    indexed: u64,
    withheld: u64,
    skipped: u64,
    ignored: u64,
    failed: u64,
    queued_for_upload: usize,
}

/// Execute the index command
pub async fn execute(args: &IndexArgs, config: AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let mut ctx = IndexContext::build(config).await?;
    let root_id = ctx.root(args.root.as_deref())?;
    let sync_root = ctx
        .indexer
        .profile()
        .root(&root_id)
        .cloned()
        .ok_or_else(|| AppError::validation(format!("Unknown sync root '{root_id}'")))?;
    let executor = IndexExecutor::new(ctx.indexer.clone());

    let start = clean_path(&args.path);
    let mut pending = VecDeque::from([start]);
    let mut report = IndexReport::default();

    // Breadth first, so every folder is indexed before its contents.
    while let Some(path) = pending.pop_front() {
        if path != ROOT_PATH {
            report.visited += 1;
            let request = IndexRequest::new_file(root_id.clone(), &path);
            match executor.execute(&request).await {
                Ok(outcome) => tally(&mut report, &outcome),
                Err(IndexExecutionError::Deferred(reason)) => {
                    warn!(path = %path, reason = %reason, "Parent not indexed, skipping subtree");
                    report.failed += 1;
                    continue;
                }
                Err(IndexExecutionError::Internal(e)) => return Err(e),
            }
        }

        let local = sync_root.local_file(&path);
        if !tokio::fs::metadata(&local).await.map(|m| m.is_dir()).unwrap_or(false) {
            continue;
        }

        let mut entries = tokio::fs::read_dir(&local)
            .await
            .map_err(|e| AppError::storage(format!("Failed to list {}: {e}", local.display())))?;
        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::storage(format!("Failed to list {}: {e}", local.display())))?
        {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();
        pending.extend(names.iter().map(|name| join_path(&path, name)));
    }

    report.queued_for_upload = ctx.drain_uploads().len();
    info!(visited = report.visited, indexed = report.indexed, "Finished indexing tree");
    ctx.save().await?;
    Printer::new(format).record(&report)
}

fn tally(report: &mut IndexReport, outcome: &IndexOutcome) {
    match outcome {
        IndexOutcome::Indexed { .. } => report.indexed += 1,
        IndexOutcome::Withheld { .. } => report.withheld += 1,
        IndexOutcome::Ignored => report.ignored += 1,
        IndexOutcome::Failed { .. } => report.failed += 1,
        _ => report.skipped += 1,
    }
}
