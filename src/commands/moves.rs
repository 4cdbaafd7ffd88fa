//! `syncdesk move`: record a move or rename.

use clap::Args;

use syncdesk_core::config::AppConfig;
use syncdesk_core::error::AppError;
use syncdesk_index::IndexRequest;
use syncdesk_worker::{IndexExecutionError, IndexExecutor};

use crate::context::IndexContext;

/// Arguments for the move command
#[derive(Debug, Args)]
pub struct MoveArgs {
    /// Root-relative source path
    pub from: String,

    /// Root-relative destination path
    pub to: String,

    /// Sync root id (defaults to the only configured root)
    #[arg(short, long)]
    pub root: Option<String>,
}

/// Execute the move command
pub async fn execute(args: &MoveArgs, config: AppConfig) -> Result<(), AppError> {
    let ctx = IndexContext::build(config).await?;
    let root_id = ctx.root(args.root.as_deref())?;
    let request = IndexRequest::moved(root_id, &args.from, &args.to);

    let outcome = match IndexExecutor::new(ctx.indexer.clone()).execute(&request).await {
        Ok(outcome) => outcome,
        Err(IndexExecutionError::Deferred(reason)) => {
            return Err(AppError::validation(format!(
                "Destination folder is not indexed yet: {reason}"
            )));
        }
        Err(IndexExecutionError::Internal(e)) => return Err(e),
    };
    super::finish_single(ctx, outcome).await
}
