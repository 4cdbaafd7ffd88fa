//! `syncdesk delete`: record a deletion.

use clap::Args;

use syncdesk_core::config::AppConfig;
use syncdesk_core::error::AppError;
use syncdesk_index::IndexRequest;

use crate::context::IndexContext;

/// Arguments for the delete command
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Root-relative path that was deleted
    pub path: String,

    /// Sync root id (defaults to the only configured root)
    #[arg(short, long)]
    pub root: Option<String>,
}

/// Execute the delete command
pub async fn execute(args: &DeleteArgs, config: AppConfig) -> Result<(), AppError> {
    let ctx = IndexContext::build(config).await?;
    let root_id = ctx.root(args.root.as_deref())?;
    let outcome = ctx
        .indexer
        .process(IndexRequest::deleted(root_id, &args.path))
        .await?;
    super::finish_single(ctx, outcome).await
}
