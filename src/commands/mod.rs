//! CLI command definitions and dispatch.

pub mod config;
pub mod delete;
pub mod history;
pub mod index;
pub mod moves;
pub mod run;

use clap::{Parser, Subcommand};

use syncdesk_core::config::AppConfig;
use syncdesk_core::error::AppError;
use syncdesk_index::IndexOutcome;

use crate::context::IndexContext;
use crate::output::{self, Mark, OutputFormat};

/// SyncDesk desktop sync client indexer
#[derive(Debug, Parser)]
#[command(name = "syncdesk", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Process index requests read from stdin as JSON lines
    Run(run::RunArgs),
    /// Index a folder tree as new paths
    Index(index::IndexArgs),
    /// Record a move or rename
    Move(moves::MoveArgs),
    /// Record a deletion
    Delete(delete::DeleteArgs),
    /// Show the version history of a path
    History(history::HistoryArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Run(args) => run::execute(args, config, self.format).await,
            Commands::Index(args) => index::execute(args, config, self.format).await,
            Commands::Move(args) => moves::execute(args, config).await,
            Commands::Delete(args) => delete::execute(args, config).await,
            Commands::History(args) => history::execute(args, config, self.format).await,
            Commands::Config(args) => config::execute(args, config, &self.config, self.format),
        }
    }
}

/// Helper: report a single outcome, log queued uploads and save.
pub async fn finish_single(mut ctx: IndexContext, outcome: IndexOutcome) -> Result<(), AppError> {
    for version in ctx.drain_uploads() {
        output::field(
            "Queued for upload",
            &format!("{} v{} {}", version.file_id, version.version, version.path),
        );
    }
    match &outcome {
        IndexOutcome::Failed { message } => output::status(Mark::Failed, message),
        IndexOutcome::Indexed { .. } | IndexOutcome::Removed { .. } => {
            output::status(Mark::Done, &outcome.to_string())
        }
        other => output::status(Mark::Notice, &other.to_string()),
    }
    ctx.save().await
}
