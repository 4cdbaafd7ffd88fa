//! `syncdesk run`: the indexing daemon.
//!
//! Reads index requests as JSON lines from stdin, the boundary with the
//! external filesystem watcher, and feeds them to the worker until stdin
//! closes or a shutdown signal arrives.

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{info, warn};

use syncdesk_core::config::AppConfig;
use syncdesk_core::error::AppError;
use syncdesk_index::IndexRequest;
use syncdesk_worker::{IndexExecutor, IndexQueue, IndexWorker};

use crate::context::IndexContext;
use crate::output::{self, OutputFormat, Printer};

/// Arguments for the run command
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Number of worker lanes (overrides worker.lanes)
    #[arg(long)]
    pub lanes: Option<usize>,
}

/// Execute the run command
pub async fn execute(args: &RunArgs, config: AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let mut worker_config = config.worker.clone();
    if let Some(lanes) = args.lanes {
        worker_config.lanes = lanes;
    }
    let max_deferrals = config.index.max_deferrals;

    let IndexContext {
        config,
        database,
        indexer,
        mut uploads,
    } = IndexContext::build(config).await?;
    let (queue, receivers) = IndexQueue::new(&worker_config);
    let worker = IndexWorker::new(
        IndexExecutor::new(indexer.clone()),
        worker_config,
        max_deferrals,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker_handle = tokio::spawn(async move { worker.run(receivers, shutdown_rx).await });

    let upload_handle = tokio::spawn(async move {
        let mut count = 0u64;
        while let Some(version) = uploads.recv().await {
            info!(
                file_id = %version.file_id,
                version = version.version,
                path = %version.path,
                status = %version.status,
                "Queued for upload"
            );
            count += 1;
        }
        count
    });

    info!(lanes = queue.lane_count(), "Reading index requests from stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match serde_json::from_str::<IndexRequest>(&line) {
                    Ok(request) => {
                        queue.enqueue(request).await?;
                    }
                    Err(e) => warn!(error = %e, line = %line, "Ignoring malformed request"),
                },
                Ok(None) => {
                    info!("Input closed");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read input");
                    break;
                }
            },
            _ = shutdown_signal() => {
                info!("Shutdown signal received, draining queued requests");
                break;
            }
        }
    }

    let _ = shutdown_tx.send(true);
    drop(queue);
    let summary = worker_handle
        .await
        .map_err(|e| AppError::internal(format!("Worker task failed: {e}")))?;

    // The indexer holds the upload sender; release it so the logger ends.
    drop(indexer);
    let uploaded = upload_handle
        .await
        .map_err(|e| AppError::internal(format!("Upload logger failed: {e}")))?;

    database.save().await?;
    info!(file = %config.storage.database_file, "Saved database snapshot");

    Printer::new(format).record(&summary)?;
    output::field("Queued for upload", &uploaded.to_string());
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
