//! Worker runner: one task per lane, drained on shutdown.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use syncdesk_core::config::WorkerConfig;
use syncdesk_index::IndexOutcome;

use crate::executor::{IndexExecutionError, IndexExecutor};
use crate::queue::QueuedRequest;

/// Totals over a worker run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSummary {
    /// Requests that reached a final outcome.
    pub processed: u64,
    /// Requests that produced a version queued for upload.
    pub indexed: u64,
    /// Requests that produced a withheld version.
    pub withheld: u64,
    /// Requests put back because their parent folder was missing.
    pub deferred: u64,
    /// Deferred requests given up on.
    pub dropped: u64,
    /// Requests that failed.
    pub failed: u64,
}

impl WorkerSummary {
    fn record(&mut self, outcome: &IndexOutcome) {
        self.processed += 1;
        match outcome {
            IndexOutcome::Indexed { .. } => self.indexed += 1,
            IndexOutcome::Withheld { .. } => self.withheld += 1,
            IndexOutcome::Failed { .. } => self.failed += 1,
            _ => {}
        }
    }

    fn merge(&mut self, other: &Self) {
        self.processed += other.processed;
        self.indexed += other.indexed;
        self.withheld += other.withheld;
        self.deferred += other.deferred;
        self.dropped += other.dropped;
        self.failed += other.failed;
    }
}

/// Drives the lanes of an [`crate::IndexQueue`].
#[derive(Debug)]
pub struct IndexWorker {
    /// Executor shared by all lanes
    executor: IndexExecutor,
    /// Worker configuration
    config: WorkerConfig,
    /// Deferrals allowed per request
    max_deferrals: u32,
}

impl IndexWorker {
    /// Create a new worker
    pub fn new(executor: IndexExecutor, config: WorkerConfig, max_deferrals: u32) -> Self {
        Self {
            executor,
            config,
            max_deferrals,
        }
    }

    /// Run until every lane is closed, or until shutdown is signalled and
    /// the queued requests are drained.
    ///
    /// Draining is bounded by the shutdown grace period; lanes still busy
    /// after it are aborted.
    pub async fn run(
        &self,
        receivers: Vec<mpsc::Receiver<QueuedRequest>>,
        mut shutdown: watch::Receiver<bool>,
    ) -> WorkerSummary {
        info!(
            lanes = receivers.len(),
            max_deferrals = self.max_deferrals,
            "Index worker started"
        );

        let mut lanes = JoinSet::new();
        for (index, receiver) in receivers.into_iter().enumerate() {
            let lane = Lane {
                index,
                receiver,
                executor: self.executor.clone(),
                shutdown: shutdown.clone(),
                max_deferrals: self.max_deferrals,
                retry_delay: Duration::from_millis(self.config.retry_delay_ms),
            };
            lanes.spawn(lane.run());
        }

        let mut summary = WorkerSummary::default();
        loop {
            tokio::select! {
                joined = lanes.join_next() => match joined {
                    Some(result) => collect(result, &mut summary),
                    None => {
                        info!(?summary, "Index worker finished");
                        return summary;
                    }
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Index worker received shutdown signal");
                        break;
                    }
                }
            }
        }

        let grace = Duration::from_secs(self.config.shutdown_grace_seconds);
        let drained = tokio::time::timeout(grace, async {
            while let Some(result) = lanes.join_next().await {
                collect(result, &mut summary);
            }
        })
        .await;

        if drained.is_err() {
            warn!(
                grace_seconds = self.config.shutdown_grace_seconds,
                "Lanes did not drain in time, aborting"
            );
            lanes.abort_all();
        }

        info!(?summary, "Index worker shut down complete");
        summary
    }
}

fn collect(result: Result<WorkerSummary, tokio::task::JoinError>, summary: &mut WorkerSummary) {
    match result {
        Ok(lane) => summary.merge(&lane),
        Err(e) => error!(error = %e, "Lane task failed"),
    }
}

/// One ordered lane.
struct Lane {
    index: usize,
    receiver: mpsc::Receiver<QueuedRequest>,
    executor: IndexExecutor,
    shutdown: watch::Receiver<bool>,
    max_deferrals: u32,
    retry_delay: Duration,
}

impl Lane {
    async fn run(mut self) -> WorkerSummary {
        let mut summary = WorkerSummary::default();
        let mut deferred: VecDeque<QueuedRequest> = VecDeque::new();
        let mut draining = false;
        let mut open = true;

        loop {
            if !open && deferred.is_empty() {
                break;
            }

            tokio::select! {
                biased;

                changed = self.shutdown.changed(), if !draining => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        draining = true;
                        self.receiver.close();
                        info!(lane = self.index, "Lane draining");
                    }
                }
                item = self.receiver.recv(), if open => match item {
                    Some(queued) => self.handle(queued, &mut deferred, &mut summary).await,
                    None => open = false,
                },
                _ = tokio::time::sleep(self.retry_delay), if !deferred.is_empty() => {
                    if let Some(queued) = deferred.pop_front() {
                        self.handle(queued, &mut deferred, &mut summary).await;
                    }
                }
            }
        }

        info!(lane = self.index, processed = summary.processed, "Lane stopped");
        summary
    }

    async fn handle(
        &self,
        queued: QueuedRequest,
        deferred: &mut VecDeque<QueuedRequest>,
        summary: &mut WorkerSummary,
    ) {
        match self.executor.execute(&queued.request).await {
            Ok(outcome) => summary.record(&outcome),
            Err(IndexExecutionError::Deferred(reason)) => {
                if queued.deferrals < self.max_deferrals {
                    summary.deferred += 1;
                    deferred.push_back(QueuedRequest {
                        deferrals: queued.deferrals + 1,
                        ..queued
                    });
                } else {
                    warn!(
                        lane = self.index,
                        deferrals = queued.deferrals,
                        reason = %reason,
                        "Parent folder never appeared, dropping request"
                    );
                    summary.dropped += 1;
                }
            }
            Err(IndexExecutionError::Internal(e)) => {
                error!(
                    lane = self.index,
                    request = %queued.request,
                    error = %e,
                    "Index request failed with an internal error"
                );
                summary.processed += 1;
                summary.failed += 1;
            }
        }
    }
}
