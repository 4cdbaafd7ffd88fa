//! Index queue: routes requests to ordered lanes.
//!
//! Each lane is a bounded channel consumed by one task. Requests with the
//! same ordering key (root plus first path segment) always land on the same
//! lane, so changes to one path, and a folder and its contents, are
//! processed in arrival order.

use std::hash::{DefaultHasher, Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use syncdesk_core::config::WorkerConfig;
use syncdesk_core::error::AppError;
use syncdesk_index::IndexRequest;

/// A request waiting on a lane.
#[derive(Debug, Clone)]
pub struct QueuedRequest {
    /// The request itself.
    pub request: IndexRequest,
    /// How many times it was put back because its parent was missing.
    pub deferrals: u32,
    /// When it was first queued.
    pub enqueued_at: DateTime<Utc>,
}

impl QueuedRequest {
    /// Wrap a fresh request.
    pub fn new(request: IndexRequest) -> Self {
        Self {
            request,
            deferrals: 0,
            enqueued_at: Utc::now(),
        }
    }
}

/// Sending side of the lanes.
#[derive(Debug, Clone)]
pub struct IndexQueue {
    lanes: Vec<mpsc::Sender<QueuedRequest>>,
}

impl IndexQueue {
    /// Create the queue and one receiver per lane.
    pub fn new(config: &WorkerConfig) -> (Self, Vec<mpsc::Receiver<QueuedRequest>>) {
        let (lanes, receivers): (Vec<_>, Vec<_>) = (0..config.lanes.max(1))
            .map(|_| mpsc::channel(config.queue_capacity.max(1)))
            .unzip();
        (Self { lanes }, receivers)
    }

    /// Number of lanes.
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Lane a request is routed to.
    pub fn lane_for(&self, request: &IndexRequest) -> usize {
        let mut hasher = DefaultHasher::new();
        request.ordering_key().hash(&mut hasher);
        (hasher.finish() % self.lanes.len() as u64) as usize
    }

    /// Enqueue a request, waiting while its lane is full.
    ///
    /// Fails once the worker has started shutting down.
    pub async fn enqueue(&self, request: IndexRequest) -> Result<usize, AppError> {
        let lane = self.lane_for(&request);
        let label = request.to_string();
        self.lanes[lane]
            .send(QueuedRequest::new(request))
            .await
            .map_err(|_| AppError::service_unavailable("Index worker is shutting down"))?;

        debug!(lane, request = %label, "Enqueued index request");
        Ok(lane)
    }

    /// Current queue statistics.
    pub fn stats(&self) -> QueueStats {
        let pending = self
            .lanes
            .iter()
            .map(|lane| lane.max_capacity() - lane.capacity())
            .collect();
        QueueStats {
            lanes: self.lanes.len(),
            pending,
        }
    }
}

/// Queue statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStats {
    /// Number of lanes
    pub lanes: usize,
    /// Requests waiting on each lane
    pub pending: Vec<usize>,
}

impl QueueStats {
    /// Requests waiting across all lanes.
    pub fn total_pending(&self) -> usize {
        self.pending.iter().sum()
    }
}
