//! Index worker configuration.

use serde::{Deserialize, Serialize};

/// Index worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Number of independent processing lanes. Requests under the same
    /// top-level folder always share a lane.
    #[serde(default = "default_lanes")]
    pub lanes: usize,
    /// Capacity of each lane's queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Seconds to wait for queued requests to drain on shutdown.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
    /// Milliseconds an idle lane waits before retrying deferred requests.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            lanes: default_lanes(),
            queue_capacity: default_queue_capacity(),
            shutdown_grace_seconds: default_shutdown_grace(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

fn default_lanes() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_shutdown_grace() -> u64 {
    30
}

fn default_retry_delay() -> u64 {
    250
}
