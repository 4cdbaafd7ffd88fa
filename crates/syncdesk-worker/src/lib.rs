//! Background processing of index requests.
//!
//! This crate provides:
//! - An index queue that routes requests to ordered lanes
//! - An executor that runs one request through the indexer
//! - A worker runner that drives the lanes and drains them on shutdown

pub mod executor;
pub mod queue;
pub mod runner;

pub use executor::{IndexExecutionError, IndexExecutor};
pub use queue::{IndexQueue, QueueStats, QueuedRequest};
pub use runner::{IndexWorker, WorkerSummary};
