//! Index executor: runs one request through the indexer.

use std::sync::Arc;

use tracing::{info, warn};

use syncdesk_core::error::AppError;
use syncdesk_index::{IndexOutcome, IndexRequest, Indexer};

/// Redispatches followed for one request. A redispatch always produces a
/// New request, which never redispatches again.
const MAX_REDISPATCHES: usize = 2;

/// Error from request execution
#[derive(Debug, thiserror::Error)]
pub enum IndexExecutionError {
    /// The parent folder is not indexed yet; retry later
    #[error("Request deferred until its parent folder is indexed: {0}")]
    Deferred(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

/// Runs requests through the indexer, following redispatches.
#[derive(Debug, Clone)]
pub struct IndexExecutor {
    indexer: Arc<Indexer>,
}

impl IndexExecutor {
    /// Create a new executor
    pub fn new(indexer: Arc<Indexer>) -> Self {
        Self { indexer }
    }

    /// Execute a request to completion.
    ///
    /// A `Redispatched` outcome is processed right away; `Deferred` becomes
    /// an error so the caller can re-queue the request.
    pub async fn execute(&self, request: &IndexRequest) -> Result<IndexOutcome, IndexExecutionError> {
        let mut current = request.clone();
        let mut hops = 0;

        loop {
            let outcome = self.indexer.process(current.clone()).await?;
            match outcome {
                IndexOutcome::Redispatched(next) if hops < MAX_REDISPATCHES => {
                    info!(from = %current, to = %next, "Following redispatch");
                    current = *next;
                    hops += 1;
                }
                IndexOutcome::Redispatched(next) => {
                    warn!(request = %next, "Too many redispatches, giving up");
                    return Ok(IndexOutcome::Redispatched(next));
                }
                IndexOutcome::Deferred => {
                    return Err(IndexExecutionError::Deferred(current.to_string()));
                }
                other => return Ok(other),
            }
        }
    }
}
