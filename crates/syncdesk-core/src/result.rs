//! Convenience result type alias for SyncDesk.

use crate::error::AppError;

/// A specialized `Result` type for SyncDesk operations.
pub type AppResult<T> = Result<T, AppError>;
