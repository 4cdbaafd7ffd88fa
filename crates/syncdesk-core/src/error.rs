//! Unified application error types for SyncDesk.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Normal control-flow outcomes of the
//! indexer (ignored paths, vanished files, deferrals) are never errors.

use std::fmt;
use thiserror::Error;

/// Category of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A file, version or record does not exist.
    NotFound,
    /// A request or argument is malformed.
    Validation,
    /// A bug, not an operational condition. Never absorbed per item.
    Internal,
    /// The version repository rejected or failed an operation.
    Database,
    /// Local filesystem I/O failed.
    Storage,
    /// Packing chunk content under an encryption context failed.
    Encryption,
    Configuration,
    Serialization,
    /// The worker is shutting down.
    ServiceUnavailable,
}

impl ErrorKind {
    /// Stable upper-case code used in logs and JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION",
            Self::Internal => "INTERNAL",
            Self::Database => "DATABASE",
            Self::Storage => "STORAGE",
            Self::Encryption => "ENCRYPTION",
            Self::Configuration => "CONFIGURATION",
            Self::Serialization => "SERIALIZATION",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unified application error used throughout SyncDesk.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Wrap an I/O error with a description of what was being done.
    ///
    /// `NotFound` is preserved so callers can tell a vanished file from a
    /// failing disk; everything else becomes `Storage`.
    pub fn io(context: impl fmt::Display, err: std::io::Error) -> Self {
        let kind = if err.kind() == std::io::ErrorKind::NotFound {
            ErrorKind::NotFound
        } else {
            ErrorKind::Storage
        };
        Self::with_source(kind, format!("{context}: {err}"), err)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    pub fn encryption(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Encryption, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

impl Clone for AppError {
    /// Clones drop the source chain; the message already carries it.
    fn clone(&self) -> Self {
        Self::new(self.kind, self.message.clone())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorKind::Serialization, format!("Invalid JSON: {err}"), err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::io("I/O error", err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::storage("disk full");
        assert_eq!(err.to_string(), "STORAGE: disk full");
    }

    #[test]
    fn test_io_keeps_not_found_apart() {
        let gone = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(AppError::io("Failed to open /a", gone).is_not_found());

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = AppError::io("Failed to open /a", denied);
        assert_eq!(err.kind, ErrorKind::Storage);
        assert!(err.message.starts_with("Failed to open /a"));
    }

    #[test]
    fn test_clone_drops_source() {
        let err = AppError::io("write failed", std::io::Error::other("boom"));
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::Storage);
        assert!(cloned.source.is_none());
    }
}
