//! Domain events emitted by the indexer.
//!
//! Events are broadcast to whoever renders sync status (the tray icon in a
//! desktop build) and to the diagnostic log shipper.

pub mod index;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use index::{IndexEvent, StatusIcon, WithholdReason};

/// Wrapper for index events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub payload: IndexEvent,
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(payload: IndexEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            payload,
        }
    }
}
