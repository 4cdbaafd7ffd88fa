//! Status signal for the user interface and diagnostics.

use tokio::sync::broadcast;
use tracing::trace;

use syncdesk_core::events::{DomainEvent, IndexEvent, StatusIcon};
use syncdesk_core::types::RequestId;

/// Broadcasts [`IndexEvent`]s to any number of subscribers.
///
/// Sending never blocks and never fails the pipeline; events are dropped
/// when nobody listens.
#[derive(Debug, Clone)]
pub struct StatusNotifier {
    sender: broadcast::Sender<DomainEvent>,
}

impl StatusNotifier {
    /// Create a notifier buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    /// Publish an event.
    pub fn notify(&self, event: IndexEvent) {
        if self.sender.send(DomainEvent::new(event)).is_err() {
            trace!("No status subscribers");
        }
    }

    /// Publish a status icon change.
    pub fn status(&self, request_id: RequestId, icon: StatusIcon) {
        self.notify(IndexEvent::Status { request_id, icon });
    }
}

impl Default for StatusNotifier {
    fn default() -> Self {
        Self::new(256)
    }
}
