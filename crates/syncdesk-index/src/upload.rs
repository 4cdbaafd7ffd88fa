//! Upload queue boundary.

use async_trait::async_trait;
use tokio::sync::mpsc;

use syncdesk_core::AppError;
use syncdesk_core::result::AppResult;
use syncdesk_entity::file::FileVersion;

/// Receives versions that are ready to be uploaded.
///
/// Fire-and-forget: the indexer calls [`UploadQueue::queue`] at most once
/// per successfully processed version and does not wait for the transfer.
#[async_trait]
pub trait UploadQueue: Send + Sync + 'static {
    /// Hand a persisted version to the uploader.
    async fn queue(&self, version: &FileVersion) -> AppResult<()>;
}

/// Upload queue backed by an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelUploadQueue {
    sender: mpsc::UnboundedSender<FileVersion>,
}

impl ChannelUploadQueue {
    /// Create the queue and the receiving end the uploader drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FileVersion>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl UploadQueue for ChannelUploadQueue {
    async fn queue(&self, version: &FileVersion) -> AppResult<()> {
        self.sender
            .send(version.clone())
            .map_err(|_| AppError::service_unavailable("Upload queue is closed"))
    }
}
