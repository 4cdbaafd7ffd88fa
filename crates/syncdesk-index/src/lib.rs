//! # syncdesk-index
//!
//! The index request pipeline. Turns New, Changed, Moved and Deleted
//! requests from the filesystem watcher into persisted versions, chunks
//! file contents into the local cache and hands finished versions to the
//! upload queue.

pub mod filter;
pub mod indexer;
pub mod quota;
pub mod request;
pub mod resolver;
pub mod status;
pub mod upload;
pub mod versioning;

pub use filter::PathFilter;
pub use indexer::{IndexServices, Indexer};
pub use quota::AccountQuota;
pub use request::{IndexOutcome, IndexRequest};
pub use resolver::WorkspaceResolver;
pub use status::StatusNotifier;
pub use upload::{ChannelUploadQueue, UploadQueue};
