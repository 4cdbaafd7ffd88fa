//! Shared value types: typed identifiers and path helpers.

pub mod id;
pub mod path;

pub use id::{FileId, ProfileId, RequestId, RootId, WorkspaceId};
