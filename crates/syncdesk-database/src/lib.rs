//! # syncdesk-database
//!
//! Repository boundary of the index: the traits the pipeline queries and
//! merges through, and an in-memory implementation persisted as a JSON
//! snapshot.

pub mod memory;
pub mod repositories;

pub use memory::MemoryDatabase;
pub use repositories::{ChunkRepository, VersionRepository, WorkspaceRepository};
