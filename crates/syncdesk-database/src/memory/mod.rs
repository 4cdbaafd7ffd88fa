//! In-memory repositories with JSON snapshot persistence.

pub mod snapshot;
pub mod store;
mod table;

pub use snapshot::Snapshot;
pub use store::MemoryDatabase;
