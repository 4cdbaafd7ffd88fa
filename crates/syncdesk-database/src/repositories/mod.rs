//! Repository traits.

pub mod chunk;
pub mod version;
pub mod workspace;

pub use chunk::ChunkRepository;
pub use version::VersionRepository;
pub use workspace::WorkspaceRepository;
