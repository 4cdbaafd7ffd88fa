//! File and folder version entities.

pub mod chunk;
pub mod mime;
pub mod status;
pub mod version;

pub use chunk::{CacheStatus, Chunk, ChunkKey};
pub use mime::{FOLDER_MIME_TYPE, mime_from_path};
pub use status::{FileStatus, SyncStatus};
pub use version::{CreateFileVersion, FileVersion, VersionKey};
