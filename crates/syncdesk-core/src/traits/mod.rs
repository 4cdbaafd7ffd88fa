//! Collaborator traits that do not depend on entity types.
//!
//! Entity-aware boundaries (repositories, upload queue) live next to the
//! types they move.

pub mod crypto;
pub mod quota;

pub use crypto::{ChunkPacker, EncryptionContext};
pub use quota::{QuotaProvider, QuotaSnapshot};
