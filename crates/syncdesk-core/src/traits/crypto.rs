//! Chunk packing (encryption) boundary.

use std::fmt;

use crate::result::AppResult;
use crate::types::id::WorkspaceId;

/// Context id used for chunks outside any shared workspace.
pub const REPOSITORY_CONTEXT: &str = "repo";

/// Key material and identity under which chunks are packed.
///
/// Chunks with the same checksum packed under different contexts are
/// distinct blobs.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionContext {
    /// Context id (`repo` or `ws-<workspace id>`).
    pub id: String,
    /// 256-bit symmetric key.
    pub key: [u8; 32],
}

impl EncryptionContext {
    /// Context id for the account repository.
    pub fn repository_id() -> String {
        REPOSITORY_CONTEXT.to_string()
    }

    /// Context id for a shared workspace.
    pub fn workspace_id(id: &WorkspaceId) -> String {
        format!("ws-{id}")
    }
}

impl fmt::Debug for EncryptionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionContext")
            .field("id", &self.id)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Turns chunk plaintext into the bytes written to the chunk cache.
///
/// The packed length must depend only on the plaintext length: the chunk
/// store treats an on-disk blob of the expected length as already written.
pub trait ChunkPacker: Send + Sync + fmt::Debug + 'static {
    /// Pack `plaintext` under `context`.
    fn pack(&self, plaintext: &[u8], context: &EncryptionContext) -> AppResult<Vec<u8>>;

    /// Reverse [`ChunkPacker::pack`].
    fn unpack(&self, packed: &[u8], context: &EncryptionContext) -> AppResult<Vec<u8>>;

    /// Short name of the cipher, for logging.
    fn cipher_name(&self) -> &'static str;
}
