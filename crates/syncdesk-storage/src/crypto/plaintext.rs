//! Identity packer for unencrypted repositories.

use syncdesk_core::result::AppResult;
use syncdesk_core::traits::{ChunkPacker, EncryptionContext};

/// Stores chunk bytes as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextPacker;

impl ChunkPacker for PlaintextPacker {
    fn pack(&self, plaintext: &[u8], _context: &EncryptionContext) -> AppResult<Vec<u8>> {
        Ok(plaintext.to_vec())
    }

    fn unpack(&self, packed: &[u8], _context: &EncryptionContext) -> AppResult<Vec<u8>> {
        Ok(packed.to_vec())
    }

    fn cipher_name(&self) -> &'static str {
        "none"
    }
}
