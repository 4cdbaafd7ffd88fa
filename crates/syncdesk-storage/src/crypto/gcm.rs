//! AES-256-GCM chunk packer.

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key};

use syncdesk_core::AppError;
use syncdesk_core::result::AppResult;
use syncdesk_core::traits::{ChunkPacker, EncryptionContext};

const NONCE_LEN: usize = 12;

/// Packs chunks as `nonce || ciphertext || tag`.
///
/// The nonce is random per call, so packing the same chunk twice yields
/// different bytes of the same length.
#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmPacker;

impl AesGcmPacker {
    fn cipher(context: &EncryptionContext) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&context.key))
    }
}

impl ChunkPacker for AesGcmPacker {
    fn pack(&self, plaintext: &[u8], context: &EncryptionContext) -> AppResult<Vec<u8>> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = Self::cipher(context)
            .encrypt(&nonce, plaintext)
            .map_err(|_| {
                AppError::encryption(format!("Failed to encrypt chunk under '{}'", context.id))
            })?;

        let mut packed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        packed.extend_from_slice(nonce.as_slice());
        packed.extend_from_slice(&ciphertext);
        Ok(packed)
    }

    fn unpack(&self, packed: &[u8], context: &EncryptionContext) -> AppResult<Vec<u8>> {
        if packed.len() < NONCE_LEN {
            return Err(AppError::encryption("Packed chunk shorter than its nonce"));
        }
        let (nonce, ciphertext) = packed.split_at(NONCE_LEN);
        Self::cipher(context)
            .decrypt(GenericArray::from_slice(nonce), ciphertext)
            .map_err(|_| {
                AppError::encryption(format!("Failed to decrypt chunk under '{}'", context.id))
            })
    }

    fn cipher_name(&self) -> &'static str {
        "aes256gcm"
    }
}
