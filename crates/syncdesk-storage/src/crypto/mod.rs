//! Chunk packing under an encryption context.

pub mod gcm;
pub mod keyring;
pub mod plaintext;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use syncdesk_core::AppError;
use syncdesk_core::traits::ChunkPacker;

pub use gcm::AesGcmPacker;
pub use keyring::KeyRing;
pub use plaintext::PlaintextPacker;

/// Cipher used for chunk blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionMode {
    /// Blobs are the plaintext.
    None,
    /// AES-256-GCM with a random 96-bit nonce.
    Aes256Gcm,
}

impl EncryptionMode {
    /// Return the mode as its configuration string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Aes256Gcm => "aes256gcm",
        }
    }

    /// Create the packer for this mode.
    pub fn packer(&self) -> Arc<dyn ChunkPacker> {
        match self {
            Self::None => Arc::new(PlaintextPacker),
            Self::Aes256Gcm => Arc::new(AesGcmPacker),
        }
    }
}

impl fmt::Display for EncryptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EncryptionMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "aes256gcm" | "aes-256-gcm" => Ok(Self::Aes256Gcm),
            _ => Err(AppError::configuration(format!(
                "Unknown cipher '{s}'. Expected one of: none, aes256gcm"
            ))),
        }
    }
}
