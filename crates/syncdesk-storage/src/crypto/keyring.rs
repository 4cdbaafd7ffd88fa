//! Per-context key derivation.

use std::fmt;

use sha2::{Digest, Sha256};

use syncdesk_core::traits::EncryptionContext;
use syncdesk_core::types::WorkspaceId;

/// Derives an [`EncryptionContext`] for the account repository and for each
/// shared workspace from the profile's master secret.
#[derive(Clone)]
pub struct KeyRing {
    secret: Vec<u8>,
}

impl KeyRing {
    /// Create a key ring from the master secret.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Context for chunks outside any workspace.
    pub fn repository(&self) -> EncryptionContext {
        self.derive(EncryptionContext::repository_id())
    }

    /// Context for chunks inside `workspace`.
    pub fn workspace(&self, workspace: &WorkspaceId) -> EncryptionContext {
        self.derive(EncryptionContext::workspace_id(workspace))
    }

    /// Context for `workspace`, or the repository when there is none.
    pub fn for_workspace(&self, workspace: Option<&WorkspaceId>) -> EncryptionContext {
        match workspace {
            Some(id) => self.workspace(id),
            None => self.repository(),
        }
    }

    fn derive(&self, id: String) -> EncryptionContext {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(id.as_bytes());
        EncryptionContext {
            id,
            key: hasher.finalize().into(),
        }
    }
}

impl fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRing").field("secret", &"<redacted>").finish()
    }
}
