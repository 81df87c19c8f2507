//! Process-wide symmetric key: derivation from the configured secret

use base64::{engine::general_purpose::STANDARD, Engine};
use ecdn_core::{EcdnError, EcdnResult};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::KEY_SIZE;

/// The 256-bit key every delivery is sealed under. Zeroized on drop.
#[derive(Clone)]
pub struct SymmetricKey {
    bytes: [u8; KEY_SIZE],
}

impl SymmetricKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Build a key from raw bytes, rejecting anything that is not exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> EcdnResult<Self> {
        let bytes: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            EcdnError::KeyInit(format!(
                "key must be {KEY_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    /// Derive the key from a base64-encoded secret of any length.
    ///
    /// The decoded secret is hashed with SHA-256 so arbitrary input
    /// normalizes to exactly 32 bytes.
    pub fn derive_from_secret(secret_b64: &SecretString) -> EcdnResult<Self> {
        let encoded = secret_b64.expose_secret().trim();
        if encoded.is_empty() {
            return Err(EcdnError::KeyInit("key secret is empty".into()));
        }

        let mut decoded = STANDARD
            .decode(encoded)
            .map_err(|e| EcdnError::KeyInit(format!("key secret is not valid base64: {e}")))?;

        let digest = Sha256::digest(&decoded);
        decoded.zeroize();

        Self::from_slice(digest.as_slice())
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Generate a random 32-byte secret, base64-encoded, suitable for `AES_KEY`.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; KEY_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    let encoded = STANDARD.encode(bytes);
    bytes.zeroize();
    encoded
}
