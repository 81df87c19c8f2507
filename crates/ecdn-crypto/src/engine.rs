//! AES-256-GCM encryption operations
//!
//! An operation is one delivery of one file. [`begin_operation`] draws the
//! operation's nonce; every chunk of that file is then sealed with it via
//! [`EncryptionSession::encrypt_chunk`]. Dropping the session ends the
//! operation. Nonces are never carried over between operations.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm,
};
use ecdn_core::{EcdnError, EcdnResult};
use rand::{rngs::OsRng, RngCore};

use crate::keys::SymmetricKey;
use crate::{NONCE_SIZE, TAG_SIZE};

pub type Nonce = [u8; NONCE_SIZE];

/// Cipher context for one encryption operation.
pub struct EncryptionSession {
    cipher: Aes256Gcm,
    nonce: Nonce,
    chunks_sealed: u64,
}

/// Start an encryption operation under `key` with a freshly drawn nonce.
pub fn begin_operation(key: &SymmetricKey) -> EcdnResult<EncryptionSession> {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|e| EcdnError::Randomness(e.to_string()))?;

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| EcdnError::KeyInit(format!("AES-256-GCM: {e}")))?;

    Ok(EncryptionSession {
        cipher,
        nonce,
        chunks_sealed: 0,
    })
}

impl EncryptionSession {
    pub fn nonce(&self) -> &Nonce {
        &self.nonce
    }

    pub fn chunks_sealed(&self) -> u64 {
        self.chunks_sealed
    }

    /// Seal one chunk with the operation nonce.
    ///
    /// Returns `ciphertext || tag`, `plaintext.len() + 16` bytes. Output is
    /// deterministic for a fixed (key, nonce, plaintext).
    pub fn encrypt_chunk(&mut self, plaintext: &[u8]) -> EcdnResult<Vec<u8>> {
        let sealed = self
            .cipher
            .encrypt(aes_gcm::Nonce::from_slice(&self.nonce), plaintext)
            .map_err(|e| {
                EcdnError::Encryption(format!("chunk {} seal failed: {e}", self.chunks_sealed))
            })?;
        self.chunks_sealed += 1;
        Ok(sealed)
    }
}

impl std::fmt::Debug for EncryptionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionSession")
            .field("chunks_sealed", &self.chunks_sealed)
            .finish_non_exhaustive()
    }
}

/// Open one sealed chunk (`ciphertext || tag`) with the operation nonce.
pub fn open_chunk(key: &SymmetricKey, nonce: &Nonce, sealed: &[u8]) -> EcdnResult<Vec<u8>> {
    if sealed.len() < TAG_SIZE {
        return Err(EcdnError::Decryption(format!(
            "sealed chunk too short: {} bytes (minimum {TAG_SIZE})",
            sealed.len()
        )));
    }

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| EcdnError::KeyInit(format!("AES-256-GCM: {e}")))?;

    cipher
        .decrypt(aes_gcm::Nonce::from_slice(nonce), sealed)
        .map_err(|_| {
            EcdnError::Decryption("chunk open failed: wrong key, wrong nonce, or corrupted data".into())
        })
}
