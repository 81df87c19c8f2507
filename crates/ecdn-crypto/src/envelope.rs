//! Whole-buffer envelope sealing and opening
//!
//! Envelope format (binary):
//! ```text
//! [12 bytes: nonce][sealed chunk 0]...[sealed chunk n-1]
//! sealed chunk = AES-256-GCM(key, nonce, plaintext[i*CHUNK_SIZE..]) || 16-byte tag
//! ```
//!
//! An empty plaintext seals to the nonce alone.

use ecdn_core::{EcdnError, EcdnResult};

use crate::engine::{begin_operation, open_chunk, Nonce};
use crate::keys::SymmetricKey;
use crate::{CHUNK_SIZE, NONCE_SIZE, SEALED_CHUNK_SIZE, TAG_SIZE};

/// Seal a whole plaintext buffer as one operation.
pub fn seal_envelope(key: &SymmetricKey, plaintext: &[u8]) -> EcdnResult<Vec<u8>> {
    let mut session = begin_operation(key)?;

    let chunks = plaintext.len().div_ceil(CHUNK_SIZE);
    let mut envelope = Vec::with_capacity(NONCE_SIZE + plaintext.len() + chunks * TAG_SIZE);
    envelope.extend_from_slice(session.nonce());

    for chunk in plaintext.chunks(CHUNK_SIZE) {
        envelope.extend_from_slice(&session.encrypt_chunk(chunk)?);
    }

    tracing::trace!(
        plaintext_bytes = plaintext.len(),
        chunks = session.chunks_sealed(),
        "envelope sealed"
    );
    Ok(envelope)
}

/// Open an envelope produced by either delivery path.
pub fn open_envelope(key: &SymmetricKey, envelope: &[u8]) -> EcdnResult<Vec<u8>> {
    let layout = envelope_layout(envelope)?;
    let (nonce_bytes, body) = envelope.split_at(NONCE_SIZE);
    let nonce: Nonce = nonce_bytes
        .try_into()
        .map_err(|_| EcdnError::Decryption("envelope nonce is malformed".into()))?;

    let mut plaintext = Vec::with_capacity(layout.plaintext_len as usize);
    for (index, segment) in body.chunks(SEALED_CHUNK_SIZE).enumerate() {
        let chunk = open_chunk(key, &nonce, segment).map_err(|e| match e {
            EcdnError::Decryption(msg) => EcdnError::Decryption(format!("segment {index}: {msg}")),
            other => other,
        })?;
        plaintext.extend_from_slice(&chunk);
    }
    Ok(plaintext)
}

/// Shape of an envelope, derivable without the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeLayout {
    pub segments: usize,
    pub plaintext_len: u64,
    /// Length of the final segment including its tag (0 if there are no segments)
    pub last_segment_len: usize,
}

/// Validate an envelope's length and compute its segment layout.
///
/// A final segment must carry at least one plaintext byte: chunks are never
/// empty, so anything at or below the tag size means truncation.
pub fn envelope_layout(envelope: &[u8]) -> EcdnResult<EnvelopeLayout> {
    if envelope.len() < NONCE_SIZE {
        return Err(EcdnError::Decryption(format!(
            "envelope too short: {} bytes (minimum {NONCE_SIZE})",
            envelope.len()
        )));
    }

    let body_len = envelope.len() - NONCE_SIZE;
    let full = body_len / SEALED_CHUNK_SIZE;
    let rest = body_len % SEALED_CHUNK_SIZE;

    if rest != 0 && rest <= TAG_SIZE {
        return Err(EcdnError::Decryption(format!(
            "envelope truncated: trailing segment of {rest} bytes"
        )));
    }

    let segments = full + usize::from(rest != 0);
    let last_segment_len = match (rest, full) {
        (0, 0) => 0,
        (0, _) => SEALED_CHUNK_SIZE,
        (r, _) => r,
    };

    Ok(EnvelopeLayout {
        segments,
        plaintext_len: (body_len - segments * TAG_SIZE) as u64,
        last_segment_len,
    })
}
