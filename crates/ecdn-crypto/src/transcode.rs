//! Incremental base64 (standard alphabet, padded) for response bodies
//!
//! [`Base64Stream`] lets the streamed path encode each sealed chunk as soon
//! as it is produced. Only the 0–2 input bytes that do not complete a 3-byte
//! group are held between writes, so the concatenated output always equals
//! the one-shot encoding of the concatenated input.

use base64::{engine::general_purpose::STANDARD, Engine};
use ecdn_core::{EcdnError, EcdnResult};

/// Stateful base64 encoder that never buffers more than two input bytes.
#[derive(Debug, Default)]
pub struct Base64Stream {
    pending: [u8; 2],
    pending_len: usize,
}

impl Base64Stream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode as much of `input` as completes whole groups.
    pub fn write(&mut self, input: &[u8]) -> String {
        let mut out = String::with_capacity((self.pending_len + input.len()) / 3 * 4);
        let mut input = input;

        if self.pending_len > 0 {
            let needed = 3 - self.pending_len;
            if input.len() < needed {
                self.pending[self.pending_len..self.pending_len + input.len()]
                    .copy_from_slice(input);
                self.pending_len += input.len();
                return out;
            }

            let mut group = [0u8; 3];
            group[..self.pending_len].copy_from_slice(&self.pending[..self.pending_len]);
            group[self.pending_len..].copy_from_slice(&input[..needed]);
            STANDARD.encode_string(group, &mut out);
            input = &input[needed..];
            self.pending_len = 0;
        }

        let aligned = input.len() - input.len() % 3;
        STANDARD.encode_string(&input[..aligned], &mut out);

        let rest = &input[aligned..];
        self.pending[..rest.len()].copy_from_slice(rest);
        self.pending_len = rest.len();
        out
    }

    /// Flush the trailing partial group with `=` padding.
    pub fn finish(self) -> String {
        STANDARD.encode(&self.pending[..self.pending_len])
    }

    /// Input bytes held back waiting for a complete group.
    pub fn pending_len(&self) -> usize {
        self.pending_len
    }
}

/// Encode a complete envelope in one call (buffered path).
pub fn encode_envelope(envelope: &[u8]) -> String {
    STANDARD.encode(envelope)
}

/// Decode a downloaded body back to the binary envelope.
///
/// Surrounding whitespace (e.g. a trailing newline added by a tool that
/// saved the body) is ignored.
pub fn decode_envelope(text: &str) -> EcdnResult<Vec<u8>> {
    STANDARD
        .decode(text.trim())
        .map_err(|e| EcdnError::BadInput(format!("body is not valid base64: {e}")))
}
