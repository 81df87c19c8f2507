//! Chunk-at-a-time sealing for the streamed delivery path
//!
//! [`EnvelopeSealer`] couples one encryption operation with one
//! [`Base64Stream`]: it yields the encoded nonce first, then one encoded
//! piece per sealed chunk, then the padding tail. [`EnvelopeStream`] drives
//! it over an async reader; each chunk is sealed on the blocking pool.

use std::io;

use ecdn_core::EcdnResult;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::engine::{begin_operation, EncryptionSession, Nonce};
use crate::keys::SymmetricKey;
use crate::transcode::Base64Stream;
use crate::CHUNK_SIZE;
/// One in-progress streamed envelope.
#[derive(Debug)]
pub struct EnvelopeSealer {
    session: EncryptionSession,
    encoder: Base64Stream,
}

impl EnvelopeSealer {
    /// Begin an operation. Returns the sealer and the encoded nonce, which
    /// must be sent before any chunk.
    pub fn begin(key: &SymmetricKey) -> EcdnResult<(Self, String)> {
        let session = begin_operation(key)?;
        let mut encoder = Base64Stream::new();
        let header = encoder.write(session.nonce());
        Ok((Self { session, encoder }, header))
    }

    pub fn nonce(&self) -> &Nonce {
        self.session.nonce()
    }

    pub fn chunks_sealed(&self) -> u64 {
        self.session.chunks_sealed()
    }

    /// Seal and encode the next chunk, in source order.
    pub fn seal(&mut self, chunk: &[u8]) -> EcdnResult<String> {
        let sealed = self.session.encrypt_chunk(chunk)?;
        Ok(self.encoder.write(&sealed))
    }

    /// End the operation, returning the base64 padding tail (may be empty).
    pub fn finish(self) -> String {
        self.encoder.finish()
    }
}

/// Fill `buf` from `reader`, stopping early only at end of input.
///
/// Chunk boundaries must land on multiples of the chunk size regardless of
/// how the reader splits its reads.
async fn read_chunk<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Lazy sequence of encoded envelope pieces over an async reader.
///
/// [`next_piece`](Self::next_piece) yields the encoded nonce, then one piece
/// per chunk, then the padding tail if non-empty. After an error the stream
/// is finished and the reader is no longer polled.
pub struct EnvelopeStream<R> {
    reader: R,
    sealer: Option<EnvelopeSealer>,
    header: Option<String>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> EnvelopeStream<R> {
    /// Begin the operation eagerly so key and randomness failures surface
    /// before anything is emitted.
    pub fn new(key: &SymmetricKey, reader: R) -> EcdnResult<Self> {
        let (sealer, header) = EnvelopeSealer::begin(key)?;
        Ok(Self {
            reader,
            sealer: Some(sealer),
            header: Some(header),
            buf: vec![0u8; CHUNK_SIZE],
        })
    }

    /// Produce the next encoded piece, or `None` once the envelope is complete.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn next_piece(&mut self) -> EcdnResult<Option<String>> {
        if let Some(header) = self.header.take() {
            return Ok(Some(header));
        }

        // Taken for the duration of the call; only restored on success.
        let Some(mut sealer) = self.sealer.take() else {
            return Ok(None);
        };

        let n = read_chunk(&mut self.reader, &mut self.buf).await?;
        if n == 0 {
            tracing::debug!(chunks = sealer.chunks_sealed(), "envelope complete");
            let tail = sealer.finish();
            return Ok((!tail.is_empty()).then_some(tail));
        }

        let buf = std::mem::take(&mut self.buf);
        let (sealer, buf, sealed) = tokio::task::spawn_blocking(move || {
            let sealed = sealer.seal(&buf[..n]);
            (sealer, buf, sealed)
        })
        .await
        .map_err(io::Error::from)?;

        let encoded = sealed?;
        self.buf = buf;
        self.sealer = Some(sealer);
        Ok(Some(encoded))
    }

    /// True once the envelope has been fully emitted or an error ended it.
    pub fn is_finished(&self) -> bool {
        self.header.is_none() && self.sealer.is_none()
    }
}
