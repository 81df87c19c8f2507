//! ecdn-crypto: encryption pipeline for served files
//!
//! Architecture: one AES-256-GCM operation per delivered file
//!
//! Pipeline: plaintext → 1 MiB chunks → AES-256-GCM (operation nonce) → base64 → response
//!
//! Envelope layout:
//! ```text
//! [12 bytes: nonce][chunk 1 ciphertext + 16-byte tag][chunk 2 ...]...[chunk n ...]
//! ```
//!
//! Every chunk of one operation is sealed with the same nonce, drawn fresh
//! from the OS RNG when the operation begins. Chunk boundaries fall on
//! multiples of [`CHUNK_SIZE`], so a client splits the ciphertext at
//! `CHUNK_SIZE + TAG_SIZE` and opens each segment independently.

pub mod engine;
pub mod envelope;
pub mod keys;
pub mod strategy;
pub mod stream;
pub mod transcode;

pub use engine::{begin_operation, open_chunk, EncryptionSession, Nonce};
pub use envelope::{envelope_layout, open_envelope, seal_envelope, EnvelopeLayout};
pub use keys::{generate_secret, SymmetricKey};
pub use strategy::DeliveryStrategy;
pub use stream::{EnvelopeSealer, EnvelopeStream};
pub use transcode::{decode_envelope, encode_envelope, Base64Stream};

/// Size of the symmetric key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of an AES-GCM nonce (96-bit)
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM authentication tag
pub const TAG_SIZE: usize = 16;

/// Maximum plaintext bytes per sealed chunk (1 MiB)
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Size of a full sealed chunk on the wire
pub const SEALED_CHUNK_SIZE: usize = CHUNK_SIZE + TAG_SIZE;

/// Files larger than this are streamed instead of buffered (10 MiB)
pub const LARGE_FILE_THRESHOLD: u64 = 10 * CHUNK_SIZE as u64;
