//! Integration tests for the two delivery encodings.
//!
//! Buffered (`seal_envelope` + `encode_envelope`) and streamed
//! (`EnvelopeStream`) bodies must be interchangeable for a client: same
//! layout, same decryption procedure.

use ecdn_crypto::{
    begin_operation, decode_envelope, encode_envelope, envelope_layout, open_chunk,
    open_envelope, seal_envelope, EnvelopeStream, SymmetricKey, CHUNK_SIZE, NONCE_SIZE,
    SEALED_CHUNK_SIZE, TAG_SIZE,
};
use proptest::prelude::*;

fn test_key() -> SymmetricKey {
    SymmetricKey::from_bytes([42u8; 32])
}

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

/// Drive an `EnvelopeStream` to completion on a throwaway runtime, so the
/// proptests below can stay synchronous.
fn streamed_body(key: &SymmetricKey, plaintext: &[u8]) -> String {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    rt.block_on(async {
        let mut stream = EnvelopeStream::new(key, plaintext).expect("begin stream");
        let mut body = String::new();
        while let Some(piece) = stream.next_piece().await.expect("stream piece") {
            body.push_str(&piece);
        }
        body
    })
}

#[test]
fn empty_file_is_twelve_byte_envelope() {
    let key = test_key();

    let buffered = seal_envelope(&key, b"").unwrap();
    assert_eq!(buffered.len(), NONCE_SIZE);

    let streamed = decode_envelope(&streamed_body(&key, b"")).unwrap();
    assert_eq!(streamed.len(), NONCE_SIZE);
    assert!(open_envelope(&key, &streamed).unwrap().is_empty());
}

#[test]
fn exact_chunk_is_one_segment() {
    let key = test_key();
    let plaintext = make_data(CHUNK_SIZE);

    for envelope in [
        seal_envelope(&key, &plaintext).unwrap(),
        decode_envelope(&streamed_body(&key, &plaintext)).unwrap(),
    ] {
        assert_eq!(envelope.len(), NONCE_SIZE + SEALED_CHUNK_SIZE);
        let layout = envelope_layout(&envelope).unwrap();
        assert_eq!(layout.segments, 1);
        assert_eq!(open_envelope(&key, &envelope).unwrap(), plaintext);
    }
}

#[test]
fn one_byte_past_chunk_is_two_segments() {
    let key = test_key();
    let plaintext = make_data(CHUNK_SIZE + 1);

    for envelope in [
        seal_envelope(&key, &plaintext).unwrap(),
        decode_envelope(&streamed_body(&key, &plaintext)).unwrap(),
    ] {
        let layout = envelope_layout(&envelope).unwrap();
        assert_eq!(layout.segments, 2);
        assert_eq!(layout.last_segment_len, 1 + TAG_SIZE);

        let nonce: [u8; NONCE_SIZE] = envelope[..NONCE_SIZE].try_into().unwrap();
        let second = &envelope[NONCE_SIZE + SEALED_CHUNK_SIZE..];
        assert_eq!(open_chunk(&key, &nonce, second).unwrap(), &plaintext[CHUNK_SIZE..]);
    }
}

#[test]
fn buffered_and_streamed_use_fresh_nonces() {
    let key = test_key();
    let plaintext = make_data(100);

    let a = seal_envelope(&key, &plaintext).unwrap();
    let b = seal_envelope(&key, &plaintext).unwrap();
    let c = decode_envelope(&streamed_body(&key, &plaintext)).unwrap();

    assert_ne!(a[..NONCE_SIZE], b[..NONCE_SIZE]);
    assert_ne!(a[..NONCE_SIZE], c[..NONCE_SIZE]);
    assert_ne!(a, b, "identical plaintext must not seal identically twice");
}

#[test]
fn streamed_body_matches_one_shot_encoding() {
    let key = test_key();
    let plaintext = make_data(CHUNK_SIZE + 12_345);

    let body = streamed_body(&key, &plaintext);
    let envelope = decode_envelope(&body).unwrap();
    assert_eq!(encode_envelope(&envelope), body);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_buffered_roundtrip(plaintext in proptest::collection::vec(any::<u8>(), 0..4096)) {
        let key = test_key();
        let envelope = seal_envelope(&key, &plaintext).unwrap();
        prop_assert_eq!(open_envelope(&key, &envelope).unwrap(), plaintext);
    }

    #[test]
    fn prop_streamed_roundtrip(plaintext in proptest::collection::vec(any::<u8>(), 0..4096)) {
        let key = test_key();
        let envelope = decode_envelope(&streamed_body(&key, &plaintext)).unwrap();
        prop_assert_eq!(open_envelope(&key, &envelope).unwrap(), plaintext);
    }

    /// With the nonce held fixed, any chunking of P seals to pieces that open
    /// back to exactly the same chunk boundaries.
    #[test]
    fn prop_any_chunking_opens_per_chunk(
        plaintext in proptest::collection::vec(any::<u8>(), 1..512),
        chunk_len in 1usize..600,
    ) {
        let key = test_key();
        let mut session = begin_operation(&key).unwrap();
        let nonce = *session.nonce();

        let whole = session.encrypt_chunk(&plaintext).unwrap();
        prop_assert_eq!(open_chunk(&key, &nonce, &whole).unwrap(), plaintext.clone());

        for chunk in plaintext.chunks(chunk_len) {
            let sealed = session.encrypt_chunk(chunk).unwrap();
            prop_assert_eq!(sealed.len(), chunk.len() + TAG_SIZE);
            prop_assert_eq!(open_chunk(&key, &nonce, &sealed).unwrap(), chunk.to_vec());
        }
    }
}
