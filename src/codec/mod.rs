//! Envelope codec for the encrypted API payloads.
//!
//! Every response body from the upstream service wraps its JSON in an
//! "envelope": base64 text holding AES-256-ECB ciphertext whose key is the
//! hex MD5 digest of a seed string. The seed is either a static secret (the
//! domain-list file) or `<unix_seconds><api_secret>` where the timestamp must
//! match the one sent in the request's `tokenparam` header.
//!
//! Decrypted plaintext may carry framing noise around the JSON value; the
//! codec strips everything outside the first `{`/`[` and the last `}`/`]`
//! without parsing it.

mod error;

pub use error::CodecError;

use aes::Aes256;
use base64::Engine as _;
use cipher::block_padding::NoPadding;
use cipher::{BlockDecryptMut, KeyInit};

type Aes256EcbDec = ecb::Decryptor<Aes256>;

const AES_BLOCK_SIZE: usize = 16;

/// Derives the cipher key for a seed string.
///
/// The key is the lowercase hex MD5 digest of the UTF-8 seed bytes, used as
/// ASCII key material: 32 hex characters become the 32-byte AES-256 key.
#[must_use]
pub fn derive_key(seed: &str) -> String {
    format!("{:x}", md5::compute(seed.as_bytes()))
}

/// Decodes an encrypted envelope into the embedded JSON substring.
///
/// Steps, each failing the whole call when malformed: base64 decode,
/// AES-256-ECB decrypt (no padding), UTF-8 decode, then bracket-scan
/// extraction. A plaintext without any JSON brackets yields an empty string,
/// which callers must treat as a parse failure rather than valid JSON.
///
/// # Errors
///
/// Returns [`CodecError`] when the envelope is not base64, the ciphertext is
/// not block-aligned, decryption fails, or the plaintext is not UTF-8.
pub fn decode(envelope: &str, seed: &str) -> Result<String, CodecError> {
    let key = derive_key(seed).into_bytes();

    let mut ciphertext = base64::engine::general_purpose::STANDARD
        .decode(envelope.trim())
        .map_err(CodecError::base64)?;

    if ciphertext.len() % AES_BLOCK_SIZE != 0 {
        return Err(CodecError::block_length(ciphertext.len()));
    }

    let cipher = Aes256EcbDec::new_from_slice(&key).map_err(|_| CodecError::Decrypt)?;
    let plaintext = cipher
        .decrypt_padded_mut::<NoPadding>(&mut ciphertext)
        .map_err(|_| CodecError::Decrypt)?
        .to_vec();

    let text = String::from_utf8(plaintext).map_err(CodecError::utf8)?;
    Ok(extract_json_slice(&text).to_string())
}

/// Returns the inclusive slice between the first opening and last closing
/// JSON bracket.
///
/// Mirrors the upstream scan exactly: with no opening bracket the result is
/// empty; with an opening bracket but no closing one the backward scan stops
/// at the opening bracket and the result is a single-character nonsense
/// string. Neither case is an error here.
fn extract_json_slice(text: &str) -> &str {
    let bytes = text.as_bytes();

    let mut start = 0;
    while start < bytes.len() && bytes[start] != b'{' && bytes[start] != b'[' {
        start += 1;
    }
    if start >= bytes.len() {
        return "";
    }

    let mut end = bytes.len() - 1;
    while end > start && bytes[end] != b'}' && bytes[end] != b']' {
        end -= 1;
    }

    // start and end both sit on ASCII bracket bytes, so the slice bounds are
    // always char boundaries.
    &text[start..=end]
}
