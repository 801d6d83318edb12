//! Shared helpers for integration tests: envelope encryption and a pinned
//! clock so responses can be encrypted with the timestamp the client will
//! use for decryption.
#![allow(dead_code)]

use aes::Aes256;
use base64::Engine as _;
use cipher::block_padding::NoPadding;
use cipher::{BlockEncryptMut, KeyInit};
use rouman_source::codec::derive_key;

type Aes256EcbEnc = ecb::Encryptor<Aes256>;

const AES_BLOCK_SIZE: usize = 16;

/// Timestamp every test client is pinned to.
pub const FIXED_TIME: u64 = 1_700_000_000;

/// API envelope secret (pinned protocol constant).
pub const API_SECRET: &str = "rouman5APISecret2025";

/// Domain-list envelope secret (pinned protocol constant).
pub const DOMAIN_SECRET: &str = "rouman5DomainSecret2025";

/// Clock function handed to `with_clock`.
pub fn fixed_clock() -> u64 {
    FIXED_TIME
}

/// Installs a fmt subscriber honoring `RUST_LOG`. Safe to call from every
/// test; only the first call wins.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Encrypts `plaintext` into a base64 envelope for `seed`, padding with `#`
/// framing noise to stay block-aligned.
pub fn encrypt_envelope(plaintext: &str, seed: &str) -> String {
    let mut buf = plaintext.as_bytes().to_vec();
    while buf.len() % AES_BLOCK_SIZE != 0 {
        buf.push(b'#');
    }
    let key = derive_key(seed).into_bytes();
    let len = buf.len();
    let cipher = Aes256EcbEnc::new_from_slice(&key).expect("valid AES-256 key");
    let encrypted = cipher
        .encrypt_padded_mut::<NoPadding>(&mut buf, len)
        .expect("block-aligned buffer")
        .to_vec();
    base64::engine::general_purpose::STANDARD.encode(encrypted)
}

/// Builds a full 200 API response body: `{"data": "<envelope>"}` encrypted
/// with the pinned timestamp seed.
pub fn api_response_body(payload_json: &str) -> String {
    let seed = format!("{FIXED_TIME}{API_SECRET}");
    serde_json::json!({ "data": encrypt_envelope(payload_json, &seed) }).to_string()
}

/// Builds an encrypted domain-list file body.
pub fn domain_list_body(servers: &[&str]) -> String {
    let json = serde_json::json!({ "servers": servers }).to_string();
    encrypt_envelope(&json, DOMAIN_SECRET)
}
