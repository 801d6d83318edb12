//! Error types for the envelope codec.

use thiserror::Error;

/// Errors that can occur while decoding an encrypted API envelope.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The envelope string is not valid base64.
    #[error("envelope is not valid base64: {source}")]
    Base64 {
        /// The underlying decode error.
        #[source]
        source: base64::DecodeError,
    },

    /// The ciphertext length is not a whole number of AES blocks.
    #[error("ciphertext length {len} is not a multiple of the AES block size")]
    BlockLength {
        /// Length of the decoded ciphertext in bytes.
        len: usize,
    },

    /// Block-cipher decryption failed (wrong key material or corrupt data).
    #[error("AES-ECB decryption failed")]
    Decrypt,

    /// The decrypted bytes are not valid UTF-8 text.
    #[error("decrypted payload is not valid UTF-8: {source}")]
    Utf8 {
        /// The underlying conversion error.
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl CodecError {
    /// Creates a base64 error from the decoder failure.
    pub(crate) fn base64(source: base64::DecodeError) -> Self {
        Self::Base64 { source }
    }

    /// Creates a block-length error.
    pub(crate) fn block_length(len: usize) -> Self {
        Self::BlockLength { len }
    }

    /// Creates a UTF-8 conversion error.
    pub(crate) fn utf8(source: std::string::FromUtf8Error) -> Self {
        Self::Utf8 { source }
    }
}
