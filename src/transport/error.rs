//! Error types for the transport seam.

use thiserror::Error;

/// Errors raised by a [`Transport`](super::Transport) implementation.
///
/// HTTP error statuses are not transport errors: the transport reports
/// status and body verbatim and the API client decides what they mean.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network-level failure (DNS, connect, TLS, read).
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client construction failed: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },

    /// A header name or value was rejected by the HTTP client.
    #[error("invalid header {name}")]
    InvalidHeader {
        /// The offending header name.
        name: String,
    },
}

impl TransportError {
    /// Creates a network error carrying the request URL.
    pub(crate) fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an invalid-header error.
    pub(crate) fn invalid_header(name: impl Into<String>) -> Self {
        Self::InvalidHeader { name: name.into() }
    }
}
