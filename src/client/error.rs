//! Error types for the authenticated API client.

use thiserror::Error;

use crate::codec::CodecError;
use crate::transport::TransportError;

/// Errors surfaced by API calls.
///
/// [`ApiError::SessionExpired`] is distinct from a plain status error so a
/// caller can trigger re-authentication instead of a generic retry. Nothing
/// is retried or swallowed here; retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport could not complete the exchange.
    #[error("transport failure for {url}: {source}")]
    Transport {
        /// The request URL.
        url: String,
        /// The underlying transport error.
        #[source]
        source: TransportError,
    },

    /// The server answered with a non-200 status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// Server-provided message, or a generic status description.
        message: String,
    },

    /// 401 with the known "please log in" message while the session was
    /// believed active.
    #[error("session expired; login required")]
    SessionExpired,

    /// The response JSON was missing or mistyped (e.g. no string `data`
    /// field), or the decoded envelope held no parsable JSON.
    #[error("malformed API response: {reason}")]
    MalformedResponse {
        /// What was wrong with the response shape.
        reason: String,
    },

    /// The response envelope failed to decode.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl ApiError {
    /// Creates a transport error carrying the request URL.
    pub(crate) fn transport(url: impl Into<String>, source: TransportError) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates a status error with the server message when present.
    pub(crate) fn status(status: u16, message: Option<String>) -> Self {
        Self::Status {
            status,
            message: message.unwrap_or_else(|| format!("unexpected status {status}")),
        }
    }

    /// Creates a malformed-response error.
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_falls_back_to_numeric_description() {
        let err = ApiError::status(503, None);
        assert!(err.to_string().contains("503"));

        let err = ApiError::status(401, Some("请先登录".to_string()));
        assert!(err.to_string().contains("请先登录"));
    }
}
