//! Transport seam between the adapter and the network.
//!
//! The core never parses cookies or interprets HTTP statuses at this layer:
//! a [`Transport`] returns status and body verbatim and the API client maps
//! them to domain errors. The production [`HttpTransport`] wraps `reqwest`
//! with the shared client policy (timeouts, gzip, cookie jar); tests swap in
//! mock transports through the same trait.

mod error;

pub use error::TransportError;

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::warn;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

/// Raw HTTP exchange result: status code plus body text.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body decoded as text.
    pub body: String,
}

/// Object-safe network collaborator.
///
/// Uses `async_trait` so the adapter can hold `Arc<dyn Transport>` and tests
/// can substitute scripted implementations.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a GET request with the given headers.
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<TransportResponse, TransportError>;

    /// Issues a POST request with a pre-encoded form body.
    async fn post_form(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &str,
    ) -> Result<TransportResponse, TransportError>;

    /// Drops session cookies for the given URL.
    fn delete_cookies(&self, url: &str);
}

struct ClientState {
    client: Client,
}

/// Production transport backed by `reqwest` with a shared cookie jar.
pub struct HttpTransport {
    state: RwLock<ClientState>,
}

impl HttpTransport {
    /// Builds the transport with the shared client policy.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when client construction fails.
    pub fn new() -> Result<Self, TransportError> {
        let client = build_client()?;
        Ok(Self {
            state: RwLock::new(ClientState { client }),
        })
    }

    fn client(&self) -> Client {
        // Lock poisoning only happens if a builder panicked; fall back to the
        // stored client either way.
        match self.state.read() {
            Ok(guard) => guard.client.clone(),
            Err(poisoned) => poisoned.into_inner().client.clone(),
        }
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").finish_non_exhaustive()
    }
}

fn build_client() -> Result<Client, TransportError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
        .gzip(true)
        .cookie_provider(Arc::new(Jar::default()))
        .build()
        .map_err(|source| TransportError::ClientBuild { source })
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| TransportError::invalid_header(name))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| TransportError::invalid_header(name))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

async fn read_response(
    url: &str,
    response: reqwest::Response,
) -> Result<TransportResponse, TransportError> {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|source| TransportError::network(url, source))?;
    Ok(TransportResponse { status, body })
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<TransportResponse, TransportError> {
        let response = self
            .client()
            .get(url)
            .headers(header_map(headers)?)
            .send()
            .await
            .map_err(|source| TransportError::network(url, source))?;
        read_response(url, response).await
    }

    async fn post_form(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &str,
    ) -> Result<TransportResponse, TransportError> {
        let response = self
            .client()
            .post(url)
            .headers(header_map(headers)?)
            .body(body.to_string())
            .send()
            .await
            .map_err(|source| TransportError::network(url, source))?;
        read_response(url, response).await
    }

    fn delete_cookies(&self, url: &str) {
        // reqwest's Jar has no per-domain removal, so a logout resets the
        // whole jar by rebuilding the client with a fresh one.
        let _ = url;
        match build_client() {
            Ok(client) => {
                let mut guard = match self.state.write() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                guard.client = client;
            }
            Err(error) => {
                warn!(error = %error, "cookie reset failed; keeping existing client");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_header_map_accepts_fixed_header_set() {
        let map = header_map(&crate::protocol::base_headers()).unwrap();
        assert_eq!(
            map.get("x-requested-with").unwrap(),
            "com.rouman5.app"
        );
    }

    #[test]
    fn test_header_map_rejects_bad_name() {
        let headers = vec![("bad header".to_string(), "v".to_string())];
        let err = header_map(&headers).unwrap_err();
        assert!(matches!(err, TransportError::InvalidHeader { .. }));
    }

    #[test]
    fn test_http_transport_builds() {
        assert!(HttpTransport::new().is_ok());
    }
}
