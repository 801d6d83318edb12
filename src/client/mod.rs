//! Authenticated API client: auth headers, status mapping, envelope decode.
//!
//! Every call derives a fresh Unix timestamp, signs it into the `token` /
//! `tokenparam` headers, and decrypts the response `data` envelope with the
//! same timestamp. Session state is an explicit [`Session`] value threaded
//! through calls so concurrent sessions and tests stay isolated.

mod error;

pub use error::ApiError;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::codec;
use crate::protocol;
use crate::transport::{Transport, TransportResponse};

/// Explicit session context for API calls.
///
/// The only state the 401 mapping needs: whether this session previously
/// logged in. A 401 "please log in" on a logged-in session means the session
/// expired; on an anonymous session it is just a status error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    /// Whether the session holds (or held) login cookies.
    pub logged_in: bool,
}

impl Session {
    /// An anonymous session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self { logged_in: false }
    }

    /// A session that has authenticated.
    #[must_use]
    pub fn logged_in() -> Self {
        Self { logged_in: true }
    }
}

/// Shape of every 200 response: the payload is an encrypted string envelope.
#[derive(Debug, Deserialize)]
struct DataEnvelope {
    data: Option<serde_json::Value>,
}

/// Shape of error bodies carrying a server message.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "errorMsg")]
    error_msg: Option<String>,
}

/// Clock source, injectable for tests that pin the envelope timestamp.
pub type Clock = fn() -> u64;

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Authenticated API client over a [`Transport`].
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    clock: Clock,
}

impl ApiClient {
    /// Creates a client using the system clock.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            clock: unix_now,
        }
    }

    /// Creates a client with a fixed clock, for tests that must control the
    /// envelope seed timestamp.
    #[must_use]
    pub fn with_clock(transport: Arc<dyn Transport>, clock: Clock) -> Self {
        Self { transport, clock }
    }

    /// Auth header set for a given timestamp.
    ///
    /// `token` is the hex MD5 of `<time><auth_key>`; `tokenparam` echoes the
    /// timestamp and app version so the server can verify the signature.
    #[must_use]
    pub fn api_headers(time: u64) -> Vec<(String, String)> {
        let token = codec::derive_key(&format!("{time}{}", protocol::AUTH_TOKEN_KEY));
        let mut headers = protocol::base_headers();
        headers.push(("Authorization".into(), "Bearer".into()));
        headers.push(("Sec-Fetch-Storage-Access".into(), "active".into()));
        headers.push(("token".into(), token));
        headers.push((
            "tokenparam".into(),
            format!("{time},{}", protocol::APP_VERSION),
        ));
        headers.push(("User-Agent".into(), protocol::USER_AGENT.into()));
        headers
    }

    /// Issues an authenticated GET and returns the decoded JSON substring.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-200 status (including
    /// the session-expired mapping), a missing/mistyped `data` field, or an
    /// envelope that fails to decode.
    #[instrument(skip(self, session), fields(url = %url))]
    pub async fn get(&self, url: &str, session: &Session) -> Result<String, ApiError> {
        let time = (self.clock)();
        let response = self
            .transport
            .get(url, &Self::api_headers(time))
            .await
            .map_err(|source| ApiError::transport(url, source))?;
        Self::handle_response(response, time, session)
    }

    /// Issues an authenticated form POST and returns the decoded JSON
    /// substring.
    ///
    /// The body must already be `application/x-www-form-urlencoded` encoded.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`ApiClient::get`].
    #[instrument(skip(self, session, body), fields(url = %url))]
    pub async fn post_form(
        &self,
        url: &str,
        body: &str,
        session: &Session,
    ) -> Result<String, ApiError> {
        let time = (self.clock)();
        let mut headers = Self::api_headers(time);
        headers.push((
            "Content-Type".into(),
            "application/x-www-form-urlencoded".into(),
        ));
        let response = self
            .transport
            .post_form(url, &headers, body)
            .await
            .map_err(|source| ApiError::transport(url, source))?;
        Self::handle_response(response, time, session)
    }

    /// Drops session cookies for every given API domain.
    pub fn clear_session(&self, domains: &[String]) {
        for domain in domains {
            self.transport.delete_cookies(domain);
        }
    }

    fn handle_response(
        response: TransportResponse,
        time: u64,
        session: &Session,
    ) -> Result<String, ApiError> {
        if response.status != 200 {
            if response.status == 401 {
                let message = serde_json::from_str::<ErrorBody>(&response.body)
                    .ok()
                    .and_then(|body| body.error_msg);
                if message.as_deref() == Some(protocol::LOGIN_REQUIRED_MSG) && session.logged_in {
                    return Err(ApiError::SessionExpired);
                }
                return Err(ApiError::status(401, message));
            }
            return Err(ApiError::status(response.status, None));
        }

        let envelope = serde_json::from_str::<DataEnvelope>(&response.body)
            .map_err(|error| ApiError::malformed(format!("response is not JSON: {error}")))?;
        let Some(serde_json::Value::String(data)) = envelope.data else {
            return Err(ApiError::malformed("`data` field missing or not a string"));
        };

        let seed = format!("{time}{}", protocol::API_SECRET);
        let decoded = codec::decode(&data, &seed)?;
        debug!(len = decoded.len(), "decoded API envelope");
        Ok(decoded)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}
