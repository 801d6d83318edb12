//! Domain mapping and the domain-refresh pipeline.
//!
//! The adapter tracks which API hosts and image host are currently active.
//! The selection lives in an immutable [`DomainSnapshot`] owned by the
//! adapter; a refresh produces a [`DomainRefreshOutcome`] the caller commits,
//! so nothing here is process-wide mutable state.
//!
//! A refresh fetches an encrypted domain-list file, decrypts it with the
//! static domain secret, and keeps at most the first four servers. Any
//! failure along the way (network, status, decrypt, empty list) degrades to
//! the built-in fallback list instead of surfacing an error.

use serde::Deserialize;
use tracing::debug;

use crate::codec;
use crate::protocol;

/// Maximum number of server entries taken from a fetched domain list.
pub const MAX_SERVERS: usize = 4;

/// Immutable view of the currently selected API and image hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSnapshot {
    api_domains: Vec<String>,
    image_host: String,
}

impl DomainSnapshot {
    /// Creates the built-in fallback snapshot used before any refresh.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            api_domains: protocol::FALLBACK_SERVERS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            image_host: protocol::FALLBACK_IMAGE_HOST.to_string(),
        }
    }

    /// Returns the active API host list.
    #[must_use]
    pub fn api_domains(&self) -> &[String] {
        &self.api_domains
    }

    /// Returns the active image host (scheme included).
    #[must_use]
    pub fn image_host(&self) -> &str {
        &self.image_host
    }

    /// Resolves the API base URL for a user-selected domain index.
    ///
    /// Indices outside `[0, len)` fall back to index 0. Entries already
    /// carrying a scheme are used as-is, otherwise `https://` is assumed.
    #[must_use]
    pub fn api_base_url(&self, index: usize) -> String {
        let index = if index < self.api_domains.len() { index } else { 0 };
        let domain = self
            .api_domains
            .get(index)
            .map_or(protocol::FALLBACK_SERVERS[0], String::as_str);
        if domain.contains("://") {
            domain.trim_end_matches('/').to_string()
        } else {
            format!("https://{domain}")
        }
    }

    /// Returns a snapshot with the API host list replaced.
    ///
    /// An empty list leaves the snapshot unchanged.
    #[must_use]
    pub fn with_api_domains(&self, domains: Vec<String>) -> Self {
        if domains.is_empty() {
            return self.clone();
        }
        Self {
            api_domains: domains,
            image_host: self.image_host.clone(),
        }
    }

    /// Returns a snapshot with the image host replaced.
    ///
    /// An empty host leaves the snapshot unchanged.
    #[must_use]
    pub fn with_image_host(&self, host: &str) -> Self {
        if host.is_empty() {
            return self.clone();
        }
        Self {
            api_domains: self.api_domains.clone(),
            image_host: host.trim_end_matches('/').to_string(),
        }
    }

    /// Cover image URL convention: `<imageHost>/covers/<id>_cover.jpg`.
    #[must_use]
    pub fn cover_url(&self, comic_id: &str) -> String {
        format!("{}/covers/{comic_id}_cover.jpg", self.image_host)
    }

    /// Chapter page URL: `<imageHost>/comics/<comicId>/<chapterId>/<name>`.
    #[must_use]
    pub fn page_url(&self, comic_id: &str, chapter_id: &str, image_name: &str) -> String {
        format!(
            "{}/comics/{comic_id}/{chapter_id}/{image_name}",
            self.image_host
        )
    }

    /// Avatar URL: `<imageHost>/users/<name>`.
    #[must_use]
    pub fn avatar_url(&self, image_name: &str) -> String {
        format!("{}/users/{image_name}", self.image_host)
    }
}

/// Result of a domain refresh, to be committed by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainRefreshOutcome {
    /// The remote list decrypted and parsed; holds at most
    /// [`MAX_SERVERS`] entries.
    Fetched {
        /// Servers to apply.
        servers: Vec<String>,
    },
    /// The fetch failed in any way; the fallback list applies.
    FetchFailed {
        /// The built-in fallback servers.
        fallback: Vec<String>,
    },
}

impl DomainRefreshOutcome {
    /// A failed refresh resolving to the built-in fallback list.
    #[must_use]
    pub fn failed() -> Self {
        Self::FetchFailed {
            fallback: protocol::FALLBACK_SERVERS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// The server list this outcome resolves to, fetched or fallback.
    #[must_use]
    pub fn servers(&self) -> &[String] {
        match self {
            Self::Fetched { servers } => servers,
            Self::FetchFailed { fallback } => fallback,
        }
    }

    /// True when the remote list was actually applied.
    #[must_use]
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched { .. })
    }
}

#[derive(Debug, Deserialize)]
struct DomainListFile {
    #[serde(default)]
    servers: Vec<String>,
}

/// Decodes a fetched domain-list envelope into a refresh outcome.
///
/// Decrypts with the static domain secret and keeps the first
/// [`MAX_SERVERS`] entries; any decode or parse failure, or an empty server
/// list, degrades to [`DomainRefreshOutcome::FetchFailed`].
#[must_use]
pub fn parse_domain_list(envelope: &str) -> DomainRefreshOutcome {
    let fallback = DomainRefreshOutcome::failed;

    let decoded = match codec::decode(envelope, protocol::DOMAIN_SECRET) {
        Ok(decoded) => decoded,
        Err(error) => {
            debug!(error = %error, "domain list envelope did not decode");
            return fallback();
        }
    };

    match serde_json::from_str::<DomainListFile>(&decoded) {
        Ok(file) if !file.servers.is_empty() => {
            let mut servers = file.servers;
            servers.truncate(MAX_SERVERS);
            DomainRefreshOutcome::Fetched { servers }
        }
        Ok(_) => {
            debug!("domain list decoded but held no servers");
            fallback()
        }
        Err(error) => {
            debug!(error = %error, "domain list JSON did not parse");
            fallback()
        }
    }
}
