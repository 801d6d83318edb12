//! Pinned protocol constants shared across the adapter.
//!
//! Secrets, version markers, and the fixed header sets are fixed by the
//! upstream service and must match it byte-for-byte; none of this is
//! user-configurable.

/// Secret mixed with the request timestamp to derive the `token` header.
pub(crate) const AUTH_TOKEN_KEY: &str = "rouman5APPContent2025";

/// Secret mixed with the request timestamp to derive the response envelope key.
pub(crate) const API_SECRET: &str = "rouman5APISecret2025";

/// Static secret for the remote domain-list envelope.
pub(crate) const DOMAIN_SECRET: &str = "rouman5DomainSecret2025";

/// Version string echoed in the `tokenparam` header.
pub(crate) const APP_VERSION: &str = "2.1.0";

/// Package marker sent via `X-Requested-With`.
pub(crate) const PKG_NAME: &str = "com.rouman5.app";

/// Site origin used for `Origin`/`Referer`.
pub(crate) const SITE_ORIGIN: &str = "https://rouman5.com";

/// Remote domain-list file (encrypted with [`DOMAIN_SECRET`]).
pub(crate) const DOMAIN_LIST_URL: &str = "https://cdn.rouman5.com/config/domains.txt";

/// Literal 401 body message meaning the session cookie is gone.
pub(crate) const LOGIN_REQUIRED_MSG: &str = "请先登录";

/// Fixed browser User-Agent the upstream expects from the app.
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 10; K; wv) AppleWebKit/537.36 \
    (KHTML, like Gecko) Version/4.0 Chrome/130.0.0.0 Mobile Safari/537.36";

/// Built-in API host list used until a domain refresh succeeds.
pub(crate) const FALLBACK_SERVERS: [&str; 4] = [
    "www.rouman5.com",
    "api.rouman5.com",
    "cdn.rouman5.com",
    "backup.rouman5.com",
];

/// Built-in image host used until an image-host refresh succeeds.
pub(crate) const FALLBACK_IMAGE_HOST: &str = "https://img.rouman5.com";

/// Header list shared by every API call (auth headers are layered on top).
pub(crate) fn base_headers() -> Vec<(String, String)> {
    vec![
        ("Accept".into(), "*/*".into()),
        ("Accept-Encoding".into(), "gzip, deflate, br, zstd".into()),
        (
            "Accept-Language".into(),
            "zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7".into(),
        ),
        ("Connection".into(), "keep-alive".into()),
        ("Origin".into(), SITE_ORIGIN.into()),
        ("Referer".into(), format!("{SITE_ORIGIN}/")),
        ("Sec-Fetch-Dest".into(), "empty".into()),
        ("Sec-Fetch-Mode".into(), "cors".into()),
        ("Sec-Fetch-Site".into(), "same-site".into()),
        ("X-Requested-With".into(), PKG_NAME.into()),
    ]
}

/// Header list attached to page-image and thumbnail requests.
pub(crate) fn image_headers() -> Vec<(String, String)> {
    vec![
        (
            "Accept".into(),
            "image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8".into(),
        ),
        ("Accept-Encoding".into(), "gzip, deflate, br, zstd".into()),
        (
            "Accept-Language".into(),
            "zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7".into(),
        ),
        ("Connection".into(), "keep-alive".into()),
        ("Referer".into(), format!("{SITE_ORIGIN}/")),
        ("Sec-Fetch-Dest".into(), "image".into()),
        ("Sec-Fetch-Mode".into(), "no-cors".into()),
        ("Sec-Fetch-Site".into(), "same-site".into()),
        ("Sec-Fetch-Storage-Access".into(), "active".into()),
        ("User-Agent".into(), USER_AGENT.into()),
        ("X-Requested-With".into(), PKG_NAME.into()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_headers_carry_package_marker() {
        let headers = base_headers();
        let marker = headers
            .iter()
            .find(|(name, _)| name == "X-Requested-With")
            .map(|(_, value)| value.as_str());
        assert_eq!(marker, Some(PKG_NAME));
    }

    #[test]
    fn test_image_headers_are_image_scoped() {
        let headers = image_headers();
        let accept = headers
            .iter()
            .find(|(name, _)| name == "Accept")
            .map(|(_, value)| value.as_str())
            .unwrap_or_default();
        assert!(accept.starts_with("image/"), "Accept should be image-first: {accept}");
        let dest = headers
            .iter()
            .find(|(name, _)| name == "Sec-Fetch-Dest")
            .map(|(_, value)| value.as_str());
        assert_eq!(dest, Some("image"));
    }
}
