//! URL normalization and validation for inbound requests.

use thiserror::Error;
use url::Url;

/// Why a user-supplied URL was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("URL is empty")]
    Empty,
    #[error("URL could not be parsed: {0}")]
    Malformed(String),
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
}

/// Trim whitespace and prepend `https://` when no scheme is given.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else if trimmed.contains("://") {
        // Keep foreign schemes so validation can reject them by name.
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Parse a normalized URL and require an http(s) scheme and a host.
pub fn validate_url(normalized: &str) -> Result<Url, UrlError> {
    if normalized.is_empty() {
        return Err(UrlError::Empty);
    }
    let parsed = Url::parse(normalized).map_err(|e| UrlError::Malformed(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::UnsupportedScheme(other.to_string())),
    }
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(UrlError::MissingHost),
    }
}

/// Compare requested and final URLs after parsing, so that a trailing slash
/// added by URL normalization does not count as a redirect.
pub fn urls_differ(requested: &str, final_url: &str) -> bool {
    match (Url::parse(requested), Url::parse(final_url)) {
        (Ok(a), Ok(b)) => a != b,
        _ => requested != final_url,
    }
}
