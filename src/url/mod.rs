//! URL handling module for Arachne
//!
//! This module provides domain derivation (the key for rate limiting and
//! circuit breaking) and the syntax check run before any fetch.

mod domain;

pub use domain::{domain_of, extract_domain};

use crate::{ScrapeError, ScrapeResult};
use url::Url;

/// Validates a URL before it is fetched
///
/// A URL is accepted when it parses, uses the `http` or `https` scheme, and
/// names a host. Failures are [`ScrapeError::InvalidUrl`], which is never retried.
///
/// # Examples
///
/// ```
/// use arachne::url::validate_url;
///
/// assert!(validate_url("https://example.com/page").is_ok());
/// assert!(validate_url("ftp://example.com/file").is_err());
/// assert!(validate_url("not a url").is_err());
/// ```
pub fn validate_url(raw: &str) -> ScrapeResult<Url> {
    let invalid = |reason: String| ScrapeError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid("URL is empty".to_string()));
    }

    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(invalid("missing host".to_string())),
    }
}
