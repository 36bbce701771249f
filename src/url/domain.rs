use url::Url;

/// Extracts the domain key from a URL
///
/// The key is the lowercase host, followed by `:port` when the URL names a
/// non-default port. Two URLs with the same key share rate limiting and
/// circuit-breaker state.
///
/// # Returns
///
/// * `Some(String)` - The domain key
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use arachne::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_domain(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Derives the domain key from a raw URL string
///
/// Unparseable input maps to the empty key, which never carries a configured
/// per-domain limit.
pub fn domain_of(url: &str) -> String {
    Url::parse(url.trim())
        .ok()
        .and_then(|parsed| extract_domain(&parsed))
        .unwrap_or_default()
}
