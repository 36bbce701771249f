//! HTML parser for page metadata
//!
//! This module extracts the two things a fetch reports back besides the body:
//! - the page title
//! - the next-page link used by pagination crawls

use scraper::{Html, Selector};
use url::Url;

/// Selectors tried in order when looking for the next page
const NEXT_LINK_SELECTORS: [&str; 3] = [
    "link[rel~='next'][href]",
    "a[rel~='next'][href]",
    "a.next[href]",
];

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Absolute URL of the next page, if the page links to one
    pub next_url: Option<String>,
}

/// Parses HTML content and extracts the title and next-page link
///
/// # Next Link Rules
///
/// The first match wins, in this order:
/// - `<link rel="next" href="...">`
/// - `<a rel="next" href="...">`
/// - `<a class="next" href="...">`
///
/// Links are resolved against `base_url`. `javascript:`, `mailto:`, `tel:`,
/// `data:` and fragment-only hrefs are ignored, as is anything that does not
/// resolve to http(s) or that points back at `base_url` itself.
///
/// # Example
///
/// ```
/// use arachne::crawler::parse_page;
/// use url::Url;
///
/// let html = r#"<html><head><title>Page 1</title></head>
///     <body><a rel="next" href="/page/2">Next</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/page/1").unwrap();
/// let parsed = parse_page(html, &base_url);
/// assert_eq!(parsed.title, Some("Page 1".to_string()));
/// assert_eq!(parsed.next_url, Some("https://example.com/page/2".to_string()));
/// ```
pub fn parse_page(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        next_url: extract_next_url(&document, base_url),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Finds the first usable next-page link
fn extract_next_url(document: &Html, base_url: &Url) -> Option<String> {
    NEXT_LINK_SELECTORS
        .iter()
        .filter_map(|raw| Selector::parse(raw).ok())
        .find_map(|selector| {
            document
                .select(&selector)
                .filter_map(|element| element.value().attr("href"))
                .find_map(|href| resolve_link(href, base_url))
        })
        .filter(|next| next != base_url.as_str())
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}
