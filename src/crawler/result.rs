//! Per-URL scrape outcome

use crate::crawler::fetcher::FetchResult;
use crate::ScrapeError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of scraping one submitted URL
///
/// One instance exists per submitted URL regardless of how many attempts were
/// made. On success `error` is `None` and the fetch fields are filled in; on
/// failure `error` is set and the fetch fields keep their zero values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapedResult {
    pub url: String,
    pub status: u16,
    pub title: String,
    /// Body, truncated to the configured byte cap
    pub content: String,
    /// Length in bytes of the full, untruncated body
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ScrapedResult {
    /// Creates an empty result for `url`, stamped now
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: 0,
            title: String::new(),
            content: String::new(),
            size: 0,
            next_url: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Fills in the fetch fields, truncating content to `max_content_bytes` (0 = no cap)
    pub fn record_fetch(&mut self, fetched: FetchResult, max_content_bytes: usize) {
        self.status = fetched.status;
        self.title = fetched.title.unwrap_or_default();
        self.next_url = fetched.next_url;
        self.size = fetched.body.len();
        self.content = truncate_content(fetched.body, max_content_bytes);
        self.error = None;
    }

    /// Marks the result as failed, clearing any fetch fields
    pub fn record_error(&mut self, error: &ScrapeError) {
        self.status = 0;
        self.title.clear();
        self.content.clear();
        self.size = 0;
        self.next_url = None;
        self.error = Some(error.to_string());
    }

    /// Creates a failed result in one step
    pub fn failed(url: impl Into<String>, error: &ScrapeError) -> Self {
        let mut result = Self::new(url);
        result.record_error(error);
        result
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Truncates `body` to at most `max_bytes` bytes, backing off to a char boundary
///
/// A cap of 0 keeps the whole body.
pub fn truncate_content(mut body: String, max_bytes: usize) -> String {
    if max_bytes == 0 || body.len() <= max_bytes {
        return body;
    }

    let mut cut = max_bytes;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    body.truncate(cut);
    body
}
