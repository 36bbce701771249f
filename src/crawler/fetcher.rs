//! Fetch strategies
//!
//! This module defines the pluggable fetch seam and its default HTTP implementation:
//! - `FetchStrategy`: performs a single page retrieval
//! - `FetchContext`: the deadline and per-request timeout a fetch must honour
//! - `HttpStrategy`: reqwest-backed GET with title / next-link extraction
//! - Error classification for transport and status failures

use crate::config::{CrawlerConfig, FetchConfig};
use crate::crawler::parser::parse_page;
use crate::{ScrapeError, ScrapeResult};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Result of a successful fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResult {
    /// HTTP status code
    pub status: u16,
    /// Full response body
    pub body: String,
    /// Page title, if one was found
    pub title: Option<String>,
    /// Absolute URL of the next page, if one was found
    pub next_url: Option<String>,
}

/// Time limits handed to a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchContext {
    /// The batch or crawl deadline; no fetch should outlive it
    pub deadline: Instant,
    /// Upper bound for a single request
    pub request_timeout: Duration,
}

impl FetchContext {
    pub fn new(deadline: Instant, request_timeout: Duration) -> Self {
        Self {
            deadline,
            request_timeout,
        }
    }

    /// Time left before the deadline
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// The tighter of the request timeout and the time left before the deadline
    pub fn effective_timeout(&self) -> Duration {
        self.request_timeout.min(self.remaining())
    }
}

/// Performs the actual retrieval of a single page
///
/// Implementations are expected to honour `ctx`; the orchestrator never aborts
/// a fetch on its own.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    async fn fetch(&self, url: &Url, ctx: &FetchContext) -> ScrapeResult<FetchResult>;
}

/// Builds an HTTP client with the configured user agent
///
/// # Example
///
/// ```no_run
/// use arachne::config::FetchConfig;
/// use arachne::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Plain HTTP GET strategy
#[derive(Debug, Clone)]
pub struct HttpStrategy {
    client: Client,
}

impl HttpStrategy {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    /// Wraps an already-configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FetchStrategy for HttpStrategy {
    /// Fetches a page
    ///
    /// # Error Classification
    ///
    /// | Condition | Error | Retryable |
    /// |-----------|-------|-----------|
    /// | Deadline already elapsed | DeadlineExceeded | no |
    /// | HTTP 408, 429, 5xx | HttpStatus | yes |
    /// | Other non-2xx | HttpStatus | no |
    /// | Timeout, connect failure, body read failure | Network | yes |
    /// | Request construction / redirect failure | Permanent | no |
    async fn fetch(&self, url: &Url, ctx: &FetchContext) -> ScrapeResult<FetchResult> {
        if ctx.is_expired() {
            return Err(ScrapeError::DeadlineExceeded {
                url: url.to_string(),
            });
        }

        let response = self
            .client
            .get(url.clone())
            .timeout(ctx.effective_timeout())
            .send()
            .await
            .map_err(|e| classify_reqwest_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| classify_reqwest_error(url, &e))?;

        let parsed = parse_page(&body, &final_url);

        Ok(FetchResult {
            status: status.as_u16(),
            body,
            title: parsed.title,
            next_url: parsed.next_url,
        })
    }
}

/// Maps a reqwest error onto the scrape error taxonomy
fn classify_reqwest_error(url: &Url, error: &reqwest::Error) -> ScrapeError {
    let message = if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else if error.is_body() || error.is_decode() || error.is_request() {
        error.to_string()
    } else {
        return ScrapeError::Permanent {
            url: url.to_string(),
            message: error.to_string(),
        };
    };

    ScrapeError::Network {
        url: url.to_string(),
        message,
        retryable: true,
    }
}

/// Builds a fetch context for a run that starts now
pub fn context_for_run(config: &CrawlerConfig) -> FetchContext {
    FetchContext::new(
        Instant::now() + config.total_timeout(),
        config.request_timeout(),
    )
}
