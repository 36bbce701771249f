//! Arachne: a concurrent web-scraping engine
//!
//! This crate fetches batches of URLs (or follows pagination links from a seed URL)
//! through a pluggable fetch strategy, bounding global and per-domain concurrency,
//! isolating unhealthy domains with circuit breakers, and retrying transient failures.

pub mod config;
pub mod crawler;
pub mod metrics;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Arachne operations
#[derive(Debug, Error)]
pub enum ArachneError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid value for {var}: '{value}'")]
    Env { var: String, value: String },
}

/// Errors produced while scraping a single URL
///
/// Every variant ends up rendered into [`crawler::ScrapedResult::error`]; none of
/// them abort a batch or a site crawl.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScrapeError {
    /// The URL is malformed; no request is made and nothing is retried
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Transport-level failure (connect, timeout, body read)
    #[error("network error for {url}: {message}")]
    Network {
        url: String,
        message: String,
        retryable: bool,
    },

    /// The server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// Failure that retrying cannot fix
    #[error("permanent failure for {url}: {message}")]
    Permanent { url: String, message: String },

    /// The batch or crawl deadline elapsed before the fetch could complete
    #[error("deadline exceeded before {url} could be fetched")]
    DeadlineExceeded { url: String },

    /// The domain's circuit breaker is open and the call was not attempted
    #[error("circuit breaker open for {domain}")]
    CircuitOpen { domain: String },
}

impl ScrapeError {
    /// Returns true if another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { retryable, .. } => *retryable,
            Self::HttpStatus { status, .. } => {
                *status == 408 || *status == 429 || (500..600).contains(status)
            }
            Self::InvalidUrl { .. }
            | Self::Permanent { .. }
            | Self::DeadlineExceeded { .. }
            | Self::CircuitOpen { .. } => false,
        }
    }

    /// Returns true if this is a circuit-breaker rejection rather than a fetch failure
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen { .. })
    }

    /// HTTP status carried by the error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for Arachne operations
pub type Result<T> = std::result::Result<T, ArachneError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for single-URL scrape operations
pub type ScrapeResult<T> = std::result::Result<T, ScrapeError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{FetchStrategy, Orchestrator, ScrapedResult};
pub use metrics::{Metrics, MetricsSnapshot};
pub use crate::url::{domain_of, extract_domain, validate_url};
