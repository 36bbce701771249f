use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Main configuration structure for Arachne
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
}

/// Scraping engine configuration: concurrency, retries, circuit breaking
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of fetches in flight across all domains
    #[serde(rename = "max-concurrent")]
    pub max_concurrent: usize,

    /// Per-request timeout handed to the fetch strategy (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Deadline for a whole batch or site crawl (milliseconds)
    #[serde(rename = "total-timeout-ms")]
    pub total_timeout_ms: u64,

    /// Maximum number of attempts per URL
    #[serde(rename = "retry-attempts")]
    pub retry_attempts: u32,

    /// Base backoff unit; attempt `n` waits `n * retry-delay-ms` before the next try
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Consecutive failures that open a domain's circuit
    #[serde(rename = "circuit-breaker-threshold")]
    pub circuit_breaker_threshold: u32,

    /// How long an open circuit rejects calls (milliseconds)
    #[serde(rename = "circuit-breaker-timeout-ms")]
    pub circuit_breaker_timeout_ms: u64,

    /// Page budget for pagination crawls
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Stored content is truncated to this many bytes (0 keeps everything)
    #[serde(rename = "max-content-bytes")]
    pub max_content_bytes: usize,

    /// Domain -> maximum concurrent fetches for that domain
    #[serde(rename = "domain-rate-limit")]
    pub domain_rate_limit: HashMap<String, usize>,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn total_timeout(&self) -> Duration {
        Duration::from_millis(self.total_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn circuit_breaker_timeout(&self) -> Duration {
        Duration::from_millis(self.circuit_breaker_timeout_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            request_timeout_ms: 10_000,
            total_timeout_ms: 30_000,
            retry_attempts: 3,
            retry_delay_ms: 1_000,
            circuit_breaker_threshold: 3,
            circuit_breaker_timeout_ms: 30_000,
            max_pages: 10,
            max_content_bytes: 16_384,
            domain_rate_limit: HashMap::new(),
        }
    }
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("arachne/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Output and reporting configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the JSON report
    #[serde(rename = "output-file")]
    pub output_file: String,

    /// Default log level (trace, debug, info, warn, error)
    #[serde(rename = "log-level")]
    pub log_level: String,

    /// Whether the metrics snapshot is included in reports
    #[serde(rename = "enable-metrics")]
    pub enable_metrics: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_file: "scraping_results.json".to_string(),
            log_level: "info".to_string(),
            enable_metrics: true,
        }
    }
}
