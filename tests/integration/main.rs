//! Integration tests for the scraper
//!
//! These tests use wiremock to create mock HTTP servers and drive the
//! orchestrator end-to-end through the real HTTP strategy.

mod config_tests;
mod scrape_tests;
mod site_tests;

use arachne::config::{Config, CrawlerConfig};

/// Creates a test configuration with short delays
pub fn create_test_config() -> Config {
    Config {
        crawler: CrawlerConfig {
            max_concurrent: 3,
            request_timeout_ms: 2_000,
            total_timeout_ms: 10_000,
            retry_attempts: 3,
            retry_delay_ms: 10,
            circuit_breaker_threshold: 3,
            circuit_breaker_timeout_ms: 60_000,
            max_pages: 10,
            ..CrawlerConfig::default()
        },
        ..Config::default()
    }
}

/// Wraps a title and optional next link in a minimal HTML page
pub fn html_page(title: &str, next: Option<&str>) -> String {
    let next = next
        .map(|href| format!(r#"<a rel="next" href="{}">Next</a>"#, href))
        .unwrap_or_default();
    format!(
        r#"<html><head><title>{}</title></head><body><p>Content</p>{}</body></html>"#,
        title, next
    )
}
