//! Crawler module for page fetching and scrape orchestration
//!
//! This module contains the core scraping logic, including:
//! - Global and per-domain admission control
//! - Per-domain circuit breakers
//! - Retry with linear backoff
//! - HTTP fetching and HTML metadata extraction
//! - Bulk and pagination orchestration

mod circuit_breaker;
mod fetcher;
mod orchestrator;
mod parser;
mod rate_limiter;
mod registry;
mod result;
mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitState, CircuitStats};
pub use fetcher::{
    build_http_client, context_for_run, FetchContext, FetchResult, FetchStrategy, HttpStrategy,
};
pub use orchestrator::Orchestrator;
pub use parser::{parse_page, ParsedPage};
pub use rate_limiter::{AdmissionPermit, RateLimiter};
pub use registry::BreakerRegistry;
pub use result::{truncate_content, ScrapedResult};
pub use retry::RetryPolicy;
