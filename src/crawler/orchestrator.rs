//! Scrape orchestration
//!
//! The orchestrator owns the rate limiter, the breaker registry, the retry
//! policy and the metrics collector, and drives two modes:
//! - bulk fan-out (`scrape_urls`): one task per URL, results in completion order
//! - pagination (`scrape_site`): a sequential walk of next-page links
//!
//! Every URL goes through the same pipeline:
//! admit -> validate -> retry(breaker(fetch)) -> release.

use crate::config::{Config, CrawlerConfig};
use crate::crawler::circuit_breaker::CircuitStats;
use crate::crawler::fetcher::{context_for_run, FetchContext, FetchStrategy, HttpStrategy};
use crate::crawler::rate_limiter::RateLimiter;
use crate::crawler::registry::BreakerRegistry;
use crate::crawler::result::ScrapedResult;
use crate::crawler::retry::RetryPolicy;
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::url::{domain_of, validate_url};
use crate::{ArachneError, ScrapeError};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Scrape orchestrator
///
/// Cloning is cheap; clones share limiter slots, breakers and metrics.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    config: CrawlerConfig,
    strategy: Arc<dyn FetchStrategy>,
    limiter: RateLimiter,
    breakers: BreakerRegistry,
    retry: RetryPolicy,
    metrics: Metrics,
}

impl Orchestrator {
    /// Creates an orchestrator that fetches over plain HTTP
    ///
    /// # Arguments
    ///
    /// * `config` - The full configuration; the `fetch` section configures the HTTP client
    ///
    /// # Returns
    ///
    /// * `Ok(Orchestrator)` - Ready to scrape
    /// * `Err(ArachneError)` - The HTTP client could not be built
    pub fn new(config: &Config) -> Result<Self, ArachneError> {
        let strategy = HttpStrategy::new(&config.fetch)?;
        Ok(Self::with_strategy(config.crawler.clone(), Arc::new(strategy)))
    }

    /// Creates an orchestrator around a custom fetch strategy
    pub fn with_strategy(config: CrawlerConfig, strategy: Arc<dyn FetchStrategy>) -> Self {
        let limiter = RateLimiter::new(config.max_concurrent, &config.domain_rate_limit);
        let breakers = BreakerRegistry::new(
            config.circuit_breaker_threshold,
            config.circuit_breaker_timeout(),
        );
        let retry = RetryPolicy::from_config(&config);

        Self {
            inner: Arc::new(Inner {
                config,
                strategy,
                limiter,
                breakers,
                retry,
                metrics: Metrics::new(),
            }),
        }
    }

    /// Scrapes every URL concurrently
    ///
    /// One result is returned per input URL, in completion order. The whole
    /// batch shares a single deadline of `total-timeout-ms`.
    pub async fn scrape_urls(&self, urls: Vec<String>) -> Vec<ScrapedResult> {
        let total = urls.len();
        let ctx = context_for_run(&self.inner.config);
        tracing::info!(
            "Scraping {} URLs (max {} concurrent)",
            total,
            self.inner.limiter.global_capacity()
        );

        let (tx, mut rx) = mpsc::channel(total.max(1));
        for url in urls {
            let tx = tx.clone();
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                let result = inner.scrape_one(url, &ctx).await;
                // The receiver outlives every sender.
                let _ = tx.send(result).await;
            });
        }
        drop(tx);

        let mut results = Vec::with_capacity(total);
        while let Some(result) = rx.recv().await {
            results.push(result);
        }

        self.inner.metrics.finish();
        results
    }

    /// Follows next-page links from `seed`, one page at a time
    ///
    /// Stops after `max-pages` distinct URLs or when no unvisited link is left.
    /// A URL seen twice is skipped without using up the page budget. Results are
    /// returned in visit order.
    pub async fn scrape_site(&self, seed: &str) -> Vec<ScrapedResult> {
        let max_pages = self.inner.config.max_pages;
        let ctx = context_for_run(&self.inner.config);
        tracing::info!("Crawling from {} (max {} pages)", seed, max_pages);

        let mut frontier = VecDeque::from([seed.to_string()]);
        let mut visited: HashSet<String> = HashSet::new();
        let mut results = Vec::new();

        while visited.len() < max_pages {
            let Some(url) = frontier.pop_front() else {
                break;
            };
            if !visited.insert(url.clone()) {
                tracing::debug!(url = %url, "Skipping already visited page");
                continue;
            }

            let result = self.inner.scrape_one(url, &ctx).await;
            if let Some(next) = &result.next_url {
                if visited.len() < max_pages {
                    frontier.push_back(next.clone());
                }
            }
            tracing::debug!(
                "Progress: {} / {} pages, {} queued",
                visited.len(),
                max_pages,
                frontier.len()
            );
            results.push(result);
        }

        self.inner.metrics.finish();
        tracing::info!("Crawl finished after {} pages", results.len());
        results
    }

    /// Copies the current metrics
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Breaker state for every domain touched so far
    pub fn circuit_breaker_stats(&self) -> BTreeMap<String, CircuitStats> {
        self.inner.breakers.stats()
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.inner.config
    }
}

impl Inner {
    /// Runs the full pipeline for one URL; never fails, errors land in the result
    async fn scrape_one(&self, url: String, ctx: &FetchContext) -> ScrapedResult {
        let domain = domain_of(&url);
        let permit = self.limiter.acquire(&domain).await;
        let mut result = ScrapedResult::new(url.as_str());

        let target = match validate_url(&url) {
            Ok(target) => target,
            Err(err) => {
                tracing::warn!(url = %url, "{}", err);
                result.record_error(&err);
                permit.release();
                return result;
            }
        };

        let breaker = self.breakers.get_or_create(&domain);
        self.metrics.record_request();

        let breaker = &breaker;
        let strategy = &self.strategy;
        let target = &target;
        let outcome = self
            .retry
            .run(
                // Each attempt is timed on its own
                move |_attempt| async move {
                    let started = Instant::now();
                    let fetched = breaker.execute(|| strategy.fetch(target, ctx)).await?;
                    Ok((fetched, started.elapsed()))
                },
                |attempt, err: &ScrapeError| {
                    self.metrics.record_retry();
                    tracing::warn!(
                        url = %url,
                        attempt,
                        backoff_ms = self.retry.backoff(attempt).as_millis() as u64,
                        "Retrying after error: {}",
                        err
                    );
                },
            )
            .await;

        match outcome {
            Ok((fetched, elapsed)) => {
                let status = fetched.status;
                let bytes = fetched.body.len();
                result.record_fetch(fetched, self.config.max_content_bytes);
                self.metrics
                    .record_success(&domain, status, bytes as u64, elapsed);
                tracing::info!(
                    url = %url,
                    status,
                    bytes,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Scraped page"
                );
            }
            Err(err) => {
                self.metrics
                    .record_failure(&domain, err.status_code().unwrap_or(0));
                if err.is_circuit_open() {
                    tracing::warn!(url = %url, domain = %domain, "Skipped: {}", err);
                } else {
                    tracing::error!(url = %url, domain = %domain, "Failed: {}", err);
                }
                result.record_error(&err);
            }
        }

        permit.release();
        result
    }
}
