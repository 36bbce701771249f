//! Retry policy for single-URL fetches
//!
//! Backoff grows linearly: the wait after failed attempt `n` is `n * delay`.
//!
//! | Outcome | Action |
//! |---------|--------|
//! | success | stop, return the value |
//! | circuit rejection | stop immediately |
//! | retryable failure, attempts left | wait, try again |
//! | non-retryable failure | stop |
//! | retryable failure on the last attempt | stop |

use crate::config::CrawlerConfig;
use crate::ScrapeError;
use std::future::Future;
use std::time::Duration;

/// Attempt budget and backoff unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy; at least one attempt is always made
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.retry_attempts, config.retry_delay())
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Wait before the attempt that follows failed attempt `attempt`
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.delay.saturating_mul(attempt)
    }

    /// Runs `operation` until it succeeds or a terminal error occurs
    ///
    /// `operation` receives the 1-based attempt number. `on_retry` is called with
    /// the failed attempt number and its error right before each backoff sleep.
    pub async fn run<T, F, Fut, R>(
        &self,
        mut operation: F,
        mut on_retry: R,
    ) -> Result<T, ScrapeError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ScrapeError>>,
        R: FnMut(u32, &ScrapeError),
    {
        let mut attempt = 1;
        loop {
            let err = match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if err.is_circuit_open() || !err.is_retryable() || attempt >= self.attempts {
                return Err(err);
            }

            on_retry(attempt, &err);
            tokio::time::sleep(self.backoff(attempt)).await;
            attempt += 1;
        }
    }
}
