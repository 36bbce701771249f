//! Per-domain circuit breaker
//!
//! # States
//!
//! | State | Behaviour |
//! |-------|-----------|
//! | Closed | calls pass through, consecutive failures are counted |
//! | Open | calls are rejected without running, until the open timeout elapses |
//! | HalfOpen | exactly one trial call runs; success closes, failure reopens |
//!
//! The internal lock is held only while deciding admission and while recording
//! the outcome, never across the guarded call itself.

use crate::ScrapeError;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// Circuit state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half-open",
        };
        f.write_str(name)
    }
}

/// Point-in-time view of a breaker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitStats {
    pub domain: String,
    pub state: CircuitState,
    pub failures: u32,
    pub threshold: u32,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failures: u32,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
}

/// Failure-isolation state machine guarding calls to one domain
#[derive(Debug)]
pub struct CircuitBreaker {
    domain: String,
    threshold: u32,
    open_timeout: Duration,
    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    /// Creates a closed breaker that opens after `threshold` consecutive failures
    pub fn new(domain: impl Into<String>, threshold: u32, open_timeout: Duration) -> Self {
        Self {
            domain: domain.into(),
            threshold: threshold.max(1),
            open_timeout,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failures: 0,
                opened_at: None,
                trial_in_flight: false,
            }),
        }
    }

    /// Runs `operation` if the circuit admits it
    ///
    /// Returns [`ScrapeError::CircuitOpen`] without running `operation` while the
    /// circuit is open (or a half-open trial is already running). Otherwise the
    /// operation's own result is returned and recorded.
    pub async fn execute<T, F, Fut>(&self, operation: F) -> Result<T, ScrapeError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ScrapeError>>,
    {
        let trial = self.admit()?;
        let mut call = CallGuard {
            breaker: self,
            trial,
            settled: false,
        };

        let result = operation().await;
        call.settle(result.is_ok());
        result
    }

    /// Returns the current state, failure count and domain
    pub fn stats(&self) -> CircuitStats {
        let inner = self.lock();
        CircuitStats {
            domain: self.domain.clone(),
            state: inner.state,
            failures: inner.failures,
            threshold: self.threshold,
        }
    }

    /// Current state
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Decides whether a call may run; `Ok(true)` marks the half-open trial
    fn admit(&self) -> Result<bool, ScrapeError> {
        let mut inner = self.lock();

        match inner.state {
            CircuitState::Closed => Ok(false),
            CircuitState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|at| at.elapsed() >= self.open_timeout)
                    .unwrap_or(true);

                if elapsed {
                    tracing::info!(domain = %self.domain, "Circuit half-open, allowing trial call");
                    inner.state = CircuitState::HalfOpen;
                    inner.trial_in_flight = true;
                    Ok(true)
                } else {
                    Err(self.rejection())
                }
            }
            CircuitState::HalfOpen => {
                if inner.trial_in_flight {
                    Err(self.rejection())
                } else {
                    inner.trial_in_flight = true;
                    Ok(true)
                }
            }
        }
    }

    fn record(&self, trial: bool, success: bool) {
        let mut inner = self.lock();
        if trial {
            inner.trial_in_flight = false;
        }

        if success {
            if inner.state != CircuitState::Closed {
                tracing::info!(domain = %self.domain, "Circuit closed");
            }
            inner.state = CircuitState::Closed;
            inner.failures = 0;
            inner.opened_at = None;
            return;
        }

        inner.failures = inner.failures.saturating_add(1);

        let reopen = inner.state == CircuitState::HalfOpen;
        let trip = inner.state == CircuitState::Closed && inner.failures >= self.threshold;
        if reopen || trip {
            tracing::warn!(
                domain = %self.domain,
                failures = inner.failures,
                "Circuit opened for {:?}",
                self.open_timeout
            );
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
        }
    }

    fn rejection(&self) -> ScrapeError {
        ScrapeError::CircuitOpen {
            domain: self.domain.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        // State stays consistent even if a holder panicked; every write is a
        // plain field assignment.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Records a failure if the guarded future is dropped before completing
struct CallGuard<'a> {
    breaker: &'a CircuitBreaker,
    trial: bool,
    settled: bool,
}

impl CallGuard<'_> {
    fn settle(&mut self, success: bool) {
        self.settled = true;
        self.breaker.record(self.trial, success);
    }
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.record(self.trial, false);
        }
    }
}
