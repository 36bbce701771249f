//! Request metrics
//!
//! This module collects counters while scraping:
//! - requests, successes, failures and retries
//! - bytes fetched and response times
//! - per-domain and per-status breakdowns
//!
//! All recording methods take `&self` and may be called from concurrent tasks.

mod report;

pub use report::print_metrics;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Per-domain aggregates
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DomainMetrics {
    pub requests: u64,
    pub successes: u64,
    pub failures: u64,
    pub bytes: u64,
    pub avg_response_ms: f64,
    #[serde(skip)]
    total_response: Duration,
}

/// Point-in-time copy of the collected metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub retries: u64,
    pub total_bytes: u64,
    pub avg_response_ms: f64,
    pub success_rate: f64,
    pub requests_per_second: f64,
    pub elapsed_seconds: f64,
    pub status_codes: BTreeMap<u16, u64>,
    pub domains: BTreeMap<String, DomainMetrics>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
struct Counters {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    retries: u64,
    total_bytes: u64,
    total_response: Duration,
    status_codes: BTreeMap<u16, u64>,
    domains: BTreeMap<String, DomainMetrics>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

/// Thread-safe metrics collector
#[derive(Debug)]
pub struct Metrics {
    counters: Mutex<Counters>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(Counters {
                total_requests: 0,
                successful_requests: 0,
                failed_requests: 0,
                retries: 0,
                total_bytes: 0,
                total_response: Duration::ZERO,
                status_codes: BTreeMap::new(),
                domains: BTreeMap::new(),
                started_at: Utc::now(),
                finished_at: None,
            }),
        }
    }

    /// Counts one submitted URL
    pub fn record_request(&self) {
        self.lock().total_requests += 1;
    }

    /// Records a successful fetch
    pub fn record_success(&self, domain: &str, status: u16, bytes: u64, duration: Duration) {
        let mut counters = self.lock();
        counters.successful_requests += 1;
        counters.total_bytes += bytes;
        counters.total_response += duration;
        *counters.status_codes.entry(status).or_insert(0) += 1;

        let entry = counters.domains.entry(domain.to_string()).or_default();
        entry.requests += 1;
        entry.successes += 1;
        entry.bytes += bytes;
        entry.total_response += duration;
        entry.avg_response_ms = average_ms(entry.total_response, entry.successes);
    }

    /// Records a URL whose final outcome was a failure (status 0 when none was received)
    pub fn record_failure(&self, domain: &str, status: u16) {
        let mut counters = self.lock();
        counters.failed_requests += 1;
        if status != 0 {
            *counters.status_codes.entry(status).or_insert(0) += 1;
        }

        let entry = counters.domains.entry(domain.to_string()).or_default();
        entry.requests += 1;
        entry.failures += 1;
    }

    /// Counts one retry
    pub fn record_retry(&self) {
        self.lock().retries += 1;
    }

    /// Stamps the end of a run
    pub fn finish(&self) {
        self.lock().finished_at = Some(Utc::now());
    }

    /// Copies the current counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        let counters = self.lock();

        let end = counters.finished_at.unwrap_or_else(Utc::now);
        let elapsed_seconds = (end - counters.started_at)
            .to_std()
            .unwrap_or_default()
            .as_secs_f64();

        let completed = counters.successful_requests + counters.failed_requests;
        let success_rate = if completed > 0 {
            (counters.successful_requests as f64 / completed as f64) * 100.0
        } else {
            0.0
        };
        let requests_per_second = if elapsed_seconds > 0.0 {
            counters.total_requests as f64 / elapsed_seconds
        } else {
            0.0
        };

        MetricsSnapshot {
            total_requests: counters.total_requests,
            successful_requests: counters.successful_requests,
            failed_requests: counters.failed_requests,
            retries: counters.retries,
            total_bytes: counters.total_bytes,
            avg_response_ms: average_ms(counters.total_response, counters.successful_requests),
            success_rate,
            requests_per_second,
            elapsed_seconds,
            status_codes: counters.status_codes.clone(),
            domains: counters.domains.clone(),
            started_at: counters.started_at,
            finished_at: counters.finished_at,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn average_ms(total: Duration, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total.as_secs_f64() * 1000.0 / count as f64
    }
}
