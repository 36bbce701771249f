//! Admission control for fetches
//!
//! Two layers of counting semaphores gate every fetch:
//! - a global semaphore sized to `max-concurrent`
//! - one semaphore per domain listed in `domain-rate-limit`
//!
//! Domain semaphores are created once from configuration and never added or
//! removed afterwards, so lookups need no lock.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Slots held by one in-flight fetch
///
/// Dropping the permit returns both slots, global first and then the domain slot.
#[derive(Debug)]
pub struct AdmissionPermit {
    // Field order is drop order.
    _global: OwnedSemaphorePermit,
    domain: Option<OwnedSemaphorePermit>,
}

impl AdmissionPermit {
    /// Returns both slots
    pub fn release(self) {
        drop(self);
    }

    /// Whether a domain-scoped slot is held in addition to the global one
    pub fn has_domain_slot(&self) -> bool {
        self.domain.is_some()
    }
}

/// Global and per-domain concurrency gates
#[derive(Debug)]
pub struct RateLimiter {
    global: Arc<Semaphore>,
    global_capacity: usize,
    domains: HashMap<String, (Arc<Semaphore>, usize)>,
}

impl RateLimiter {
    /// Creates a limiter with `max_concurrent` global slots and the given domain caps
    pub fn new(max_concurrent: usize, domain_limits: &HashMap<String, usize>) -> Self {
        let global_capacity = max_concurrent.max(1);
        let domains = domain_limits
            .iter()
            .map(|(domain, limit)| {
                let limit = (*limit).max(1);
                (
                    domain.to_lowercase(),
                    (Arc::new(Semaphore::new(limit)), limit),
                )
            })
            .collect();

        Self {
            global: Arc::new(Semaphore::new(global_capacity)),
            global_capacity,
            domains,
        }
    }

    /// Waits for a global slot, then for the domain slot if the domain is capped
    ///
    /// Waiters are not served in any guaranteed order.
    pub async fn acquire(&self, domain: &str) -> AdmissionPermit {
        let global = acquire_slot(&self.global).await;

        let domain = match self.domains.get(domain) {
            Some((semaphore, _)) => Some(acquire_slot(semaphore).await),
            None => None,
        };

        AdmissionPermit {
            _global: global,
            domain,
        }
    }

    /// Total number of global slots
    pub fn global_capacity(&self) -> usize {
        self.global_capacity
    }

    /// Global slots not currently held
    pub fn available_global(&self) -> usize {
        self.global.available_permits()
    }

    /// Configured cap for a domain, if any
    pub fn domain_capacity(&self, domain: &str) -> Option<usize> {
        self.domains.get(domain).map(|(_, limit)| *limit)
    }

    /// Domain slots not currently held, if the domain is capped
    pub fn available_for_domain(&self, domain: &str) -> Option<usize> {
        self.domains
            .get(domain)
            .map(|(semaphore, _)| semaphore.available_permits())
    }
}

async fn acquire_slot(semaphore: &Arc<Semaphore>) -> OwnedSemaphorePermit {
    Arc::clone(semaphore)
        .acquire_owned()
        .await
        .expect("rate limiter semaphores are never closed")
}
