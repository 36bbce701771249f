//! Domain -> circuit breaker registry
//!
//! Breakers are created on first reference to a domain and kept for the
//! lifetime of the registry. Lookups take the read lock; creation takes the
//! write lock just long enough to insert. No lock is held while a breaker runs.

use crate::crawler::circuit_breaker::{CircuitBreaker, CircuitStats};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Lazily-populated set of per-domain circuit breakers
#[derive(Debug)]
pub struct BreakerRegistry {
    threshold: u32,
    open_timeout: Duration,
    breakers: RwLock<HashMap<String, Arc<CircuitBreaker>>>,
}

impl BreakerRegistry {
    pub fn new(threshold: u32, open_timeout: Duration) -> Self {
        Self {
            threshold,
            open_timeout,
            breakers: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the breaker for `domain`, creating it if this is the first use
    ///
    /// Concurrent first-time callers for the same domain receive the same instance.
    pub fn get_or_create(&self, domain: &str) -> Arc<CircuitBreaker> {
        {
            let breakers = self
                .breakers
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(breaker) = breakers.get(domain) {
                return Arc::clone(breaker);
            }
        }

        let mut breakers = self
            .breakers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let breaker = breakers.entry(domain.to_string()).or_insert_with(|| {
            tracing::debug!(domain, "Creating circuit breaker");
            Arc::new(CircuitBreaker::new(
                domain,
                self.threshold,
                self.open_timeout,
            ))
        });
        Arc::clone(breaker)
    }

    /// Returns the breaker for `domain` if one has been created
    pub fn get(&self, domain: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(domain)
            .cloned()
    }

    /// Snapshot of every breaker's stats, keyed by domain
    pub fn stats(&self) -> BTreeMap<String, CircuitStats> {
        self.breakers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(domain, breaker)| (domain.clone(), breaker.stats()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.breakers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
