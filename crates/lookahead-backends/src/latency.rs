//! Latency backend: delays another backend to simulate a slow network.
//!
//! The delay for a term is `base + hash(term) % jitter`. The hash is stable,
//! so the same term always takes the same time and out-of-order responses can
//! be reproduced on demand.

use async_trait::async_trait;
use lookahead_core::{QueryBackend, QueryError};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LatencyBackend<B> {
    inner: B,
    base: Duration,
    jitter: Duration,
}

impl<B: QueryBackend> LatencyBackend<B> {
    pub fn new(inner: B, base: Duration) -> Self {
        Self {
            inner,
            base,
            jitter: Duration::ZERO,
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// The delay applied to `term`.
    pub fn delay_for(&self, term: &str) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.base;
        }
        self.base + Duration::from_millis(stable_hash(term) % jitter_ms)
    }
}

#[async_trait]
impl<B: QueryBackend> QueryBackend for LatencyBackend<B> {
    async fn search(&self, term: &str) -> Result<Vec<String>, QueryError> {
        let delay = self.delay_for(term);
        tracing::trace!(%term, ?delay, "latency: delaying query");
        tokio::time::sleep(delay).await;
        self.inner.search(term).await
    }
}

/// djb2-style hash, stable across Rust versions and process restarts.
fn stable_hash(s: &str) -> u64 {
    s.bytes()
        .fold(5381u64, |acc, b| acc.wrapping_mul(33).wrapping_add(b as u64))
}
