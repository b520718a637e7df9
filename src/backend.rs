//! Backend selection from command-line flags.

use anyhow::Context;
use lookahead_backends::{catalog::demo_catalog, CatalogBackend, HttpBackend, LatencyBackend};
use lookahead_core::QueryBackend;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Which backend to query, as described by the CLI.
#[derive(Debug, Clone, Default)]
pub struct BackendSpec {
    /// Newline-separated catalog file. The built-in demo catalog otherwise.
    pub catalog: Option<PathBuf>,
    /// Remote suggestion endpoint. Takes precedence over `catalog`.
    pub http: Option<String>,
    /// Simulated base latency added to every query.
    pub latency: Duration,
    /// Extra per-term latency spread on top of `latency`.
    pub jitter: Duration,
    /// Maximum matches per catalog query.
    pub limit: usize,
}

impl BackendSpec {
    pub fn build(&self) -> anyhow::Result<Arc<dyn QueryBackend>> {
        if let Some(endpoint) = &self.http {
            let backend = HttpBackend::new(endpoint)
                .with_context(|| format!("invalid --http endpoint {endpoint:?}"))?;
            tracing::info!(%endpoint, "backend: http");
            return Ok(self.with_latency(backend));
        }

        let catalog = match &self.catalog {
            Some(path) => CatalogBackend::from_path(path)
                .with_context(|| format!("reading catalog {}", path.display()))?,
            None => demo_catalog(),
        };
        tracing::info!(entries = catalog.len(), limit = self.limit, "backend: catalog");
        Ok(self.with_latency(catalog.with_limit(self.limit)))
    }

    fn with_latency<B: QueryBackend>(&self, backend: B) -> Arc<dyn QueryBackend> {
        if self.latency.is_zero() && self.jitter.is_zero() {
            Arc::new(backend)
        } else {
            Arc::new(LatencyBackend::new(backend, self.latency).with_jitter(self.jitter))
        }
    }
}
