//! Catalog backend: case-insensitive search over an in-memory list of
//! entries.
//!
//! Ranking: entries that start with the term come first, then entries that
//! merely contain it. Within each group catalog order is kept.

use async_trait::async_trait;
use lookahead_core::{QueryBackend, QueryError};
use std::path::Path;

const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct CatalogBackend {
    /// (original, lowercased) pairs in catalog order.
    entries: Vec<(String, String)>,
    limit: usize,
}

impl CatalogBackend {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|e| {
                let entry: String = e.into();
                let folded = entry.to_lowercase();
                (entry, folded)
            })
            .collect();
        Self {
            entries,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Parse one entry per line. Blank lines and `#` comments are skipped.
    pub fn parse(src: &str) -> Self {
        Self::new(
            src.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// Load a catalog file (see [`parse`](Self::parse)).
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let src = std::fs::read_to_string(path)?;
        let catalog = Self::parse(&src);
        tracing::debug!(path = %path.display(), entries = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Cap the number of matches per query.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Synchronous lookup used by the async [`QueryBackend`] impl.
    pub fn lookup(&self, term: &str) -> Vec<String> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut prefix = Vec::new();
        let mut infix = Vec::new();
        for (entry, folded) in &self.entries {
            if folded.starts_with(&needle) {
                prefix.push(entry);
            } else if folded.contains(&needle) {
                infix.push(entry);
            }
            if prefix.len() >= self.limit {
                break;
            }
        }

        prefix
            .into_iter()
            .chain(infix)
            .take(self.limit)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl QueryBackend for CatalogBackend {
    async fn search(&self, term: &str) -> Result<Vec<String>, QueryError> {
        Ok(self.lookup(term))
    }
}

/// A small built-in catalog used when no catalog file is given.
pub fn demo_catalog() -> CatalogBackend {
    CatalogBackend::parse(include_str!("demo_catalog.txt"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
