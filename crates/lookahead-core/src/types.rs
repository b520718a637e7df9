//! Core types for lookahead-core.
//!
//! This module defines the data shared across the pipeline stages: the
//! [`Term`] the user typed, the [`ResultSet`] a query produced for it, and the
//! [`SearchEvent`] envelope the consumer receives.

use crate::error::{QueryError, SourceError};
use serde::Deserialize;
use std::time::Duration;

/// The current user query, exactly as the input box reported it.
pub type Term = String;

/// Ordered matches for exactly one [`Term`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    /// Term the query was dispatched for.
    pub term: Term,
    /// Dispatch generation that produced these results. Generations start at
    /// 1 and increase by one per dispatch.
    pub generation: u64,
    /// Matches in backend order.
    pub items: Vec<String>,
    /// Wall time between dispatch and resolution.
    pub elapsed: Duration,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A query that failed for one term. Scoped to that term only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFailure {
    pub term: Term,
    pub generation: u64,
    pub error: QueryError,
}

/// Everything the pipeline can deliver to its consumer.
///
/// Completion is not an event: the [`SearchEvents`](crate::SearchEvents)
/// channel closes instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// A query resolved and is still current.
    Results(ResultSet),
    /// A query failed. The pipeline keeps running.
    QueryFailed(QueryFailure),
    /// The term source failed. Always the last event.
    SourceFailed(SourceError),
}

impl SearchEvent {
    /// Term this event belongs to, if any.
    pub fn term(&self) -> Option<&str> {
        match self {
            SearchEvent::Results(set) => Some(&set.term),
            SearchEvent::QueryFailed(failure) => Some(&failure.term),
            SearchEvent::SourceFailed(_) => None,
        }
    }

    /// Dispatch generation this event belongs to, if any.
    pub fn generation(&self) -> Option<u64> {
        match self {
            SearchEvent::Results(set) => Some(set.generation),
            SearchEvent::QueryFailed(failure) => Some(failure.generation),
            SearchEvent::SourceFailed(_) => None,
        }
    }
}

/// How the dispatch stage flattens one query per term into a single result
/// stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Cancel the in-flight query whenever a newer term is dispatched. Only
    /// the latest term's outcome can reach the consumer.
    #[default]
    Switch,
    /// Keep every query running and deliver all outcomes in the order they
    /// resolve.
    Merge,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Switch => write!(f, "switch"),
            Strategy::Merge => write!(f, "merge"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "switch" | "switchmap" | "latest" => Ok(Strategy::Switch),
            "merge" | "mergemap" | "flatmap" | "all" => Ok(Strategy::Merge),
            other => Err(format!("unknown strategy: {other} (expected switch or merge)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
