//! Query dispatch stage: one backend query per surviving term, flattened
//! into a single outcome stream by a [`Strategy`].
//!
//! # Cancellation
//!
//! Every dispatch takes the next value of a [`GenerationClock`]. Under
//! [`Strategy::Switch`] the previous request's [`CancellationToken`] is fired
//! in the same call, and [`Dispatcher::settle`] only accepts a completion
//! whose captured generation is still the current one. Because the driver
//! owns the dispatcher exclusively, the bump and the cancellation can never be
//! observed separately: a result that resolves after a newer dispatch started
//! is discarded no matter when it arrives.

use crate::error::QueryError;
use crate::types::{QueryFailure, ResultSet, SearchEvent, Strategy, Term};
use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::task::{Id, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Backend seam
// ---------------------------------------------------------------------------

/// Anything that can turn a term into an ordered list of matches.
#[async_trait]
pub trait QueryBackend: Send + Sync + 'static {
    async fn search(&self, term: &str) -> Result<Vec<String>, QueryError>;
}

#[async_trait]
impl<F, Fut> QueryBackend for F
where
    F: Fn(Term) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<String>, QueryError>> + Send + 'static,
{
    async fn search(&self, term: &str) -> Result<Vec<String>, QueryError> {
        (self)(term.to_owned()).await
    }
}

// ---------------------------------------------------------------------------
// Generation clock
// ---------------------------------------------------------------------------

/// Monotonic dispatch counter. Generation 0 means "nothing dispatched yet".
#[derive(Debug, Default, Clone, Copy)]
pub struct GenerationClock {
    current: u64,
}

impl GenerationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance and return the new generation.
    pub fn advance(&mut self) -> u64 {
        self.current = self.current.wrapping_add(1);
        self.current
    }

    pub const fn current(&self) -> u64 {
        self.current
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// A query task that finished, successfully or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub generation: u64,
    pub term: Term,
    pub outcome: Result<Vec<String>, QueryError>,
    pub elapsed: std::time::Duration,
}

#[derive(Debug)]
struct Pending {
    generation: u64,
    term: Term,
    started: Instant,
}

pub struct Dispatcher {
    backend: Arc<dyn QueryBackend>,
    strategy: Strategy,
    clock: GenerationClock,
    /// Cancellation handle of the most recent dispatch.
    active: Option<CancellationToken>,
    tasks: JoinSet<Completion>,
    pending: HashMap<Id, Pending>,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn QueryBackend>, strategy: Strategy) -> Self {
        Self {
            backend,
            strategy,
            clock: GenerationClock::new(),
            active: None,
            tasks: JoinSet::new(),
            pending: HashMap::new(),
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Generation of the most recent dispatch (0 before the first).
    pub fn generation(&self) -> u64 {
        self.clock.current()
    }

    /// Number of query tasks still running, including cancelled ones that
    /// have not yet reported back.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Start a query for `term` and return its generation.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&mut self, term: Term) -> u64 {
        let generation = self.clock.advance();

        if self.strategy == Strategy::Switch {
            if let Some(previous) = self.active.take() {
                tracing::debug!(generation, "dispatch: cancelling superseded query");
                previous.cancel();
            }
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let backend = Arc::clone(&self.backend);
        let query = term.clone();
        let started = Instant::now();

        let handle = self.tasks.spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => Err(QueryError::Cancelled),
                result = backend.search(&query) => result,
            };
            Completion {
                generation,
                term: query,
                outcome,
                elapsed: started.elapsed(),
            }
        });

        self.pending.insert(
            handle.id(),
            Pending {
                generation,
                term: term.clone(),
                started,
            },
        );
        self.active = Some(cancel);

        tracing::debug!(%term, generation, strategy = %self.strategy, "dispatch: query started");
        generation
    }

    /// Wait for the next query task to finish. Returns `None` when idle.
    ///
    /// A task that panicked is reported as a [`QueryError::Backend`] failure
    /// for its term rather than being lost.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        loop {
            match self.tasks.join_next_with_id().await? {
                Ok((id, completion)) => {
                    self.pending.remove(&id);
                    return Some(completion);
                }
                Err(err) => {
                    let Some(pending) = self.pending.remove(&err.id()) else {
                        continue;
                    };
                    if err.is_cancelled() {
                        continue;
                    }
                    tracing::warn!(term = %pending.term, generation = pending.generation, "dispatch: query task panicked");
                    return Some(Completion {
                        generation: pending.generation,
                        term: pending.term,
                        outcome: Err(QueryError::Backend("query task panicked".to_string())),
                        elapsed: pending.started.elapsed(),
                    });
                }
            }
        }
    }

    /// Whether a completion of `generation` may still reach the consumer.
    pub fn accepts(&self, generation: u64) -> bool {
        match self.strategy {
            Strategy::Switch => generation == self.clock.current(),
            Strategy::Merge => true,
        }
    }

    /// Turn a completion into the event the consumer should see, or `None`
    /// if it has been superseded.
    pub fn settle(&mut self, completion: Completion) -> Option<SearchEvent> {
        let Completion {
            generation,
            term,
            outcome,
            elapsed,
        } = completion;

        if !self.accepts(generation) {
            tracing::debug!(%term, generation, current = self.clock.current(), "dispatch: stale outcome discarded");
            return None;
        }

        if self.strategy == Strategy::Switch {
            self.active = None;
        }

        match outcome {
            Ok(items) => {
                tracing::debug!(%term, generation, items = items.len(), ?elapsed, "dispatch: results delivered");
                Some(SearchEvent::Results(ResultSet {
                    term,
                    generation,
                    items,
                    elapsed,
                }))
            }
            Err(error) => {
                tracing::warn!(%term, generation, %error, "dispatch: query failed");
                Some(SearchEvent::QueryFailed(QueryFailure {
                    term,
                    generation,
                    error,
                }))
            }
        }
    }

    /// Cancel and abort everything in flight.
    pub fn shutdown(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel();
        }
        self.tasks.abort_all();
        self.pending.clear();
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("strategy", &self.strategy)
            .field("generation", &self.clock.current())
            .field("in_flight", &self.tasks.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
