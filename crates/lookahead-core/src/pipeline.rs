//! Pipeline driver: composes debounce, dedupe and dispatch over a
//! [`TermStream`] and exposes the outcome as [`SearchEvents`].
//!
//! A single spawned task owns every stage. Its `select!` loop reacts to four
//! things: a new term, the debounce deadline, a query completion, and the
//! consumer going away. Stage transitions therefore run one at a time, in
//! arrival order, and the dispatcher's generation slot never needs a lock.
//!
//! # Termination
//!
//! - Source completes: the pending debounced term is discarded, in-flight
//!   queries are allowed to finish, then the event channel closes.
//! - Source fails: the pending term is discarded, in-flight queries are
//!   cancelled, [`SearchEvent::SourceFailed`] is sent once, then the channel
//!   closes.
//! - Consumer drops [`SearchEvents`]: everything in flight is cancelled.

use crate::debounce::{Debouncer, DEFAULT_DEBOUNCE};
use crate::dedupe::Dedupe;
use crate::dispatch::{Dispatcher, QueryBackend};
use crate::source::{SourceSignal, TermStream};
use crate::types::{SearchEvent, Strategy, Term};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Quiet period before a term is forwarded.
    pub debounce: Duration,
    /// How per-term queries are flattened.
    pub strategy: Strategy,
    /// Suppress a debounced term equal to the previous one.
    pub dedupe: bool,
    /// Strip surrounding whitespace from every incoming term.
    pub trim: bool,
    /// Debounced terms shorter than this many characters are not dispatched.
    pub min_len: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            strategy: Strategy::Switch,
            dedupe: true,
            trim: false,
            min_len: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Entry point for configuring and spawning a pipeline.
pub struct Pipeline;

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    options: PipelineOptions,
}

impl PipelineBuilder {
    pub fn options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn debounce(mut self, period: Duration) -> Self {
        self.options.debounce = period;
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.options.strategy = strategy;
        self
    }

    pub fn dedupe(mut self, enabled: bool) -> Self {
        self.options.dedupe = enabled;
        self
    }

    pub fn trim(mut self, enabled: bool) -> Self {
        self.options.trim = enabled;
        self
    }

    pub fn min_len(mut self, min_len: usize) -> Self {
        self.options.min_len = min_len;
        self
    }

    /// Spawn the driver task on the current tokio runtime.
    pub fn spawn(self, terms: TermStream, backend: impl QueryBackend) -> SearchEvents {
        self.spawn_shared(terms, Arc::new(backend))
    }

    /// Like [`spawn`](Self::spawn) for a backend that is already shared.
    pub fn spawn_shared(self, terms: TermStream, backend: Arc<dyn QueryBackend>) -> SearchEvents {
        let (tx, rx) = mpsc::unbounded_channel();
        let stages = Stages::new(self.options, backend);
        tokio::spawn(drive(terms, stages, tx));
        SearchEvents { rx }
    }
}

/// Debounce, dedupe and switch-dispatch `terms` against `backend`.
///
/// `debounce` defaults to 400ms when `None`.
pub fn search(
    terms: TermStream,
    backend: impl QueryBackend,
    debounce: Option<Duration>,
) -> SearchEvents {
    Pipeline::builder()
        .debounce(debounce.unwrap_or(DEFAULT_DEBOUNCE))
        .spawn(terms, backend)
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Receiving end of a running pipeline. Dropping it stops the pipeline.
#[derive(Debug)]
pub struct SearchEvents {
    rx: mpsc::UnboundedReceiver<SearchEvent>,
}

impl SearchEvents {
    /// Next event, or `None` once the pipeline has finished.
    pub async fn recv(&mut self) -> Option<SearchEvent> {
        self.rx.recv().await
    }

    /// Non-blocking poll for UI loops.
    pub fn try_recv(&mut self) -> Result<SearchEvent, mpsc::error::TryRecvError> {
        self.rx.try_recv()
    }

    /// Wait for the pipeline to finish and return everything it delivered.
    pub async fn collect(mut self) -> Vec<SearchEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.recv().await {
            events.push(event);
        }
        events
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

struct Stages {
    options: PipelineOptions,
    debouncer: Debouncer<Term>,
    dedupe: Option<Dedupe<Term>>,
    dispatcher: Dispatcher,
}

impl Stages {
    fn new(options: PipelineOptions, backend: Arc<dyn QueryBackend>) -> Self {
        Self {
            debouncer: Debouncer::new(options.debounce),
            dedupe: options.dedupe.then(Dedupe::new),
            dispatcher: Dispatcher::new(backend, options.strategy),
            options,
        }
    }

    /// A raw term arrived from the source.
    fn accept(&mut self, term: Term) {
        let term = if self.options.trim {
            term.trim().to_owned()
        } else {
            term
        };
        if let Some(dropped) = self.debouncer.push(term, Instant::now()) {
            tracing::trace!(term = %dropped, "debounce: superseded before quiet period");
        }
    }

    /// The debounce deadline passed.
    fn fire(&mut self) {
        let Some(term) = self.debouncer.take_due(Instant::now()) else {
            return;
        };

        if term.chars().count() < self.options.min_len {
            tracing::debug!(%term, min_len = self.options.min_len, "pipeline: term below minimum length");
            return;
        }

        let term = match self.dedupe.as_mut() {
            Some(dedupe) => match dedupe.admit(term) {
                Some(term) => term,
                None => {
                    tracing::debug!("dedupe: repeated term suppressed");
                    return;
                }
            },
            None => term,
        };

        self.dispatcher.dispatch(term);
    }
}

async fn drive(
    mut terms: TermStream,
    mut stages: Stages,
    tx: mpsc::UnboundedSender<SearchEvent>,
) {
    tracing::info!(
        debounce = ?stages.options.debounce,
        strategy = %stages.options.strategy,
        dedupe = stages.options.dedupe,
        "pipeline started"
    );

    let mut source_open = true;

    loop {
        let deadline = stages.debouncer.deadline();

        tokio::select! {
            biased;

            _ = tx.closed() => {
                tracing::debug!("pipeline: consumer dropped");
                break;
            }

            signal = terms.recv(), if source_open => match signal {
                Some(SourceSignal::Term(term)) => stages.accept(term),
                Some(SourceSignal::Failed(err)) => {
                    if let Some(term) = stages.debouncer.discard() {
                        tracing::debug!(%term, "debounce: pending term discarded on source failure");
                    }
                    stages.dispatcher.shutdown();
                    tracing::warn!(error = %err, "pipeline: source failed");
                    let _ = tx.send(SearchEvent::SourceFailed(err));
                    break;
                }
                None => {
                    source_open = false;
                    if let Some(term) = stages.debouncer.discard() {
                        tracing::debug!(%term, "debounce: pending term discarded on completion");
                    }
                }
            },

            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                stages.fire();
            }

            Some(done) = stages.dispatcher.next_completion(), if !stages.dispatcher.is_idle() => {
                if let Some(event) = stages.dispatcher.settle(done) {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
            }
        }

        if !source_open && stages.dispatcher.is_idle() {
            break;
        }
    }

    stages.dispatcher.shutdown();
    tracing::info!(generation = stages.dispatcher.generation(), "pipeline stopped");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
