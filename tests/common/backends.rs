//! In-process query backends with scripted latency and failures.
//!
//! [`ScriptedBackend`] answers every term with `["<term>:1", "<term>:2"]`
//! after a configurable delay, unless the term is scripted to fail. Every
//! call is recorded in a [`CallLog`] together with its offset from the moment
//! the backend was built, so harnesses running under `start_paused` can
//! assert exact dispatch times.

use lookahead_core::{QueryBackend, QueryError, Term};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// One backend invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub term: Term,
    pub at: Duration,
}

/// Shared record of backend invocations.
#[derive(Debug, Clone)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
    start: Instant,
}

impl CallLog {
    fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            start: Instant::now(),
        }
    }

    fn record(&self, term: &str) {
        self.calls.lock().unwrap().push(Call {
            term: term.to_string(),
            at: self.start.elapsed(),
        });
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Terms in dispatch order.
    pub fn terms(&self) -> Vec<Term> {
        self.calls().into_iter().map(|c| c.term).collect()
    }
}

/// Items the scripted backend returns for `term`.
pub fn items_for(term: &str) -> Vec<String> {
    vec![format!("{term}:1"), format!("{term}:2")]
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    default_delay: Duration,
    delays: HashMap<Term, Duration>,
    failures: HashMap<Term, QueryError>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            default_delay: Duration::from_millis(10),
            ..Default::default()
        }
    }

    /// Latency for terms without their own delay.
    pub fn default_delay(mut self, ms: u64) -> Self {
        self.default_delay = Duration::from_millis(ms);
        self
    }

    pub fn delay(mut self, term: &str, ms: u64) -> Self {
        self.delays.insert(term.to_string(), Duration::from_millis(ms));
        self
    }

    pub fn fail(mut self, term: &str, error: QueryError) -> Self {
        self.failures.insert(term.to_string(), error);
        self
    }

    pub fn build(self) -> (Arc<dyn QueryBackend>, CallLog) {
        let log = CallLog::new();
        let recorder = log.clone();
        let script = Arc::new(self);

        let backend = move |term: Term| {
            recorder.record(&term);
            let script = Arc::clone(&script);
            async move {
                let delay = script
                    .delays
                    .get(&term)
                    .copied()
                    .unwrap_or(script.default_delay);
                tokio::time::sleep(delay).await;
                match script.failures.get(&term) {
                    Some(err) => Err(err.clone()),
                    None => Ok(items_for(&term)),
                }
            }
        };

        let backend: Arc<dyn QueryBackend> = Arc::new(backend);
        (backend, log)
    }
}
