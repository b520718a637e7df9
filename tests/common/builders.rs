//! Test builders: scripted typing sessions for the term source.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use lookahead_core::{term_channel, SourceError, TermStream};
use std::time::Duration;
use tokio::time::Instant;

enum Step {
    Type(Duration, String),
    Complete(Duration),
    Fail(Duration, SourceError),
}

/// A timeline of input-change events, played back on a background task.
///
/// # Example
///
/// ```rust
/// let terms = TypingSession::new()
///     .at(0, "A")
///     .at(50, "An")
///     .at(100, "Ang")
///     .complete_at(1_000)
///     .spawn();
/// ```
pub struct TypingSession {
    steps: Vec<Step>,
}

impl TypingSession {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// The input box holds `term` at `ms` after the session starts.
    pub fn at(mut self, ms: u64, term: &str) -> Self {
        self.steps
            .push(Step::Type(Duration::from_millis(ms), term.to_string()));
        self
    }

    pub fn complete_at(mut self, ms: u64) -> Self {
        self.steps.push(Step::Complete(Duration::from_millis(ms)));
        self
    }

    pub fn fail_at(mut self, ms: u64, message: &str) -> Self {
        self.steps.push(Step::Fail(
            Duration::from_millis(ms),
            SourceError::Input(message.to_string()),
        ));
        self
    }

    /// Start playback now. Without a `complete_at` or `fail_at` step the
    /// source stays open until the pipeline shuts down.
    pub fn spawn(self) -> TermStream {
        let (subject, terms) = term_channel();
        let start = Instant::now();

        tokio::spawn(async move {
            for step in self.steps {
                match step {
                    Step::Type(at, term) => {
                        tokio::time::sleep_until(start + at).await;
                        subject.next(term);
                    }
                    Step::Complete(at) => {
                        tokio::time::sleep_until(start + at).await;
                        return;
                    }
                    Step::Fail(at, err) => {
                        tokio::time::sleep_until(start + at).await;
                        subject.fail(err);
                        return;
                    }
                }
            }
            // No terminal step: hold the source open.
            std::future::pending::<()>().await;
        });

        terms
    }
}
