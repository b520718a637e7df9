//! Event source: turns input-change notifications into a push-based term
//! stream.
//!
//! [`TermSubject`] is the sending half: the input box calls
//! [`TermSubject::next`] with its full text on every change. [`TermStream`] is
//! the receiving half handed to the pipeline. Arrival order is preserved and
//! nothing is filtered or dropped here.

use crate::error::SourceError;
use crate::types::Term;
use tokio::sync::mpsc;

/// What the source can tell the pipeline besides completing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SourceSignal {
    Term(Term),
    Failed(SourceError),
}

/// Sending half of a term stream.
///
/// Cloning yields another handle onto the same stream. The stream completes
/// once every handle has been dropped or [`complete`](Self::complete)d.
#[derive(Debug, Clone)]
pub struct TermSubject {
    tx: mpsc::UnboundedSender<SourceSignal>,
}

/// Receiving half of a term stream. Feed it to [`Pipeline`](crate::Pipeline).
#[derive(Debug)]
pub struct TermStream {
    rx: mpsc::UnboundedReceiver<SourceSignal>,
}

/// Create a connected subject / stream pair.
pub fn term_channel() -> (TermSubject, TermStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (TermSubject { tx }, TermStream { rx })
}

impl TermSubject {
    /// Emit a term. Returns `false` if the pipeline has already shut down.
    pub fn next(&self, term: impl Into<Term>) -> bool {
        self.tx.send(SourceSignal::Term(term.into())).is_ok()
    }

    /// Fail the stream. The pipeline reports `err` once and stops.
    pub fn fail(self, err: SourceError) -> bool {
        self.tx.send(SourceSignal::Failed(err)).is_ok()
    }

    /// Release this handle. The stream completes when no handles remain.
    pub fn complete(self) {}

    /// Whether the receiving side is gone.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl TermStream {
    pub(crate) async fn recv(&mut self) -> Option<SourceSignal> {
        self.rx.recv().await
    }

    /// A stream that yields `terms` in order and then completes.
    pub fn from_terms<I, T>(terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        let (subject, stream) = term_channel();
        for term in terms {
            subject.next(term);
        }
        stream
    }
}
