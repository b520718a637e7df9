//! Error types for lookahead-core.
//!
//! [`QueryError`] is local to one term and never stops the pipeline.
//! [`SourceError`] is fatal and surfaced to the consumer exactly once.

use thiserror::Error;

/// A query backend failed for one term.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The backend reported a failure of its own.
    #[error("backend error: {0}")]
    Backend(String),
    /// The backend could not be reached.
    #[error("transport error: {0}")]
    Transport(String),
    /// The backend answered with a non-success status code.
    #[error("backend returned status {0}")]
    Status(u16),
    /// The backend answered with a body that could not be decoded.
    #[error("could not decode response: {0}")]
    Decode(String),
    /// The query was superseded by a newer term before it resolved.
    #[error("query cancelled")]
    Cancelled,
}

/// The upstream term source failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("input source failed: {0}")]
    Input(String),
    #[error("input source i/o error: {0}")]
    Io(String),
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::Io(err.to_string())
    }
}

/// Loading or parsing `config.toml` failed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Parse(#[from] config::ConfigError),
    #[error("config file i/o error: {0}")]
    Io(#[from] std::io::Error),
}
