//! lookahead-core: the instant-search pipeline.
//!
//! This crate exposes the four pipeline stages as public modules, plus the
//! shared types and errors used across the workspace.
//!
//! # Architecture
//!
//! ```text
//! TermSubject ──► Debounce ──► Dedupe ──► Dispatch ──► SearchEvents
//!                                            │
//!                                            └──► QueryBackend (spawned tasks)
//! ```
//!
//! A single driver task owns the three stateful stages; queries run on
//! spawned tasks and report back to the driver, which decides whether their
//! outcome is still current before forwarding it to the consumer.

pub mod config;
pub mod debounce;
pub mod dedupe;
pub mod dispatch;
pub mod error;
pub mod pipeline;
pub mod source;
pub mod types;

pub use dispatch::QueryBackend;
pub use error::{ConfigError, QueryError, SourceError};
pub use pipeline::{search, Pipeline, PipelineBuilder, PipelineOptions, SearchEvents};
pub use source::{term_channel, TermStream, TermSubject};
pub use types::{QueryFailure, ResultSet, SearchEvent, Strategy, Term};
