//! lookahead: instant search with a debounced, de-duplicated, race-free
//! query pipeline.
//!
//! The pipeline itself lives in `lookahead-core`, the query backends in
//! `lookahead-backends` and the terminal front end in `lookahead-tui`. This
//! crate wires them to the command line and exposes the pieces the binary
//! and the integration harnesses share.
//!
//! # Architecture
//!
//! ```text
//! query bar / replay script
//!        │ input-change events
//!        ▼
//!   TermSubject ──► debounce ──► dedupe ──► dispatch ──► SearchEvents ──► UI / stdout
//!                                              │
//!                                              ▼
//!                                       QueryBackend (catalog | http, optional latency)
//! ```

pub mod backend;
pub mod replay;

pub use backend::BackendSpec;
pub use replay::{OutputFormat, ReplayRecord, ScriptLine};
