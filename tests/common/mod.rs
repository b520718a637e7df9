//! Shared test utilities for lookahead integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Everything except the fake HTTP server is deterministic
//! under `#[tokio::test(start_paused = true)]`.

pub mod assertions;
pub mod backends;
pub mod builders;
pub mod fake_search_api;

pub use assertions::*;
pub use backends::*;
pub use builders::*;
pub use fake_search_api::FakeSearchApi;
