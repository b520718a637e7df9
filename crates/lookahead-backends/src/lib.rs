//! lookahead-backends: query backends for the lookahead pipeline.
//!
//! Each backend implements [`lookahead_core::QueryBackend`]: it takes one
//! term and eventually yields an ordered list of matches or a
//! [`lookahead_core::QueryError`].

pub mod catalog;
pub mod http;
pub mod latency;

pub use catalog::CatalogBackend;
pub use http::HttpBackend;
pub use latency::LatencyBackend;
