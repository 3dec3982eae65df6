//! Coding-platform statistics aggregation.
//!
//! Fetches each configured platform's statistics endpoint concurrently,
//! extracts canonical fields through per-platform path expressions, and merges
//! them over the curated fallback record. Failures are recorded per platform
//! and never abort a sweep.

pub mod client;
pub mod engine;
pub mod error;
pub mod path;

pub use client::StatsClient;
pub use engine::{resolve_platform, Aggregator};
pub use error::StatsError;
pub use path::{extract, PathExpr, Step};
