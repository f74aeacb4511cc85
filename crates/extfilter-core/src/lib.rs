//! extfilter-core — translation engine for the extfilter Prometheus exporter.
//!
//! Provides:
//! - `stats` — parser for the extfilter `key=value` stats file
//! - `metrics` — the metric catalogue and the key → sample mapper
//! - `collector` — per-scrape file reading, with a mockable filesystem
//! - `exposition` — `prometheus` collector adapter and text encoding

pub mod collector;
pub mod exposition;
pub mod metrics;
pub mod stats;

/// Crate version with the git revision it was built from.
pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("EXTFILTER_GIT_SHA"),
    ")"
);
