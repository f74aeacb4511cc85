//! Stats file collector.
//!
//! This module reads the extfilter stats file on every scrape and turns it
//! into samples, with a mockable filesystem for tests.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                   StatsCollector                     │
//! │   open ─▶ StatsReader ─▶ map_stat ─▶ Vec<Sample>     │
//! │                                  └─▶ warn!/error!    │
//! │                        │                             │
//! │                 ┌──────▼──────┐                      │
//! │                 │  FileSystem │ (trait)              │
//! │                 └──────┬──────┘                      │
//! └────────────────────────┼─────────────────────────────┘
//!                          │
//!              ┌───────────┴───────────┐
//!       ┌──────▼──────┐         ┌──────▼──────┐
//!       │   RealFs    │         │   MockFs    │
//!       │ (std::fs)   │         │ (fixtures)  │
//!       └─────────────┘         └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use extfilter_core::collector::{MockFs, StatsCollector, mock::TYPICAL_STATS_PATH};
//!
//! let collector = StatsCollector::new(MockFs::typical_extfilter(), TYPICAL_STATS_PATH);
//! let scrape = collector.scrape();
//! assert_eq!(scrape.samples.len(), 28);
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod mock;
pub mod traits;

pub use collector::{CollectError, Scrape, ScrapeSummary, StatsCollector};
pub use mock::MockFs;
pub use traits::{FileSystem, RealFs};
