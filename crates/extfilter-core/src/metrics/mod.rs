//! Metric identities exposed by the exporter and the mapping from stats keys.
//!
//! # Architecture
//!
//! ```text
//!   StatLine { key, value }
//!            │
//!     ┌──────▼──────┐      category table      ┌────────────────────┐
//!     │  map_stat   │ ───────────────────────▶ │ worker / allports  │
//!     └──────┬──────┘                          │ allworkers tables  │
//!            │                                 └────────────────────┘
//!            ▼
//!   Mapping::Sample(Sample)   → exposition
//!   Mapping::Dropped          → ignored (known, not exported)
//!   Mapping::Unknown(reason)  → logged by the collector
//! ```

pub mod catalogue;
pub mod mapper;

pub use catalogue::{Catalogue, METRICS_PREFIX, MetricDescriptor, MetricId};
pub use mapper::{Mapping, Sample, UnknownKey, map_stat};
