//! Shared application state.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::sync::Arc;

use axum::extract::State;
use prometheus::Registry;

pub(crate) struct ExporterState {
    /// Holds the extfilter collector; every gather is one scrape.
    pub(crate) registry: Registry,
    pub(crate) telemetry_path: String,
}

pub(crate) type SharedState = Arc<ExporterState>;
pub(crate) type AppState = State<SharedState>;
