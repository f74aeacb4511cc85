//! In-memory filesystem and stats file fixtures.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
pub use scenarios::TYPICAL_STATS_PATH;
