//! Scrape-time collector for the extfilter stats file.
//!
//! Every scrape opens the file fresh, streams it through the parser and
//! the mapper, and drops the reader before returning. Nothing is cached
//! between scrapes.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::collector::traits::FileSystem;
use crate::metrics::{Catalogue, Mapping, Sample, map_stat};
use crate::stats::StatsReader;

/// Scrape-level failure. Line- and key-level problems are only logged.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("failed to open stats file {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Counters describing one scrape, for debug logging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapeSummary {
    /// Physical lines read, blank ones included.
    pub lines: usize,
    pub samples: usize,
    pub malformed: usize,
    pub unknown: usize,
    pub dropped: usize,
    pub duration: Duration,
}

/// Result of one scrape.
#[derive(Debug, Clone, Default)]
pub struct Scrape {
    pub samples: Vec<Sample>,
    pub summary: ScrapeSummary,
}

/// Reads the stats file and maps it to samples.
pub struct StatsCollector<F: FileSystem> {
    fs: F,
    stats_path: PathBuf,
    catalogue: Arc<Catalogue>,
}

impl<F: FileSystem> StatsCollector<F> {
    /// Creates a collector for the stats file at `stats_path`.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `stats_path` - Path of the file extfilter writes its counters to
    pub fn new(fs: F, stats_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            stats_path: stats_path.into(),
            catalogue: Arc::new(Catalogue::new()),
        }
    }

    pub fn stats_path(&self) -> &Path {
        &self.stats_path
    }

    /// The descriptor table every emitted sample refers to.
    pub fn catalogue(&self) -> &Arc<Catalogue> {
        &self.catalogue
    }

    /// Runs one scrape.
    ///
    /// Fails only if the stats file cannot be opened. Malformed lines and
    /// unknown keys are logged and skipped; a read error mid-file ends the
    /// scrape early with the samples collected so far.
    pub fn try_scrape(&self) -> Result<Scrape, CollectError> {
        let started = Instant::now();
        let reader = self
            .fs
            .open(&self.stats_path)
            .map_err(|source| CollectError::Open {
                path: self.stats_path.clone(),
                source,
            })?;

        let mut stats = StatsReader::new(reader);
        let mut samples = Vec::new();
        let mut summary = ScrapeSummary::default();

        for item in stats.by_ref() {
            let stat = match item {
                Ok(stat) => stat,
                Err(e) if e.is_fatal() => {
                    error!(path = %self.stats_path.display(), error = %e, "error reading stats file");
                    break;
                }
                Err(e) => {
                    summary.malformed += 1;
                    warn!(path = %self.stats_path.display(), error = %e, "skipping malformed stats line");
                    continue;
                }
            };

            match map_stat(&stat.key, stat.value) {
                Mapping::Sample(sample) => samples.push(sample),
                Mapping::Dropped => summary.dropped += 1,
                Mapping::Unknown(reason) => {
                    summary.unknown += 1;
                    warn!(key = %stat.key, "{}", reason);
                }
            }
        }

        summary.lines = stats.lines_read();
        summary.samples = samples.len();
        summary.duration = started.elapsed();

        debug!(
            lines = summary.lines,
            samples = summary.samples,
            malformed = summary.malformed,
            unknown = summary.unknown,
            dropped = summary.dropped,
            duration_us = summary.duration.as_micros() as u64,
            "stats file scraped"
        );

        Ok(Scrape { samples, summary })
    }

    /// Runs one scrape, degrading any failure to an empty result.
    pub fn scrape(&self) -> Scrape {
        match self.try_scrape() {
            Ok(scrape) => scrape,
            Err(e) => {
                error!(error = %e, "scrape failed, no samples collected");
                Scrape::default()
            }
        }
    }
}
