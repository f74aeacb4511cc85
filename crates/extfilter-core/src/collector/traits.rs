//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait lets the collector read the real stats file in
//! production and an in-memory fixture in tests.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Abstraction for filesystem operations.
pub trait FileSystem: Send + Sync {
    /// Opens a file for buffered, read-only access.
    ///
    /// The file is released when the returned reader is dropped.
    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead + Send>>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead + Send>> {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
