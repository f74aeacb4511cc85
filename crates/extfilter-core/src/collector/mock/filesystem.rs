//! In-memory mock filesystem for testing collectors without real files.
//!
//! Files can be replaced or removed between scrapes, which is how tests
//! simulate extfilter rewriting its stats file.

use std::collections::HashMap;
use std::io::{self, BufRead, Cursor};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::collector::traits::FileSystem;

/// In-memory filesystem for testing.
///
/// Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    files: Arc<RwLock<HashMap<PathBuf, Vec<u8>>>>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a file with the given content.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.write_files()
            .insert(path.as_ref().to_path_buf(), content.into());
    }

    /// Removes a file. Removing a missing file is a no-op.
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        self.write_files().remove(path.as_ref());
    }

    fn write_files(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<PathBuf, Vec<u8>>> {
        // Poisoning is ignored; every update is a single insert or remove.
        self.files.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl FileSystem for MockFs {
    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead + Send>> {
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        let content = files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })?;
        Ok(Box::new(Cursor::new(content)))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(path)
    }
}
