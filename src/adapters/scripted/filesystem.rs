//! In-memory filesystem.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::lock;
use crate::error::BoxError;
use crate::ports::filesystem::FileSystem;

/// Filesystem held in a map, with switchable write failures.
#[derive(Default)]
pub struct MemoryFileSystem {
    files: Mutex<HashMap<PathBuf, String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryFileSystem {
    /// Creates an empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a file.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        lock(&self.files).insert(path.into(), contents.into());
        self
    }

    /// Makes every following write fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current contents of a file, if present.
    #[must_use]
    pub fn contents(&self, path: &Path) -> Option<String> {
        lock(&self.files).get(path).cloned()
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, BoxError> {
        self.contents(path).ok_or_else(|| format!("file not found: {}", path.display()).into())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), BoxError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(format!("read-only filesystem: {}", path.display()).into());
        }
        lock(&self.files).insert(path.to_path_buf(), contents.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        lock(&self.files).contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failing_writes_leave_contents_untouched() {
        let fs = MemoryFileSystem::new().with_file("/a.json", "[]");
        fs.fail_writes(true);
        assert!(fs.write(Path::new("/a.json"), "[1]").is_err());
        assert_eq!(fs.read_to_string(Path::new("/a.json")).unwrap(), "[]");
        fs.fail_writes(false);
        fs.write(Path::new("/a.json"), "[1]").unwrap();
        assert_eq!(fs.contents(Path::new("/a.json")).as_deref(), Some("[1]"));
        assert_eq!(fs.write_count(), 1);
    }
}
