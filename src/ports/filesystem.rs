//! Filesystem port for file I/O operations.

use std::path::Path;

use crate::error::BoxError;

/// Provides filesystem access for reading and writing files.
///
/// Used for the subscriber file and the JSON config file.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not valid UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String, BoxError>;

    /// Writes the given contents to a file, creating or overwriting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails (permissions, disk full, etc.).
    fn write(&self, path: &Path, contents: &str) -> Result<(), BoxError>;

    /// Returns `true` if the path exists.
    fn exists(&self, path: &Path) -> bool;
}
