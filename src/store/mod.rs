//! Subscriber registry — the set of chats that receive notifications.
//!
//! The set lives in memory and is mirrored to a JSON array of ids through
//! the `FileSystem` port after every mutation:
//!
//! ```text
//! [123456789, -100987654321]
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use crate::error::PersistenceError;
use crate::ports::filesystem::FileSystem;
use crate::ports::messenger::RecipientId;

/// Persistent set of subscribed recipients.
///
/// Shared between the command handler (writer) and the monitor (reader);
/// readers take a [`snapshot`](Self::snapshot) before iterating.
pub struct SubscriberRegistry {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    ids: Mutex<BTreeSet<RecipientId>>,
}

impl SubscriberRegistry {
    /// Creates an empty registry backed by `path`. Nothing is read yet.
    #[must_use]
    pub fn new(fs: Arc<dyn FileSystem>, path: &Path) -> Self {
        Self { fs, path: path.to_path_buf(), ids: Mutex::new(BTreeSet::new()) }
    }

    /// Creates a registry and fills it from disk.
    ///
    /// A missing or malformed file is logged and yields an empty registry.
    #[must_use]
    pub fn open(fs: Arc<dyn FileSystem>, path: &Path) -> Self {
        let registry = Self::new(fs, path);
        match registry.load() {
            Ok(count) => info!(count, path = %path.display(), "loaded subscribers"),
            Err(err) => warn!(error = %err, "starting with no subscribers"),
        }
        registry
    }

    /// Replaces the in-memory set with the file contents, returning the
    /// number of subscribers read. On error the set is left empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or not a JSON
    /// array of ids.
    pub fn load(&self) -> Result<usize, PersistenceError> {
        let mut ids = self.guard();
        ids.clear();
        let raw = self
            .fs
            .read_to_string(&self.path)
            .map_err(|source| PersistenceError::Read { path: self.path.clone(), source })?;
        let loaded: Vec<RecipientId> = serde_json::from_str(&raw)
            .map_err(|source| PersistenceError::Decode { path: self.path.clone(), source })?;
        ids.extend(loaded);
        Ok(ids.len())
    }

    /// Writes the current set to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails. The in-memory set is
    /// kept either way.
    pub fn persist(&self) -> Result<(), PersistenceError> {
        let ids = self.guard();
        Self::write(&*self.fs, &self.path, &ids)
    }

    /// Adds a recipient and persists immediately. Returns `true` if the id
    /// was new.
    ///
    /// The write happens even for known ids, so a previously failed save
    /// is retried on the next subscription.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails; the id stays registered in
    /// memory.
    pub fn add(&self, id: RecipientId) -> Result<bool, PersistenceError> {
        let mut ids = self.guard();
        let added = ids.insert(id);
        Self::write(&*self.fs, &self.path, &ids)?;
        Ok(added)
    }

    /// A copy of the current set, safe to iterate while others add.
    #[must_use]
    pub fn snapshot(&self) -> BTreeSet<RecipientId> {
        self.guard().clone()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guard().len()
    }

    /// Returns `true` if nobody is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    /// Backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(
        fs: &dyn FileSystem,
        path: &Path,
        ids: &BTreeSet<RecipientId>,
    ) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(ids).map_err(PersistenceError::Encode)?;
        fs.write(path, &json)
            .map_err(|source| PersistenceError::Write { path: path.to_path_buf(), source })
    }

    fn guard(&self) -> MutexGuard<'_, BTreeSet<RecipientId>> {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
