//! Deterministic in-memory adapters for tests and dry runs.
//!
//! Each adapter stands in for one port without touching the network or
//! the disk, and exposes hooks to script its behaviour.

pub mod clock;
pub mod filesystem;
pub mod messenger;
pub mod probe;

pub use clock::ManualClock;
pub use filesystem::MemoryFileSystem;
pub use messenger::RecordingMessenger;
pub use probe::ScriptedProbe;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a mutex, ignoring poisoning from a panicked test thread.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
