//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the core and an external
//! system (time, disk, the signal endpoint, the chat platform).
//! Implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod messenger;
pub mod probe;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use messenger::{CommandKind, Inbound, Messenger, Outbound, RecipientId};
pub use probe::SignalProbe;
