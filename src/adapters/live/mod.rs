//! Live adapters for real external interactions.

pub mod clock;
pub mod filesystem;
pub mod probe;
pub mod telegram;

pub use clock::SystemClock;
pub use filesystem::DiskFileSystem;
pub use probe::HttpProbe;
pub use telegram::TelegramMessenger;
