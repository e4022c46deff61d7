//! `gridwatch subscribers` command.

use std::sync::Arc;

use crate::adapters::live::DiskFileSystem;
use crate::config::Config;
use crate::error::Error;
use crate::ports::FileSystem;
use crate::store::SubscriberRegistry;

/// Execute the `subscribers` command.
///
/// Prints one stored recipient id per line.
///
/// # Errors
///
/// Returns an error if the subscriber file exists but cannot be read or
/// parsed.
pub fn run(config: &Config) -> Result<(), Error> {
    let fs: Arc<dyn FileSystem> = Arc::new(DiskFileSystem);
    if !fs.exists(&config.subscribers_path) {
        println!("No subscribers stored.");
        return Ok(());
    }

    let registry = SubscriberRegistry::new(fs, &config.subscribers_path);
    registry.load()?;
    if registry.is_empty() {
        println!("No subscribers stored.");
        return Ok(());
    }
    for id in registry.snapshot() {
        println!("{id}");
    }
    Ok(())
}
