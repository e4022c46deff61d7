//! Service context bundling all port trait objects.

use std::sync::Arc;

use crate::adapters::live::{DiskFileSystem, HttpProbe, SystemClock, TelegramMessenger};
use crate::config::Config;
use crate::error::ConfigError;
use crate::ports::{Clock, FileSystem, Messenger, SignalProbe};

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Handles are
/// shared, so the context is cheap to clone into background tasks.
#[derive(Clone)]
pub struct ServiceContext {
    /// Clock for obtaining the current time.
    pub clock: Arc<dyn Clock>,
    /// Filesystem for the subscriber file.
    pub fs: Arc<dyn FileSystem>,
    /// Reads the monitored signal.
    pub probe: Arc<dyn SignalProbe>,
    /// Chat channel for commands and notifications.
    pub messenger: Arc<dyn Messenger>,
}

impl ServiceContext {
    /// Wires arbitrary adapters together.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        fs: Arc<dyn FileSystem>,
        probe: Arc<dyn SignalProbe>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self { clock, fs, probe, messenger }
    }

    /// Creates a live context: system clock, real disk, HTTP probe and
    /// the Telegram bot API.
    ///
    /// # Errors
    ///
    /// Returns an error if no bot token is configured or an HTTP client
    /// cannot be built.
    pub fn live(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            clock: Arc::new(SystemClock),
            fs: Arc::new(DiskFileSystem),
            probe: Arc::new(HttpProbe::new(&config.probe_url)?),
            messenger: Arc::new(TelegramMessenger::new(config.token()?)?),
        })
    }
}
