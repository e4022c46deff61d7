//! `gridwatch probe` command.

use crate::adapters::live::HttpProbe;
use crate::config::Config;
use crate::error::Error;
use crate::ports::SignalProbe;
use crate::signal::SignalState;

/// Execute the `probe` command.
///
/// Prints `on`, `off` or `unknown` for a single probe.
///
/// # Errors
///
/// Returns an error if the probe client cannot be built or the reading
/// is `unknown`.
pub async fn run(config: &Config) -> Result<(), Error> {
    let probe = HttpProbe::new(&config.probe_url)?;
    let state = probe.probe().await;
    println!("{state}");
    if state == SignalState::Unknown {
        return Err(Error::SignalUnavailable(probe.url().to_string()));
    }
    Ok(())
}
