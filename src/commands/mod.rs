//! Command dispatch and handlers.

pub mod probe;
pub mod run;
pub mod subscribers;

use crate::adapters::live::DiskFileSystem;
use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::error::Error;

/// Dispatch a parsed command to its handler.
///
/// Resolves configuration from flags, environment and the config file,
/// then runs the command on a multi-threaded runtime.
///
/// # Errors
///
/// Returns an error string if configuration is invalid or the command fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    execute(cli).map_err(|e| e.to_string())
}

fn execute(cli: &Cli) -> Result<(), Error> {
    let config = Config::resolve(&cli.config, &DiskFileSystem)?;

    match cli.command {
        Command::Run => block_on(run::run(&config)),
        Command::Probe => block_on(probe::run(&config)),
        Command::Subscribers => subscribers::run(&config),
    }
}

fn block_on<F>(future: F) -> Result<(), Error>
where
    F: std::future::Future<Output = Result<(), Error>>,
{
    tokio::runtime::Builder::new_multi_thread().enable_all().build()?.block_on(future)
}
