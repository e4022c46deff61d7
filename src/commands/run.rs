//! `gridwatch run` command.

use tokio::sync::watch;
use tracing::{error, info};

use crate::config::Config;
use crate::context::ServiceContext;
use crate::dispatcher::Dispatcher;
use crate::error::Error;

/// Execute the `run` command.
///
/// Starts the bot and blocks until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the token is missing or a client cannot be built.
pub async fn run(config: &Config) -> Result<(), Error> {
    let ctx = ServiceContext::live(config)?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown requested");
                let _ = shutdown_tx.send(true);
            }
            Err(err) => {
                // A dropped sender reads as shutdown; this task owns it until killed.
                error!(error = %err, "failed to install Ctrl-C handler");
                std::future::pending::<()>().await;
            }
        }
    });

    info!(probe = %config.probe_url, subscribers = %config.subscribers_path.display(), "starting");
    Dispatcher::new(ctx, &config.subscribers_path).run(shutdown_rx).await;
    Ok(())
}
