//! Process wiring: the background monitor plus the supervised
//! foreground command loop.

use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::context::ServiceContext;
use crate::error::ChannelError;
use crate::handler::CommandHandler;
use crate::monitor::TransitionMonitor;
use crate::store::SubscriberRegistry;

/// Pause before restarting a failed receive loop.
pub const RESTART_BACKOFF: Duration = Duration::from_secs(15);

/// Runs the bot until shutdown is signalled.
pub struct Dispatcher {
    ctx: ServiceContext,
    subscribers_path: PathBuf,
}

impl Dispatcher {
    /// Creates a dispatcher that keeps subscribers in `subscribers_path`.
    #[must_use]
    pub fn new(ctx: ServiceContext, subscribers_path: &Path) -> Self {
        Self { ctx, subscribers_path: subscribers_path.to_path_buf() }
    }

    /// Loads subscribers, starts the monitor in the background and serves
    /// commands in the foreground until `shutdown` becomes `true` (or its
    /// sender is dropped). Never fails: receive-loop failures and panics
    /// are logged and the loop is restarted after [`RESTART_BACKOFF`].
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let registry =
            Arc::new(SubscriberRegistry::open(Arc::clone(&self.ctx.fs), &self.subscribers_path));
        let monitor = TransitionMonitor::start(&self.ctx, Arc::clone(&registry)).await;
        let handler = Arc::new(CommandHandler::new(self.ctx.clone(), registry, monitor.handle()));
        let monitor_task = tokio::spawn(monitor.run(shutdown.clone()));

        info!("listening for commands");
        while !*shutdown.borrow() {
            let task = tokio::spawn(receive_loop(Arc::clone(&handler)));
            let abort = task.abort_handle();

            let outcome = tokio::select! {
                joined = task => joined,
                _ = shutdown.changed() => {
                    abort.abort();
                    break;
                }
            };
            match outcome {
                Ok(Err(err)) => error!(error = %err, "receive loop failed"),
                Ok(Ok(never)) => match never {},
                Err(join) if join.is_panic() => error!("receive loop panicked"),
                Err(join) => error!(error = %join, "receive loop aborted"),
            }

            warn!(backoff = ?RESTART_BACKOFF, "restarting receive loop");
            tokio::select! {
                () = tokio::time::sleep(RESTART_BACKOFF) => {}
                _ = shutdown.changed() => break,
            }
        }

        if let Err(err) = monitor_task.await {
            error!(error = %err, "monitor task ended abnormally");
        }
        info!("dispatcher stopped");
    }
}

/// Pulls command batches and handles them one at a time. Only returns on
/// a receive failure; a failed reply is logged and skipped.
async fn receive_loop(handler: Arc<CommandHandler>) -> Result<Infallible, ChannelError> {
    loop {
        let batch = handler.messenger().receive().await?;
        for command in batch {
            if let Err(err) = handler.handle(&command).await {
                warn!(chat = %command.chat, kind = ?command.kind, error = %err, "reply failed");
            }
        }
    }
}
