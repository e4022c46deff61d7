//! Handling of inbound chat commands.

use std::sync::Arc;

use tracing::{info, warn};

use crate::context::ServiceContext;
use crate::error::ChannelError;
use crate::monitor::MonitorHandle;
use crate::notify::{greeting, status_message, PROBE_FAILURE_REPLY};
use crate::ports::{CommandKind, Inbound, Messenger, Outbound};
use crate::store::SubscriberRegistry;

/// Answers `subscribe` and `status-query` commands.
///
/// Each command produces exactly one reply; `subscribe` additionally adds
/// the sender to the registry.
pub struct CommandHandler {
    ctx: ServiceContext,
    registry: Arc<SubscriberRegistry>,
    monitor: MonitorHandle,
}

impl CommandHandler {
    /// Creates a handler over the given ports, registry and monitor view.
    #[must_use]
    pub fn new(
        ctx: ServiceContext,
        registry: Arc<SubscriberRegistry>,
        monitor: MonitorHandle,
    ) -> Self {
        Self { ctx, registry, monitor }
    }

    /// The channel replies go through.
    #[must_use]
    pub fn messenger(&self) -> &dyn Messenger {
        &*self.ctx.messenger
    }

    /// Handles one command.
    ///
    /// # Errors
    ///
    /// Returns an error if the reply could not be sent. For `subscribe` the
    /// sender is registered even when the greeting fails.
    pub async fn handle(&self, command: &Inbound) -> Result<(), ChannelError> {
        match command.kind {
            CommandKind::Subscribe => self.subscribe(command).await,
            CommandKind::StatusQuery => self.status(command).await,
        }
    }

    async fn subscribe(&self, command: &Inbound) -> Result<(), ChannelError> {
        let replied =
            self.ctx.messenger.send(Outbound::reply(command, greeting(&command.sender_name))).await;

        match self.registry.add(command.chat) {
            Ok(true) => info!(chat = %command.chat, total = self.registry.len(), "new subscriber"),
            Ok(false) => info!(chat = %command.chat, "already subscribed"),
            Err(err) => warn!(chat = %command.chat, error = %err, "subscriber kept in memory only"),
        }
        replied
    }

    async fn status(&self, command: &Inbound) -> Result<(), ChannelError> {
        let record = self.monitor.snapshot();
        let reading = self.ctx.probe.probe().await;
        let elapsed = record.elapsed_secs(self.ctx.clock.now());

        let text = match reading.known() {
            Some(state) => status_message(state, elapsed),
            None => {
                warn!(chat = %command.chat, "status requested while probe is failing");
                PROBE_FAILURE_REPLY.to_string()
            }
        };
        self.ctx.messenger.send(Outbound::reply(command, text)).await
    }
}
