//! Messenger that records outgoing messages and replays inbound batches.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use super::lock;
use crate::error::ChannelError;
use crate::ports::messenger::{Inbound, Messenger, Outbound, ReceiveFuture, RecipientId, SendFuture};

/// In-memory messenger.
///
/// Sends are recorded unless the recipient is marked unreachable (error)
/// or stalled (never answers). `receive` serves scripted batches and then
/// waits forever, like an idle chat.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Outbound>>,
    unreachable: Mutex<HashSet<RecipientId>>,
    stalled: Mutex<HashSet<RecipientId>>,
    inbound: Mutex<VecDeque<Result<Vec<Inbound>, ChannelError>>>,
}

impl RecordingMessenger {
    /// Creates a messenger with nothing scripted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a batch of inbound commands.
    pub fn push_inbound(&self, batch: Vec<Inbound>) {
        lock(&self.inbound).push_back(Ok(batch));
    }

    /// Queues a receive failure.
    pub fn push_receive_error(&self, err: ChannelError) {
        lock(&self.inbound).push_back(Err(err));
    }

    /// Makes sends to `to` fail immediately.
    pub fn mark_unreachable(&self, to: RecipientId) {
        lock(&self.unreachable).insert(to);
    }

    /// Makes sends to `to` hang until the caller gives up.
    pub fn mark_stalled(&self, to: RecipientId) {
        lock(&self.stalled).insert(to);
    }

    /// Everything delivered so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<Outbound> {
        lock(&self.sent).clone()
    }

    /// Texts delivered to one recipient, in order.
    #[must_use]
    pub fn sent_to(&self, to: RecipientId) -> Vec<String> {
        lock(&self.sent).iter().filter(|m| m.to == to).map(|m| m.text.clone()).collect()
    }
}

impl Messenger for RecordingMessenger {
    fn send(&self, message: Outbound) -> SendFuture<'_> {
        Box::pin(async move {
            let stalled = lock(&self.stalled).contains(&message.to);
            if stalled {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            let unreachable = lock(&self.unreachable).contains(&message.to);
            if unreachable {
                return Err(ChannelError::Rejected {
                    code: 403,
                    description: format!("chat {} unreachable", message.to),
                });
            }
            lock(&self.sent).push(message);
            Ok(())
        })
    }

    fn receive(&self) -> ReceiveFuture<'_> {
        Box::pin(async move {
            let next = lock(&self.inbound).pop_front();
            match next {
                Some(batch) => batch,
                None => std::future::pending().await,
            }
        })
    }
}
