//! FIFO buffer of pending notifications and its broadcast drain.

use std::collections::{BTreeSet, VecDeque};
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::error::ChannelError;
use crate::ports::messenger::{Messenger, Outbound, RecipientId};

/// Upper bound on a single delivery attempt.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// A formatted notification waiting to be broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMessage {
    /// Enqueue order, starting at zero.
    pub seq: u64,
    /// Message text.
    pub text: String,
}

/// Outcome of one [`NotificationQueue::drain_to`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Messages removed from the queue.
    pub messages: usize,
    /// Successful (message, recipient) deliveries.
    pub delivered: usize,
    /// Failed or timed-out deliveries.
    pub failed: usize,
}

/// Ordered queue of notifications.
///
/// Every message is offered once to every recipient and then dropped,
/// whether or not each send succeeded.
pub struct NotificationQueue {
    pending: VecDeque<PendingMessage>,
    next_seq: u64,
    send_timeout: Duration,
}

impl NotificationQueue {
    /// Creates an empty queue whose sends give up after `send_timeout`.
    #[must_use]
    pub fn new(send_timeout: Duration) -> Self {
        Self { pending: VecDeque::new(), next_seq: 0, send_timeout }
    }

    /// Appends a message and returns its sequence number.
    pub fn enqueue(&mut self, text: impl Into<String>) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push_back(PendingMessage { seq, text: text.into() });
        seq
    }

    /// Number of messages waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending messages, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &PendingMessage> {
        self.pending.iter()
    }

    /// Broadcasts queued messages oldest first to every recipient.
    ///
    /// Individual failures are logged and skipped; they are neither retried
    /// nor requeued. A message goes to all recipients concurrently, each
    /// send cut off after the queue's send timeout, so one stalled chat
    /// delays a message by at most that timeout.
    pub async fn drain_to(
        &mut self,
        messenger: &dyn Messenger,
        recipients: &BTreeSet<RecipientId>,
    ) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        while let Some(message) = self.pending.front().cloned() {
            let sends = recipients.iter().map(|&to| {
                let send = messenger.send(Outbound::new(to, message.text.clone()));
                let timeout = self.send_timeout;
                async move {
                    let outcome = match tokio::time::timeout(timeout, send).await {
                        Ok(result) => result,
                        Err(_) => Err(ChannelError::Timeout(timeout)),
                    };
                    (to, outcome)
                }
            });
            // All recipients of one message at once; messages stay in order.
            for (to, outcome) in join_all(sends).await {
                match outcome {
                    Ok(()) => report.delivered += 1,
                    Err(err) => {
                        warn!(recipient = %to, seq = message.seq, error = %err, "delivery failed");
                        report.failed += 1;
                    }
                }
            }
            self.pending.pop_front();
            report.messages += 1;
            debug!(seq = message.seq, recipients = recipients.len(), "broadcast message");
        }

        report
    }
}
