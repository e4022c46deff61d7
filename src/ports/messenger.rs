//! Messaging channel port.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::ChannelError;

/// Boxed future returned by [`Messenger::send`].
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ChannelError>> + Send + 'a>>;

/// Boxed future returned by [`Messenger::receive`].
pub type ReceiveFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<Inbound>, ChannelError>> + Send + 'a>>;

/// Opaque recipient identifier (a chat id on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientId(pub i64);

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The commands the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Greeting interaction; registers the sender for notifications.
    Subscribe,
    /// Asks for the current signal state.
    StatusQuery,
}

/// An incoming command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    /// What was asked.
    pub kind: CommandKind,
    /// Where the command came from; replies go here.
    pub chat: RecipientId,
    /// Display name of the sender, used in the greeting.
    pub sender_name: String,
    /// Platform id of the command message, used to thread the reply.
    pub message_id: Option<i64>,
}

/// An outgoing text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    /// Recipient.
    pub to: RecipientId,
    /// Message text.
    pub text: String,
    /// Message this one replies to, if any.
    pub reply_to: Option<i64>,
}

impl Outbound {
    /// A standalone message.
    #[must_use]
    pub fn new(to: RecipientId, text: impl Into<String>) -> Self {
        Self { to, text: text.into(), reply_to: None }
    }

    /// A reply to an inbound command.
    #[must_use]
    pub fn reply(to: &Inbound, text: impl Into<String>) -> Self {
        Self { to: to.chat, text: text.into(), reply_to: to.message_id }
    }
}

/// Sends and receives chat messages.
pub trait Messenger: Send + Sync {
    /// Delivers one message.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform is unreachable or rejects the message.
    fn send(&self, message: Outbound) -> SendFuture<'_>;

    /// Waits for the next batch of commands. May return an empty batch.
    ///
    /// # Errors
    ///
    /// Returns an error if polling the platform fails.
    fn receive(&self) -> ReceiveFuture<'_>;
}
