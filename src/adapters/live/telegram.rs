//! Live adapter for the `Messenger` port using the Telegram Bot HTTP API.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChannelError, ConfigError};
use crate::notify::queue::SEND_TIMEOUT;
use crate::ports::messenger::{
    CommandKind, Inbound, Messenger, Outbound, ReceiveFuture, RecipientId, SendFuture,
};

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// How long `getUpdates` may hold the connection open.
pub const LONG_POLL: Duration = Duration::from_secs(30);

/// Telegram bot client.
///
/// Tracks the update offset so every update is handed out once.
pub struct TelegramMessenger {
    client: Client,
    endpoint: String,
    offset: AtomicI64,
}

impl TelegramMessenger {
    /// Creates a client for the bot identified by `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token: &str) -> Result<Self, ConfigError> {
        Self::with_api_url(TELEGRAM_API_URL, token)
    }

    /// Creates a client against a different API host.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_api_url(api_url: &str, token: &str) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .connect_timeout(SEND_TIMEOUT)
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self {
            client,
            endpoint: format!("{}/bot{token}", api_url.trim_end_matches('/')),
            offset: AtomicI64::new(0),
        })
    }

    async fn call<B, T>(&self, method: &str, body: &B, timeout: Duration) -> Result<T, ChannelError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}/{method}", self.endpoint))
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        let text = response.text().await.map_err(|e| transport_error(e, timeout))?;
        let reply: ApiReply<T> =
            serde_json::from_str(&text).map_err(|e| ChannelError::Decode(e.to_string()))?;
        reply.into_result()
    }
}

/// The token is part of the URL, so it is stripped before the error leaves.
fn transport_error(err: reqwest::Error, timeout: Duration) -> ChannelError {
    if err.is_timeout() {
        ChannelError::Timeout(timeout)
    } else {
        ChannelError::Transport(err.without_url().to_string())
    }
}

/// Envelope around every Bot API response.
#[derive(Deserialize)]
struct ApiReply<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<u16>,
    description: Option<String>,
}

impl<T> ApiReply<T> {
    fn into_result(self) -> Result<T, ChannelError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(ChannelError::Rejected {
                code: self.error_code.unwrap_or_default(),
                description: self.description.unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }
}

#[derive(Serialize)]
struct GetUpdates<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to_message_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    message_id: i64,
    chat: Chat,
    from: Option<User>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct User {
    first_name: String,
}

/// Recognizes `/start` and `/check`, with or without an `@botname` suffix.
pub(crate) fn parse_command(text: &str) -> Option<CommandKind> {
    let word = text.split_whitespace().next()?;
    let name = word.split('@').next().unwrap_or(word);
    match name {
        "/start" => Some(CommandKind::Subscribe),
        "/check" => Some(CommandKind::StatusQuery),
        _ => None,
    }
}

fn to_inbound(update: Update) -> Option<Inbound> {
    let message = update.message?;
    let kind = parse_command(message.text.as_deref()?)?;
    Some(Inbound {
        kind,
        chat: RecipientId(message.chat.id),
        sender_name: message.from.map(|u| u.first_name).unwrap_or_default(),
        message_id: Some(message.message_id),
    })
}

impl Messenger for TelegramMessenger {
    fn send(&self, message: Outbound) -> SendFuture<'_> {
        Box::pin(async move {
            let body = SendMessage {
                chat_id: message.to.0,
                text: &message.text,
                reply_to_message_id: message.reply_to,
            };
            let _: serde_json::Value = self.call("sendMessage", &body, SEND_TIMEOUT).await?;
            Ok(())
        })
    }

    fn receive(&self) -> ReceiveFuture<'_> {
        Box::pin(async move {
            let body = GetUpdates {
                offset: self.offset.load(Ordering::SeqCst),
                timeout: LONG_POLL.as_secs(),
                allowed_updates: &["message"],
            };
            let updates: Vec<Update> =
                self.call("getUpdates", &body, LONG_POLL + SEND_TIMEOUT).await?;

            if let Some(last) = updates.iter().map(|u| u.update_id).max() {
                self.offset.store(last + 1, Ordering::SeqCst);
            }
            debug!(count = updates.len(), "received updates");
            Ok(updates.into_iter().filter_map(to_inbound).collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_command("/start"), Some(CommandKind::Subscribe));
        assert_eq!(parse_command("/check"), Some(CommandKind::StatusQuery));
        assert_eq!(parse_command("/check@grid_bot"), Some(CommandKind::StatusQuery));
        assert_eq!(parse_command("  /start please"), Some(CommandKind::Subscribe));
    }

    #[test]
    fn ignores_other_text() {
        assert_eq!(parse_command("hello"), None);
        assert_eq!(parse_command("/help"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn decodes_update_batch() {
        let raw = r#"{
            "ok": true,
            "result": [
                {"update_id": 10, "message": {"message_id": 5, "chat": {"id": 42},
                 "from": {"first_name": "Olena"}, "text": "/start"}},
                {"update_id": 11, "message": {"message_id": 6, "chat": {"id": 42},
                 "text": "just chatting"}},
                {"update_id": 12}
            ]
        }"#;
        let reply: ApiReply<Vec<Update>> = serde_json::from_str(raw).unwrap();
        let inbound: Vec<Inbound> =
            reply.into_result().unwrap().into_iter().filter_map(to_inbound).collect();
        assert_eq!(
            inbound,
            vec![Inbound {
                kind: CommandKind::Subscribe,
                chat: RecipientId(42),
                sender_name: "Olena".into(),
                message_id: Some(5),
            }]
        );
    }

    #[test]
    fn api_rejection_becomes_error() {
        let raw = r#"{"ok": false, "error_code": 403, "description": "Forbidden: bot was blocked by the user"}"#;
        let reply: ApiReply<serde_json::Value> = serde_json::from_str(raw).unwrap();
        match reply.into_result() {
            Err(ChannelError::Rejected { code, description }) => {
                assert_eq!(code, 403);
                assert!(description.contains("blocked"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn reply_id_is_omitted_when_absent() {
        let body = SendMessage { chat_id: 1, text: "hi", reply_to_message_id: None };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"chat_id": 1, "text": "hi"}));
    }
}
