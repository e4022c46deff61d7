//! User-facing message texts and the outbound notification queue.

pub mod queue;

pub use queue::{DeliveryReport, NotificationQueue, PendingMessage, SEND_TIMEOUT};

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

use crate::duration::format_elapsed;
use crate::signal::PowerState;

/// Reply sent when a status query cannot reach the signal endpoint.
pub const PROBE_FAILURE_REPLY: &str = "‼ unknown. Local server error";

fn emoji(state: PowerState) -> &'static str {
    match state {
        PowerState::On => "💡",
        PowerState::Off => "🚫",
    }
}

/// Broadcast text for a confirmed transition into `state`.
///
/// `at` is rendered as `HH:MM DD Month` in its own time zone.
#[must_use]
pub fn transition_message<Tz>(state: PowerState, elapsed_secs: f64, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let verb = match state {
        PowerState::On => "turned on",
        PowerState::Off => "turned off",
    };
    format!(
        "{} electricity {verb} after {} at {}",
        emoji(state),
        format_elapsed(elapsed_secs),
        at.format("%H:%M %d %B"),
    )
}

/// Reply to a status query.
#[must_use]
pub fn status_message(state: PowerState, elapsed_secs: f64) -> String {
    let phrase = match state {
        PowerState::On => "already on",
        PowerState::Off => "still off",
    };
    format!("{} electricity {phrase} {}", emoji(state), format_elapsed(elapsed_secs))
}

/// Reply to a subscribe command.
#[must_use]
pub fn greeting(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        "Hello 😊".to_string()
    } else {
        format!("Hello {name} 😊")
    }
}
