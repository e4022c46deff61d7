//! Signal readings and the transition record derived from them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single probe reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalState {
    /// The endpoint reported `true`.
    On,
    /// The endpoint answered with anything other than `true`.
    Off,
    /// The probe failed. Never causes a transition.
    Unknown,
}

impl SignalState {
    /// Interprets a successful response body.
    ///
    /// The body is trimmed and compared case-insensitively against `true`;
    /// any other well-formed body means the signal is off.
    #[must_use]
    pub fn from_body(body: &str) -> Self {
        if body.trim().eq_ignore_ascii_case("true") {
            Self::On
        } else {
            Self::Off
        }
    }

    /// Returns the confirmed power state, or `None` for `Unknown`.
    #[must_use]
    pub fn known(self) -> Option<PowerState> {
        match self {
            Self::On => Some(PowerState::On),
            Self::Off => Some(PowerState::Off),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// A confirmed signal state. `Unknown` cannot be represented here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    /// Power is available.
    On,
    /// Power is gone.
    Off,
}

impl From<PowerState> for SignalState {
    fn from(state: PowerState) -> Self {
        match state {
            PowerState::On => Self::On,
            PowerState::Off => Self::Off,
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        SignalState::from(*self).fmt(f)
    }
}

/// The last confirmed state and when it was entered.
///
/// Copied out as a whole so readers always see a consistent pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRecord {
    /// The sticky confirmed state.
    pub state: PowerState,
    /// When `state` was entered (or the monitor started).
    pub since: DateTime<Utc>,
}

impl TransitionRecord {
    /// Seconds elapsed between `since` and `now`, clamped at zero.
    #[must_use]
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> f64 {
        (now - self.since).to_std().map(|d| d.as_secs_f64()).unwrap_or_default()
    }
}
