//! Human-readable rendering of elapsed time.

const SECS_PER_DAY: u64 = 86_400;
const SECS_PER_HOUR: u64 = 3_600;
const SECS_PER_MINUTE: u64 = 60;

/// Formats an elapsed number of seconds as `HH:MM:SS`, prefixed with
/// `N day(s) ` once at least a full day has passed.
///
/// Fractional seconds are floored. Negative or non-finite input renders as
/// zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_elapsed(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 { seconds.floor() as u64 } else { 0 };

    let days = total / SECS_PER_DAY;
    let rem = total % SECS_PER_DAY;
    let hours = rem / SECS_PER_HOUR;
    let minutes = rem % SECS_PER_HOUR / SECS_PER_MINUTE;
    let secs = rem % SECS_PER_MINUTE;

    let clock = format!("{hours:02}:{minutes:02}:{secs:02}");
    match days {
        0 => clock,
        1 => format!("1 day {clock}"),
        n => format!("{n} days {clock}"),
    }
}
