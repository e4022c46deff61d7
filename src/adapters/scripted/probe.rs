//! Probe that replays a fixed sequence of readings.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::lock;
use crate::ports::probe::{ProbeFuture, SignalProbe};
use crate::signal::SignalState;

/// Serves queued readings in order; once drained it keeps answering
/// with the fallback reading.
pub struct ScriptedProbe {
    script: Mutex<VecDeque<SignalState>>,
    fallback: Mutex<SignalState>,
    calls: AtomicUsize,
}

impl ScriptedProbe {
    /// Creates a probe that serves `readings`, then `Unknown`.
    #[must_use]
    pub fn new(readings: impl IntoIterator<Item = SignalState>) -> Self {
        Self {
            script: Mutex::new(readings.into_iter().collect()),
            fallback: Mutex::new(SignalState::Unknown),
            calls: AtomicUsize::new(0),
        }
    }

    /// Creates a probe that always answers `state`.
    #[must_use]
    pub fn always(state: SignalState) -> Self {
        let probe = Self::new([]);
        probe.set_fallback(state);
        probe
    }

    /// Appends readings to the script.
    pub fn push(&self, readings: impl IntoIterator<Item = SignalState>) {
        lock(&self.script).extend(readings);
    }

    /// Changes the reading served once the script is empty.
    pub fn set_fallback(&self, state: SignalState) {
        *lock(&self.fallback) = state;
    }

    /// Number of probes performed.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next(&self) -> SignalState {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.script).pop_front().unwrap_or_else(|| *lock(&self.fallback))
    }
}

impl SignalProbe for ScriptedProbe {
    fn probe(&self) -> ProbeFuture<'_> {
        let state = self.next();
        Box::pin(async move { state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_script_then_fallback() {
        let probe = ScriptedProbe::new([SignalState::On, SignalState::Off]);
        assert_eq!(probe.probe().await, SignalState::On);
        assert_eq!(probe.probe().await, SignalState::Off);
        assert_eq!(probe.probe().await, SignalState::Unknown);
        probe.set_fallback(SignalState::On);
        assert_eq!(probe.probe().await, SignalState::On);
        assert_eq!(probe.calls(), 4);
    }
}
