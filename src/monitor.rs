//! Transition monitor — the poll-detect-notify control loop.
//!
//! ```text
//!            probe = Unknown            probe = current
//!          ┌────────────────┐         ┌───────────────┐
//!          ▼                │         ▼               │
//!        ┌───────────────────┐ probe != current ┌───────────────────┐
//!        │  On  (since = t1) │ ───────────────► │ Off (since = t2)  │
//!        └───────────────────┘ ◄─────────────── └───────────────────┘
//!                               enqueue message
//! ```
//!
//! The `(state, since)` pair lives behind a lock shared with the command
//! handler through [`MonitorHandle`]. A confirmed transition updates the
//! pair and enqueues its message under the same write lock.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::Local;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::context::ServiceContext;
use crate::notify::{transition_message, DeliveryReport, NotificationQueue, SEND_TIMEOUT};
use crate::ports::{Clock, Messenger, SignalProbe};
use crate::signal::{PowerState, SignalState, TransitionRecord};
use crate::store::SubscriberRegistry;

/// Time between probes.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// What a single reading did to the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// The probe failed; nothing changed.
    Ignored,
    /// The reading matched the current state.
    Unchanged,
    /// First known reading after an `Unknown` startup; adopted silently.
    Baseline(PowerState),
    /// A confirmed transition; its message was enqueued as `seq`.
    Transition {
        /// Previous state.
        from: PowerState,
        /// New state.
        to: PowerState,
        /// Queue sequence number of the notification.
        seq: u64,
    },
}

/// Read-only view of the monitor's transition record.
#[derive(Clone)]
pub struct MonitorHandle {
    record: Arc<RwLock<TransitionRecord>>,
}

impl MonitorHandle {
    /// The current `(state, since)` pair, copied atomically.
    #[must_use]
    pub fn snapshot(&self) -> TransitionRecord {
        *self.record.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Polls the probe, detects transitions and broadcasts them.
pub struct TransitionMonitor {
    probe: Arc<dyn SignalProbe>,
    clock: Arc<dyn Clock>,
    messenger: Arc<dyn Messenger>,
    registry: Arc<SubscriberRegistry>,
    record: Arc<RwLock<TransitionRecord>>,
    queue: NotificationQueue,
    baseline_pending: bool,
}

impl TransitionMonitor {
    /// Takes the initial reading and builds the monitor.
    ///
    /// The transition timestamp starts at the current time. If the first
    /// probe is `Unknown` the state defaults to `Off` and the next known
    /// reading is adopted as the baseline without a notification.
    pub async fn start(ctx: &ServiceContext, registry: Arc<SubscriberRegistry>) -> Self {
        let first = ctx.probe.probe().await;
        let now = ctx.clock.now();
        let (state, baseline_pending) = match first.known() {
            Some(state) => (state, false),
            None => {
                warn!("initial probe failed; assuming off until the first successful reading");
                (PowerState::Off, true)
            }
        };
        info!(%state, "monitor starting");

        Self {
            probe: Arc::clone(&ctx.probe),
            clock: Arc::clone(&ctx.clock),
            messenger: Arc::clone(&ctx.messenger),
            registry,
            record: Arc::new(RwLock::new(TransitionRecord { state, since: now })),
            queue: NotificationQueue::new(SEND_TIMEOUT),
            baseline_pending,
        }
    }

    /// A handle for reading the transition record from other tasks.
    #[must_use]
    pub fn handle(&self) -> MonitorHandle {
        MonitorHandle { record: Arc::clone(&self.record) }
    }

    /// Notifications not yet broadcast.
    #[must_use]
    pub fn queue(&self) -> &NotificationQueue {
        &self.queue
    }

    /// Applies one reading to the state machine.
    pub fn observe(&mut self, reading: SignalState) -> Observation {
        let Some(new) = reading.known() else {
            return Observation::Ignored;
        };
        let now = self.clock.now();
        let mut record = self.record.write().unwrap_or_else(PoisonError::into_inner);

        if self.baseline_pending {
            self.baseline_pending = false;
            *record = TransitionRecord { state: new, since: now };
            info!(state = %new, "baseline established");
            return Observation::Baseline(new);
        }
        if record.state == new {
            return Observation::Unchanged;
        }

        let from = record.state;
        let text = transition_message(new, record.elapsed_secs(now), &now.with_timezone(&Local));
        *record = TransitionRecord { state: new, since: now };
        let seq = self.queue.enqueue(text);
        drop(record);

        info!(%from, to = %new, seq, "signal transition");
        Observation::Transition { from, to: new, seq }
    }

    /// Broadcasts everything queued to the current subscribers.
    pub async fn deliver(&mut self) -> DeliveryReport {
        if self.queue.is_empty() {
            return DeliveryReport::default();
        }
        let recipients = self.registry.snapshot();
        let report = self.queue.drain_to(&*self.messenger, &recipients).await;
        info!(
            messages = report.messages,
            delivered = report.delivered,
            failed = report.failed,
            "notifications sent"
        );
        report
    }

    /// One poll cycle: probe, observe, deliver.
    pub async fn tick(&mut self) -> Observation {
        let reading = self.probe.probe().await;
        let observation = self.observe(reading);
        debug!(%reading, ?observation, "poll");
        self.deliver().await;
        observation
    }

    /// Polls every [`POLL_INTERVAL`] until `shutdown` flips to `true` or
    /// its sender goes away.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(POLL_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !*shutdown.borrow() {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = shutdown.changed() => {}
            }
            if shutdown.has_changed().is_err() {
                break;
            }
        }
        info!(pending = self.queue.len(), "monitor stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::scripted::{
        ManualClock, MemoryFileSystem, RecordingMessenger, ScriptedProbe,
    };
    use crate::ports::{FileSystem, RecipientId};
    use chrono::{TimeDelta, TimeZone, Utc};
    use std::path::Path;

    struct Rig {
        probe: Arc<ScriptedProbe>,
        clock: Arc<ManualClock>,
        messenger: Arc<RecordingMessenger>,
        registry: Arc<SubscriberRegistry>,
        ctx: ServiceContext,
    }

    fn rig(readings: &[SignalState]) -> Rig {
        let probe = Arc::new(ScriptedProbe::new(readings.iter().copied()));
        let clock =
            Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()));
        let messenger = Arc::new(RecordingMessenger::new());
        let fs: Arc<dyn FileSystem> = Arc::new(MemoryFileSystem::new());
        let registry = Arc::new(SubscriberRegistry::new(Arc::clone(&fs), Path::new("/ids.json")));
        let ctx = ServiceContext::new(clock.clone(), fs, probe.clone(), messenger.clone());
        Rig { probe, clock, messenger, registry, ctx }
    }

    #[tokio::test]
    async fn start_adopts_first_reading() {
        let rig = rig(&[SignalState::On]);
        let monitor = TransitionMonitor::start(&rig.ctx, rig.registry.clone()).await;
        let record = monitor.handle().snapshot();
        assert_eq!(record.state, PowerState::On);
        assert_eq!(record.since, rig.clock.now());
    }

    #[tokio::test]
    async fn unknown_never_transitions() {
        let rig = rig(&[SignalState::On]);
        let mut monitor = TransitionMonitor::start(&rig.ctx, rig.registry.clone()).await;
        let before = monitor.handle().snapshot();

        rig.clock.advance(TimeDelta::seconds(5));
        assert_eq!(monitor.observe(SignalState::Unknown), Observation::Ignored);
        assert_eq!(monitor.handle().snapshot(), before);
        assert!(monitor.queue().is_empty());
    }

    #[tokio::test]
    async fn same_reading_is_a_no_op() {
        let rig = rig(&[SignalState::Off]);
        let mut monitor = TransitionMonitor::start(&rig.ctx, rig.registry.clone()).await;
        rig.clock.advance(TimeDelta::seconds(5));
        assert_eq!(monitor.observe(SignalState::Off), Observation::Unchanged);
        assert!(monitor.queue().is_empty());
    }

    #[tokio::test]
    async fn change_updates_record_and_enqueues_once() {
        let rig = rig(&[SignalState::Off]);
        let mut monitor = TransitionMonitor::start(&rig.ctx, rig.registry.clone()).await;

        rig.clock.advance(TimeDelta::seconds(3_725));
        let observation = monitor.observe(SignalState::On);

        assert_eq!(
            observation,
            Observation::Transition { from: PowerState::Off, to: PowerState::On, seq: 0 }
        );
        let record = monitor.handle().snapshot();
        assert_eq!(record.state, PowerState::On);
        assert_eq!(record.since, rig.clock.now());
        let texts: Vec<&str> = monitor.queue().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].starts_with("💡 electricity turned on after 01:02:05 at "));
    }

    #[tokio::test]
    async fn unknown_start_adopts_next_known_reading_silently() {
        let rig = rig(&[SignalState::Unknown]);
        let mut monitor = TransitionMonitor::start(&rig.ctx, rig.registry.clone()).await;
        assert_eq!(monitor.handle().snapshot().state, PowerState::Off);

        rig.clock.advance(TimeDelta::seconds(10));
        assert_eq!(monitor.observe(SignalState::Unknown), Observation::Ignored);
        assert_eq!(monitor.observe(SignalState::On), Observation::Baseline(PowerState::On));
        assert!(monitor.queue().is_empty());
        assert_eq!(monitor.handle().snapshot().since, rig.clock.now());

        rig.clock.advance(TimeDelta::seconds(10));
        assert!(matches!(monitor.observe(SignalState::Off), Observation::Transition { .. }));
    }

    #[tokio::test]
    async fn tick_delivers_to_subscribers() {
        let rig = rig(&[SignalState::On, SignalState::Off]);
        rig.registry.add(RecipientId(1)).unwrap();
        rig.registry.add(RecipientId(2)).unwrap();
        let mut monitor = TransitionMonitor::start(&rig.ctx, rig.registry.clone()).await;

        rig.clock.advance(TimeDelta::seconds(65));
        let observation = monitor.tick().await;

        assert!(matches!(observation, Observation::Transition { to: PowerState::Off, .. }));
        assert!(monitor.queue().is_empty());
        for id in [1, 2] {
            let texts = rig.messenger.sent_to(RecipientId(id));
            assert_eq!(texts.len(), 1);
            assert!(texts[0].starts_with("🚫 electricity turned off after 00:01:05 at "));
        }
    }

    #[tokio::test]
    async fn delivery_failure_does_not_stop_polling() {
        let rig = rig(&[SignalState::On, SignalState::Off, SignalState::On]);
        rig.registry.add(RecipientId(1)).unwrap();
        rig.messenger.mark_unreachable(RecipientId(1));
        let mut monitor = TransitionMonitor::start(&rig.ctx, rig.registry.clone()).await;

        assert!(matches!(monitor.tick().await, Observation::Transition { .. }));
        assert!(matches!(monitor.tick().await, Observation::Transition { .. }));
        assert!(monitor.queue().is_empty());
        assert_eq!(rig.probe.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn run_polls_until_shutdown() {
        let rig = rig(&[SignalState::On]);
        rig.probe.set_fallback(SignalState::On);
        let monitor = TransitionMonitor::start(&rig.ctx, rig.registry.clone()).await;
        let (tx, rx) = watch::channel(false);

        let task = tokio::spawn(monitor.run(rx));
        tokio::time::sleep(POLL_INTERVAL * 3 + Duration::from_millis(100)).await;
        tx.send(true).unwrap();
        task.await.unwrap();

        // startup probe + immediate first tick + three interval ticks
        assert_eq!(rig.probe.calls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_when_sender_is_dropped() {
        let rig = rig(&[SignalState::Off]);
        let monitor = TransitionMonitor::start(&rig.ctx, rig.registry.clone()).await;
        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(monitor.run(rx));
        drop(tx);
        task.await.unwrap();
    }
}
