//! End-to-end monitor scenarios driven through the scripted adapters.

use std::path::Path;
use std::sync::Arc;
use std::thread;

use chrono::{TimeDelta, TimeZone, Utc};

use gridwatch::adapters::scripted::{
    ManualClock, MemoryFileSystem, RecordingMessenger, ScriptedProbe,
};
use gridwatch::context::ServiceContext;
use gridwatch::monitor::{Observation, TransitionMonitor};
use gridwatch::ports::{Clock, FileSystem, RecipientId};
use gridwatch::signal::{PowerState, SignalState};
use gridwatch::store::SubscriberRegistry;

struct Harness {
    clock: Arc<ManualClock>,
    messenger: Arc<RecordingMessenger>,
    registry: Arc<SubscriberRegistry>,
    ctx: ServiceContext,
}

fn harness(readings: Vec<SignalState>) -> Harness {
    let probe = Arc::new(ScriptedProbe::new(readings));
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 12, 24, 18, 0, 0).unwrap()));
    let messenger = Arc::new(RecordingMessenger::new());
    let fs: Arc<dyn FileSystem> = Arc::new(MemoryFileSystem::new());
    let registry = Arc::new(SubscriberRegistry::new(Arc::clone(&fs), Path::new("/ids.json")));
    let ctx = ServiceContext::new(clock.clone(), fs, probe, messenger.clone());
    Harness { clock, messenger, registry, ctx }
}

#[tokio::test]
async fn flapping_sequence_yields_exactly_two_notifications() {
    use SignalState::{Off, On, Unknown};

    // First reading is consumed by startup.
    let h = harness(vec![On, On, Off, Unknown, Off, On]);
    h.registry.add(RecipientId(100)).unwrap();
    let mut monitor = TransitionMonitor::start(&h.ctx, h.registry.clone()).await;

    let mut observations = Vec::new();
    for _ in 0..5 {
        h.clock.advance(TimeDelta::seconds(5));
        observations.push(monitor.tick().await);
    }

    assert_eq!(observations[0], Observation::Unchanged);
    assert_eq!(
        observations[1],
        Observation::Transition { from: PowerState::On, to: PowerState::Off, seq: 0 }
    );
    assert_eq!(observations[2], Observation::Ignored);
    assert_eq!(observations[3], Observation::Unchanged);
    assert_eq!(
        observations[4],
        Observation::Transition { from: PowerState::Off, to: PowerState::On, seq: 1 }
    );

    let texts = h.messenger.sent_to(RecipientId(100));
    assert_eq!(texts.len(), 2);
    // Startup at t0, Off at t0+10s, On at t0+25s: the Unknown tick does not reset the clock.
    assert!(texts[0].starts_with("🚫 electricity turned off after 00:00:10 at "));
    assert!(texts[1].starts_with("💡 electricity turned on after 00:00:15 at "));
}

#[tokio::test]
async fn late_subscriber_only_gets_later_messages_in_order() {
    use SignalState::{Off, On};

    let h = harness(vec![On, Off, On, Off]);
    h.registry.add(RecipientId(1)).unwrap();
    let mut monitor = TransitionMonitor::start(&h.ctx, h.registry.clone()).await;

    monitor.tick().await;
    h.registry.add(RecipientId(2)).unwrap();
    monitor.tick().await;
    monitor.tick().await;

    let first = h.messenger.sent_to(RecipientId(1));
    let second = h.messenger.sent_to(RecipientId(2));
    assert_eq!(first.len(), 3);
    assert_eq!(second, first[1..].to_vec());
    assert!(first[0].contains("turned off"));
    assert!(first[1].contains("turned on"));
    assert!(first[2].contains("turned off"));
}

#[tokio::test]
async fn status_reader_never_sees_a_torn_record() {
    let h = harness(vec![SignalState::On]);
    let start = h.clock.now();
    let mut monitor = TransitionMonitor::start(&h.ctx, h.registry.clone()).await;
    let handle = monitor.handle();

    // Even offsets from `start` are On, odd offsets are Off; a mixed pair
    // would break the parity.
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let handle = handle.clone();
            thread::spawn(move || {
                for _ in 0..20_000 {
                    let record = handle.snapshot();
                    let offset = (record.since - start).num_seconds();
                    let expect_on = offset % 2 == 0;
                    assert_eq!(record.state == PowerState::On, expect_on, "torn read: {record:?}");
                }
            })
        })
        .collect();

    for i in 1..=2_000 {
        h.clock.advance(TimeDelta::seconds(1));
        let next = if i % 2 == 0 { SignalState::On } else { SignalState::Off };
        assert!(matches!(monitor.observe(next), Observation::Transition { .. }));
    }

    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(monitor.queue().len(), 2_000);
}
