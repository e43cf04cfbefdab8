//! Threaded runner tests with short real-time timeouts.

use aya_stream::{
    ChannelAdapter, ConnectionStatus, DropReason, FeedSender, Message, MessageUpdate, Phase,
    Snapshot, Source, StreamConfig, StreamRunner, TestSource, TestSourceSettings, ViewEvent,
    ViewSubscription,
};
use std::time::{Duration, Instant};

const WAIT: Duration = Duration::from_secs(5);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn start(config: StreamConfig) -> (ChannelAdapter, FeedSender, StreamRunner) {
    init_tracing();
    let adapter = ChannelAdapter::new();
    let sender = adapter.feed("live");
    let runner = StreamRunner::spawn(&adapter, "live", config).unwrap();
    (adapter, sender, runner)
}

fn update(id: &str) -> MessageUpdate {
    MessageUpdate::new(Message::text(Source::Twitch, id, "viewer", "hello"))
}

/// Wait for a published snapshot matching `check`.
fn wait_for(subscription: &ViewSubscription, check: impl Fn(&Snapshot) -> bool) -> Snapshot {
    let deadline = Instant::now() + WAIT;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match subscription.recv_timeout(remaining) {
            Ok(ViewEvent::Snapshot { snapshot }) if check(&snapshot) => return snapshot,
            Ok(ViewEvent::Dropped { reason }) => panic!("Subscription dropped: {:?}", reason),
            Ok(_) => {}
            Err(e) => panic!("Timed out waiting for snapshot: {:?}", e),
        }
    }
}

#[test]
fn test_entries_expire_on_their_own() {
    let config = StreamConfig::default().with_display_timeout(Duration::from_millis(200));
    let (_adapter, sender, runner) = start(config);
    let subscription = runner.subscribe();

    sender.send(update("a")).unwrap();

    wait_for(&subscription, |s| s.len() == 1);
    wait_for(&subscription, |s| {
        s.find("a").is_some_and(|e| e.phase == Phase::Loaded)
    });
    wait_for(&subscription, |s| {
        s.find("a").is_some_and(|e| e.phase == Phase::Removing)
    });
    let last = wait_for(&subscription, |s| s.is_empty());

    assert!(last.version >= 4);
    runner.shutdown().unwrap();
}

#[test]
fn test_frames_and_updates_apply_in_order() {
    let (_adapter, sender, runner) = start(StreamConfig::default().with_max_messages(3));
    let subscription = runner.subscribe();

    for id in ["1", "2", "3", "4"] {
        sender.send(update(id)).unwrap();
    }
    let frame = aya_stream::encode_frame(&MessageUpdate::delete(Message::text(
        Source::Twitch,
        "3",
        "viewer",
        "",
    )))
    .unwrap();
    sender.send_frame(frame).unwrap();
    sender.send_frame("not a frame").unwrap();

    let snapshot = wait_for(&subscription, |s| {
        s.find("3").is_some_and(|e| e.delete_requested)
    });

    let ids: Vec<_> = snapshot.ids().iter().map(|id| id.to_string()).collect();
    assert_eq!(ids, vec!["2", "3", "4"]);
    assert_eq!(runner.snapshot().len(), 3);

    runner.shutdown().unwrap();
}

#[test]
fn test_disconnect_keeps_entries() {
    let (_adapter, sender, runner) = start(StreamConfig::default());
    let subscription = runner.subscribe();

    sender.send(update("kept")).unwrap();
    wait_for(&subscription, |s| s.len() == 1);

    sender
        .set_status(ConnectionStatus::Failed("socket reset".to_string()))
        .unwrap();
    sender.close();

    let deadline = Instant::now() + WAIT;
    while !matches!(runner.status(), ConnectionStatus::Failed(_)) {
        assert!(Instant::now() < deadline, "status never reported");
        std::thread::sleep(Duration::from_millis(5));
    }

    assert_eq!(runner.snapshot().len(), 1);
    assert!(runner.is_running());
    runner.shutdown().unwrap();
}

#[test]
fn test_closed_feed_reports_closed() {
    let (_adapter, sender, runner) = start(StreamConfig::default());
    let subscription = runner.subscribe();

    sender.close();

    let deadline = Instant::now() + WAIT;
    loop {
        match subscription.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(ViewEvent::Status { status }) if status == ConnectionStatus::Closed => break,
            Ok(_) => {}
            Err(e) => panic!("Expected Closed status, got {:?}", e),
        }
    }

    assert_eq!(runner.status(), ConnectionStatus::Closed);
}

#[test]
fn test_shutdown_releases_everything() {
    let (adapter, sender, runner) = start(StreamConfig::default());
    let subscription = runner.subscribe();

    sender.send(update("a")).unwrap();
    wait_for(&subscription, |s| s.len() == 1);
    assert!(adapter.is_subscribed("live"));

    runner.shutdown().unwrap();

    // Feed released, subscribers told
    assert!(sender.send(update("b")).is_err());
    assert!(!adapter.is_subscribed("live"));

    let mut saw_shutdown = false;
    while let Ok(event) = subscription.try_recv() {
        if let ViewEvent::Dropped { reason } = event {
            assert_eq!(reason, DropReason::Shutdown);
            saw_shutdown = true;
        }
    }
    assert!(saw_shutdown);
}

#[test]
fn test_subscribe_starts_with_current_snapshot() {
    let (_adapter, sender, runner) = start(StreamConfig::default());
    let first = runner.subscribe();

    sender.send(update("a")).unwrap();
    wait_for(&first, |s| s.len() == 1);

    let late = runner.subscribe();
    match late.recv_timeout(WAIT).unwrap() {
        ViewEvent::Snapshot { snapshot } => assert_eq!(snapshot.len(), 1),
        other => panic!("Expected Snapshot event, got {:?}", other),
    }

    runner.unsubscribe(late.id);
    assert_eq!(runner.subscriber_count(), 1);
}

#[test]
fn test_with_synthetic_source() {
    let config = StreamConfig::default().with_display_timeout(Duration::from_millis(200));
    let (_adapter, sender, runner) = start(config);
    let subscription = runner.subscribe();

    let source = TestSource::spawn(
        sender,
        TestSourceSettings {
            interval: Duration::from_millis(10),
            delete_after: Duration::from_millis(30),
        },
    )
    .unwrap();

    wait_for(&subscription, |s| s.find("0").is_some_and(|e| e.delete_requested));
    wait_for(&subscription, |s| s.len() >= 3);

    assert!(source.stop() >= 3);
    runner.shutdown().unwrap();
}
