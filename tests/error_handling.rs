//! Error handling and edge case tests.

use aya_stream::{
    decode_frame, encode_frame, ChannelAdapter, ConnectionAdapter, Message, MessageUpdate, Millis,
    Source, StreamConfig, StreamError, StreamRunner, StreamView,
};

fn test_view() -> StreamView {
    StreamView::new("errors", &StreamConfig::default()).unwrap()
}

fn frame(tag: &str, id: &str) -> String {
    let update = MessageUpdate::new(Message::text(Source::Twitch, id, "viewer", "hello"));
    encode_frame(&update)
        .unwrap()
        .replace("\"update\":\"new\"", &format!("\"update\":\"{}\"", tag))
}

// --- Malformed Input ---

#[test]
fn test_unknown_tag_leaves_buffer_untouched() {
    let mut view = test_view();
    view.on_frame(&frame("new", "1"), Millis(0));
    let before = view.snapshot();

    assert!(!view.on_frame(&frame("pin", "1"), Millis(1)));
    assert!(!view.on_frame(&frame("pin", "2"), Millis(1)));

    assert_eq!(view.snapshot(), before);
}

#[test]
fn test_malformed_frame_is_skipped() {
    let mut view = test_view();

    assert!(!view.on_frame("{\"update\":", Millis(0)));
    assert!(!view.on_frame("[]", Millis(0)));
    assert!(view.on_frame(&frame("new", "1"), Millis(0)));
    assert_eq!(view.len(), 1);
}

#[test]
fn test_decode_reports_malformed_frame() {
    let result = decode_frame("{\"update\":\"new\",\"message\":{\"id\":\"1\"}}");
    assert!(matches!(result, Err(StreamError::Decode(_))));
}

#[test]
fn test_unknown_source_still_decodes() {
    let text = frame("new", "1").replace("\"twitch\"", "\"kick\"");
    let update = decode_frame(&text).unwrap().unwrap();
    assert_eq!(update.message.source, Source::Unknown("kick".to_string()));
}

// --- Unknown Ids ---

#[test]
fn test_edit_and_delete_of_unknown_id() {
    let mut view = test_view();
    view.on_frame(&frame("new", "1"), Millis(0));

    assert!(!view.on_frame(&frame("edit", "404"), Millis(1)));
    assert!(!view.on_frame(&frame("delete", "404"), Millis(1)));

    assert_eq!(view.len(), 1);
    assert!(view.find("404").is_none());
}

#[test]
fn test_double_delete_matches_single_delete() {
    let mut once = test_view();
    let mut twice = test_view();

    for view in [&mut once, &mut twice] {
        view.on_frame(&frame("new", "1"), Millis(0));
        view.on_frame(&frame("delete", "1"), Millis(1));
    }
    twice.on_frame(&frame("delete", "1"), Millis(2));

    assert_eq!(once.snapshot().entries, twice.snapshot().entries);
}

#[test]
fn test_stale_timers_after_early_removal() {
    let mut view = StreamView::new("tiny", &StreamConfig::default().with_max_messages(2)).unwrap();
    for id in ["1", "2", "3", "4"] {
        view.on_frame(&frame("new", id), Millis(0));
    }

    // Only the two survivors have timers left to fire
    assert_eq!(view.pending_timers(), 4);
    view.advance_to(Millis(u64::MAX));
    assert!(view.is_empty());
}

// --- Configuration ---

#[test]
fn test_invalid_config_rejected() {
    let zero_timeout = StreamConfig {
        display_timeout_ms: 0,
        ..Default::default()
    };
    assert!(matches!(
        StreamView::new("s", &zero_timeout),
        Err(StreamError::InvalidConfig(_))
    ));

    let adapter = ChannelAdapter::new();
    adapter.feed("s");
    let result = StreamRunner::spawn(&adapter, "s", StreamConfig::default().with_max_messages(0));
    assert!(matches!(result, Err(StreamError::InvalidConfig(_))));

    // No subscription was taken
    assert!(!adapter.is_subscribed("s"));
}

// --- Adapter ---

#[test]
fn test_runner_for_unknown_stream() {
    let adapter = ChannelAdapter::new();
    let result = StreamRunner::spawn(&adapter, "missing", StreamConfig::default());
    assert!(matches!(result, Err(StreamError::StreamNotFound(_))));
}

#[test]
fn test_adapter_trait_object() {
    let adapter: Box<dyn ConnectionAdapter> = Box::new(ChannelAdapter::new());
    assert!(adapter.subscribe("anything").is_err());
}
