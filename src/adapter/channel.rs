//! In-memory connection adapter.
//!
//! Anything that can push updates (a websocket reader, a test, the
//! synthetic test source) writes through a [`FeedSender`]; streams
//! subscribe through the [`ConnectionAdapter`] trait as usual.

use crate::adapter::feed::{ConnectionStatus, Feed, FeedEvent};
use crate::adapter::ConnectionAdapter;
use crate::error::{Result, StreamError};
use crate::types::MessageUpdate;
use crossbeam_channel::{unbounded, Sender};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Registered streams and the sender of their current subscription.
#[derive(Default)]
struct Streams {
    current: RwLock<HashMap<String, Option<Sender<FeedEvent>>>>,
}

/// Connection adapter backed by in-process channels.
#[derive(Clone, Default)]
pub struct ChannelAdapter {
    streams: Arc<Streams>,
}

impl ChannelAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stream and get the sending side for it.
    ///
    /// Registering an already-known stream returns another sender for it.
    pub fn feed(&self, stream_id: impl Into<String>) -> FeedSender {
        let stream_id = stream_id.into();
        self.streams
            .current
            .write()
            .entry(stream_id.clone())
            .or_insert(None);

        FeedSender {
            stream_id,
            streams: Arc::clone(&self.streams),
        }
    }

    /// Whether a stream currently has a live subscriber.
    pub fn is_subscribed(&self, stream_id: &str) -> bool {
        self.streams
            .current
            .read()
            .get(stream_id)
            .and_then(|slot| slot.as_ref())
            .is_some()
    }
}

impl ConnectionAdapter for ChannelAdapter {
    /// Start a fresh sequence for `stream_id`, ending any previous one.
    fn subscribe(&self, stream_id: &str) -> Result<Feed> {
        let mut streams = self.streams.current.write();
        let slot = streams
            .get_mut(stream_id)
            .ok_or_else(|| StreamError::StreamNotFound(stream_id.to_string()))?;

        let (sender, receiver) = unbounded();
        // Nobody is listening yet, so this cannot fail
        let _ = sender.send(FeedEvent::Status(ConnectionStatus::Open));

        if slot.replace(sender).is_some() {
            debug!(stream_id, "replaced previous subscription");
        }

        Ok(Feed::new(stream_id, receiver))
    }
}

/// Sending side of one stream of a [`ChannelAdapter`].
#[derive(Clone)]
pub struct FeedSender {
    stream_id: String,
    streams: Arc<Streams>,
}

impl FeedSender {
    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    /// Deliver an update to the current subscriber.
    pub fn send(&self, update: MessageUpdate) -> Result<()> {
        self.send_event(FeedEvent::Update(update))
    }

    /// Deliver a raw text frame to the current subscriber.
    pub fn send_frame(&self, frame: impl Into<String>) -> Result<()> {
        self.send_event(FeedEvent::Frame(frame.into()))
    }

    /// Report a transport state change to the current subscriber.
    pub fn set_status(&self, status: ConnectionStatus) -> Result<()> {
        self.send_event(FeedEvent::Status(status))
    }

    /// End the current sequence. The subscriber sees the feed close.
    pub fn close(&self) {
        if let Some(slot) = self.streams.current.write().get_mut(&self.stream_id) {
            slot.take();
        }
    }

    /// Deliver an event, failing with `Disconnected` when nobody listens.
    pub fn send_event(&self, event: FeedEvent) -> Result<()> {
        let mut streams = self.streams.current.write();
        let slot = streams
            .get_mut(&self.stream_id)
            .ok_or_else(|| StreamError::StreamNotFound(self.stream_id.clone()))?;

        let sender = slot.as_ref().ok_or(StreamError::Disconnected)?;
        if sender.send(event).is_err() {
            // Subscriber dropped its feed
            slot.take();
            return Err(StreamError::Disconnected);
        }
        Ok(())
    }
}
