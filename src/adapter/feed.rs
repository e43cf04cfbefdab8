//! Feed types handed from a connection adapter to a stream.

use crate::types::MessageUpdate;
use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use std::fmt;

/// State of the transport behind a feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connecting,
    Open,
    Closing,
    Closed,
    Failed(String),
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Connecting => f.write_str("Connecting"),
            ConnectionStatus::Open => f.write_str("Open"),
            ConnectionStatus::Closing => f.write_str("Closing"),
            ConnectionStatus::Closed => f.write_str("Closed"),
            ConnectionStatus::Failed(reason) => write!(f, "Failed: {}", reason),
        }
    }
}

/// One item of a feed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedEvent {
    /// An already-decoded update.
    Update(MessageUpdate),
    /// A raw text frame, decoded by the stream.
    Frame(String),
    /// The transport changed state.
    Status(ConnectionStatus),
}

/// A live subscription to one stream's updates.
///
/// The sequence ends when the sending side goes away. Dropping the feed
/// releases the subscription.
pub struct Feed {
    stream_id: String,
    receiver: Receiver<FeedEvent>,
}

impl Feed {
    pub fn new(stream_id: impl Into<String>, receiver: Receiver<FeedEvent>) -> Self {
        Self {
            stream_id: stream_id.into(),
            receiver,
        }
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn receiver(&self) -> &Receiver<FeedEvent> {
        &self.receiver
    }

    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<FeedEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<FeedEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }
}

impl fmt::Debug for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feed")
            .field("stream_id", &self.stream_id)
            .field("queued", &self.receiver.len())
            .finish()
    }
}
