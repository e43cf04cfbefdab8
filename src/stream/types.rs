//! Types shared between a stream and its render subscribers.

use crate::adapter::ConnectionStatus;
use crate::buffer::DisplayEntry;
use crate::types::MessageId;
use serde::{Deserialize, Serialize};

/// The visible state of a stream at one point in time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub stream_id: String,
    /// Increases by one with every accepted change.
    pub version: u64,
    /// Resident entries, oldest first.
    pub entries: Vec<DisplayEntry>,
    pub status: ConnectionStatus,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&DisplayEntry> {
        self.entries.iter().find(|e| e.id().as_str() == id)
    }

    pub fn ids(&self) -> Vec<MessageId> {
        self.entries.iter().map(|e| e.id().clone()).collect()
    }
}

/// Events delivered to render subscribers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewEvent {
    /// Entries changed.
    Snapshot { snapshot: Snapshot },

    /// Transport state changed. Entries are kept as they are.
    Status { status: ConnectionStatus },

    /// Subscription was dropped.
    Dropped { reason: DropReason },
}

/// Why a render subscription was dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// Explicitly unsubscribed.
    Unsubscribed,
    /// The stream was torn down.
    Shutdown,
}

/// Unique identifier for a render subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle to a render subscription.
pub struct ViewSubscription {
    pub id: SubscriptionId,
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<ViewEvent>,
}

impl ViewSubscription {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<ViewEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<ViewEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<ViewEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}
