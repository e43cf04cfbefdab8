//! Display entries tracked by the buffer.

use crate::lifecycle::{TimerId, TimerKind};
use crate::types::{Message, MessageId, Millis};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one resident entry.
///
/// The generation distinguishes an entry from a later one re-using the
/// same message id, so timers bound to an evicted entry can never touch
/// its successor.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryKey {
    pub id: MessageId,
    pub generation: u64,
}

impl EntryKey {
    pub fn new(id: MessageId, generation: u64) -> Self {
        Self { id, generation }
    }
}

impl fmt::Debug for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryKey({}#{})", self.id, self.generation)
    }
}

/// Lifecycle phase of an entry.
///
/// `Init -> Loaded -> Removing` while resident. `Deleted` is terminal and
/// only ever seen on entries that have left the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Init,
    Loaded,
    Removing,
    Deleted,
}

/// A message as tracked for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayEntry {
    pub key: EntryKey,
    pub message: Message,
    pub phase: Phase,
    /// Content was replaced by an edit.
    pub edited: bool,
    /// A delete arrived; content must not be shown any more.
    pub delete_requested: bool,
    /// When the entry was created, on the stream clock.
    pub created_at: Millis,
}

impl DisplayEntry {
    pub fn new(key: EntryKey, message: Message, created_at: Millis) -> Self {
        Self {
            key,
            message,
            phase: Phase::Init,
            edited: false,
            delete_requested: false,
            created_at,
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.key.id
    }

    /// Whether the projection must hide the message content.
    pub fn is_hidden(&self) -> bool {
        self.delete_requested
    }
}

/// Handles of the timers currently pending for one entry, at most one of
/// each kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntryTimers {
    pub settle: Option<TimerId>,
    pub fade: Option<TimerId>,
    pub destroy: Option<TimerId>,
}

impl EntryTimers {
    fn slot(&mut self, kind: TimerKind) -> &mut Option<TimerId> {
        match kind {
            TimerKind::Settle => &mut self.settle,
            TimerKind::Fade => &mut self.fade,
            TimerKind::Destroy => &mut self.destroy,
        }
    }

    /// Record a timer, returning the one it replaces.
    pub fn set(&mut self, kind: TimerKind, id: TimerId) -> Option<TimerId> {
        self.slot(kind).replace(id)
    }

    /// Forget a timer if it is still the one recorded for its kind.
    pub fn clear(&mut self, kind: TimerKind, id: TimerId) -> bool {
        let slot = self.slot(kind);
        if *slot == Some(id) {
            *slot = None;
            true
        } else {
            false
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = TimerId> {
        [self.settle, self.fade, self.destroy].into_iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.ids().next().is_none()
    }
}
