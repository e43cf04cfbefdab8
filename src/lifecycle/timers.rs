//! Cancellable one-shot timers on the stream clock.

use crate::buffer::EntryKey;
use crate::types::Millis;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;

/// Handle of a scheduled timer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

impl fmt::Debug for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimerId({})", self.0)
    }
}

/// Which lifecycle transition a timer drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// `Init -> Loaded`.
    Settle,
    /// `Loaded -> Removing`.
    Fade,
    /// Removal from the buffer after fading.
    Destroy,
}

/// A timer due for an entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timer {
    pub id: TimerId,
    pub key: EntryKey,
    pub kind: TimerKind,
    pub deadline: Millis,
}

/// Deadline-ordered timer queue.
///
/// Cancellation is O(1): the timer is forgotten immediately and its heap
/// slot is discarded lazily when it reaches the top. Timers sharing a
/// deadline fire in the order they were scheduled.
#[derive(Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<(Millis, TimerId)>>,
    live: HashMap<TimerId, Timer>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, key: EntryKey, kind: TimerKind, deadline: Millis) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);

        self.heap.push(Reverse((deadline, id)));
        self.live.insert(
            id,
            Timer {
                id,
                key,
                kind,
                deadline,
            },
        );

        id
    }

    /// Cancel a pending timer. Returns false if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.live.remove(&id).is_some()
    }

    /// Earliest deadline among pending timers.
    pub fn next_deadline(&mut self) -> Option<Millis> {
        self.discard_cancelled();
        self.heap.peek().map(|Reverse((deadline, _))| *deadline)
    }

    /// Pop the earliest timer if it is due at `now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<Timer> {
        self.discard_cancelled();

        let Reverse((deadline, id)) = *self.heap.peek()?;
        if deadline > now {
            return None;
        }

        self.heap.pop();
        self.live.remove(&id)
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Cancel everything. Returns how many timers were pending.
    pub fn clear(&mut self) -> usize {
        let pending = self.live.len();
        self.live.clear();
        self.heap.clear();
        pending
    }

    fn discard_cancelled(&mut self) {
        while let Some(Reverse((_, id))) = self.heap.peek() {
            if self.live.contains_key(id) {
                break;
            }
            self.heap.pop();
        }
    }
}
