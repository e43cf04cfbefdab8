//! Enacts reducer effects against the timer queue.

use crate::buffer::MessageBuffer;
use crate::lifecycle::timers::{Timer, TimerQueue};
use crate::reducer::Effect;
use crate::types::Millis;
use tracing::trace;

/// Owns the pending lifecycle timers of one stream.
///
/// Handles are mirrored into the buffer slot of the entry they belong to,
/// so an entry leaving the buffer always hands back exactly the timers
/// that must be cancelled.
#[derive(Default)]
pub struct LifecycleScheduler {
    queue: TimerQueue,
}

impl LifecycleScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enact the effects of one reduction performed at `now`.
    pub fn enact(&mut self, buffer: &mut MessageBuffer, now: Millis, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Schedule { key, kind, after } => {
                    let deadline = now + after;
                    let id = self.queue.schedule(key.clone(), kind, deadline);

                    match buffer.attach_timer(&key, kind, id) {
                        Ok(replaced) => {
                            trace!(?key, ?kind, ?deadline, "scheduled timer");
                            if let Some(previous) = replaced {
                                self.queue.cancel(previous);
                            }
                        }
                        Err(orphan) => {
                            // Entry left the buffer within the same reduction
                            self.queue.cancel(orphan);
                        }
                    }
                }
                Effect::Cancel { key, timers } => {
                    for id in timers.ids() {
                        if self.queue.cancel(id) {
                            trace!(?key, ?id, "cancelled timer");
                        }
                    }
                }
            }
        }
    }

    /// Pop the next timer due at `now`, detaching it from its entry.
    pub fn pop_due(&mut self, buffer: &mut MessageBuffer, now: Millis) -> Option<Timer> {
        let timer = self.queue.pop_due(now)?;
        buffer.detach_timer(&timer.key, timer.kind, timer.id);
        trace!(key = ?timer.key, kind = ?timer.kind, deadline = ?timer.deadline, "timer fired");
        Some(timer)
    }

    pub fn next_deadline(&mut self) -> Option<Millis> {
        self.queue.next_deadline()
    }

    /// Number of pending timers.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Cancel every pending timer, also forgetting the handles held by
    /// the buffer. Returns how many were pending.
    pub fn cancel_all(&mut self, buffer: &mut MessageBuffer) -> usize {
        buffer.clear_timers();
        self.queue.clear()
    }
}
