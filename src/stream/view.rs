//! Single owner of one stream's buffer and timers.

use crate::adapter::ConnectionStatus;
use crate::buffer::{DisplayEntry, MessageBuffer};
use crate::config::{LifecycleTimings, StreamConfig};
use crate::error::Result;
use crate::lifecycle::LifecycleScheduler;
use crate::reducer::{reduce, Mutation};
use crate::types::{MessageId, MessageUpdate, Millis};
use crate::wire::decode_frame;
use tracing::{debug, warn};

use super::types::Snapshot;

/// The live view of one chat stream.
///
/// Every change goes through [`StreamView::apply`]: incoming updates and
/// fired timers alike. Time is passed in explicitly, so a caller owning the
/// view decides what the clock is (wall time in the runner, a counter in
/// tests).
pub struct StreamView {
    stream_id: String,
    timings: LifecycleTimings,
    buffer: MessageBuffer,
    scheduler: LifecycleScheduler,
    status: ConnectionStatus,
    version: u64,
    torn_down: bool,
}

impl StreamView {
    pub fn new(stream_id: impl Into<String>, config: &StreamConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            stream_id: stream_id.into(),
            timings: config.timings(),
            buffer: MessageBuffer::new(config.max_messages),
            scheduler: LifecycleScheduler::new(),
            status: ConnectionStatus::Connecting,
            version: 0,
            torn_down: false,
        })
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn timings(&self) -> &LifecycleTimings {
        &self.timings
    }

    /// Apply one mutation at `now`. Returns whether the visible state changed.
    pub fn apply(&mut self, mutation: Mutation, now: Millis) -> bool {
        if self.torn_down {
            debug!(stream_id = %self.stream_id, "ignoring mutation after teardown");
            return false;
        }

        let reduction = reduce(&mut self.buffer, &self.timings, now, mutation);
        self.scheduler.enact(&mut self.buffer, now, reduction.effects);

        if reduction.changed {
            self.version += 1;
        }
        reduction.changed
    }

    pub fn on_update(&mut self, update: MessageUpdate, now: Millis) -> bool {
        self.apply(Mutation::Update(update), now)
    }

    /// Decode and apply a raw frame. Undecodable frames are logged and
    /// skipped.
    pub fn on_frame(&mut self, frame: &str, now: Millis) -> bool {
        match decode_frame(frame) {
            Ok(Some(update)) => self.on_update(update, now),
            Ok(None) => false,
            Err(e) => {
                warn!(stream_id = %self.stream_id, error = %e, "skipping malformed frame");
                false
            }
        }
    }

    /// Fire every timer due at or before `now`, in deadline order.
    pub fn advance_to(&mut self, now: Millis) -> bool {
        let mut changed = false;

        while let Some(timer) = self.scheduler.pop_due(&mut self.buffer, now) {
            let mutation = Mutation::Timer {
                key: timer.key,
                kind: timer.kind,
            };
            changed |= self.apply(mutation, timer.deadline);
        }

        changed
    }

    /// When the next timer is due.
    pub fn next_deadline(&mut self) -> Option<Millis> {
        self.scheduler.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    /// Record a transport state change. Entries are left untouched.
    pub fn set_status(&mut self, status: ConnectionStatus) -> bool {
        if self.status == status {
            return false;
        }
        if let ConnectionStatus::Failed(reason) = &status {
            warn!(stream_id = %self.stream_id, %reason, "connection failed; keeping last entries");
        }
        self.status = status;
        true
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    /// Cancel every pending timer and stop accepting mutations.
    pub fn teardown(&mut self) -> usize {
        self.torn_down = true;
        let cancelled = self.scheduler.cancel_all(&mut self.buffer);
        debug!(stream_id = %self.stream_id, cancelled, "stream view torn down");
        cancelled
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // --- Reads ---

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&DisplayEntry> {
        self.buffer.find_by_id(&MessageId::from(id))
    }

    /// Resident entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &DisplayEntry> + '_ {
        self.buffer.all()
    }

    /// Number of accepted changes so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            stream_id: self.stream_id.clone(),
            version: self.version,
            entries: self.buffer.entries(),
            status: self.status.clone(),
        }
    }
}
