//! Bounded, insertion-ordered entry store.

use crate::buffer::entry::{DisplayEntry, EntryKey, EntryTimers, Phase};
use crate::lifecycle::{TimerId, TimerKind};
use crate::types::MessageId;
use lru::LruCache;
use tracing::debug;

/// An entry together with the timers pending for it.
#[derive(Clone, Debug)]
struct Slot {
    entry: DisplayEntry,
    timers: EntryTimers,
}

/// An entry that left the buffer, with the timers that were still pending
/// for it. The caller is responsible for cancelling those.
#[derive(Clone, Debug)]
pub struct Removed {
    pub entry: DisplayEntry,
    pub timers: EntryTimers,
}

impl Removed {
    fn from_slot(mut slot: Slot) -> Self {
        slot.entry.phase = Phase::Deleted;
        Self {
            entry: slot.entry,
            timers: slot.timers,
        }
    }
}

/// Outcome of [`MessageBuffer::insert`].
#[derive(Debug)]
pub enum Insert {
    /// Appended; the oldest entry was evicted if capacity was exceeded.
    Added { evicted: Option<Removed> },
    /// An entry with this id is already resident; nothing changed.
    Duplicate(DisplayEntry),
}

/// Ordered collection of display entries keyed by message id.
///
/// Entries are kept oldest-first in insertion order and never re-sorted.
/// The backing `LruCache` is used purely as an ordered hash map: entries
/// are only ever peeked, so recency equals insertion order and the
/// least-recently-used entry is always the oldest one.
pub struct MessageBuffer {
    slots: LruCache<MessageId, Slot>,
    max_messages: usize,
    next_generation: u64,
}

impl MessageBuffer {
    /// Create an empty buffer holding at most `max_messages` entries.
    pub fn new(max_messages: usize) -> Self {
        Self {
            slots: LruCache::unbounded(),
            max_messages: max_messages.max(1),
            next_generation: 1,
        }
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Allocate a key for a new entry with this id.
    pub fn next_key(&mut self, id: MessageId) -> EntryKey {
        let generation = self.next_generation;
        self.next_generation += 1;
        EntryKey::new(id, generation)
    }

    /// Append an entry as the newest.
    ///
    /// If that takes the buffer over capacity the single oldest entry is
    /// evicted and handed back.
    pub fn insert(&mut self, entry: DisplayEntry) -> Insert {
        if let Some(existing) = self.slots.peek(entry.id()) {
            return Insert::Duplicate(existing.entry.clone());
        }

        self.slots.put(
            entry.id().clone(),
            Slot {
                entry,
                timers: EntryTimers::default(),
            },
        );

        let evicted = if self.slots.len() > self.max_messages {
            self.remove_oldest()
        } else {
            None
        };

        if let Some(removed) = &evicted {
            debug!(key = ?removed.entry.key, "evicted oldest entry over capacity");
        }

        Insert::Added { evicted }
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.slots.contains(id)
    }

    pub fn find_by_id(&self, id: &MessageId) -> Option<&DisplayEntry> {
        self.slots.peek(id).map(|slot| &slot.entry)
    }

    pub fn find_by_id_mut(&mut self, id: &MessageId) -> Option<&mut DisplayEntry> {
        self.slots.peek_mut(id).map(|slot| &mut slot.entry)
    }

    /// Look up an entry by key. A resident entry with the same id but a
    /// different generation does not match.
    pub fn find_by_key_mut(&mut self, key: &EntryKey) -> Option<&mut DisplayEntry> {
        self.slots
            .peek_mut(&key.id)
            .filter(|slot| slot.entry.key.generation == key.generation)
            .map(|slot| &mut slot.entry)
    }

    /// The oldest resident entry.
    pub fn oldest(&self) -> Option<&DisplayEntry> {
        self.slots.peek_lru().map(|(_, slot)| &slot.entry)
    }

    pub fn remove_oldest(&mut self) -> Option<Removed> {
        self.slots.pop_lru().map(|(_, slot)| Removed::from_slot(slot))
    }

    pub fn remove_by_id(&mut self, id: &MessageId) -> Option<Removed> {
        self.slots.pop(id).map(Removed::from_slot)
    }

    /// Remove an entry only if it is still the generation `key` refers to.
    pub fn remove_by_key(&mut self, key: &EntryKey) -> Option<Removed> {
        let matches = self
            .slots
            .peek(&key.id)
            .is_some_and(|slot| slot.entry.key.generation == key.generation);

        if matches {
            self.remove_by_id(&key.id)
        } else {
            None
        }
    }

    /// All resident entries, oldest first.
    pub fn all(&self) -> impl Iterator<Item = &DisplayEntry> + '_ {
        self.slots.iter().rev().map(|(_, slot)| &slot.entry)
    }

    /// Owned copy of all resident entries, oldest first.
    pub fn entries(&self) -> Vec<DisplayEntry> {
        self.all().cloned().collect()
    }

    // --- Timer Handles ---

    /// Record a pending timer against an entry.
    ///
    /// Returns the handle this one replaced, which the caller must cancel,
    /// or hands `id` back as an error if the entry is gone.
    pub fn attach_timer(
        &mut self,
        key: &EntryKey,
        kind: TimerKind,
        id: TimerId,
    ) -> Result<Option<TimerId>, TimerId> {
        match self.slots.peek_mut(&key.id) {
            Some(slot) if slot.entry.key.generation == key.generation => {
                Ok(slot.timers.set(kind, id))
            }
            _ => Err(id),
        }
    }

    /// Forget a timer that has fired.
    pub fn detach_timer(&mut self, key: &EntryKey, kind: TimerKind, id: TimerId) -> bool {
        match self.slots.peek_mut(&key.id) {
            Some(slot) if slot.entry.key.generation == key.generation => {
                slot.timers.clear(kind, id)
            }
            _ => false,
        }
    }

    pub fn timers(&self, id: &MessageId) -> Option<EntryTimers> {
        self.slots.peek(id).map(|slot| slot.timers)
    }

    /// Forget every timer handle, leaving entries in place.
    pub fn clear_timers(&mut self) {
        for (_, slot) in self.slots.iter_mut() {
            slot.timers = EntryTimers::default();
        }
    }

    /// Remove every entry, oldest first.
    pub fn drain(&mut self) -> Vec<Removed> {
        let mut removed = Vec::with_capacity(self.slots.len());
        while let Some(entry) = self.remove_oldest() {
            removed.push(entry);
        }
        removed
    }
}
