//! Message buffer: the bounded, ordered set of entries on display.
//!
//! - Insertion order is display order (oldest first)
//! - At most `max_messages` entries; inserting past that evicts the oldest
//! - Average O(1) lookup and removal by message id
//! - Each entry carries the handles of its pending lifecycle timers

mod entry;
mod store;

pub use entry::{DisplayEntry, EntryKey, EntryTimers, Phase};
pub use store::{Insert, MessageBuffer, Removed};
