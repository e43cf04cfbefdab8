//! Lifecycle scheduling for display entries.
//!
//! Each entry runs an independent timeline on the stream clock:
//!
//! ```text
//! t=0          Init       (created by a `new` update)
//! t=5ms        Loaded     (settle timer)
//! t=timeout    Removing   (fade timer, measured from creation)
//! +500ms       removed    (destroy timer)
//! ```
//!
//! Timers never touch the buffer themselves. Firing only yields the timer
//! back to the stream owner, which feeds it through the reducer like any
//! other mutation.

mod scheduler;
mod timers;

pub use scheduler::LifecycleScheduler;
pub use timers::{Timer, TimerId, TimerKind, TimerQueue};
