//! Stream ownership: the serialized mutation path and its drivers.
//!
//! - [`StreamView`] owns one stream's buffer and timers and exposes the
//!   single apply-mutation entry point, with time supplied by the caller
//! - [`StreamRunner`] drives a view on a worker thread from a connection
//!   adapter feed and wall-clock deadlines
//! - Render subscribers receive [`ViewEvent`]s through bounded channels
//!   and are dropped if they fall behind
//!
//! # Example
//!
//! ```ignore
//! let runner = StreamRunner::spawn(&adapter, "stream-1", StreamConfig::default())?;
//! let subscription = runner.subscribe();
//!
//! loop {
//!     match subscription.recv() {
//!         Ok(ViewEvent::Snapshot { snapshot }) => paint(&snapshot.entries),
//!         Ok(ViewEvent::Status { status }) => show_status(&status),
//!         Ok(ViewEvent::Dropped { .. }) | Err(_) => break,
//!     }
//! }
//! ```

mod runner;
mod subscribers;
mod types;
mod view;

pub use runner::StreamRunner;
pub use subscribers::ViewSubscribers;
pub use types::{DropReason, Snapshot, SubscriptionId, ViewEvent, ViewSubscription};
pub use view::StreamView;
