//! # Aya Stream
//!
//! Live chat stream buffer for multi-platform chat overlays.
//!
//! Consumes an unbounded stream of message mutations (new, edit, delete)
//! and keeps a bounded, time-decaying list of the most recent messages,
//! each running its own appear/settle/fade/expire timeline.
//!
//! ## Core Concepts
//!
//! - **Buffer**: Insertion-ordered entries keyed by message id, capped at
//!   `max_messages` with oldest-first eviction
//! - **Lifecycle**: Per-entry cancellable timers driving
//!   `Init -> Loaded -> Removing -> removed`
//! - **Reducer**: Pure mapping of one mutation onto the buffer, yielding the
//!   timer work to enact
//! - **Stream**: The single owner that serializes updates and timer firings
//!
//! ## Example
//!
//! ```ignore
//! use aya_stream::{ChannelAdapter, StreamConfig, StreamRunner};
//!
//! let adapter = ChannelAdapter::new();
//! let sender = adapter.feed("stream-1");
//!
//! let runner = StreamRunner::spawn(&adapter, "stream-1", StreamConfig::default())?;
//!
//! // Frames straight from the chat backend's websocket
//! sender.send_frame(frame_text)?;
//!
//! for row in aya_stream::projection::rows(&runner.snapshot().entries) {
//!     println!("{}", row.to_plain_text());
//! }
//! ```

pub mod adapter;
pub mod buffer;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod projection;
pub mod reducer;
pub mod stream;
pub mod types;
pub mod wire;

// Re-exports
pub use adapter::{
    ChannelAdapter, ConnectionAdapter, ConnectionStatus, Feed, FeedEvent, FeedSender, TestSource,
    TestSourceSettings,
};
pub use buffer::{DisplayEntry, EntryKey, EntryTimers, Insert, MessageBuffer, Phase, Removed};
pub use config::{LifecycleTimings, StreamConfig, POST_FADE_DELAY, SETTLE_DELAY};
pub use error::{Result, StreamError};
pub use lifecycle::{LifecycleScheduler, Timer, TimerId, TimerKind, TimerQueue};
pub use projection::{AuthorBadge, RowBody, RowView, VisualState};
pub use reducer::{reduce, Effect, Mutation, Reduction};
pub use stream::{
    DropReason, Snapshot, StreamRunner, StreamView, SubscriptionId, ViewEvent, ViewSubscription,
};
pub use types::*;
pub use wire::{decode_frame, encode_frame};
