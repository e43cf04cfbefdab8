//! Connection adapters: where message updates come from.
//!
//! The transport itself (websocket, reconnect policy, authentication) lives
//! outside this crate. An adapter only has to turn a stream id into a
//! [`Feed`] of [`FeedEvent`]s, delivered in transport order.
//!
//! # Example
//!
//! ```ignore
//! let adapter = ChannelAdapter::new();
//! let sender = adapter.feed("stream-1");
//!
//! let runner = StreamRunner::spawn(&adapter, "stream-1", StreamConfig::default())?;
//! sender.send_frame(r#"{"update":"new","message":{...}}"#)?;
//! ```

mod channel;
mod feed;
mod test_source;

pub use channel::{ChannelAdapter, FeedSender};
pub use feed::{ConnectionStatus, Feed, FeedEvent};
pub use test_source::{test_message, TestSource, TestSourceSettings};

use crate::error::Result;

/// Source of message updates for streams.
pub trait ConnectionAdapter: Send + Sync {
    /// Subscribe to a stream.
    ///
    /// Each call starts a fresh sequence; nothing delivered before the
    /// subscription is replayed.
    fn subscribe(&self, stream_id: &str) -> Result<Feed>;
}
