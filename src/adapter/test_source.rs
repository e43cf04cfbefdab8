//! Synthetic chat source for demos and soak testing.
//!
//! Emits a `new` message every `interval` with ids "0", "1", ... and
//! deletes each one again `delete_after` later, like a chatty channel with
//! an eager moderator.

use crate::adapter::channel::FeedSender;
use crate::error::Result;
use crate::types::{Author, Message, MessagePart, MessageUpdate, Source};
use crossbeam_channel::{after, bounded, select, Sender};
use std::collections::VecDeque;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Pacing of a [`TestSource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TestSourceSettings {
    /// Time between new messages.
    /// Default: 10s
    pub interval: Duration,
    /// Time from a message appearing to its deletion.
    /// Default: 30s
    pub delete_after: Duration,
}

impl Default for TestSourceSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            delete_after: Duration::from_secs(30),
        }
    }
}

/// The message the test source sends as number `n`.
pub fn test_message(n: u64) -> Message {
    Message {
        source: Source::Test,
        id: n.to_string().into(),
        author: Author {
            username: "Gamers".to_string(),
            is_admin: true,
            is_bot: false,
            color: "#ffffff".to_string(),
        },
        attachments: Vec::new(),
        message_parts: vec![MessagePart::text(format!("Bot#{}: Hello from server", n))],
    }
}

/// Handle to a running synthetic source.
pub struct TestSource {
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<u64>>,
}

impl TestSource {
    /// Start emitting into `sender` on a background thread.
    ///
    /// The source stops by itself once nobody is subscribed any more.
    pub fn spawn(sender: FeedSender, settings: TestSourceSettings) -> Result<Self> {
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let worker = thread::Builder::new()
            .name(format!("test-source-{}", sender.stream_id()))
            .spawn(move || {
                let mut next_id = 0u64;
                let mut next_new = Instant::now();
                let mut pending_deletes: VecDeque<(Instant, u64)> = VecDeque::new();

                loop {
                    let now = Instant::now();

                    if now >= next_new {
                        if sender.send(MessageUpdate::new(test_message(next_id))).is_err() {
                            break;
                        }
                        pending_deletes.push_back((now + settings.delete_after, next_id));
                        next_id += 1;
                        next_new = now + settings.interval;
                    }

                    while let Some(&(due, id)) = pending_deletes.front() {
                        if due > now {
                            break;
                        }
                        pending_deletes.pop_front();
                        let mut message = test_message(id);
                        message.message_parts.clear();
                        if sender.send(MessageUpdate::delete(message)).is_err() {
                            return next_id;
                        }
                    }

                    let wake = pending_deletes
                        .front()
                        .map(|&(due, _)| due.min(next_new))
                        .unwrap_or(next_new);

                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(after(wake.saturating_duration_since(Instant::now()))) -> _ => {}
                    }
                }

                debug!(emitted = next_id, "test source stopped");
                next_id
            })?;

        info!(interval = ?settings.interval, "test source started");

        Ok(Self {
            stop: Some(stop_tx),
            worker: Some(worker),
        })
    }

    /// Stop emitting. Returns how many messages were created.
    pub fn stop(mut self) -> u64 {
        self.halt()
    }

    fn halt(&mut self) -> u64 {
        if let Some(stop) = self.stop.take() {
            let _ = stop.try_send(());
        }
        self.worker
            .take()
            .and_then(|worker| worker.join().ok())
            .unwrap_or(0)
    }
}

impl Drop for TestSource {
    fn drop(&mut self) {
        self.halt();
    }
}
