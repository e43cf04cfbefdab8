//! Threaded driver for a stream view.

use crate::adapter::{ConnectionAdapter, ConnectionStatus, Feed, FeedEvent};
use crate::config::StreamConfig;
use crate::error::{Result, StreamError};
use crate::types::Millis;
use crossbeam_channel::{after, bounded, never, select, Receiver, Sender};
use parking_lot::RwLock;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::subscribers::ViewSubscribers;
use super::types::{DropReason, Snapshot, SubscriptionId, ViewEvent, ViewSubscription};
use super::view::StreamView;

/// State shared between the worker and the handle.
struct Shared {
    latest: RwLock<Arc<Snapshot>>,
    subscribers: ViewSubscribers,
}

impl Shared {
    fn publish(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        *self.latest.write() = Arc::clone(&snapshot);
        self.subscribers.broadcast(ViewEvent::Snapshot {
            snapshot: (*snapshot).clone(),
        });
    }

    fn publish_status(&self, view: &StreamView) {
        let status = view.status().clone();
        *self.latest.write() = Arc::new(view.snapshot());
        self.subscribers.broadcast(ViewEvent::Status { status });
    }
}

enum Control {
    Shutdown,
}

/// Runs one stream view on its own thread.
///
/// The worker thread is the only writer: feed events and timer deadlines
/// are both handled in its loop, one at a time. Readers get immutable
/// snapshots.
pub struct StreamRunner {
    stream_id: String,
    shared: Arc<Shared>,
    control: Sender<Control>,
    worker: Option<JoinHandle<()>>,
}

impl StreamRunner {
    /// Subscribe to `stream_id` through `adapter` and start the worker.
    pub fn spawn<A>(adapter: &A, stream_id: &str, config: StreamConfig) -> Result<Self>
    where
        A: ConnectionAdapter + ?Sized,
    {
        let view = StreamView::new(stream_id, &config)?;
        let feed = adapter.subscribe(stream_id)?;

        let shared = Arc::new(Shared {
            latest: RwLock::new(Arc::new(view.snapshot())),
            subscribers: ViewSubscribers::new(config.subscriber_buffer),
        });
        let (control_tx, control_rx) = bounded(1);

        let worker = Worker {
            view,
            feed: Some(feed),
            control: control_rx,
            shared: Arc::clone(&shared),
            started: Instant::now(),
        };

        let handle = thread::Builder::new()
            .name(format!("stream-{}", stream_id))
            .spawn(move || worker.run())?;

        info!(stream_id, max_messages = config.max_messages, "stream runner started");

        Ok(Self {
            stream_id: stream_id.to_string(),
            shared,
            control: control_tx,
            worker: Some(handle),
        })
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.shared.latest.read().clone()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.shared.latest.read().status.clone()
    }

    /// Subscribe to view events. The current snapshot is delivered first.
    pub fn subscribe(&self) -> ViewSubscription {
        let current = (*self.snapshot()).clone();
        self.shared
            .subscribers
            .subscribe(Some(ViewEvent::Snapshot { snapshot: current }))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.shared.subscribers.unsubscribe(id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.subscriber_count()
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Tear the stream down: cancel all timers, release the feed, drop
    /// subscribers and wait for the worker to exit.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        // A full control channel means a shutdown is already queued
        let _ = self.control.try_send(Control::Shutdown);

        worker
            .join()
            .map_err(|_| StreamError::Transport("stream worker panicked".to_string()))?;
        Ok(())
    }
}

impl Drop for StreamRunner {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!(stream_id = %self.stream_id, error = %e, "stream runner did not stop cleanly");
        }
    }
}

struct Worker {
    view: StreamView,
    feed: Option<Feed>,
    control: Receiver<Control>,
    shared: Arc<Shared>,
    started: Instant,
}

impl Worker {
    fn now(&self) -> Millis {
        Millis::from_duration(self.started.elapsed())
    }

    fn run(mut self) {
        loop {
            let now = self.now();
            if self.view.advance_to(now) {
                self.shared.publish(self.view.snapshot());
            }

            let timer = match self.view.next_deadline() {
                Some(deadline) => after(now.until(deadline)),
                None => never(),
            };
            let events = match &self.feed {
                Some(feed) => feed.receiver().clone(),
                None => never(),
            };
            let control = self.control.clone();

            select! {
                recv(control) -> _ => break,
                recv(events) -> event => match event {
                    Ok(event) => self.handle(event),
                    Err(_) => self.feed_closed(),
                },
                recv(timer) -> _ => {}
            }
        }

        self.teardown();
    }

    fn handle(&mut self, event: FeedEvent) {
        let now = self.now();
        // Timers due before this event happened apply first
        let mut changed = self.view.advance_to(now);

        match event {
            FeedEvent::Update(update) => changed |= self.view.on_update(update, now),
            FeedEvent::Frame(frame) => changed |= self.view.on_frame(&frame, now),
            FeedEvent::Status(status) => {
                if self.view.set_status(status) {
                    self.shared.publish_status(&self.view);
                }
            }
        }

        if changed {
            self.shared.publish(self.view.snapshot());
        }
    }

    fn feed_closed(&mut self) {
        debug!(stream_id = %self.view.stream_id(), "feed ended");
        self.feed = None;

        if !matches!(self.view.status(), ConnectionStatus::Failed(_))
            && self.view.set_status(ConnectionStatus::Closed)
        {
            self.shared.publish_status(&self.view);
        }
    }

    fn teardown(&mut self) {
        let cancelled = self.view.teardown();
        // Releases the adapter subscription
        self.feed = None;

        *self.shared.latest.write() = Arc::new(self.view.snapshot());
        self.shared.subscribers.close_all(DropReason::Shutdown);

        info!(stream_id = %self.view.stream_id(), cancelled, "stream runner stopped");
    }
}
