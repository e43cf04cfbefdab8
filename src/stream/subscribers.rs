//! Fan-out of view events to render subscribers.

use crossbeam_channel::{bounded, Sender};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use super::types::{DropReason, SubscriptionId, ViewEvent, ViewSubscription};

/// Internal subscriber state.
struct Subscriber {
    sender: Sender<ViewEvent>,
}

impl Subscriber {
    /// Try to send an event. Returns false if buffer is full (subscriber will be dropped).
    fn try_send(&self, event: ViewEvent) -> bool {
        self.sender.try_send(event).is_ok()
    }
}

/// Manages render subscribers of one stream.
pub struct ViewSubscribers {
    /// Active subscribers by ID.
    subscribers: RwLock<HashMap<SubscriptionId, Subscriber>>,
    /// Counter for generating subscription IDs.
    next_id: AtomicU64,
    /// Max buffered events per subscriber.
    buffer_size: usize,
}

impl ViewSubscribers {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            buffer_size: buffer_size.max(1),
        }
    }

    /// Create a new subscription, optionally primed with a first event.
    pub fn subscribe(&self, initial: Option<ViewEvent>) -> ViewSubscription {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = bounded(self.buffer_size);

        if let Some(event) = initial {
            // Fresh channel with capacity >= 1
            let _ = sender.try_send(event);
        }

        self.subscribers.write().insert(id, Subscriber { sender });

        ViewSubscription { id, receiver }
    }

    /// Unsubscribe and clean up.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        if let Some(sub) = self.subscribers.write().remove(&id) {
            // Best effort
            let _ = sub.sender.try_send(ViewEvent::Dropped {
                reason: DropReason::Unsubscribed,
            });
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Send an event to every subscriber. Drops subscribers that fail to
    /// receive.
    pub fn broadcast(&self, event: ViewEvent) {
        let mut to_remove = Vec::new();

        {
            let subs = self.subscribers.read();
            for (id, sub) in subs.iter() {
                if !sub.try_send(event.clone()) {
                    to_remove.push(*id);
                }
            }
        }

        if !to_remove.is_empty() {
            let mut subs = self.subscribers.write();
            for id in to_remove {
                if let Some(sub) = subs.remove(&id) {
                    debug!(?id, "dropping slow render subscriber");
                    // Might fail on a full buffer, that's ok
                    let _ = sub.sender.try_send(ViewEvent::Dropped {
                        reason: DropReason::BufferOverflow,
                    });
                }
            }
        }
    }

    /// Drop every subscriber.
    pub fn close_all(&self, reason: DropReason) {
        let drained: Vec<_> = self.subscribers.write().drain().collect();
        for (_, sub) in drained {
            let _ = sub.sender.try_send(ViewEvent::Dropped {
                reason: reason.clone(),
            });
        }
    }
}
