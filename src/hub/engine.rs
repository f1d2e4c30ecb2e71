//! Hub engine
//!
//! The hub fans every published message out to all registered listeners of
//! the `messageAdded` topic. Responsibilities:
//! - registering listeners with a bounded per-listener queue
//! - non-blocking delivery on publish; a full queue closes that listener only
//! - pruning listeners whose receiving side has gone away
//!
//! Concurrency and usage notes:
//! - The listener map sits behind a short-lived `std::sync::Mutex`. Publish
//!   only calls `try_send` while holding it, so it never waits on a listener.
//! - Publish order per listener equals the order of `publish` calls. Callers
//!   that need id order across concurrent posters must serialize
//!   append + publish (the chat service does).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use super::listener::{ListenerId, Subscription};
use crate::store::Message;
use crate::utils::ChatError;

/// Name of the single topic the hub serves.
pub const MESSAGE_ADDED: &str = "messageAdded";

pub(crate) type Registry = Mutex<HashMap<ListenerId, mpsc::Sender<Message>>>;

/// Outcome of a single publish, mostly useful for logs and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub overflowed: usize,
    pub disconnected: usize,
}

#[derive(Debug, Clone)]
pub struct Hub {
    pub(super) listeners: Arc<Registry>,
    queue_capacity: usize,
}

impl Hub {
    pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

    /// `queue_capacity` is clamped to at least 1.
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            listeners: Arc::new(Mutex::new(HashMap::new())),
            queue_capacity: queue_capacity.max(1),
        }
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Register a new listener. It only sees messages published from now on.
    pub fn subscribe(&self) -> Subscription {
        let id = ListenerId::new();
        let (tx, rx) = mpsc::channel(self.queue_capacity);

        let active = {
            let mut listeners = self.lock();
            listeners.insert(id, tx);
            listeners.len()
        };
        debug!("{id} subscribed to {MESSAGE_ADDED} (active={active})");

        Subscription::new(id, rx, Arc::downgrade(&self.listeners))
    }

    /// Remove a listener. Removing an unknown or already removed id is a no-op.
    pub fn unsubscribe(&self, id: &ListenerId) {
        remove_listener(&self.listeners, id);
    }

    /// Deliver `message` to every listener registered right now.
    pub fn publish(&self, message: &Message) -> PublishReport {
        let mut report = PublishReport::default();
        let mut listeners = self.lock();

        listeners.retain(|id, sender| match sender.try_send(message.clone()) {
            Ok(()) => {
                report.delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                report.overflowed += 1;
                warn!("{}; dropping it", ChatError::ListenerOverflow(*id));
                false
            }
            Err(TrySendError::Closed(_)) => {
                report.disconnected += 1;
                debug!("{id} went away, pruning");
                false
            }
        });

        debug!(
            "Published message {} to {MESSAGE_ADDED} (delivered={}, overflowed={}, disconnected={})",
            message.id, report.delivered, report.overflowed, report.disconnected
        );
        report
    }

    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    pub fn is_registered(&self, id: &ListenerId) -> bool {
        self.lock().contains_key(id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ListenerId, mpsc::Sender<Message>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(Self::DEFAULT_QUEUE_CAPACITY)
    }
}

pub(crate) fn remove_listener(registry: &Registry, id: &ListenerId) {
    let removed = registry
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(id)
        .is_some();
    if removed {
        debug!("{id} unsubscribed from {MESSAGE_ADDED}");
    }
}
