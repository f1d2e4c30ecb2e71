//! Listener handles
//!
//! A `Subscription` owns the receiving half of one listener's bounded queue.
//! The hub only keeps the sending half, so the hub can close a listener
//! (overflow) without the listener's cooperation, and a listener that goes
//! away is pruned on the next publish even if it never unsubscribed.

use std::fmt;
use std::sync::Weak;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::debug;
use uuid::Uuid;

use super::engine::Registry;
use crate::store::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// `Registered -> Delivering -> Closed`. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Registered,
    Delivering,
    Closed,
}

/// A live registration on the hub.
///
/// Dropping the handle unregisters it. After the hub closes the listener
/// (queue overflow), messages already queued can still be received, then
/// `recv` returns `None`.
#[derive(Debug)]
pub struct Subscription {
    id: ListenerId,
    receiver: mpsc::Receiver<Message>,
    registry: Weak<Registry>,
    state: ListenerState,
}

impl Subscription {
    pub(super) fn new(
        id: ListenerId,
        receiver: mpsc::Receiver<Message>,
        registry: Weak<Registry>,
    ) -> Self {
        Self {
            id,
            receiver,
            registry,
            state: ListenerState::Registered,
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == ListenerState::Closed
    }

    /// Wait for the next published message. `None` once the listener is closed.
    pub async fn recv(&mut self) -> Option<Message> {
        if self.is_closed() {
            return None;
        }
        match self.receiver.recv().await {
            Some(message) => {
                self.state = ListenerState::Delivering;
                Some(message)
            }
            None => {
                self.state = ListenerState::Closed;
                None
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv); `None` when nothing is queued.
    pub fn try_recv(&mut self) -> Option<Message> {
        if self.is_closed() {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(message) => {
                self.state = ListenerState::Delivering;
                Some(message)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.state = ListenerState::Closed;
                None
            }
        }
    }

    /// Leave the hub and discard anything still queued. Idempotent.
    pub fn unsubscribe(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            super::engine::remove_listener(&registry, &self.id);
        }
        self.receiver.close();
        if self.state != ListenerState::Closed {
            debug!("{} closed", self.id);
        }
        self.state = ListenerState::Closed;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            super::engine::remove_listener(&registry, &self.id);
        }
    }
}
