//! Chat service
//!
//! The glue between the transport and the two shared components. It owns the
//! message store and the hub and exposes the three operations of the chat
//! protocol: `messages`, `postMessage` and `messageAdded`.
//!
//! Posting runs append + publish under one gate so that publication order
//! matches id order even when many connections post at once. The same gate
//! lets [`ChatService::sync`] take a snapshot and register a listener with no
//! message slipping between the two.

use std::sync::{Mutex, PoisonError};

use tracing::info;

use crate::config::Settings;
use crate::hub::{Hub, Subscription};
use crate::store::{Message, MessageId, MessageStore};
use crate::utils::{ChatError, Result};

#[derive(Debug)]
pub struct ChatService {
    store: MessageStore,
    hub: Hub,
    post_gate: Mutex<()>,
}

impl ChatService {
    pub fn new(store: MessageStore, hub: Hub) -> Self {
        Self {
            store,
            hub,
            post_gate: Mutex::new(()),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let store = match settings.store.max_messages {
            Some(max) => MessageStore::with_capacity_limit(max),
            None => MessageStore::new(),
        };
        let hub = Hub::new(settings.hub.listener_queue_capacity);
        Self::new(store, hub)
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    /// `query messages`
    pub fn messages(&self) -> Vec<Message> {
        self.store.list_all()
    }

    /// `mutation postMessage`. Returns the id of the new message.
    ///
    /// Rejected posts leave the log untouched and consume no id.
    pub fn post_message(&self, user: &str, content: &str) -> Result<MessageId> {
        validate_post(user, content)?;

        let _gate = self.post_gate.lock().unwrap_or_else(PoisonError::into_inner);
        let message = self.store.append(user, content)?;
        let report = self.hub.publish(&message);

        info!(
            "{} posted message {} (delivered to {} listeners)",
            message.user, message.id, report.delivered
        );
        Ok(message.id)
    }

    /// `subscription messageAdded`. Only messages posted after this call are
    /// delivered; anything earlier is available through [`messages`](Self::messages).
    /// A message posted between a separate `messages` call and this one is
    /// seen by neither; use [`sync`](Self::sync) to avoid that.
    pub fn message_added(&self) -> Subscription {
        self.hub.subscribe()
    }

    /// Snapshot the log and subscribe in one step. Every message ends up
    /// exactly once in either the snapshot or the live stream.
    pub fn sync(&self) -> (Vec<Message>, Subscription) {
        let _gate = self.post_gate.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = self.store.list_all();
        let subscription = self.hub.subscribe();
        (snapshot, subscription)
    }
}

impl Default for ChatService {
    fn default() -> Self {
        Self::new(MessageStore::new(), Hub::default())
    }
}

/// Both fields must contain something other than whitespace.
pub fn validate_post(user: &str, content: &str) -> Result<()> {
    if user.trim().is_empty() {
        return Err(ChatError::validation("user must not be empty"));
    }
    if content.trim().is_empty() {
        return Err(ChatError::validation("content must not be empty"));
    }
    Ok(())
}
