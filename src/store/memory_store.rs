//! In-memory message store
//!
//! An append-only log that lives as long as the process. Ids are the
//! position in the log, so they start at 0 and have no gaps.
//!
//! Concurrency notes:
//! - `append` takes the write lock for the whole of id assignment and push,
//!   so appends are serialized and a reader never sees a half-appended entry.
//! - `list_all` takes the read lock and clones the log; snapshots can run
//!   concurrently with each other.

use std::sync::{PoisonError, RwLock};

use tracing::{debug, warn};

use super::message::{Message, MessageId};
use crate::utils::{ChatError, Result};

#[derive(Debug, Default)]
pub struct MessageStore {
    messages: RwLock<Vec<Message>>,
    max_messages: Option<usize>,
}

impl MessageStore {
    /// Unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that refuses appends once it holds `max_messages` entries.
    pub fn with_capacity_limit(max_messages: usize) -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
            max_messages: Some(max_messages),
        }
    }

    pub fn capacity_limit(&self) -> Option<usize> {
        self.max_messages
    }

    /// Append a message and return it with its assigned id.
    pub fn append(&self, user: &str, content: &str) -> Result<Message> {
        let mut messages = self
            .messages
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(max) = self.max_messages {
            if messages.len() >= max {
                warn!("Message store full, rejecting append from {user}");
                return Err(ChatError::CapacityExceeded { max });
            }
        }

        let message = Message {
            id: messages.len() as MessageId,
            user: user.to_string(),
            content: content.to_string(),
        };
        messages.push(message.clone());

        debug!("Appended message {} from {}", message.id, message.user);
        Ok(message)
    }

    /// Point-in-time copy of every message in append order.
    pub fn list_all(&self) -> Vec<Message> {
        self.messages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.messages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
