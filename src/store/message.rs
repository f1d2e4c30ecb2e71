//! Message definition
//!
//! `Message` is both the stored record and the wire representation:
//! `{ "id": int, "user": string, "content": string }`. The `id` is assigned
//! by the store and never taken from a client.

use serde::{Deserialize, Serialize};

pub type MessageId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub user: String,
    pub content: String,
}
