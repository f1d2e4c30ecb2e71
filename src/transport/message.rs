//! Wire protocol
//!
//! JSON text frames tagged by `"type"`. The operation names match the chat
//! contract: `messages`, `postMessage` and `messageAdded`.

use serde::{Deserialize, Serialize};
use tungstenite::protocol::Message as WsMessage;

use crate::store::{Message, MessageId};
use crate::utils::ChatError;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "messages")]
    Messages,

    #[serde(rename = "postMessage")]
    PostMessage { user: String, content: String },

    /// Open the live feed. With `snapshot` the current log is returned first
    /// and nothing posted in between is lost.
    #[serde(rename = "messageAdded")]
    MessageAdded {
        #[serde(default)]
        snapshot: bool,
    },

    #[serde(rename = "unsubscribe")]
    Unsubscribe,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "messages")]
    Messages { messages: Vec<Message> },

    #[serde(rename = "posted")]
    Posted { id: MessageId },

    #[serde(rename = "subscribed")]
    Subscribed { snapshot: Option<Vec<Message>> },

    #[serde(rename = "messageAdded")]
    MessageAdded { message: Message },

    #[serde(rename = "unsubscribed")]
    Unsubscribed,

    #[serde(rename = "subscriptionClosed")]
    SubscriptionClosed { reason: String },

    #[serde(rename = "error")]
    Error { message: String },
}

impl ServerMessage {
    pub fn error(err: &ChatError) -> Self {
        Self::Error {
            message: err.to_string(),
        }
    }

    pub fn to_ws(&self) -> Result<WsMessage, serde_json::Error> {
        Ok(WsMessage::text(serde_json::to_string(self)?))
    }
}
