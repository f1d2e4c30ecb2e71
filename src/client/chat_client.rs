//! Chat client
//!
//! `ChatClient` speaks the WebSocket protocol from the other side. It backs
//! the `list`, `post` and `watch` CLI commands and the end-to-end tests.
//!
//! Live `messageAdded` frames can arrive while the client waits for the reply
//! to another request; those are buffered and handed out by
//! [`ChatClient::next_message`] in arrival order.

use std::collections::VecDeque;

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;
use tungstenite::protocol::Message as WsMessage;

use crate::service::validate_post;
use crate::store::{Message, MessageId};
use crate::transport::{ClientMessage, ServerMessage};
use crate::utils::ChatError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("invalid frame: {0}")]
    Json(#[from] serde_json::Error),

    /// Refused locally, the request was never sent.
    #[error(transparent)]
    Invalid(#[from] ChatError),

    #[error("server rejected request: {0}")]
    Rejected(String),

    #[error("unexpected reply: {0:?}")]
    UnexpectedReply(Box<ServerMessage>),

    #[error("connection closed")]
    ConnectionClosed,
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

pub struct ChatClient {
    ws: WsStream,
    pending: VecDeque<Message>,
    subscription_closed: bool,
}

impl ChatClient {
    pub async fn connect(url: &str) -> ClientResult<Self> {
        let (ws, _response) = connect_async(url).await?;
        debug!("Connected to {url}");
        Ok(Self {
            ws,
            pending: VecDeque::new(),
            subscription_closed: false,
        })
    }

    /// `query messages`
    pub async fn messages(&mut self) -> ClientResult<Vec<Message>> {
        match self.request(ClientMessage::Messages).await? {
            ServerMessage::Messages { messages } => Ok(messages),
            other => Err(ClientError::UnexpectedReply(Box::new(other))),
        }
    }

    /// `mutation postMessage`. Empty fields are refused before sending.
    pub async fn post_message(&mut self, user: &str, content: &str) -> ClientResult<MessageId> {
        validate_post(user, content)?;

        let request = ClientMessage::PostMessage {
            user: user.to_string(),
            content: content.to_string(),
        };
        match self.request(request).await? {
            ServerMessage::Posted { id } => Ok(id),
            other => Err(ClientError::UnexpectedReply(Box::new(other))),
        }
    }

    /// `subscription messageAdded`. With `snapshot` the current log is
    /// returned and the live feed continues exactly where it ends.
    ///
    /// Leftovers of an earlier subscription that arrive ahead of the reply
    /// are discarded.
    pub async fn subscribe(&mut self, snapshot: bool) -> ClientResult<Option<Vec<Message>>> {
        match self.request(ClientMessage::MessageAdded { snapshot }).await? {
            ServerMessage::Subscribed { snapshot } => {
                self.pending.clear();
                self.subscription_closed = false;
                Ok(snapshot)
            }
            other => Err(ClientError::UnexpectedReply(Box::new(other))),
        }
    }

    pub async fn unsubscribe(&mut self) -> ClientResult<()> {
        match self.request(ClientMessage::Unsubscribe).await? {
            ServerMessage::Unsubscribed => {
                self.pending.clear();
                Ok(())
            }
            other => Err(ClientError::UnexpectedReply(Box::new(other))),
        }
    }

    /// Next live message. `None` once the server closed the subscription;
    /// call [`subscribe`](Self::subscribe) again to resume.
    pub async fn next_message(&mut self) -> ClientResult<Option<Message>> {
        if let Some(message) = self.pending.pop_front() {
            return Ok(Some(message));
        }
        if self.subscription_closed {
            return Ok(None);
        }

        loop {
            match self.recv().await? {
                ServerMessage::MessageAdded { message } => return Ok(Some(message)),
                ServerMessage::SubscriptionClosed { reason } => {
                    debug!("Subscription closed by server: {reason}");
                    self.subscription_closed = true;
                    return Ok(None);
                }
                other => debug!("Ignoring {other:?} while waiting for messages"),
            }
        }
    }

    pub async fn close(mut self) -> ClientResult<()> {
        self.ws.close(None).await?;
        Ok(())
    }

    async fn request(&mut self, msg: ClientMessage) -> ClientResult<ServerMessage> {
        let text = serde_json::to_string(&msg)?;
        self.ws.send(WsMessage::text(text)).await?;

        loop {
            match self.recv().await? {
                ServerMessage::MessageAdded { message } => self.pending.push_back(message),
                ServerMessage::SubscriptionClosed { .. } => self.subscription_closed = true,
                ServerMessage::Error { message } => return Err(ClientError::Rejected(message)),
                reply => return Ok(reply),
            }
        }
    }

    async fn recv(&mut self) -> ClientResult<ServerMessage> {
        while let Some(frame) = self.ws.next().await {
            match frame? {
                WsMessage::Text(text) => return Ok(serde_json::from_str(text.as_str())?),
                WsMessage::Close(_) => break,
                _ => {}
            }
        }
        Err(ClientError::ConnectionClosed)
    }
}
