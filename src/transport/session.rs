//! Per-connection request handling
//!
//! A `Session` turns decoded client frames into chat service calls and
//! queues the replies on the connection's outbound channel. While the client
//! is subscribed, a delivery task forwards the listener's queue onto the same
//! channel.
//!
//! The outbound channel is bounded. A client that stops reading eventually
//! stalls its delivery task, its listener queue fills up and the hub drops
//! it; nobody else waits.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::message::{ClientMessage, ServerMessage};
use crate::hub::{ListenerId, Subscription};
use crate::service::ChatService;
use crate::utils::{ChatError, Result};

pub const CLOSED_REASON: &str = "closed by server; resubscribe to resume";

pub struct Session {
    id: String,
    service: Arc<ChatService>,
    outbound: mpsc::Sender<ServerMessage>,
    delivery: Option<(ListenerId, JoinHandle<()>)>,
}

impl Session {
    pub fn new(service: Arc<ChatService>, outbound: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            id: format!("conn-{}", Uuid::new_v4()),
            service,
            outbound,
            delivery: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Hub listener backing the current subscription, if any.
    pub fn listener(&self) -> Option<ListenerId> {
        self.delivery.as_ref().map(|(listener, _)| *listener)
    }

    /// True while the listener is registered and its delivery task runs.
    /// A listener the hub already closed may still be draining; it no
    /// longer counts.
    pub fn is_subscribed(&self) -> bool {
        self.delivery.as_ref().is_some_and(|(listener, handle)| {
            !handle.is_finished() && self.service.hub().is_registered(listener)
        })
    }

    /// Decode and handle one text frame. Malformed frames are answered with
    /// an error and do not end the session.
    pub async fn handle_text(&mut self, text: &str) -> Result<()> {
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(msg) => self.handle(msg).await,
            Err(err) => {
                warn!(
                    "Invalid client message from {}: {err} | {}",
                    self.id,
                    text.chars().take(100).collect::<String>()
                );
                self.reply(ServerMessage::error(&ChatError::Protocol(err.to_string())))
                    .await
            }
        }
    }

    /// Handle one request. Only `TransportDisconnect` is returned as an
    /// error; everything request-scoped goes back to the client.
    pub async fn handle(&mut self, msg: ClientMessage) -> Result<()> {
        match msg {
            ClientMessage::Messages => {
                let messages = self.service.messages();
                self.reply(ServerMessage::Messages { messages }).await
            }

            ClientMessage::PostMessage { user, content } => {
                match self.service.post_message(&user, &content) {
                    Ok(id) => self.reply(ServerMessage::Posted { id }).await,
                    Err(err) if err.is_rejection() => {
                        info!("{} post rejected: {err}", self.id);
                        self.reply(ServerMessage::error(&err)).await
                    }
                    Err(err) => Err(err),
                }
            }

            ClientMessage::MessageAdded { snapshot } => {
                if self.is_subscribed() {
                    let err = ChatError::Protocol("already subscribed".to_string());
                    return self.reply(ServerMessage::error(&err)).await;
                }

                // a closed listener still draining must not leak frames after the new ack
                self.stop_delivery().await;

                let (snapshot, subscription) = if snapshot {
                    let (messages, subscription) = self.service.sync();
                    (Some(messages), subscription)
                } else {
                    (None, self.service.message_added())
                };
                let listener = subscription.id();

                // the ack goes out before any live message
                self.reply(ServerMessage::Subscribed { snapshot }).await?;
                let handle = tokio::spawn(deliver(
                    subscription,
                    self.outbound.clone(),
                    self.id.clone(),
                ));
                self.delivery = Some((listener, handle));
                info!("{} subscribed as {listener}", self.id);
                Ok(())
            }

            ClientMessage::Unsubscribe => {
                self.stop_delivery().await;
                info!("{} unsubscribed", self.id);
                self.reply(ServerMessage::Unsubscribed).await
            }
        }
    }

    /// Stop live delivery and release the listener.
    pub async fn close(&mut self) {
        self.stop_delivery().await;
    }

    async fn stop_delivery(&mut self) {
        if let Some((_, handle)) = self.delivery.take() {
            handle.abort();
            // the subscription is dropped (and unregistered) with the task
            let _ = handle.await;
        }
    }

    async fn reply(&self, msg: ServerMessage) -> Result<()> {
        self.outbound
            .send(msg)
            .await
            .map_err(|_| ChatError::TransportDisconnect)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.delivery.take() {
            handle.abort();
        }
    }
}

async fn deliver(
    mut subscription: Subscription,
    outbound: mpsc::Sender<ServerMessage>,
    session_id: String,
) {
    while let Some(message) = subscription.recv().await {
        if outbound
            .send(ServerMessage::MessageAdded { message })
            .await
            .is_err()
        {
            debug!("Outbound closed for {session_id}, stopping delivery");
            return;
        }
    }

    warn!("{} of {session_id} was closed by the hub", subscription.id());
    let _ = outbound
        .send(ServerMessage::SubscriptionClosed {
            reason: CLOSED_REASON.to_string(),
        })
        .await;
}
