//! WebSocket transport
//!
//! Minimal WebSocket server that maps protocol JSON frames onto the chat
//! service. Responsibilities:
//! - Accept TCP/WebSocket connections
//! - Give every connection a `Session` and a bounded outbound channel
//! - Run a writer task that serializes outbound messages onto the socket
//! - Release the connection's listener when the client goes away

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tracing::{debug, error, info, warn};
use tungstenite::protocol::Message as WsMessage;

use super::message::ServerMessage;
use super::session::Session;
use crate::service::ChatService;

/// Bind `addr` and serve until the listener fails.
pub async fn start_websocket_server(addr: &str, service: Arc<ChatService>) -> io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve(listener, service).await
}

/// Serve connections from an already bound listener.
pub async fn serve(listener: TcpListener, service: Arc<ChatService>) -> io::Result<()> {
    info!("WebSocket server listening on ws://{}", listener.local_addr()?);

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let service = service.clone();
                spawn(handle_connection(stream, peer, service));
            }
            Err(e) => {
                // per-connection failures (e.g. fd exhaustion) must not stop the server
                warn!("Failed to accept connection: {e}");
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, service: Arc<ChatService>) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake error from {peer}: {e}");
            return;
        }
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(service.hub().queue_capacity());
    let mut session = Session::new(service, tx);
    let session_id = session.id().to_string();
    info!("{session_id} connected from {peer}");

    let writer = {
        let session_id = session_id.clone();
        spawn(async move {
            while let Some(msg) = rx.recv().await {
                let frame = match msg.to_ws() {
                    Ok(frame) => frame,
                    Err(e) => {
                        error!("Failed to serialize message for {session_id}: {e}");
                        continue;
                    }
                };
                if let Err(e) = ws_sender.send(frame).await {
                    warn!("Failed to send message to {session_id}: {e}");
                    break;
                }
            }
            let _ = ws_sender.close().await;
            debug!("Send loop closed for {session_id}");
        })
    };

    while let Some(frame) = ws_receiver.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                debug!("Read error on {session_id}: {e}");
                break;
            }
        };

        match frame {
            WsMessage::Text(text) => {
                if let Err(e) = session.handle_text(text.as_str()).await {
                    debug!("{session_id}: {e}");
                    break;
                }
            }
            WsMessage::Close(_) => break,
            _ => {}
        }
    }

    session.close().await;
    // last outbound sender goes with the session, which ends the writer
    drop(session);
    let _ = writer.await;

    info!("{session_id} disconnected");
}
