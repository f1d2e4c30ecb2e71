//! The `transport` module is responsible for handling network communication
//! with clients via WebSockets.
//!
//! It defines the messaging protocol used between clients and the server,
//! the per-connection request handling, and the WebSocket server itself.

pub mod message;
pub mod session;
pub mod websocket;

pub use message::{ClientMessage, ServerMessage};
pub use session::Session;
pub use websocket::{serve, start_websocket_server};
