//! The `client` module is the WebSocket client side of the chat protocol,
//! used by the command-line interface.

pub mod chat_client;

pub use chat_client::{ChatClient, ClientError, ClientResult};
