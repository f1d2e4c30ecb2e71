//! The `service` module wires the message store and the hub together into
//! the operations exposed to clients.

pub mod chat;

pub use chat::{ChatService, validate_post};

#[cfg(test)]
mod tests;
