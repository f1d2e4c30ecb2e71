//! The `store` module holds the chat log.
//!
//! Messages live only in memory for the lifetime of the process; there is
//! no durability across restarts.

pub mod memory_store;
pub mod message;

pub use memory_store::MessageStore;
pub use message::{Message, MessageId};

#[cfg(test)]
mod tests;
