//! The `hub` module implements the broadcast side of the chat: a single
//! `messageAdded` topic with one bounded queue per listener.

pub mod engine;
pub mod listener;

pub use engine::{Hub, MESSAGE_ADDED, PublishReport};
pub use listener::{ListenerId, ListenerState, Subscription};
