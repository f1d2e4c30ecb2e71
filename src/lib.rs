//! # PopChat
//!
//! `popchat` is a minimalist, in-memory chat server built with Rust. Clients
//! read the message log, post messages and receive every new message live
//! over WebSockets.
//!
//! ## Core Modules
//!
//! - `store`: the append-only message log and the `Message` type.
//! - `hub`: the `messageAdded` broadcast with one bounded queue per listener.
//! - `service`: the chat operations built on top of the store and the hub.
//! - `transport`: the WebSocket server and the JSON protocol.
//! - `client`: a WebSocket client for the same protocol.
//! - `config`: loading server settings from file and environment.
//! - `utils`: error types and logging setup.

pub mod client;
pub mod config;
pub mod hub;
pub mod service;
pub mod store;
pub mod transport;
pub mod utils;
