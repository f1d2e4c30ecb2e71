//! The `error` module defines the error types shared by the store, the hub
//! and the request handlers.
//!
//! Errors that concern a single request or a single listener never escape
//! further than that request or listener.

use thiserror::Error;

use crate::hub::ListenerId;

pub type Result<T> = std::result::Result<T, ChatError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// The caller supplied an empty or malformed field.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The store reached its configured cap and refuses further appends.
    #[error("message store is full (max {max} messages)")]
    CapacityExceeded { max: usize },

    /// A listener's delivery queue was full and the listener was closed.
    #[error("{0} overflowed its delivery queue")]
    ListenerOverflow(ListenerId),

    /// The outbound half of a connection is gone.
    #[error("transport disconnected")]
    TransportDisconnect,

    /// A client frame could not be understood.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl ChatError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    /// Whether the error should be reported back to the requesting client
    /// as a rejected request, leaving the connection open.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::CapacityExceeded { .. } | Self::Protocol(_)
        )
    }
}
