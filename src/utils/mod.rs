//! The `utils` module provides a collection of utility functions and common
//! definitions used across the `popchat` application.
//!
//! It holds the shared error type and the logging bootstrap.

pub mod error;
pub mod logging;

pub use error::{ChatError, Result};

#[cfg(test)]
mod tests;
