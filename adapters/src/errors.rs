//! Custom error types specific to the `adapters` crate.
//!
//! This module defines errors that can occur while resolving widget data from a
//! provider, giving the backend a single error type for all adapter interactions.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("unknown city: {0}")]
    UnknownCity(String),
    #[error("unknown currency: {0}")]
    UnknownCurrency(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl AdapterError {
    /// True when the error is caused by the caller's input rather than the provider.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AdapterError::Unavailable(_))
    }
}
