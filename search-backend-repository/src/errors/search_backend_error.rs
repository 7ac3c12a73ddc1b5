//! Search backend error types.
//!
//! This module defines the errors raised while selecting a backend, building
//! a client for it, or talking to it.

use thiserror::Error;

/// Errors that can occur while selecting or calling the search backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchBackendError {
    /// Required connection information is missing or malformed. Raised before
    /// any network attempt.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The client transport could not be built.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request failed on the wire (DNS, refused connection, timeout, ...).
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The backend answered with a status the caller cannot interpret.
    #[error("Unexpected response status {status}: {body}")]
    ResponseError { status: u16, body: String },
}

impl SearchBackendError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    /// Create a response error.
    pub fn response(status: u16, body: impl Into<String>) -> Self {
        Self::ResponseError {
            status,
            body: body.into(),
        }
    }

    /// Whether the error was raised before any network attempt.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ConfigurationError(_))
    }
}
