//! Error types for the booking relay.
//!
//! This module defines the errors that can occur while pricing a booking,
//! talking to the payment gateway, verifying webhooks and touching the
//! booking file. [`Error::status_code`] maps each kind onto the HTTP status
//! the API answers with.

use serde_json::Value;
use thiserror::Error;

/// The main error type for this crate
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid input (client's fault)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The payment gateway rejected the request or could not be reached
    #[error("{0}")]
    Gateway(GatewayError),

    /// Webhook authenticity check failed
    #[error("Signature error: {0}")]
    Signature(String),

    /// Unknown order id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Booking file could not be read or written
    #[error("Store error: {0}")]
    Store(String),

    /// Invalid configuration (missing credentials, bad URL)
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client failure outside of a gateway call
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status code the API answers with for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) | Error::Signature(_) => 400,
            Error::NotFound(_) => 404,
            _ => 500,
        }
    }
}

/// Error returned by the payment gateway
#[derive(Debug, Clone)]
pub struct GatewayError {
    /// HTTP status code, absent for transport failures
    pub status: Option<u16>,
    /// Error code from the gateway (if provided)
    pub code: Option<String>,
    /// Error message
    pub message: String,
    /// Raw error body as returned by the gateway
    pub body: Option<Value>,
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "Gateway error ({}): {}", status, self.message),
            None => write!(f, "Gateway error: {}", self.message),
        }
    }
}

impl GatewayError {
    /// Create a gateway error from a non-success HTTP response
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            code: None,
            message: message.into(),
            body: None,
        }
    }

    /// Create a gateway error for a request that never got a response
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: message.into(),
            body: None,
        }
    }

    /// Attach the gateway's raw error body
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status.is_some_and(|s| (400..500).contains(&s))
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status.is_some_and(|s| (500..600).contains(&s))
    }
}

impl From<GatewayError> for Error {
    fn from(err: GatewayError) -> Self {
        Error::Gateway(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = Error::Gateway(GatewayError::new(400, "order_amount is invalid"));
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("order_amount is invalid"));

        let err = Error::Gateway(GatewayError::transport("connection refused"));
        assert_eq!(err.to_string(), "Gateway error: connection refused");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::Validation("x".into()).status_code(), 400);
        assert_eq!(Error::Signature("x".into()).status_code(), 400);
        assert_eq!(Error::NotFound("x".into()).status_code(), 404);
        assert_eq!(Error::Gateway(GatewayError::new(401, "x")).status_code(), 500);
        assert_eq!(Error::Store("x".into()).status_code(), 500);
    }

    #[test]
    fn test_gateway_error_classes() {
        assert!(GatewayError::new(422, "bad").is_client_error());
        assert!(GatewayError::new(502, "bad").is_server_error());
        let transport = GatewayError::transport("timeout");
        assert!(!transport.is_client_error());
        assert!(!transport.is_server_error());
    }
}
