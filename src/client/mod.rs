//! Payment gateway client and webhook authentication.
//!
//! This module contains:
//!
//! - [`rest`] - HTTP client for the gateway's order API
//! - [`auth`] - HMAC-SHA256 webhook signature verification
//!
//! [`PaymentGateway`] is the seam the booking service talks through, so tests
//! can stand in for the real gateway.

pub mod auth;
pub mod rest;

pub use auth::WebhookVerifier;
pub use rest::CashfreeClient;

use async_trait::async_trait;

use crate::error::Error;
use crate::types::{CreateGatewayOrder, GatewayOrder};

/// Something that can open a payment session for an order
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order with the gateway
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gateway`] if the gateway rejects the order or cannot
    /// be reached.
    async fn create_order(&self, order: &CreateGatewayOrder) -> Result<GatewayOrder, Error>;
}
