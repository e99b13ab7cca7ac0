//! HTTP REST client for the Cashfree PG API.
//!
//! This module provides the [`CashfreeClient`] for creating payment orders.
//! Every request carries the API version and client credentials as headers:
//!
//! - `x-api-version`: PG API version (e.g. `2023-08-01`)
//! - `x-client-id`: app id from the merchant dashboard
//! - `x-client-secret`: secret key from the merchant dashboard
//!
//! Requests are bounded by the configured timeout and are never retried.
//!
//! # Example
//!
//! ```rust,no_run
//! use leazo_booking::client::{CashfreeClient, PaymentGateway};
//! use leazo_booking::Config;
//!
//! # async fn example(order: leazo_booking::types::CreateGatewayOrder) -> leazo_booking::Result<()> {
//! let config = Config::new("app-id", "secret-key");
//! let client = CashfreeClient::new(&config)?;
//!
//! let created = client.create_order(&order).await?;
//! println!("session: {:?}", created.payment_session_id());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::PaymentGateway;
use crate::config::Config;
use crate::error::{Error, GatewayError};
use crate::types::{CreateGatewayOrder, GatewayOrder};

/// Header names for gateway authentication
#[derive(Debug, Clone)]
pub struct AuthHeaders;

impl AuthHeaders {
    /// Header name for the API version
    pub const VERSION_HEADER: &'static str = "x-api-version";
    /// Header name for the client id
    pub const CLIENT_ID_HEADER: &'static str = "x-client-id";
    /// Header name for the client secret
    pub const CLIENT_SECRET_HEADER: &'static str = "x-client-secret";
}

/// HTTP client for the Cashfree PG REST API
#[derive(Debug)]
pub struct CashfreeClient {
    client: Client,
    orders_url: String,
}

impl CashfreeClient {
    /// Create a new gateway client
    ///
    /// # Errors
    ///
    /// Returns an error if a credential is not a valid header value or the
    /// HTTP client cannot be initialized.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(Self::auth_headers(config)?)
            .build()?;

        Ok(Self {
            client,
            orders_url: config.orders_url(),
        })
    }

    /// Build authentication headers sent with every request
    fn auth_headers(config: &Config) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        for (name, value) in [
            (AuthHeaders::VERSION_HEADER, config.api_version()),
            (AuthHeaders::CLIENT_ID_HEADER, config.client_id()),
            (AuthHeaders::CLIENT_SECRET_HEADER, config.client_secret()),
        ] {
            let mut value = HeaderValue::from_str(value)
                .map_err(|_| Error::Config(format!("{} is not a valid header value", name)))?;
            value.set_sensitive(name == AuthHeaders::CLIENT_SECRET_HEADER);
            headers.insert(HeaderName::from_static(name), value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Get the order creation endpoint
    pub fn orders_url(&self) -> &str {
        &self.orders_url
    }

    /// Handle the HTTP response, checking for errors
    async fn handle_response(response: reqwest::Response) -> Result<GatewayOrder, Error> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::transport(e.to_string()))?;

        if !status.is_success() {
            return Err(parse_error(status.as_u16(), &body).into());
        }

        serde_json::from_str(&body).map_err(|e| {
            GatewayError::new(status.as_u16(), format!("unreadable gateway response: {}", e))
                .into()
        })
    }
}

#[async_trait]
impl PaymentGateway for CashfreeClient {
    async fn create_order(&self, order: &CreateGatewayOrder) -> Result<GatewayOrder, Error> {
        debug!(order_id = %order.order_id, amount = %order.order_amount, "creating gateway order");

        let response = self
            .client
            .post(&self.orders_url)
            .json(order)
            .send()
            .await
            .map_err(|e| {
                warn!(order_id = %order.order_id, error = %e, "gateway request failed");
                GatewayError::transport(e.to_string())
            })?;

        Self::handle_response(response).await
    }
}

/// Turn a non-success body into a [`GatewayError`], keeping the body if it is JSON
fn parse_error(status: u16, body: &str) -> GatewayError {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => {
            let message = value
                .get("message")
                .or_else(|| value.get("error"))
                .and_then(Value::as_str)
                .unwrap_or(body)
                .to_string();
            let code = value
                .get("code")
                .and_then(Value::as_str)
                .map(str::to_string);

            GatewayError {
                status: Some(status),
                code,
                message,
                body: Some(value),
            }
        }
        Err(_) => GatewayError::new(status, body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_error() {
        let err = parse_error(
            400,
            r#"{"message":"order_amount : invalid value","code":"order_amount_invalid","type":"invalid_request_error"}"#,
        );
        assert_eq!(err.status, Some(400));
        assert_eq!(err.code.as_deref(), Some("order_amount_invalid"));
        assert_eq!(err.message, "order_amount : invalid value");
        assert_eq!(err.body.unwrap()["type"], "invalid_request_error");
    }

    #[test]
    fn test_parse_plain_error() {
        let err = parse_error(502, "Bad Gateway");
        assert_eq!(err.message, "Bad Gateway");
        assert!(err.body.is_none());
        assert!(err.is_server_error());
    }

    #[test]
    fn test_client_uses_environment_url() {
        let config = Config::new("app", "secret");
        let client = CashfreeClient::new(&config).unwrap();
        assert_eq!(client.orders_url(), "https://sandbox.cashfree.com/pg/orders");
    }

    #[test]
    fn test_rejects_invalid_header_value() {
        let config = Config::new("app\n", "secret");
        let err = CashfreeClient::new(&config).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("x-client-id")));
    }
}
