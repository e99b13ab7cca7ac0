//! Payment gateway request and response types.
//!
//! These mirror the Cashfree PG `POST /orders` contract. Only the fields we
//! send are modelled on the request side; responses are kept as raw JSON so
//! they can be stored verbatim for audit.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::booking::BookingRequest;
use crate::types::Amount;

/// Customer identity sent with an order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerDetails {
    /// Alphanumeric customer id (derived from the phone number)
    pub customer_id: String,
    /// Customer name
    pub customer_name: String,
    /// Customer phone
    pub customer_phone: String,
    /// Customer email (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
}

impl CustomerDetails {
    /// Build customer details from a booking request
    pub fn from_request(request: &BookingRequest) -> Self {
        let digits: String = request.phone.chars().filter(char::is_ascii_alphanumeric).collect();
        Self {
            customer_id: format!("cust_{}", digits),
            customer_name: request.name.clone(),
            customer_phone: request.phone.clone(),
            customer_email: request.email.clone(),
        }
    }
}

/// Redirect and notification URLs for an order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderMeta {
    /// Where the customer lands after paying
    pub return_url: String,
    /// Where the gateway posts the payment webhook
    pub notify_url: String,
}

/// Request to create a payment order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateGatewayOrder {
    /// Locally generated order id
    pub order_id: String,
    /// Amount to collect
    pub order_amount: Amount,
    /// Currency code
    pub order_currency: String,
    /// Customer identity
    pub customer_details: CustomerDetails,
    /// Return and notify URLs
    pub order_meta: OrderMeta,
    /// Free-form note shown on the gateway dashboard
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_note: Option<String>,
}

/// Order as returned by the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GatewayOrder(pub Value);

impl GatewayOrder {
    /// Field names the payment session id has been seen under, in priority order
    pub const SESSION_ID_FIELDS: [&'static str; 2] = ["payment_session_id", "order_token"];

    /// Extract the payment session id
    pub fn payment_session_id(&self) -> Option<&str> {
        Self::SESSION_ID_FIELDS
            .iter()
            .filter_map(|field| self.0.get(*field).and_then(Value::as_str))
            .find(|id| !id.is_empty())
    }

    /// Gateway-side order status, if reported
    pub fn order_status(&self) -> Option<&str> {
        self.0.get("order_status").and_then(Value::as_str)
    }

    /// Consume into the raw response body
    pub fn into_raw(self) -> Value {
        self.0
    }
}
