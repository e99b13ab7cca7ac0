//! Schema-tolerant parsing of payment webhooks.
//!
//! The gateway has shipped several webhook shapes over time, so the order id
//! and payment status are looked up through a [`FieldChain`]: an ordered list
//! of JSON pointers where the first present non-empty value wins.

use serde_json::Value;

use crate::error::Error;
use crate::types::BookingStatus;

/// Ordered lookup candidates for one logical field
#[derive(Debug, Clone, Copy)]
pub struct FieldChain {
    candidates: &'static [&'static str],
}

impl FieldChain {
    /// Create a chain from JSON pointers in priority order
    pub const fn new(candidates: &'static [&'static str]) -> Self {
        Self { candidates }
    }

    /// First candidate holding a non-empty string or a number
    pub fn find(&self, value: &Value) -> Option<(&'static str, String)> {
        self.candidates.iter().find_map(|pointer| {
            let found = match value.pointer(pointer)? {
                Value::String(s) if !s.trim().is_empty() => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            Some((*pointer, found))
        })
    }

    /// Same as [`find`](Self::find) without reporting which candidate matched
    pub fn first(&self, value: &Value) -> Option<String> {
        self.find(value).map(|(_, found)| found)
    }

    /// The candidates, highest priority first
    pub fn candidates(&self) -> &'static [&'static str] {
        self.candidates
    }
}

/// Where the order id may live
pub const ORDER_ID_FIELDS: FieldChain = FieldChain::new(&[
    "/data/order/order_id",
    "/data/order_id",
    "/order_id",
    "/orderId",
]);

/// Where the payment status may live
pub const STATUS_FIELDS: FieldChain = FieldChain::new(&[
    "/data/payment/payment_status",
    "/data/order/order_status",
    "/payment_status",
    "/order_status",
    "/type",
]);

/// A parsed payment webhook
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookNotification {
    /// Order id, if any candidate field held one
    pub order_id: Option<String>,
    /// Raw gateway status string, if any candidate field held one
    pub status: Option<String>,
    /// The full payload, kept for audit
    pub payload: Value,
}

impl WebhookNotification {
    /// Parse the raw request body
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the body is not JSON.
    pub fn parse(raw: &[u8]) -> Result<Self, Error> {
        let payload: Value = serde_json::from_slice(raw)?;
        Ok(Self {
            order_id: ORDER_ID_FIELDS.first(&payload),
            status: STATUS_FIELDS.first(&payload),
            payload,
        })
    }

    /// Internal status this notification maps to
    pub fn booking_status(&self) -> BookingStatus {
        BookingStatus::from_gateway(self.status.as_deref().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_current_webhook_shape() {
        let raw = json!({
            "data": {
                "order": {"order_id": "order_1", "order_amount": 793},
                "payment": {"payment_status": "SUCCESS", "cf_payment_id": 12345}
            },
            "event_time": "2026-10-14T10:00:00+05:30",
            "type": "PAYMENT_SUCCESS_WEBHOOK"
        });
        let notification = WebhookNotification::parse(raw.to_string().as_bytes()).unwrap();
        assert_eq!(notification.order_id.as_deref(), Some("order_1"));
        assert_eq!(notification.status.as_deref(), Some("SUCCESS"));
        assert_eq!(notification.booking_status(), BookingStatus::Paid);
        assert_eq!(notification.payload, raw);
    }

    #[test]
    fn test_flat_webhook_shape() {
        let raw = br#"{"orderId": "order_2", "order_status": "FAILED"}"#;
        let notification = WebhookNotification::parse(raw).unwrap();
        assert_eq!(notification.order_id.as_deref(), Some("order_2"));
        assert_eq!(notification.booking_status(), BookingStatus::Failed);
    }

    #[test]
    fn test_priority_order() {
        let value = json!({
            "order_id": "flat",
            "data": {"order_id": "nested", "order": {"order_id": "deep"}}
        });
        assert_eq!(
            ORDER_ID_FIELDS.find(&value),
            Some(("/data/order/order_id", "deep".to_string()))
        );

        let value = json!({"order_id": "", "orderId": 42});
        assert_eq!(ORDER_ID_FIELDS.first(&value).as_deref(), Some("42"));
    }

    #[test]
    fn test_falls_back_to_event_type() {
        let raw = br#"{"data": {"order": {"order_id": "order_3"}}, "type": "PAYMENT_FAILED_WEBHOOK"}"#;
        let notification = WebhookNotification::parse(raw).unwrap();
        assert_eq!(notification.booking_status(), BookingStatus::Failed);
    }

    #[test]
    fn test_missing_fields() {
        let notification = WebhookNotification::parse(b"{}").unwrap();
        assert_eq!(notification.order_id, None);
        assert_eq!(notification.status, None);
        assert_eq!(notification.booking_status(), BookingStatus::Pending);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            WebhookNotification::parse(b"not json"),
            Err(Error::Json(_))
        ));
    }
}
