//! Booking types.
//!
//! This module contains the booking form as submitted by the frontend, the
//! validated request the rest of the crate works with, and the record that
//! lands in the booking file.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::pricing::{Quote, DEFAULT_HOURS};
use crate::types::Amount;

/// Rental plan
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Plan {
    /// Billed per hour
    Hourly,
    /// Flat day rental
    Day,
    /// Flat night rental
    Night,
    /// Any plan name we do not price (charged 0)
    Other(String),
}

impl From<String> for Plan {
    fn from(value: String) -> Self {
        match value.as_str() {
            "hourly" => Plan::Hourly,
            "day" => Plan::Day,
            "night" => Plan::Night,
            _ => Plan::Other(value),
        }
    }
}

impl From<Plan> for String {
    fn from(plan: Plan) -> Self {
        plan.to_string()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Hourly => f.write_str("hourly"),
            Plan::Day => f.write_str("day"),
            Plan::Night => f.write_str("night"),
            Plan::Other(name) => f.write_str(name),
        }
    }
}

/// How the customer pays
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    /// Cash on delivery
    Cod,
    /// UPI (earns the online payment discount)
    Upi,
    /// Any other online method (card, netbanking, ...)
    Other(String),
}

impl PaymentMethod {
    /// Whether the booking is settled in cash on delivery
    pub fn is_cod(&self) -> bool {
        matches!(self, PaymentMethod::Cod)
    }
}

impl From<String> for PaymentMethod {
    fn from(value: String) -> Self {
        match value.as_str() {
            "cod" => PaymentMethod::Cod,
            "upi" => PaymentMethod::Upi,
            _ => PaymentMethod::Other(value),
        }
    }
}

impl From<PaymentMethod> for String {
    fn from(method: PaymentMethod) -> Self {
        method.to_string()
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cod => f.write_str("cod"),
            PaymentMethod::Upi => f.write_str("upi"),
            PaymentMethod::Other(name) => f.write_str(name),
        }
    }
}

/// A game picked on the booking form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSelection {
    /// Game title
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,

    /// Price as given, fractions and negatives included; missing or
    /// non-numeric prices are 0
    #[serde(default, deserialize_with = "lenient_amount")]
    pub price: Amount,
}

impl GameSelection {
    /// Create a game selection
    pub fn new(name: impl Into<String>, price: Amount) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// Booking form exactly as the frontend submits it
///
/// Every field is optional here; [`BookingForm::validate`] turns it into a
/// [`BookingRequest`] or names the first missing field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingForm {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub plan: Option<String>,
    #[serde(default)]
    pub hours: Option<Value>,
    #[serde(default)]
    pub games: Option<Vec<GameSelection>>,
    #[serde(default)]
    pub add_controller: Option<Value>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub coupon: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub payment_method: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub booking_date: Option<String>,
}

impl BookingForm {
    /// Check required fields and coerce the optional ones
    ///
    /// Required fields are checked in the order plan, games, bookingDate,
    /// name, phone, address, city, paymentMethod. Whitespace-only strings
    /// count as missing, which is stricter than an emptiness check: a
    /// booking with a name of `"  "` cannot be delivered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first missing field.
    pub fn validate(self) -> Result<BookingRequest, Error> {
        fn required(value: Option<String>, field: &str) -> Result<String, Error> {
            value
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::Validation(format!("Missing required field: {}", field)))
        }

        let plan = required(self.plan, "plan")?;
        let games = self
            .games
            .ok_or_else(|| Error::Validation("Missing required field: games".into()))?;
        let booking_date = required(self.booking_date, "bookingDate")?;
        let name = required(self.name, "name")?;
        let phone = required(self.phone, "phone")?;
        let address = required(self.address, "address")?;
        let city = required(self.city, "city")?;
        let payment_method = required(self.payment_method, "paymentMethod")?;

        Ok(BookingRequest {
            plan: Plan::from(plan),
            hours: coerce_hours(self.hours.as_ref()),
            games,
            add_controller: coerce_flag(self.add_controller.as_ref()),
            city,
            coupon: self.coupon.filter(|c| !c.is_empty()),
            payment_method: PaymentMethod::from(payment_method),
            name,
            phone,
            address,
            email: self.email.filter(|e| !e.trim().is_empty()),
            booking_date,
        })
    }
}

/// A validated booking request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub plan: Plan,
    pub hours: u32,
    pub games: Vec<GameSelection>,
    pub add_controller: bool,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,
    pub payment_method: PaymentMethod,
    pub name: String,
    pub phone: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub booking_date: String,
}

/// Payment lifecycle status of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Cash on delivery, nothing to collect online
    BookedCod,
    /// Waiting for the customer to pay online
    PendingPayment,
    /// Gateway reported a successful payment
    Paid,
    /// Gateway reported a failed payment
    Failed,
    /// Gateway reported something we do not classify
    Pending,
}

impl BookingStatus {
    /// Initial status for a freshly created booking
    pub fn initial(method: &PaymentMethod) -> Self {
        if method.is_cod() {
            BookingStatus::BookedCod
        } else {
            BookingStatus::PendingPayment
        }
    }

    /// Classify a gateway status string
    ///
    /// Case-insensitive substring match: `SUCCESS` or `PAID` means paid,
    /// `FAILED` means failed, anything else is pending.
    pub fn from_gateway(status: &str) -> Self {
        let status = status.to_ascii_uppercase();
        if status.contains("SUCCESS") || status.contains("PAID") {
            BookingStatus::Paid
        } else if status.contains("FAILED") {
            BookingStatus::Failed
        } else {
            BookingStatus::Pending
        }
    }
}

/// One booking as persisted in the booking file
///
/// Everything but `status`, `updated_at` and `webhook` is fixed at creation;
/// [`BookingRecord::apply_webhook`] is the only mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub order_id: String,
    pub payload: BookingRequest,
    pub calc: Quote,
    pub amount: Amount,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<Value>,
}

impl BookingRecord {
    /// Create a record for a booking the gateway accepted
    pub fn new(
        order_id: impl Into<String>,
        payload: BookingRequest,
        calc: Quote,
        gateway_response: Option<Value>,
    ) -> Self {
        let now = Utc::now();
        Self {
            order_id: order_id.into(),
            status: BookingStatus::initial(&payload.payment_method),
            amount: calc.total,
            payload,
            calc,
            created_at: now,
            updated_at: now,
            gateway_response,
            webhook: None,
        }
    }

    /// Record a webhook outcome
    pub fn apply_webhook(&mut self, status: BookingStatus, webhook: Value) {
        self.status = status;
        self.webhook = Some(webhook);
        self.updated_at = Utc::now();
    }
}

/// Response to a successful create-order call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub success: bool,
    pub order_id: String,
    pub amount: Amount,
    pub payment_session_id: Option<String>,
}

/// Hours for the hourly plan; absent, zero or unparseable means the default
fn coerce_hours(value: Option<&Value>) -> u32 {
    let hours = match value {
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().map(round_half_away)),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().map(round_half_away),
        _ => None,
    };
    hours
        .and_then(|h| u32::try_from(h).ok())
        .filter(|&h| h > 0)
        .unwrap_or(DEFAULT_HOURS)
}

fn coerce_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim(), "true" | "1" | "on" | "yes"),
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    }
}

/// Non-negative hour counts only; negative or non-finite input yields 0
fn round_half_away(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

/// Deserialize helper for prices: numbers or numeric strings, else 0
///
/// The value is kept exactly (to the paisa); nothing is rounded to whole
/// rupees here.
fn lenient_amount<'de, D>(deserializer: D) -> Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    let price = match value {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(rupees) => Some(Amount::rupees(rupees)),
            None => n.as_f64().and_then(Amount::from_f64),
        },
        Some(Value::String(s)) => parse_amount(s.trim()),
        _ => None,
    };
    Ok(price.unwrap_or(Amount::ZERO))
}

fn parse_amount(text: &str) -> Option<Amount> {
    match text.parse::<i64>() {
        Ok(rupees) => Some(Amount::rupees(rupees)),
        Err(_) => text.parse::<f64>().ok().and_then(Amount::from_f64),
    }
}

/// Deserialize helper that accepts strings or numbers as text
fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}
