//! Types for booking requests, records and gateway traffic.
//!
//! - [`amount`] - Exact money amounts
//! - [`booking`] - Booking form, validated request, record and status
//! - [`gateway`] - Payment gateway order request and response

pub mod amount;
pub mod booking;
pub mod gateway;

pub use amount::Amount;

pub use booking::{
    BookingForm, BookingRecord, BookingRequest, BookingStatus, CreatedOrder, GameSelection,
    PaymentMethod, Plan,
};
pub use gateway::{CreateGatewayOrder, CustomerDetails, GatewayOrder, OrderMeta};

/// Timestamp in milliseconds since Unix epoch
pub type TimestampMs = u64;
