//! # leazo-booking
//!
//! Booking and payment relay for console rentals: prices a booking form,
//! opens a payment session with the [Cashfree](https://www.cashfree.com) PG
//! API, persists the booking to a flat JSON file, and reconciles the booking
//! when the gateway posts its signed payment webhook.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use leazo_booking::api::{create_router, AppState};
//! use leazo_booking::{BookingService, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), leazo_booking::Error> {
//!     let config = Config::from_env()?;
//!     let addr = config.listen_addr();
//!     let service = BookingService::from_config(config)?;
//!
//!     let listener = tokio::net::TcpListener::bind(addr).await?;
//!     axum::serve(listener, create_router(AppState { service })).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Pricing
//!
//! Money is held in [`types::Amount`], exact to the paisa. See [`pricing`]
//! for the rate tables and calculation order.
//!
//! ## Architecture
//!
//! - [`pricing`] - Pure pricing engine
//! - [`store`] - Flat-file booking store
//! - [`client`] - Payment gateway client and webhook signatures
//! - [`webhook`] - Schema-tolerant webhook parsing
//! - [`service`] - Order creation, webhook reconciliation, lookup
//! - [`api`] - axum routes
//! - [`types`] - Request, record and gateway types
//! - [`config`] - Configuration and credentials
//! - [`error`] - Error types for the crate

#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod pricing;
pub mod service;
pub mod store;
pub mod types;
pub mod webhook;

// Re-export main types at crate root for convenience
pub use config::Config;
pub use error::Error;
pub use service::{BookingService, WebhookOutcome};
pub use store::BookingStore;

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;
