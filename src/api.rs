//! HTTP API handlers and routes using axum.
//!
//! Routes:
//! - GET  /health                  - Health check
//! - POST /api/create-order        - Price a booking and open a payment session
//! - POST /api/webhook             - Gateway payment webhook (raw body, signed)
//! - GET  /api/booking/{order_id}  - Look up a booking

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

use crate::client::auth::WebhookHeaders;
use crate::error::Error;
use crate::service::BookingService;
use crate::types::BookingForm;

/// Application state shared across handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub service: BookingService,
}

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/create-order", post(create_order_handler))
        .route("/api/webhook", post(webhook_handler))
        .route("/api/booking/{order_id}", get(get_booking_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint.
/// GET /health
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Create an order.
/// POST /api/create-order
///
/// The body is parsed here rather than through `Json` so malformed input gets
/// the same 400 error shape as a missing field.
async fn create_order_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let form: BookingForm = serde_json::from_slice(&body)
        .map_err(|e| Error::Validation(format!("invalid booking form: {}", e)))?;
    let created = state.service.create_order(form).await?;
    Ok(Json(created))
}

/// Receive a payment webhook.
/// POST /api/webhook
///
/// Takes the body as raw bytes: the signature covers them exactly.
async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    state
        .service
        .handle_webhook(
            &body,
            header_str(&headers, WebhookHeaders::SIGNATURE_HEADER),
            header_str(&headers, WebhookHeaders::TIMESTAMP_HEADER),
        )
        .await?;

    Ok(Json(AckResponse { success: true }))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[derive(Serialize)]
struct AckResponse {
    success: bool,
}

/// Look up a booking.
/// GET /api/booking/{order_id}
async fn get_booking_handler(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.service.get_booking(&order_id).await?;
    Ok(Json(record))
}

// ============================================================================
// Error Handling
// ============================================================================

/// API error wrapper turning crate errors into JSON responses.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let (message, details) = match self.0 {
            Error::Validation(msg) | Error::Signature(msg) => (msg, None),
            Error::NotFound(_) => ("Booking not found".to_string(), None),
            Error::Gateway(e) => {
                let details = e.body.unwrap_or(Value::String(e.message));
                ("Payment gateway error".to_string(), Some(details))
            }
            other => {
                error!(error = %other, "request failed");
                ("Internal server error".to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            error: message,
            details,
        });

        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}
