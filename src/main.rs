//! Booking relay entry point.
//!
//! Loads configuration from the environment, then serves the booking API
//! until Ctrl+C.

use leazo_booking::api::{create_router, AppState};
use leazo_booking::{BookingService, Config};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> leazo_booking::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().inspect_err(|e| error!("{}", e))?;
    let addr = config.listen_addr();

    info!(
        environment = ?config.environment(),
        bookings_file = %config.bookings_file().display(),
        notify_url = %config.notify_url(),
        "Starting booking relay..."
    );

    let service = BookingService::from_config(config)?;
    let router = create_router(AppState { service });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP API listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  POST /api/create-order          - Create a booking and payment session");
    info!("  POST /api/webhook               - Payment gateway webhook");
    info!("  GET  /api/booking/{{order_id}}    - Look up a booking");
    info!("  GET  /health                    - Health check");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Booking relay stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("Received shutdown signal");
}
