//! ETA Overlay - A state-managed HTTP server driving a live vehicle ETA overlay
//!
//! This is the main entry point for the eta-overlay application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use eta_overlay::{
    config::Config,
    state::{AppState, Overlay, SystemClock},
    api::create_router,
    services::TracingSink,
    tasks::spawn_overlay,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("eta_overlay={},tower_http=info", config.log_level()))
        .init();

    info!("Starting eta-overlay server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, room={}, departing={}s, arriving={}s",
          config.host, config.port, config.room, config.departing_secs, config.arriving_secs);

    // Build the overlay core and start its driver task
    let overlay = Overlay::new(config.status_windows())
        .with_labels(config.from.clone(), config.to.clone())
        .with_vehicle(config.vehicle());
    let handle = spawn_overlay(
        overlay,
        Arc::new(SystemClock),
        vec![Box::new(TracingSink::new())],
    );

    let state = Arc::new(AppState::new(handle, config.room.clone(), config.port, config.host.clone()));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /command - Apply an overlay control message");
    info!("  PUT  /state   - Merge a pushed state document");
    info!("  GET  /state   - Export the state document");
    info!("  GET  /display - Current overlay frame");
    info!("  GET  /events  - Server-sent stream of overlay frames");
    info!("  GET  /status  - Server status");
    info!("  GET  /health  - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
