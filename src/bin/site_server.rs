// Site server binary entry point
//
// Usage: cargo run --bin site_server

use second_opinion_site::{create_router, telemetry, AppState, Config};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    telemetry::init_tracing();

    tracing::info!("Starting site server...");

    // Configuration from environment variables
    let config = Config::from_env();
    config.log_summary();

    // Initialize application state (CMS client, rate limiter, CAPTCHA)
    tracing::info!("Initializing application state...");
    let state = AppState::new(&config).await?;
    tracing::info!("Application state initialized successfully");

    // Create router with all endpoints and middleware
    let app = create_router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Peer address feeds the contact rate limiter when no proxy header is present
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
