//! Netta Service - HTTP API for the Netta social network
//!
//! This is the main entry point for the netta service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use netta_service::{create_router, seed_demo_data, AppState, ServiceConfig};
use netta_store::SqliteStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,netta=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Netta Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        database_url = %config.database_url,
        token_ttl_seconds = config.token_ttl_seconds,
        seed_demo_data = config.seed_demo_data,
        "Service configuration loaded"
    );

    // Open the database and apply migrations
    let store = Arc::new(SqliteStore::connect(&config.database_url).await?);

    if config.seed_demo_data && seed_demo_data(store.as_ref()).await? {
        tracing::info!("Empty database seeded with demo accounts");
    }

    // Build app state
    let state = AppState::new(store.clone(), config.clone());

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
