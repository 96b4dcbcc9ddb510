// SPDX-License-Identifier: MIT

//! Shoplink API Server
//!
//! Thin backend for installing a Shopify app into merchant shops: OAuth
//! install flow, per-shop access token storage, and shop/update webhooks.

use shoplink::{
    config::Config,
    db::FirestoreDb,
    services::{SessionStore, ShopifyClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment; missing credentials abort startup
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Shoplink API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // In-memory session store for OAuth state nonces
    let sessions = SessionStore::new();

    // Shopify API client
    let shopify = ShopifyClient::new(
        config.shopify_api_key.clone(),
        config.shopify_api_secret.clone(),
        config.app_url.clone(),
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        sessions,
        shopify,
    });

    // Build router
    let app = shoplink::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("shoplink=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
