// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fitness Competition Tracker API Server
//!
//! Serves the local competition document to the desktop UI over HTTP on
//! the loopback interface.

use fitness_competition::{config::Config, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        data_file = %config.data_file.display(),
        proofs_dir = %config.proofs_dir.display(),
        "Starting Fitness Competition Tracker"
    );

    // Load the competition document (an empty one if none exists yet)
    let state = Arc::new(AppState::load(config.clone()).await);

    // Build router
    let app = fitness_competition::routes::create_router(state);

    // Start server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fitness_competition=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
