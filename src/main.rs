// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! BMI Tracker API Server
//!
//! Serves Google sign-in and per-user BMI history backed by MySQL.

use bmi_tracker::{
    config::Config,
    db::{MemoryStore, MySqlStore, Store},
    services::{GoogleOAuthClient, GoogleOidcVerifier},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting BMI Tracker API");

    // BMI_STORE=memory runs without a database (local demos only)
    let store: Arc<dyn Store> = if std::env::var("BMI_STORE").as_deref() == Ok("memory") {
        tracing::warn!("Using in-memory store; data is lost on restart");
        Arc::new(MemoryStore::new())
    } else {
        let mysql = MySqlStore::connect(&config).await?;
        mysql.ensure_schema().await?;
        Arc::new(mysql)
    };

    let google_oidc_verifier = Arc::new(GoogleOidcVerifier::new(&config)?);
    let google_oauth = GoogleOAuthClient::new(&config)?;

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        google_oidc_verifier,
        google_oauth,
    });

    // Build router
    let app = bmi_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::new("info")
            .add_directive("bmi_tracker=debug".parse()?),
    };

    tracing_subscriber::registry().with(filter).with(format).init();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
