//! Coffee Traceability & Quality Platform - Backend Server
//!
//! Tracks coffee from farm harvest through processing, milling, cupping
//! and roasting, with a public traceability page per lot.

use std::net::SocketAddr;

use coffee_trace_backend::{create_app, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing (CTQ__LOG_FORMAT=json for structured output)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "coffee_trace_server=debug,coffee_trace_backend=debug,tower_http=debug".into()
    });
    let json_logs = std::env::var("CTQ__LOG_FORMAT").is_ok_and(|f| f == "json");
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Load configuration
    let config = Config::load()?;

    tracing::info!("Starting Coffee Traceability & Quality Server");
    tracing::info!("Environment: {}", config.environment);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    if config.store.seed_demo_data {
        tracing::info!("Seeding demo supply chain data");
    }
    let state = AppState::new(config)?;
    if state.ai.is_mock() {
        tracing::warn!("No AI API key configured, reports will use the built-in generator");
    }

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
