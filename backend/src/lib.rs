//! Coffee Traceability & Quality Platform - Backend
//!
//! Farm-to-roaster traceability, processing, milling, cupping and roasting
//! for specialty coffee supply chains.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;

use crate::error::AppResult;
use crate::external::AiReportClient;
use crate::store::{new_store, Store};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<Config>,
    pub ai: AiReportClient,
}

impl AppState {
    /// Build the in-memory store (seeded) and the AI report client
    pub fn new(config: Config) -> AppResult<Self> {
        let data = store::seed(&config)?;
        let ai = AiReportClient::new(&config.ai)?;
        Ok(Self {
            store: new_store(data),
            config: Arc::new(config),
            ai,
        })
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Coffee Traceability & Quality Platform API v1.0"
}
