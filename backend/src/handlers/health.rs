//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: String,
    pub ai_reports: String,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let users = state.store.read().await.users.len();
    let ai_reports = if state.ai.is_mock() { "mock" } else { "live" };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: format!("in-memory ({} users)", users),
        ai_reports: ai_reports.to_string(),
    })
}
