//! HTTP handlers for public lot traceability endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    services::traceability::{TraceabilityService, TraceabilityView},
    AppState,
};

/// Get public traceability view for a lot
/// This endpoint is unauthenticated - accessible via QR code scan
pub async fn get_traceability_view(
    State(state): State<AppState>,
    Path(lot_id): Path<String>,
) -> AppResult<Json<TraceabilityView>> {
    let service = TraceabilityService::new(state.store, state.config.traceability.clone());
    let view = service.trace(&lot_id).await?;
    Ok(Json(view))
}
