//! HTTP handlers for AI quality reports
//!
//! The report context is copied out of the store first so the store lock is
//! never held across the outbound API call.

use axum::{
    extract::{Path, State},
    Json,
};
use shared::Role;

use crate::{
    error::AppResult,
    external::QualityReport,
    middleware::CurrentUser,
    services::ReportingService,
    AppState,
};

/// Quality report for a green bean lot
pub async fn generate_lot_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(lot_id): Path<String>,
) -> AppResult<Json<QualityReport>> {
    current_user
        .0
        .require_role(&[Role::Processor, Role::Roaster, Role::Cupper, Role::HeadJudge])?;
    let service = ReportingService::new(state.store);
    let context = service.lot_report_context(&lot_id).await?;

    let report = state.ai.generate(&context).await?;
    tracing::info!(lot_id, generated_by = %report.generated_by, "Lot report generated");
    Ok(Json(report))
}

/// Quality report for a finalized cupping session
pub async fn generate_session_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(session_id): Path<String>,
) -> AppResult<Json<QualityReport>> {
    current_user.0.require_role(&[Role::Cupper, Role::HeadJudge])?;
    let service = ReportingService::new(state.store);
    let context = service.session_report_context(&session_id).await?;

    let report = state.ai.generate(&context).await?;
    tracing::info!(session_id, generated_by = %report.generated_by, "Session report generated");
    Ok(Json(report))
}
