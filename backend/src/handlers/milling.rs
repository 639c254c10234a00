//! HTTP handlers for parchment lots, dry-mill lab work and hulling

use axum::{
    extract::{Path, Query, State},
    Json,
};
use shared::{GreenBeanLot, ParchmentLot, ParchmentStatus, Role};

use super::StatusQuery;
use crate::{
    error::AppResult,
    middleware::CurrentUser,
    services::milling::{HullAndGradeInput, LabResultsInput},
    services::MillingService,
    AppState,
};

pub async fn list_parchment_lots(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<StatusQuery<ParchmentStatus>>,
) -> AppResult<Json<Vec<ParchmentLot>>> {
    current_user.0.require_role(&[Role::Processor])?;
    let service = MillingService::new(state.store);
    let lots = service.list_parchment(query.status).await?;
    Ok(Json(lots))
}

pub async fn get_parchment_lot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(parchment_id): Path<String>,
) -> AppResult<Json<ParchmentLot>> {
    current_user.0.require_role(&[Role::Processor])?;
    let service = MillingService::new(state.store);
    let lot = service.get_parchment(&parchment_id).await?;
    Ok(Json(lot))
}

/// Record physical lab results for a parchment lot
pub async fn record_lab_results(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(parchment_id): Path<String>,
    Json(input): Json<LabResultsInput>,
) -> AppResult<Json<ParchmentLot>> {
    current_user.0.require_role(&[Role::Processor])?;
    let service = MillingService::new(state.store);
    let lot = service
        .record_lab_results(&current_user.0, &parchment_id, input)
        .await?;
    Ok(Json(lot))
}

/// Hull a parchment lot into graded green bean lots
pub async fn hull_and_grade(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(parchment_id): Path<String>,
    Json(input): Json<HullAndGradeInput>,
) -> AppResult<Json<Vec<GreenBeanLot>>> {
    current_user.0.require_role(&[Role::Processor])?;
    let service = MillingService::new(state.store);
    let lots = service.hull_and_grade(&parchment_id, input).await?;
    Ok(Json(lots))
}
