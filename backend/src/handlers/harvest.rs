//! Harvest lot HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use shared::{HarvestLot, Role};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::harvest::{HarvestLotFilter, RegisterHarvestInput};
use crate::services::{HarvestService, ReportingService};
use crate::AppState;

const HARVEST_READERS: &[Role] = &[Role::Farmer, Role::Processor];

/// List harvest lots, newest harvest first
pub async fn list_harvest_lots(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<HarvestLotFilter>,
) -> AppResult<Json<Vec<HarvestLot>>> {
    current_user.0.require_role(HARVEST_READERS)?;
    let service = HarvestService::new(state.store);
    let lots = service.list_lots(&current_user.0, &filter).await?;
    Ok(Json(lots))
}

/// Register a new harvest lot
pub async fn register_harvest_lot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RegisterHarvestInput>,
) -> AppResult<(StatusCode, Json<HarvestLot>)> {
    current_user.0.require_role(&[Role::Farmer])?;
    let service = HarvestService::new(state.store);
    let lot = service.register_lot(&current_user.0, input).await?;
    Ok((StatusCode::CREATED, Json(lot)))
}

pub async fn get_harvest_lot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(lot_id): Path<String>,
) -> AppResult<Json<HarvestLot>> {
    current_user.0.require_role(HARVEST_READERS)?;
    let service = HarvestService::new(state.store);
    let lot = service.get_lot(&current_user.0, &lot_id).await?;
    Ok(Json(lot))
}

/// Download the filtered harvest lot list as CSV
pub async fn export_harvest_lots(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<HarvestLotFilter>,
) -> AppResult<impl IntoResponse> {
    current_user.0.require_role(HARVEST_READERS)?;
    let service = HarvestService::new(state.store);
    let rows = service.export_rows(&current_user.0, &filter).await?;
    let csv = ReportingService::export_to_csv(&rows)?;

    let filename = format!(
        "attachment; filename=\"harvest-lots-{}.csv\"",
        Utc::now().format("%Y%m%d")
    );
    tracing::info!(user_id = %current_user.0.user_id, rows = rows.len(), "Harvest lots exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        csv,
    ))
}
