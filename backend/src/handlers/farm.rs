//! HTTP handlers for farms and their GAP logs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{Farm, GapLogEntry, Role};

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    services::farm::{CreateFarmInput, UpdateFarmInput},
    services::gap::RecordGapInput,
    services::{FarmService, GapService},
    AppState,
};

const FARM_READERS: &[Role] = &[Role::Farmer, Role::Processor];

/// List farms visible to the current user
pub async fn list_farms(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Farm>>> {
    current_user.0.require_role(FARM_READERS)?;
    let service = FarmService::new(state.store);
    let farms = service.list_farms(&current_user.0).await?;
    Ok(Json(farms))
}

/// Register a farm
pub async fn create_farm(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateFarmInput>,
) -> AppResult<(StatusCode, Json<Farm>)> {
    current_user.0.require_role(&[Role::Farmer])?;
    let service = FarmService::new(state.store);
    let farm = service.create_farm(&current_user.0, input).await?;
    Ok((StatusCode::CREATED, Json(farm)))
}

pub async fn get_farm(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<String>,
) -> AppResult<Json<Farm>> {
    current_user.0.require_role(FARM_READERS)?;
    let service = FarmService::new(state.store);
    let farm = service.get_farm(&current_user.0, &farm_id).await?;
    Ok(Json(farm))
}

pub async fn update_farm(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<String>,
    Json(input): Json<UpdateFarmInput>,
) -> AppResult<Json<Farm>> {
    current_user.0.require_role(&[Role::Farmer])?;
    let service = FarmService::new(state.store);
    let farm = service.update_farm(&current_user.0, &farm_id, input).await?;
    Ok(Json(farm))
}

/// GAP log for a farm, newest first
pub async fn list_gap_entries(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<String>,
) -> AppResult<Json<Vec<GapLogEntry>>> {
    current_user.0.require_role(FARM_READERS)?;
    let service = GapService::new(state.store);
    let entries = service.list_entries(&current_user.0, &farm_id).await?;
    Ok(Json(entries))
}

pub async fn record_gap_entry(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<String>,
    Json(input): Json<RecordGapInput>,
) -> AppResult<(StatusCode, Json<GapLogEntry>)> {
    current_user.0.require_role(&[Role::Farmer])?;
    let service = GapService::new(state.store);
    let entry = service.record_entry(&current_user.0, &farm_id, input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
