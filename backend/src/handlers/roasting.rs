//! HTTP handlers for roaster inventory and roast batches

use axum::{extract::State, http::StatusCode, Json};
use shared::{RoastBatch, RoasterInventoryItem, Role};

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    services::roasting::{ClaimInput, RecordRoastInput},
    services::RoastingService,
    AppState,
};

/// Claim green coffee into the roaster's own inventory
pub async fn claim_green_coffee(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ClaimInput>,
) -> AppResult<(StatusCode, Json<RoasterInventoryItem>)> {
    current_user.0.require_role(&[Role::Roaster])?;
    let service = RoastingService::new(state.store);
    let item = service.claim(&current_user.0, input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn list_roaster_inventory(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<RoasterInventoryItem>>> {
    current_user.0.require_role(&[Role::Roaster])?;
    let service = RoastingService::new(state.store);
    let items = service.list_inventory(&current_user.0).await?;
    Ok(Json(items))
}

/// Log a roast batch against an inventory item
pub async fn record_roast_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordRoastInput>,
) -> AppResult<(StatusCode, Json<RoastBatch>)> {
    current_user.0.require_role(&[Role::Roaster])?;
    let service = RoastingService::new(state.store);
    let batch = service.record_batch(&current_user.0, input).await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

pub async fn list_roast_batches(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<RoastBatch>>> {
    current_user.0.require_role(&[Role::Roaster])?;
    let service = RoastingService::new(state.store);
    let batches = service.list_batches(&current_user.0).await?;
    Ok(Json(batches))
}
