//! HTTP handlers for green bean inventory

use axum::{
    extract::{Path, Query, State},
    Json,
};
use shared::{GreenBeanLot, Role};

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    services::inventory::{GreenLotFilter, SetAvailabilityInput, WithdrawInput},
    services::InventoryService,
    AppState,
};

const INVENTORY_READERS: &[Role] = &[Role::Processor, Role::Roaster, Role::Cupper, Role::HeadJudge];

/// List green bean lots, filtered by availability or grade
pub async fn list_green_lots(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<GreenLotFilter>,
) -> AppResult<Json<Vec<GreenBeanLot>>> {
    current_user.0.require_role(INVENTORY_READERS)?;
    let service = InventoryService::new(state.store);
    let lots = service.list_lots(&filter).await?;
    Ok(Json(lots))
}

pub async fn get_green_lot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(lot_id): Path<String>,
) -> AppResult<Json<GreenBeanLot>> {
    current_user.0.require_role(INVENTORY_READERS)?;
    let service = InventoryService::new(state.store);
    let lot = service.get_lot(&lot_id).await?;
    Ok(Json(lot))
}

/// Withdraw coffee from a lot
pub async fn withdraw_green_lot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(lot_id): Path<String>,
    Json(input): Json<WithdrawInput>,
) -> AppResult<Json<GreenBeanLot>> {
    current_user.0.require_role(&[Role::Processor])?;
    let service = InventoryService::new(state.store);
    let lot = service.withdraw(&current_user.0, &lot_id, input).await?;
    Ok(Json(lot))
}

/// Mark a lot available or reserved
pub async fn set_green_lot_availability(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(lot_id): Path<String>,
    Json(input): Json<SetAvailabilityInput>,
) -> AppResult<Json<GreenBeanLot>> {
    current_user.0.require_role(&[Role::Processor])?;
    let service = InventoryService::new(state.store);
    let lot = service.set_availability(&lot_id, input).await?;
    Ok(Json(lot))
}
