//! Administration handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{Role, User};

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    services::admin::{CreateUserInput, DeleteSummary},
    services::AdminService,
    AppState,
};

fn admin_service(state: AppState, current_user: &CurrentUser) -> AppResult<AdminService> {
    current_user.0.require_role(&[Role::Admin])?;
    Ok(AdminService::new(state.store, state.config.auth.bcrypt_cost))
}

pub async fn list_users(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<User>>> {
    let service = admin_service(state, &current_user)?;
    let users = service.list_users().await?;
    Ok(Json(users))
}

pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateUserInput>,
) -> AppResult<(StatusCode, Json<User>)> {
    let service = admin_service(state, &current_user)?;
    let user = service.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<String>,
) -> AppResult<Json<DeleteSummary>> {
    let service = admin_service(state, &current_user)?;
    let summary = service.delete_user(&current_user.0, &user_id).await?;
    Ok(Json(summary))
}

/// Delete a farm with its harvest lots and GAP log
pub async fn delete_farm(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<String>,
) -> AppResult<Json<DeleteSummary>> {
    let service = admin_service(state, &current_user)?;
    let summary = service.delete_farm(&farm_id).await?;
    Ok(Json(summary))
}

pub async fn delete_harvest_lot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(lot_id): Path<String>,
) -> AppResult<Json<DeleteSummary>> {
    let service = admin_service(state, &current_user)?;
    let summary = service.delete_harvest_lot(&lot_id).await?;
    Ok(Json(summary))
}

pub async fn delete_green_lot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(lot_id): Path<String>,
) -> AppResult<Json<DeleteSummary>> {
    let service = admin_service(state, &current_user)?;
    let summary = service.delete_green_lot(&lot_id).await?;
    Ok(Json(summary))
}

pub async fn delete_cupping_session(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(session_id): Path<String>,
) -> AppResult<Json<DeleteSummary>> {
    let service = admin_service(state, &current_user)?;
    let summary = service.delete_session(&session_id).await?;
    Ok(Json(summary))
}
