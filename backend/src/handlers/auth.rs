//! Authentication handlers

use axum::{extract::State, Json};
use shared::User;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::auth::{LoginInput, LoginResponse};
use crate::services::AuthService;
use crate::AppState;

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginInput>,
) -> Result<Json<LoginResponse>, AppError> {
    let auth_service = AuthService::new(state.store.clone(), &state.config);
    let response = auth_service.login(body).await?;
    Ok(Json(response))
}

/// Current session's user
pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<User>, AppError> {
    let auth_service = AuthService::new(state.store.clone(), &state.config);
    let user = auth_service.current_user(&current_user.0.user_id).await?;
    Ok(Json(user))
}
