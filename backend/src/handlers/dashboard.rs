//! Role dashboard handler

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    services::dashboard::Dashboard,
    services::DashboardService,
    AppState,
};

/// Summary for the current user's role
pub async fn get_dashboard(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Dashboard>> {
    let service = DashboardService::new(state.store);
    let dashboard = service.for_user(&current_user.0).await?;
    Ok(Json(dashboard))
}
