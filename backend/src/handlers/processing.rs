//! HTTP handlers for wet processing batches

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{BatchStatus, ProcessingBatch, Role};

use super::StatusQuery;
use crate::{
    error::AppResult,
    middleware::CurrentUser,
    services::processing::{
        DryingReadingInput, KanbanBoard, MoveBatchInput, MoveBatchResult, StartBatchInput,
    },
    services::ProcessingService,
    AppState,
};

/// List processing batches, optionally by column
pub async fn list_batches(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<StatusQuery<BatchStatus>>,
) -> AppResult<Json<Vec<ProcessingBatch>>> {
    current_user.0.require_role(&[Role::Processor])?;
    let service = ProcessingService::new(state.store);
    let batches = service.list_batches(query.status).await?;
    Ok(Json(batches))
}

/// Kanban view of all batches
pub async fn get_board(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<KanbanBoard>> {
    current_user.0.require_role(&[Role::Processor])?;
    let service = ProcessingService::new(state.store);
    let board = service.board().await?;
    Ok(Json(board))
}

/// Start processing a ready harvest lot
pub async fn start_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<StartBatchInput>,
) -> AppResult<(StatusCode, Json<ProcessingBatch>)> {
    current_user.0.require_role(&[Role::Processor])?;
    let service = ProcessingService::new(state.store);
    let batch = service.start_batch(input).await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

pub async fn get_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<String>,
) -> AppResult<Json<ProcessingBatch>> {
    current_user.0.require_role(&[Role::Processor])?;
    let service = ProcessingService::new(state.store);
    let batch = service.get_batch(&batch_id).await?;
    Ok(Json(batch))
}

/// Log a drying reading
pub async fn add_drying_reading(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<String>,
    Json(input): Json<DryingReadingInput>,
) -> AppResult<Json<ProcessingBatch>> {
    current_user.0.require_role(&[Role::Processor])?;
    let service = ProcessingService::new(state.store);
    let batch = service.add_drying_reading(&batch_id, input).await?;
    Ok(Json(batch))
}

/// Move a batch to another kanban column
pub async fn move_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<String>,
    Json(input): Json<MoveBatchInput>,
) -> AppResult<Json<MoveBatchResult>> {
    current_user.0.require_role(&[Role::Processor])?;
    let service = ProcessingService::new(state.store);
    let result = service.move_batch(&batch_id, input).await?;
    Ok(Json(result))
}
