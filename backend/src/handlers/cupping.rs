//! HTTP handlers for cupping sessions, score sheets and QC cuppings

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{CuppingSample, CuppingSession, JudgeScore, Role};

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    services::cupping::{
        view_for, AddJudgeInput, AddSampleInput, CreateQcInput, CreateSessionInput,
        OverrideScoreInput, SubmitScoreInput,
    },
    services::CuppingService,
    AppState,
};

const CUPPERS: &[Role] = &[Role::Cupper, Role::HeadJudge];

/// Create a competition session
pub async fn create_cupping_session(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateSessionInput>,
) -> AppResult<(StatusCode, Json<CuppingSession>)> {
    current_user.0.require_role(&[Role::HeadJudge])?;
    let service = CuppingService::new(state.store);
    let session = service.create_session(&current_user.0, input).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Record a single-cupper QC cupping for a lot
pub async fn create_qc_session(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateQcInput>,
) -> AppResult<(StatusCode, Json<CuppingSession>)> {
    current_user.0.require_role(CUPPERS)?;
    let service = CuppingService::new(state.store);
    let session = service.create_qc_session(&current_user.0, input).await?;
    Ok((StatusCode::CREATED, Json(view_for(&current_user.0, &session))))
}

/// List sessions the current user may see
pub async fn list_cupping_sessions(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<CuppingSession>>> {
    current_user.0.require_role(CUPPERS)?;
    let service = CuppingService::new(state.store);
    let sessions = service.list_sessions(&current_user.0).await?;
    Ok(Json(sessions))
}

/// Get a session, blinded for judges until it is finalized
pub async fn get_cupping_session(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(session_id): Path<String>,
) -> AppResult<Json<CuppingSession>> {
    current_user.0.require_role(CUPPERS)?;
    let service = CuppingService::new(state.store);
    let session = service.get_session(&current_user.0, &session_id).await?;
    Ok(Json(session))
}

pub async fn add_session_judge(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(session_id): Path<String>,
    Json(input): Json<AddJudgeInput>,
) -> AppResult<Json<CuppingSession>> {
    current_user.0.require_role(&[Role::HeadJudge])?;
    let service = CuppingService::new(state.store);
    let session = service.add_judge(&session_id, input).await?;
    Ok(Json(session))
}

pub async fn add_session_sample(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(session_id): Path<String>,
    Json(input): Json<AddSampleInput>,
) -> AppResult<(StatusCode, Json<CuppingSample>)> {
    current_user.0.require_role(&[Role::HeadJudge])?;
    let service = CuppingService::new(state.store);
    let sample = service.add_sample(&session_id, input).await?;
    Ok((StatusCode::CREATED, Json(sample)))
}

/// Move a session to its next phase
pub async fn advance_cupping_session(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(session_id): Path<String>,
) -> AppResult<Json<CuppingSession>> {
    current_user.0.require_role(&[Role::HeadJudge])?;
    let service = CuppingService::new(state.store);
    let session = service.advance(&session_id).await?;
    Ok(Json(session))
}

/// Submit the current judge's sheet for a sample
pub async fn submit_score(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(session_id): Path<String>,
    Json(input): Json<SubmitScoreInput>,
) -> AppResult<Json<JudgeScore>> {
    current_user.0.require_role(CUPPERS)?;
    let service = CuppingService::new(state.store);
    let score = service.submit_score(&current_user.0, &session_id, input).await?;
    Ok(Json(score))
}

/// Replace a judge's sheet during adjudication
pub async fn override_score(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((session_id, sample_id, judge_id)): Path<(String, String, String)>,
    Json(input): Json<OverrideScoreInput>,
) -> AppResult<Json<JudgeScore>> {
    current_user.0.require_role(&[Role::HeadJudge])?;
    let service = CuppingService::new(state.store);
    let score = service
        .override_score(&session_id, &sample_id, &judge_id, input)
        .await?;
    Ok(Json(score))
}
