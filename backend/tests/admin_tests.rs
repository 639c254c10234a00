//! Administration tests: accounts and cascading deletes

mod common;

use coffee_trace_backend::error::AppError;
use coffee_trace_backend::services::admin::CreateUserInput;
use coffee_trace_backend::services::auth::LoginInput;
use coffee_trace_backend::services::cupping::{
    AddJudgeInput, AddSampleInput, CreateSessionInput, SubmitScoreInput,
};
use coffee_trace_backend::services::roasting::ClaimInput;
use coffee_trace_backend::services::{
    AdminService, AuthService, CuppingService, RoastingService,
};
use common::*;
use shared::{Role, SessionStatus};

fn new_user(email: &str, password: &str, role: Role) -> CreateUserInput {
    CreateUserInput {
        name: "Ploy Cupper".to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role,
    }
}

#[tokio::test]
async fn test_created_user_can_log_in() {
    let state = demo_state();
    let admin = AdminService::new(state.store.clone(), 4);

    let user = admin
        .create_user(new_user(" Ploy@Coffee.test ", "cupping-2024", Role::Cupper))
        .await
        .unwrap();
    assert_eq!(user.email, "ploy@coffee.test");
    assert!(user.id.starts_with("USR-"));

    let auth = AuthService::new(state.store.clone(), &state.config);
    let response = auth
        .login(LoginInput {
            email: "ploy@coffee.test".to_string(),
            password: "cupping-2024".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(response.user.id, user.id);
}

#[tokio::test]
async fn test_create_user_validation() {
    let state = demo_state();
    let admin = AdminService::new(state.store.clone(), 4);

    let err = admin
        .create_user(new_user("farmer@coffee.test", "long-enough", Role::Farmer))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateEntry(_)));

    let err = admin
        .create_user(new_user("short@coffee.test", "short", Role::Farmer))
        .await
        .unwrap_err();
    match err {
        AppError::Validation { field, .. } => assert_eq!(field, "password"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let state = demo_state();
    let admin = AdminService::new(state.store.clone(), 4);
    let me = seeded(ADMIN);

    let err = admin.delete_user(&me, &me.user_id).await.unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));

    let summary = admin.delete_user(&me, &seeded(CUPPER2).user_id).await.unwrap();
    assert_eq!(summary.deleted["users"], 1);
    assert_eq!(admin.list_users().await.unwrap().len(), 6);

    let err = admin.delete_user(&me, &seeded(CUPPER2).user_id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_farm_cascades() {
    let state = demo_state();
    let admin = AdminService::new(state.store.clone(), 4);

    let summary = admin.delete_farm("FARM-00000001").await.unwrap();
    assert_eq!(summary.deleted["farms"], 1);
    assert_eq!(summary.deleted["harvest_lots"], 2);
    assert_eq!(summary.deleted["gap_logs"], 1);

    let data = state.store.read().await;
    assert!(data.harvest_lots.is_empty());
    assert!(data.gap_logs.is_empty());
    // Downstream records are kept
    assert_eq!(data.processing_batches.len(), 1);
    assert_eq!(data.green_bean_lots.len(), 2);
}

#[tokio::test]
async fn test_delete_harvest_lot_cascades() {
    let state = demo_state();
    let admin = AdminService::new(state.store.clone(), 4);

    let summary = admin.delete_harvest_lot("HL-00000001").await.unwrap();
    assert_eq!(summary.deleted["processing_batches"], 1);
    assert_eq!(summary.deleted["parchment_lots"], 1);

    let data = state.store.read().await;
    assert!(data.parchment_lots.is_empty());
    assert_eq!(data.green_bean_lots.len(), 2);
}

#[tokio::test]
async fn test_delete_green_lot_cascades() {
    let state = demo_state();
    let roaster = seeded(ROASTER);
    RoastingService::new(state.store.clone())
        .claim(
            &roaster,
            ClaimInput {
                green_bean_lot_id: "GB-00000001".to_string(),
                weight_kg: dec("5"),
            },
        )
        .await
        .unwrap();

    let admin = AdminService::new(state.store.clone(), 4);
    let summary = admin.delete_green_lot("GB-00000001").await.unwrap();
    assert_eq!(summary.deleted["green_bean_lots"], 1);
    assert_eq!(summary.deleted["roaster_inventory"], 1);
    assert_eq!(summary.deleted["roast_batches"], 0);

    let err = admin.delete_green_lot("GB-00000001").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_session() {
    let state = demo_state();
    let admin = AdminService::new(state.store.clone(), 4);
    let summary = admin.delete_session("CS-00000001").await.unwrap();
    assert_eq!(summary.deleted["cupping_sessions"], 1);

    // Scores already copied to the lot stay there
    let data = state.store.read().await;
    assert_eq!(data.green_lot("GB-00000001").unwrap().cupping_scores.len(), 1);
}

#[tokio::test]
async fn test_deleted_judge_leaves_open_panels() {
    let state = demo_state();
    let admin = AdminService::new(state.store.clone(), 4);
    let cupping = CuppingService::new(state.store.clone());

    let session = cupping
        .create_session(
            &seeded(HEAD_JUDGE),
            CreateSessionInput {
                name: "Panel Change".to_string(),
                date: None,
            },
        )
        .await
        .unwrap();
    for judge_idx in [CUPPER, CUPPER2] {
        cupping
            .add_judge(
                &session.id,
                AddJudgeInput {
                    judge_id: seeded(judge_idx).user_id,
                },
            )
            .await
            .unwrap();
    }
    let sample = cupping
        .add_sample(
            &session.id,
            AddSampleInput {
                green_bean_lot_id: "GB-00000002".to_string(),
            },
        )
        .await
        .unwrap();
    cupping.advance(&session.id).await.unwrap();

    cupping
        .submit_score(
            &seeded(CUPPER2),
            &session.id,
            SubmitScoreInput {
                sample_id: sample.id.clone(),
                sheet: sheet("7.5"),
            },
        )
        .await
        .unwrap();

    let summary = admin
        .delete_user(&seeded(ADMIN), &seeded(CUPPER2).user_id)
        .await
        .unwrap();
    assert_eq!(summary.deleted["session_panels"], 1);
    assert_eq!(summary.deleted["score_sheets"], 1);

    cupping
        .submit_score(
            &seeded(CUPPER),
            &session.id,
            SubmitScoreInput {
                sample_id: sample.id.clone(),
                sheet: sheet("8"),
            },
        )
        .await
        .unwrap();

    let session = cupping.advance(&session.id).await.unwrap();
    assert_eq!(session.status, SessionStatus::Adjudication);
    assert_eq!(session.judges, vec![seeded(CUPPER).user_id]);
    let session = cupping.advance(&session.id).await.unwrap();
    let results = session.results.unwrap();
    assert_eq!(results[0].judge_count, 1);
    assert_eq!(results[0].total_score, dec("86"));

    // Finalized sessions keep their panel
    let summary = admin
        .delete_user(&seeded(ADMIN), &seeded(CUPPER).user_id)
        .await
        .unwrap();
    assert_eq!(summary.deleted["session_panels"], 0);
    let data = state.store.read().await;
    assert_eq!(
        data.session("CS-00000001").unwrap().judges,
        vec![seeded(CUPPER).user_id]
    );
    assert_eq!(data.session(&session.id).unwrap().scores.len(), 1);
}
