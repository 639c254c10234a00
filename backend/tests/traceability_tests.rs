//! Traceability view tests
//!
//! The public page walks a lot back to its farm; links that no longer
//! resolve show "N/A" instead of failing.

mod common;

use coffee_trace_backend::error::AppError;
use coffee_trace_backend::services::admin::CreateUserInput;
use coffee_trace_backend::services::roasting::{ClaimInput, RecordRoastInput};
use coffee_trace_backend::services::{AdminService, RoastingService, TraceabilityService};
use coffee_trace_backend::AppState;
use common::*;
use shared::{RoastLevel, NOT_AVAILABLE};

fn service(state: &AppState) -> TraceabilityService {
    TraceabilityService::new(state.store.clone(), state.config.traceability.clone())
}

#[tokio::test]
async fn test_green_lot_full_chain() {
    let state = demo_state();
    let view = service(&state).trace("GB-00000001").await.unwrap();

    assert_eq!(view.page_url, "http://localhost:3000/trace/GB-00000001");
    assert!(view.qr_code_url.contains("size=200x200"));
    assert!(view.qr_code_url.contains("GB-00000001"));

    assert_eq!(view.origin.farm_id, "FARM-00000001");
    assert_eq!(view.origin.farmer_name, "Somchai Farmer");
    assert_eq!(view.origin.location, "Doi Chang, Chiang Rai");
    assert_eq!(view.origin.variety, "Typica");
    assert_eq!(view.origin.harvest_date, "2024-11-20");

    assert_eq!(view.processing.batch_id, "PB-00000001");
    assert_eq!(view.processing.process_type, "Washed");
    assert_eq!(view.processing.completed_date, "2024-12-06");
    assert_eq!(view.processing.drying.as_ref().unwrap().readings, 3);

    assert_eq!(view.milling.parchment_lot_id, "PL-00000001");
    assert_eq!(view.milling.grade, "AA");
    assert!(view.milling.lab_results.is_some());

    assert_eq!(view.cupping.scores.len(), 1);
    assert_eq!(view.cupping.average_score, "87.75");
    assert_eq!(view.cupping.classification, "Excellent");
    assert!(view.roasting.batches.is_empty());
}

#[tokio::test]
async fn test_uncupped_lot_shows_not_available() {
    let state = demo_state();
    let view = service(&state).trace("GB-00000002").await.unwrap();
    assert_eq!(view.milling.grade, "A");
    assert!(view.cupping.scores.is_empty());
    assert_eq!(view.cupping.average_score, NOT_AVAILABLE);
    assert_eq!(view.cupping.classification, NOT_AVAILABLE);
}

#[tokio::test]
async fn test_harvest_lot_without_batch() {
    let state = demo_state();
    let view = service(&state).trace("HL-00000002").await.unwrap();
    assert_eq!(view.origin.variety, "Catimor");
    assert_eq!(view.processing.batch_id, NOT_AVAILABLE);
    assert_eq!(view.processing.process_type, NOT_AVAILABLE);
    assert!(view.processing.drying.is_none());
    assert_eq!(view.milling.parchment_lot_id, NOT_AVAILABLE);
    assert_eq!(view.milling.grade, NOT_AVAILABLE);
}

#[tokio::test]
async fn test_deleted_upstream_records_render_not_available() {
    let state = demo_state();
    AdminService::new(state.store.clone(), 4)
        .delete_farm("FARM-00000001")
        .await
        .unwrap();

    let view = service(&state).trace("GB-00000001").await.unwrap();
    // Harvest lots went with the farm, so origin is gone
    assert_eq!(view.origin.farm_id, NOT_AVAILABLE);
    assert_eq!(view.origin.farmer_name, NOT_AVAILABLE);
    assert_eq!(view.origin.variety, NOT_AVAILABLE);
    // Milling and cupping still resolve
    assert_eq!(view.milling.parchment_lot_id, "PL-00000001");
    assert_eq!(view.cupping.average_score, "87.75");
}

#[tokio::test]
async fn test_roast_batches_listed() {
    let state = demo_state();
    let roasting = RoastingService::new(state.store.clone());
    let roaster = seeded(ROASTER);
    let item = roasting
        .claim(
            &roaster,
            ClaimInput {
                green_bean_lot_id: "GB-00000001".to_string(),
                weight_kg: dec("10"),
            },
        )
        .await
        .unwrap();
    roasting
        .record_batch(
            &roaster,
            RecordRoastInput {
                inventory_item_id: item.id,
                roast_date: None,
                batch_size_kg: dec("5"),
                roasted_weight_kg: dec("4.2"),
                roast_level: RoastLevel::Light,
                notes: None,
            },
        )
        .await
        .unwrap();

    let view = service(&state).trace("GB-00000001").await.unwrap();
    assert_eq!(view.roasting.batches.len(), 1);
    assert_eq!(view.roasting.batches[0].roast_level, "Light");
    assert_eq!(view.roasting.batches[0].yield_percent, dec("84"));
}

#[tokio::test]
async fn test_unknown_lot_not_found() {
    let state = demo_state();
    let err = service(&state).trace("GB-DOESNOTEXIST").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // Only lots are traceable
    let admin = AdminService::new(state.store.clone(), 4);
    let user = admin
        .create_user(CreateUserInput {
            name: "Visitor".to_string(),
            email: "visitor@coffee.test".to_string(),
            password: "visitor-pass".to_string(),
            role: shared::Role::Roaster,
        })
        .await
        .unwrap();
    let err = service(&state).trace(&user.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
