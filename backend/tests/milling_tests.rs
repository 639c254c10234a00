//! Dry mill tests
//!
//! Lab results, hulling and grade splits of parchment lots.

mod common;

use chrono::NaiveDate;
use coffee_trace_backend::error::AppError;
use coffee_trace_backend::services::milling::{HullAndGradeInput, LabResultsInput};
use coffee_trace_backend::services::processing::{
    CompletionInput, MoveBatchInput, StartBatchInput,
};
use coffee_trace_backend::services::{MillingService, ProcessingService};
use coffee_trace_backend::AppState;
use common::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    validate_grade_split, Availability, BatchStatus, GradeSplit, GreenGrade, ParchmentStatus,
    ProcessType,
};

/// Process the ready demo lot into 100 kg of parchment awaiting hulling
async fn fresh_parchment(state: &AppState) -> String {
    let processing = ProcessingService::new(state.store.clone());
    let batch = processing
        .start_batch(StartBatchInput {
            harvest_lot_id: "HL-00000002".to_string(),
            process_type: ProcessType::Natural,
            start_date: NaiveDate::from_ymd_opt(2024, 12, 6),
        })
        .await
        .unwrap();
    processing
        .move_batch(
            &batch.id,
            MoveBatchInput {
                status: BatchStatus::Completed,
                completion: Some(CompletionInput {
                    completed_date: NaiveDate::from_ymd_opt(2024, 12, 28).unwrap(),
                    final_moisture_percent: dec("11.0"),
                    parchment_weight_kg: dec("100"),
                }),
            },
        )
        .await
        .unwrap()
        .parchment_lot
        .unwrap()
        .id
}

fn split(grade: GreenGrade, weight: &str) -> GradeSplit {
    GradeSplit {
        grade,
        weight_kg: dec(weight),
    }
}

#[tokio::test]
async fn test_hull_and_grade_creates_green_lots() {
    let state = demo_state();
    let parchment_id = fresh_parchment(&state).await;
    let service = MillingService::new(state.store.clone());

    let lots = service
        .hull_and_grade(
            &parchment_id,
            HullAndGradeInput {
                total_green_weight_kg: dec("80"),
                splits: vec![
                    split(GreenGrade::Aa, "40.5"),
                    split(GreenGrade::A, "30"),
                    split(GreenGrade::Peaberry, "9.5"),
                ],
            },
        )
        .await
        .unwrap();

    assert_eq!(lots.len(), 3);
    assert!(lots.iter().all(|l| l.parchment_lot_id == parchment_id));
    assert!(lots.iter().all(|l| l.status == Availability::Available));
    assert!(lots.iter().all(|l| l.current_weight_kg == l.initial_weight_kg));
    assert_eq!(lots[2].grade, GreenGrade::Peaberry);

    let parchment = service.get_parchment(&parchment_id).await.unwrap();
    assert_eq!(parchment.status, ParchmentStatus::Hulled);
    assert_eq!(parchment.weight_kg, Decimal::ZERO);

    // A hulled lot cannot be hulled again
    let err = service
        .hull_and_grade(
            &parchment_id,
            HullAndGradeInput {
                total_green_weight_kg: dec("10"),
                splits: vec![split(GreenGrade::B, "10")],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition(_)));
}

#[tokio::test]
async fn test_split_must_match_declared_total() {
    let state = demo_state();
    let parchment_id = fresh_parchment(&state).await;
    let service = MillingService::new(state.store.clone());

    let err = service
        .hull_and_grade(
            &parchment_id,
            HullAndGradeInput {
                total_green_weight_kg: dec("80"),
                splits: vec![split(GreenGrade::Aa, "40"), split(GreenGrade::A, "39.98")],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::WeightMismatch(_)));

    // Within tolerance is accepted
    let lots = service
        .hull_and_grade(
            &parchment_id,
            HullAndGradeInput {
                total_green_weight_kg: dec("80"),
                splits: vec![split(GreenGrade::Aa, "40"), split(GreenGrade::A, "39.99")],
            },
        )
        .await
        .unwrap();
    assert_eq!(lots.len(), 2);
}

#[tokio::test]
async fn test_green_weight_cannot_exceed_parchment() {
    let state = demo_state();
    let parchment_id = fresh_parchment(&state).await;
    let service = MillingService::new(state.store.clone());

    let err = service
        .hull_and_grade(
            &parchment_id,
            HullAndGradeInput {
                total_green_weight_kg: dec("120"),
                splits: vec![split(GreenGrade::Aa, "120")],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientInventory(_)));

    let parchment = service.get_parchment(&parchment_id).await.unwrap();
    assert_eq!(parchment.status, ParchmentStatus::AwaitingHulling);
}

#[tokio::test]
async fn test_empty_or_zero_splits_rejected() {
    let state = demo_state();
    let parchment_id = fresh_parchment(&state).await;
    let service = MillingService::new(state.store.clone());

    for splits in [vec![], vec![split(GreenGrade::Aa, "0"), split(GreenGrade::A, "50")]] {
        let err = service
            .hull_and_grade(
                &parchment_id,
                HullAndGradeInput {
                    total_green_weight_kg: dec("50"),
                    splits,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }
}

#[tokio::test]
async fn test_oversized_split_weights_rejected() {
    let state = demo_state();
    let parchment_id = fresh_parchment(&state).await;
    let service = MillingService::new(state.store.clone());

    let huge = GradeSplit {
        grade: GreenGrade::Aa,
        weight_kg: Decimal::MAX,
    };
    let err = service
        .hull_and_grade(
            &parchment_id,
            HullAndGradeInput {
                total_green_weight_kg: dec("50"),
                splits: vec![huge.clone(), huge],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "splits"));

    let parchment = service.get_parchment(&parchment_id).await.unwrap();
    assert_eq!(parchment.status, ParchmentStatus::AwaitingHulling);
}

#[tokio::test]
async fn test_record_lab_results() {
    let state = demo_state();
    let parchment_id = fresh_parchment(&state).await;
    let service = MillingService::new(state.store.clone());
    let processor = seeded(PROCESSOR);

    let lot = service
        .record_lab_results(
            &processor,
            &parchment_id,
            LabResultsInput {
                moisture_percent: dec("10.8"),
                water_activity: dec("0.56"),
                density: Some(dec("705")),
                screen_size: Some(17),
                primary_defects: 1,
                secondary_defects: 4,
            },
        )
        .await
        .unwrap();

    let lab = lot.lab_results.unwrap();
    assert_eq!(lab.tested_by, processor.user_id);
    assert_eq!(lab.water_activity, dec("0.56"));

    let err = service
        .record_lab_results(
            &processor,
            &parchment_id,
            LabResultsInput {
                moisture_percent: dec("10.8"),
                water_activity: dec("1.2"),
                density: None,
                screen_size: None,
                primary_defects: 0,
                secondary_defects: 0,
            },
        )
        .await
        .unwrap_err();
    match err {
        AppError::Validation { field, .. } => assert_eq!(field, "water_activity"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_list_parchment_by_status() {
    let state = demo_state();
    let parchment_id = fresh_parchment(&state).await;
    let service = MillingService::new(state.store.clone());

    let waiting = service
        .list_parchment(Some(ParchmentStatus::AwaitingHulling))
        .await
        .unwrap();
    assert_eq!(waiting.len(), 1);
    assert_eq!(waiting[0].id, parchment_id);
    assert_eq!(service.list_parchment(None).await.unwrap().len(), 2);
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn weights_strategy() -> impl Strategy<Value = Vec<Decimal>> {
        prop::collection::vec((1i64..=50_000).prop_map(|n| Decimal::new(n, 2)), 1..6)
    }

    proptest! {
        #[test]
        fn prop_exact_split_always_accepted(weights in weights_strategy()) {
            let total: Decimal = weights.iter().sum();
            prop_assert!(validate_grade_split(total, &weights).is_ok());
        }

        #[test]
        fn prop_split_off_by_more_than_tolerance_rejected(
            weights in weights_strategy(),
            cents in 2i64..=500,
            over in any::<bool>(),
        ) {
            let sum: Decimal = weights.iter().sum();
            let delta = Decimal::new(cents, 2);
            let total = if over { sum + delta } else { sum - delta };
            prop_assume!(total > Decimal::ZERO);
            prop_assert!(validate_grade_split(total, &weights).is_err());
        }
    }
}
