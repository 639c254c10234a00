//! Dry milling service: parchment lab tests and hull-and-grade splits

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    checked_sum, generate_id, validate_grade_split, validate_moisture_content,
    validate_positive_weight, validate_water_activity, Availability, GradeSplit, GreenBeanLot,
    IdKind, ParchmentLot, ParchmentStatus, PhysicalLabResults,
};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::store::Store;

/// Milling service
#[derive(Clone)]
pub struct MillingService {
    store: Store,
}

/// Physical lab test results for a parchment sample
#[derive(Debug, Deserialize)]
pub struct LabResultsInput {
    pub moisture_percent: Decimal,
    pub water_activity: Decimal,
    pub density: Option<Decimal>,
    pub screen_size: Option<u8>,
    #[serde(default)]
    pub primary_defects: u32,
    #[serde(default)]
    pub secondary_defects: u32,
}

/// Hull a parchment lot and split the green coffee into graded lots
#[derive(Debug, Deserialize)]
pub struct HullAndGradeInput {
    pub total_green_weight_kg: Decimal,
    pub splits: Vec<GradeSplit>,
}

impl MillingService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn list_parchment(
        &self,
        status: Option<ParchmentStatus>,
    ) -> AppResult<Vec<ParchmentLot>> {
        let data = self.store.read().await;
        Ok(data
            .parchment_lots
            .iter()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .cloned()
            .collect())
    }

    pub async fn get_parchment(&self, parchment_id: &str) -> AppResult<ParchmentLot> {
        let data = self.store.read().await;
        data.parchment_lot(parchment_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Parchment lot".to_string()))
    }

    /// Record lab results, replacing any earlier test
    pub async fn record_lab_results(
        &self,
        user: &AuthUser,
        parchment_id: &str,
        input: LabResultsInput,
    ) -> AppResult<ParchmentLot> {
        validate_moisture_content(input.moisture_percent)
            .map_err(|msg| AppError::validation("moisture_percent", msg))?;
        validate_water_activity(input.water_activity)
            .map_err(|msg| AppError::validation("water_activity", msg))?;
        if input.density.map_or(false, |d| d <= Decimal::ZERO) {
            return Err(AppError::validation("density", "Density must be greater than zero"));
        }

        let mut data = self.store.write().await;
        let parchment = data
            .parchment_lots
            .iter_mut()
            .find(|p| p.id == parchment_id)
            .ok_or_else(|| AppError::NotFound("Parchment lot".to_string()))?;

        parchment.lab_results = Some(PhysicalLabResults {
            moisture_percent: input.moisture_percent,
            water_activity: input.water_activity,
            density: input.density,
            screen_size: input.screen_size,
            primary_defects: input.primary_defects,
            secondary_defects: input.secondary_defects,
            tested_by: user.user_id.clone(),
            tested_at: Utc::now(),
        });

        tracing::info!(parchment_id, "Lab results recorded");
        Ok(parchment.clone())
    }

    /// Hull a parchment lot into one green bean lot per grade split
    ///
    /// The parchment lot is consumed: its weight is zeroed and it is marked hulled.
    pub async fn hull_and_grade(
        &self,
        parchment_id: &str,
        input: HullAndGradeInput,
    ) -> AppResult<Vec<GreenBeanLot>> {
        validate_positive_weight(input.total_green_weight_kg)
            .map_err(|msg| AppError::validation("total_green_weight_kg", msg))?;
        if input.splits.is_empty() {
            return Err(AppError::validation("splits", "At least one graded lot is required"));
        }
        if input.splits.iter().any(|s| s.weight_kg <= Decimal::ZERO) {
            return Err(AppError::validation(
                "splits",
                "Graded lot weights must be greater than zero",
            ));
        }
        let weights: Vec<Decimal> = input.splits.iter().map(|s| s.weight_kg).collect();
        let sum = checked_sum(&weights).ok_or_else(|| {
            AppError::validation("splits", "Graded lot weights are too large")
        })?;
        if let Err(msg) = validate_grade_split(input.total_green_weight_kg, &weights) {
            tracing::warn!(parchment_id, total = %input.total_green_weight_kg, sum = %sum, "Rejected grade split");
            return Err(AppError::WeightMismatch(format!(
                "{} (declared {} kg, splits sum to {} kg)",
                msg, input.total_green_weight_kg, sum
            )));
        }

        let mut data = self.store.write().await;
        let parchment = data
            .parchment_lots
            .iter_mut()
            .find(|p| p.id == parchment_id)
            .ok_or_else(|| AppError::NotFound("Parchment lot".to_string()))?;

        if parchment.status != ParchmentStatus::AwaitingHulling {
            return Err(AppError::InvalidStateTransition(format!(
                "Parchment lot {} has already been hulled",
                parchment.id
            )));
        }
        if input.total_green_weight_kg > parchment.weight_kg {
            return Err(AppError::InsufficientInventory(format!(
                "Green weight {} kg exceeds parchment weight {} kg",
                input.total_green_weight_kg, parchment.weight_kg
            )));
        }

        parchment.weight_kg = Decimal::ZERO;
        parchment.status = ParchmentStatus::Hulled;

        let lots: Vec<GreenBeanLot> = input
            .splits
            .iter()
            .map(|split| GreenBeanLot {
                id: generate_id(IdKind::GreenBeanLot),
                parchment_lot_id: parchment_id.to_string(),
                grade: split.grade,
                initial_weight_kg: split.weight_kg,
                current_weight_kg: split.weight_kg,
                status: Availability::Available,
                cupping_scores: vec![],
                withdrawals: vec![],
            })
            .collect();
        data.green_bean_lots.extend(lots.iter().cloned());

        tracing::info!(parchment_id, lots = lots.len(), total = %input.total_green_weight_kg, "Parchment hulled and graded");
        Ok(lots)
    }
}
