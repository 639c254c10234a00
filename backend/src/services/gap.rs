//! Good Agricultural Practice (GAP) activity log service

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{generate_id, GapActivity, GapLogEntry, IdKind, Role};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::store::Store;

/// GAP log service
#[derive(Clone)]
pub struct GapService {
    store: Store,
}

/// Input for recording a GAP activity
#[derive(Debug, Deserialize, Validate)]
pub struct RecordGapInput {
    pub date: NaiveDate,
    pub activity: GapActivity,
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
    #[validate(length(max = 200))]
    pub product_used: Option<String>,
    pub quantity: Option<Decimal>,
}

impl GapService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn record_entry(
        &self,
        user: &AuthUser,
        farm_id: &str,
        input: RecordGapInput,
    ) -> AppResult<GapLogEntry> {
        input.validate()?;
        if input.description.trim().is_empty() {
            return Err(AppError::validation("description", "Description is required"));
        }
        if input.quantity.map_or(false, |q| q < Decimal::ZERO) {
            return Err(AppError::validation("quantity", "Quantity cannot be negative"));
        }

        let mut data = self.store.write().await;
        if data.farm(farm_id).is_none() {
            return Err(AppError::NotFound("Farm".to_string()));
        }
        if user.role == Role::Farmer && !data.owns_farm(&user.user_id, farm_id) {
            return Err(AppError::InsufficientPermissions);
        }

        let entry = GapLogEntry {
            id: generate_id(IdKind::GapLog),
            farm_id: farm_id.to_string(),
            date: input.date,
            activity: input.activity,
            description: input.description.trim().to_string(),
            product_used: input
                .product_used
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            quantity: input.quantity,
            recorded_by: user.user_id.clone(),
        };
        data.gap_logs.push(entry.clone());

        tracing::info!(entry_id = %entry.id, farm_id, activity = %entry.activity, "GAP activity recorded");
        Ok(entry)
    }

    /// Entries for a farm, most recent first
    pub async fn list_entries(&self, user: &AuthUser, farm_id: &str) -> AppResult<Vec<GapLogEntry>> {
        let data = self.store.read().await;
        if data.farm(farm_id).is_none() {
            return Err(AppError::NotFound("Farm".to_string()));
        }
        if user.role == Role::Farmer && !data.owns_farm(&user.user_id, farm_id) {
            return Err(AppError::InsufficientPermissions);
        }

        let mut entries: Vec<GapLogEntry> = data
            .gap_logs
            .iter()
            .filter(|e| e.farm_id == farm_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }
}
