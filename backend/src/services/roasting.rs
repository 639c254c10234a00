//! Roaster inventory and roast batch service

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    calculate_roast_yield, generate_id, validate_roast_batch, Availability, IdKind, RoastBatch,
    RoastLevel, RoasterInventoryItem,
};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::inventory::withdraw_from_lot;
use crate::store::Store;

/// Purpose recorded on the green lot when a roaster claims stock
pub const ROASTER_CLAIM_PURPOSE: &str = "roaster claim";

/// Roasting service
#[derive(Clone)]
pub struct RoastingService {
    store: Store,
}

/// Input for claiming green coffee into roaster inventory
#[derive(Debug, Deserialize)]
pub struct ClaimInput {
    pub green_bean_lot_id: String,
    pub weight_kg: Decimal,
}

/// Input for recording a roast batch
#[derive(Debug, Deserialize, Validate)]
pub struct RecordRoastInput {
    pub inventory_item_id: String,
    /// Defaults to today
    pub roast_date: Option<NaiveDate>,
    pub batch_size_kg: Decimal,
    pub roasted_weight_kg: Decimal,
    pub roast_level: RoastLevel,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl RoastingService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Claim stock from an available green bean lot
    pub async fn claim(&self, user: &AuthUser, input: ClaimInput) -> AppResult<RoasterInventoryItem> {
        let mut data = self.store.write().await;
        let lot = data
            .green_bean_lots
            .iter_mut()
            .find(|l| l.id == input.green_bean_lot_id)
            .ok_or_else(|| AppError::NotFound("Green bean lot".to_string()))?;

        if lot.status != Availability::Available {
            tracing::warn!(lot_id = %lot.id, status = %lot.status, "Rejected roaster claim");
            return Err(AppError::InvalidStateTransition(format!(
                "Green bean lot {} is not available",
                lot.id
            )));
        }

        let today = Utc::now().date_naive();
        withdraw_from_lot(
            lot,
            input.weight_kg,
            ROASTER_CLAIM_PURPOSE,
            Some(user.name.clone()),
            &user.user_id,
            today,
        )?;

        let item = RoasterInventoryItem {
            id: generate_id(IdKind::RoasterInventory),
            roaster_id: user.user_id.clone(),
            green_bean_lot_id: lot.id.clone(),
            claimed_weight_kg: input.weight_kg,
            remaining_weight_kg: input.weight_kg,
            claimed_date: today,
        };
        data.roaster_inventory.push(item.clone());

        tracing::info!(item_id = %item.id, lot_id = %item.green_bean_lot_id, weight_kg = %item.claimed_weight_kg, "Green coffee claimed by roaster");
        Ok(item)
    }

    /// Record a roast against one of the roaster's inventory items
    pub async fn record_batch(&self, user: &AuthUser, input: RecordRoastInput) -> AppResult<RoastBatch> {
        input.validate()?;
        if input.batch_size_kg <= Decimal::ZERO {
            return Err(AppError::validation("batch_size_kg", "Batch size must be greater than zero"));
        }
        if input.roasted_weight_kg <= Decimal::ZERO {
            return Err(AppError::validation(
                "roasted_weight_kg",
                "Roasted weight must be greater than zero",
            ));
        }
        if input.roasted_weight_kg > input.batch_size_kg {
            return Err(AppError::validation(
                "roasted_weight_kg",
                "Roasted weight cannot exceed batch size",
            ));
        }

        let mut data = self.store.write().await;
        let item = data
            .roaster_inventory
            .iter_mut()
            .find(|i| i.id == input.inventory_item_id)
            .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?;

        if item.roaster_id != user.user_id && !user.is_admin() {
            return Err(AppError::InsufficientPermissions);
        }

        validate_roast_batch(item.remaining_weight_kg, input.batch_size_kg, input.roasted_weight_kg)
            .map_err(|msg| {
                AppError::InsufficientInventory(format!(
                    "{}: batch {} kg, {} kg remaining",
                    msg, input.batch_size_kg, item.remaining_weight_kg
                ))
            })?;

        item.remaining_weight_kg -= input.batch_size_kg;
        let batch = RoastBatch {
            id: generate_id(IdKind::RoastBatch),
            inventory_item_id: item.id.clone(),
            roaster_id: item.roaster_id.clone(),
            roast_date: input.roast_date.unwrap_or_else(|| Utc::now().date_naive()),
            batch_size_kg: input.batch_size_kg,
            roasted_weight_kg: input.roasted_weight_kg,
            roast_level: input.roast_level,
            yield_percent: calculate_roast_yield(input.batch_size_kg, input.roasted_weight_kg),
            notes: input.notes.filter(|n| !n.trim().is_empty()),
        };
        data.roast_batches.push(batch.clone());

        tracing::info!(batch_id = %batch.id, item_id = %batch.inventory_item_id, yield_percent = %batch.yield_percent, "Roast batch recorded");
        Ok(batch)
    }

    /// Roaster's own inventory; admins see every roaster's
    pub async fn list_inventory(&self, user: &AuthUser) -> AppResult<Vec<RoasterInventoryItem>> {
        let data = self.store.read().await;
        Ok(data
            .roaster_inventory
            .iter()
            .filter(|i| user.is_admin() || i.roaster_id == user.user_id)
            .cloned()
            .collect())
    }

    pub async fn list_batches(&self, user: &AuthUser) -> AppResult<Vec<RoastBatch>> {
        let data = self.store.read().await;
        let mut batches: Vec<RoastBatch> = data
            .roast_batches
            .iter()
            .filter(|b| user.is_admin() || b.roaster_id == user.user_id)
            .cloned()
            .collect();
        batches.sort_by(|a, b| b.roast_date.cmp(&a.roast_date));
        Ok(batches)
    }
}
