//! Green bean inventory service
//!
//! Withdrawals reduce a lot's current weight; a lot that reaches zero is
//! marked depleted and can no longer change availability.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    generate_id, validate_withdrawal, Availability, GreenBeanLot, GreenGrade, IdKind, Withdrawal,
};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::store::Store;

/// Inventory service
#[derive(Clone)]
pub struct InventoryService {
    store: Store,
}

/// Filters for listing green bean lots
#[derive(Debug, Default, Deserialize)]
pub struct GreenLotFilter {
    pub status: Option<Availability>,
    pub grade: Option<GreenGrade>,
}

/// Input for withdrawing coffee from a lot
#[derive(Debug, Deserialize, Validate)]
pub struct WithdrawInput {
    pub weight_kg: Decimal,
    #[validate(length(min = 1, max = 200))]
    pub purpose: String,
    #[validate(length(max = 200))]
    pub recipient: Option<String>,
    /// Defaults to today
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SetAvailabilityInput {
    pub status: Availability,
}

/// Take weight out of a lot and append the withdrawal record
pub(crate) fn withdraw_from_lot(
    lot: &mut GreenBeanLot,
    weight_kg: Decimal,
    purpose: &str,
    recipient: Option<String>,
    withdrawn_by: &str,
    date: NaiveDate,
) -> AppResult<Withdrawal> {
    if lot.status == Availability::Depleted {
        return Err(AppError::InsufficientInventory(format!(
            "Green bean lot {} is depleted",
            lot.id
        )));
    }
    if weight_kg <= Decimal::ZERO {
        return Err(AppError::validation("weight_kg", "Weight must be greater than zero"));
    }
    validate_withdrawal(lot.current_weight_kg, weight_kg).map_err(|msg| {
        AppError::InsufficientInventory(format!(
            "{}: requested {} kg, {} kg remaining",
            msg, weight_kg, lot.current_weight_kg
        ))
    })?;

    let withdrawal = Withdrawal {
        id: generate_id(IdKind::Withdrawal),
        weight_kg,
        purpose: purpose.to_string(),
        recipient,
        withdrawn_by: withdrawn_by.to_string(),
        date,
    };
    lot.current_weight_kg -= weight_kg;
    lot.withdrawals.push(withdrawal.clone());

    if lot.current_weight_kg.is_zero() {
        lot.status = Availability::Depleted;
        tracing::info!(lot_id = %lot.id, "Green bean lot depleted");
    }

    Ok(withdrawal)
}

impl InventoryService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn list_lots(&self, filter: &GreenLotFilter) -> AppResult<Vec<GreenBeanLot>> {
        let data = self.store.read().await;
        Ok(data
            .green_bean_lots
            .iter()
            .filter(|l| filter.status.map_or(true, |s| l.status == s))
            .filter(|l| filter.grade.map_or(true, |g| l.grade == g))
            .cloned()
            .collect())
    }

    pub async fn get_lot(&self, lot_id: &str) -> AppResult<GreenBeanLot> {
        let data = self.store.read().await;
        data.green_lot(lot_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Green bean lot".to_string()))
    }

    pub async fn withdraw(
        &self,
        user: &AuthUser,
        lot_id: &str,
        input: WithdrawInput,
    ) -> AppResult<GreenBeanLot> {
        input.validate()?;
        let mut data = self.store.write().await;
        let lot = data
            .green_bean_lots
            .iter_mut()
            .find(|l| l.id == lot_id)
            .ok_or_else(|| AppError::NotFound("Green bean lot".to_string()))?;

        let withdrawal = withdraw_from_lot(
            lot,
            input.weight_kg,
            input.purpose.trim(),
            input.recipient,
            &user.user_id,
            input.date.unwrap_or_else(|| Utc::now().date_naive()),
        )?;

        tracing::info!(lot_id, withdrawal_id = %withdrawal.id, weight_kg = %withdrawal.weight_kg, remaining = %lot.current_weight_kg, "Green coffee withdrawn");
        Ok(lot.clone())
    }

    /// Mark a lot available or reserved
    pub async fn set_availability(
        &self,
        lot_id: &str,
        input: SetAvailabilityInput,
    ) -> AppResult<GreenBeanLot> {
        if input.status == Availability::Depleted {
            return Err(AppError::validation(
                "status",
                "Lots become depleted only by withdrawing all stock",
            ));
        }

        let mut data = self.store.write().await;
        let lot = data
            .green_bean_lots
            .iter_mut()
            .find(|l| l.id == lot_id)
            .ok_or_else(|| AppError::NotFound("Green bean lot".to_string()))?;

        if lot.status == Availability::Depleted {
            return Err(AppError::InvalidStateTransition(format!(
                "Green bean lot {} is depleted",
                lot.id
            )));
        }

        lot.status = input.status;
        tracing::info!(lot_id, status = %lot.status, "Availability changed");
        Ok(lot.clone())
    }
}
