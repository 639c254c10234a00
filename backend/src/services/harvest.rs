//! Harvest lot registration and listing service

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    generate_id, validate_harvest_date, validate_positive_weight, DateRange, HarvestLot,
    HarvestLotStatus, IdKind, Role,
};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::store::Store;

/// Harvest service
#[derive(Clone)]
pub struct HarvestService {
    store: Store,
}

/// Input for registering a harvest lot
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterHarvestInput {
    #[validate(length(min = 1))]
    pub farm_id: String,
    #[validate(length(min = 1, max = 100))]
    pub variety: String,
    pub weight_kg: Decimal,
    #[validate(length(min = 1, max = 100))]
    pub plot: String,
    pub harvest_date: NaiveDate,
}

/// Filters for listing harvest lots
#[derive(Debug, Default, Deserialize)]
pub struct HarvestLotFilter {
    pub farm_id: Option<String>,
    pub status: Option<HarvestLotStatus>,
    pub variety: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl HarvestLotFilter {
    fn matches(&self, lot: &HarvestLot) -> bool {
        let range = DateRange {
            start: self.start_date,
            end: self.end_date,
        };
        self.farm_id.as_deref().map_or(true, |f| lot.farm_id == f)
            && self.status.map_or(true, |s| lot.status == s)
            && self
                .variety
                .as_deref()
                .map_or(true, |v| lot.variety.eq_ignore_ascii_case(v))
            && range.contains(lot.harvest_date)
    }
}

/// Row of the harvest lot CSV export
#[derive(Debug, Serialize)]
pub struct HarvestLotCsvRow {
    pub id: String,
    pub farm_id: String,
    pub farmer_name: String,
    pub variety: String,
    pub weight_kg: Decimal,
    pub plot: String,
    pub harvest_date: NaiveDate,
    pub status: String,
}

impl From<&HarvestLot> for HarvestLotCsvRow {
    fn from(lot: &HarvestLot) -> Self {
        Self {
            id: lot.id.clone(),
            farm_id: lot.farm_id.clone(),
            farmer_name: lot.farmer_name.clone(),
            variety: lot.variety.clone(),
            weight_kg: lot.weight_kg,
            plot: lot.plot.clone(),
            harvest_date: lot.harvest_date,
            status: lot.status.as_str().to_string(),
        }
    }
}

impl HarvestService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Register a new harvest lot against a farm
    pub async fn register_lot(
        &self,
        user: &AuthUser,
        input: RegisterHarvestInput,
    ) -> AppResult<HarvestLot> {
        input.validate()?;
        if input.variety.trim().is_empty() {
            return Err(AppError::validation("variety", "Variety is required"));
        }
        if input.plot.trim().is_empty() {
            return Err(AppError::validation("plot", "Plot is required"));
        }
        validate_positive_weight(input.weight_kg)
            .map_err(|msg| AppError::validation("weight_kg", msg))?;
        validate_harvest_date(input.harvest_date, Utc::now().date_naive())
            .map_err(|msg| AppError::validation("harvest_date", msg))?;

        let mut data = self.store.write().await;
        let farm = data
            .farm(&input.farm_id)
            .ok_or_else(|| AppError::NotFound("Farm".to_string()))?;

        if user.role == Role::Farmer && farm.owner_id.as_deref() != Some(&user.user_id) {
            return Err(AppError::InsufficientPermissions);
        }

        let lot = HarvestLot {
            id: generate_id(IdKind::HarvestLot),
            farm_id: farm.id.clone(),
            farmer_name: farm.farmer_name.clone(),
            variety: input.variety.trim().to_string(),
            weight_kg: input.weight_kg,
            plot: input.plot.trim().to_string(),
            harvest_date: input.harvest_date,
            status: HarvestLotStatus::Ready,
            created_by: Some(user.user_id.clone()),
        };
        data.harvest_lots.push(lot.clone());

        tracing::info!(lot_id = %lot.id, farm_id = %lot.farm_id, weight_kg = %lot.weight_kg, "Harvest lot registered");
        Ok(lot)
    }

    /// List harvest lots; farmers only see lots from their own farms
    pub async fn list_lots(
        &self,
        user: &AuthUser,
        filter: &HarvestLotFilter,
    ) -> AppResult<Vec<HarvestLot>> {
        let data = self.store.read().await;
        let mut lots: Vec<HarvestLot> = data
            .harvest_lots
            .iter()
            .filter(|l| user.role != Role::Farmer || data.owns_farm(&user.user_id, &l.farm_id))
            .filter(|l| filter.matches(l))
            .cloned()
            .collect();
        lots.sort_by(|a, b| b.harvest_date.cmp(&a.harvest_date).then_with(|| a.id.cmp(&b.id)));

        tracing::debug!(count = lots.len(), "Listed harvest lots");
        Ok(lots)
    }

    pub async fn get_lot(&self, user: &AuthUser, lot_id: &str) -> AppResult<HarvestLot> {
        let data = self.store.read().await;
        let lot = data
            .harvest_lot(lot_id)
            .ok_or_else(|| AppError::NotFound("Harvest lot".to_string()))?;

        if user.role == Role::Farmer && !data.owns_farm(&user.user_id, &lot.farm_id) {
            return Err(AppError::InsufficientPermissions);
        }
        Ok(lot.clone())
    }

    /// Filtered rows for the CSV export
    pub async fn export_rows(
        &self,
        user: &AuthUser,
        filter: &HarvestLotFilter,
    ) -> AppResult<Vec<HarvestLotCsvRow>> {
        let lots = self.list_lots(user, filter).await?;
        Ok(lots.iter().map(HarvestLotCsvRow::from).collect())
    }
}
