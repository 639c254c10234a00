//! Harvest lot models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A harvest lot registered by a farmer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestLot {
    pub id: String,
    pub farm_id: String,
    pub farmer_name: String,
    pub variety: String,
    pub weight_kg: Decimal,
    pub plot: String,
    pub harvest_date: NaiveDate,
    pub status: HarvestLotStatus,
    pub created_by: Option<String>,
}

/// Harvest lot status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HarvestLotStatus {
    Ready,
    Processing,
}

impl HarvestLotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HarvestLotStatus::Ready => "ready",
            HarvestLotStatus::Processing => "processing",
        }
    }
}

impl std::fmt::Display for HarvestLotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HarvestLotStatus::Ready => write!(f, "Ready"),
            HarvestLotStatus::Processing => write!(f, "Processing"),
        }
    }
}
