//! Farm and Good Agricultural Practice (GAP) log models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A farm registered on the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Farm {
    pub id: String,
    pub farmer_name: String,
    pub location: String,
    /// User account that manages this farm
    pub owner_id: Option<String>,
}

/// A GAP compliance activity entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapLogEntry {
    pub id: String,
    pub farm_id: String,
    pub date: NaiveDate,
    pub activity: GapActivity,
    pub description: String,
    pub product_used: Option<String>,
    pub quantity: Option<Decimal>,
    pub recorded_by: String,
}

/// GAP activity categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GapActivity {
    Fertilizer,
    PestControl,
    WaterManagement,
}

impl std::fmt::Display for GapActivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GapActivity::Fertilizer => write!(f, "Fertilizer"),
            GapActivity::PestControl => write!(f, "Pest Control"),
            GapActivity::WaterManagement => write!(f, "Water Management"),
        }
    }
}
