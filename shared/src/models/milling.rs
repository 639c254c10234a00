//! Parchment and green bean lot models (dry milling)

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Dried parchment produced by a completed processing batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParchmentLot {
    pub id: String,
    pub batch_id: String,
    pub weight_kg: Decimal,
    pub moisture_percent: Decimal,
    pub status: ParchmentStatus,
    pub lab_results: Option<PhysicalLabResults>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParchmentStatus {
    AwaitingHulling,
    Hulled,
}

impl std::fmt::Display for ParchmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParchmentStatus::AwaitingHulling => write!(f, "Awaiting Hulling"),
            ParchmentStatus::Hulled => write!(f, "Hulled"),
        }
    }
}

/// Physical lab analysis of a parchment sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalLabResults {
    pub moisture_percent: Decimal,
    pub water_activity: Decimal,
    /// g/L
    pub density: Option<Decimal>,
    /// Dominant screen size (e.g., 16)
    pub screen_size: Option<u8>,
    pub primary_defects: u32,
    pub secondary_defects: u32,
    pub tested_by: String,
    pub tested_at: DateTime<Utc>,
}

/// Green (hulled) coffee available for cupping, sale and roasting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GreenBeanLot {
    pub id: String,
    pub parchment_lot_id: String,
    pub grade: GreenGrade,
    pub initial_weight_kg: Decimal,
    pub current_weight_kg: Decimal,
    pub status: Availability,
    pub cupping_scores: Vec<LotCuppingScore>,
    pub withdrawals: Vec<Withdrawal>,
}

impl GreenBeanLot {
    /// Mean of all recorded session scores
    pub fn average_cupping_score(&self) -> Option<Decimal> {
        if self.cupping_scores.is_empty() {
            return None;
        }
        let total: Decimal = self.cupping_scores.iter().map(|s| s.score).sum();
        Some((total / Decimal::from(self.cupping_scores.len())).round_dp(2))
    }

    pub fn total_withdrawn_kg(&self) -> Decimal {
        self.withdrawals.iter().map(|w| w.weight_kg).sum()
    }
}

/// Size/quality grade assigned at hulling
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GreenGrade {
    #[serde(rename = "AA")]
    Aa,
    A,
    B,
    C,
    #[serde(rename = "PB")]
    Peaberry,
}

impl std::fmt::Display for GreenGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GreenGrade::Aa => write!(f, "AA"),
            GreenGrade::A => write!(f, "A"),
            GreenGrade::B => write!(f, "B"),
            GreenGrade::C => write!(f, "C"),
            GreenGrade::Peaberry => write!(f, "PB"),
        }
    }
}

/// Availability of a green bean lot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    Reserved,
    Depleted,
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Availability::Available => write!(f, "Available"),
            Availability::Reserved => write!(f, "Reserved"),
            Availability::Depleted => write!(f, "Depleted"),
        }
    }
}

/// Score a lot received in a cupping session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotCuppingScore {
    pub session_id: String,
    pub session_name: String,
    pub date: NaiveDate,
    pub score: Decimal,
}

/// A withdrawal of green coffee from a lot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: String,
    pub weight_kg: Decimal,
    pub purpose: String,
    pub recipient: Option<String>,
    pub withdrawn_by: String,
    pub date: NaiveDate,
}

/// One output of a hull-and-grade split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeSplit {
    pub grade: GreenGrade,
    pub weight_kg: Decimal,
}
