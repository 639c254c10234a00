//! Common types used across the platform

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tolerance used when comparing weights that must add up (kg)
pub fn weight_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// Round a weight or percentage to two decimal places for display
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// Entity id prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    User,
    Farm,
    HarvestLot,
    ProcessingBatch,
    ParchmentLot,
    GreenBeanLot,
    CuppingSession,
    CuppingSample,
    GapLog,
    RoasterInventory,
    RoastBatch,
    Withdrawal,
}

impl IdKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            IdKind::User => "USR",
            IdKind::Farm => "FARM",
            IdKind::HarvestLot => "HL",
            IdKind::ProcessingBatch => "PB",
            IdKind::ParchmentLot => "PL",
            IdKind::GreenBeanLot => "GB",
            IdKind::CuppingSession => "CS",
            IdKind::CuppingSample => "SMP",
            IdKind::GapLog => "GAP",
            IdKind::RoasterInventory => "RI",
            IdKind::RoastBatch => "RB",
            IdKind::Withdrawal => "WD",
        }
    }
}

/// Generate a new entity id (e.g., "HL-3F9A12C0")
pub fn generate_id(kind: IdKind) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", kind.prefix(), suffix[..8].to_uppercase())
}

/// Placeholder rendered for references that no longer resolve
pub const NOT_AVAILABLE: &str = "N/A";

/// Date range for queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Check whether a date falls inside the range (bounds inclusive, open ends allowed)
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_format() {
        let id = generate_id(IdKind::HarvestLot);
        assert!(id.starts_with("HL-"));
        assert_eq!(id.len(), 11);
        assert!(id[3..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_generate_id_unique() {
        let a = generate_id(IdKind::GreenBeanLot);
        let b = generate_id(IdKind::GreenBeanLot);
        assert_ne!(a, b);
    }

    #[test]
    fn test_date_range_open_ends() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let open = DateRange { start: None, end: None };
        assert!(open.contains(d));

        let bounded = DateRange {
            start: NaiveDate::from_ymd_opt(2024, 3, 15),
            end: NaiveDate::from_ymd_opt(2024, 3, 31),
        };
        assert!(bounded.contains(d));
        assert!(!bounded.contains(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
    }
}
