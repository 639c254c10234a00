//! Roaster inventory and roast batch models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Green coffee claimed by a roaster from a green bean lot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoasterInventoryItem {
    pub id: String,
    pub roaster_id: String,
    pub green_bean_lot_id: String,
    pub claimed_weight_kg: Decimal,
    pub remaining_weight_kg: Decimal,
    pub claimed_date: NaiveDate,
}

/// A roast drawn against a roaster inventory item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoastBatch {
    pub id: String,
    pub inventory_item_id: String,
    pub roaster_id: String,
    pub roast_date: NaiveDate,
    pub batch_size_kg: Decimal,
    pub roasted_weight_kg: Decimal,
    pub roast_level: RoastLevel,
    pub yield_percent: Decimal,
    pub notes: Option<String>,
}

/// Roast levels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoastLevel {
    Light,
    MediumLight,
    Medium,
    MediumDark,
    Dark,
}

impl std::fmt::Display for RoastLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoastLevel::Light => write!(f, "Light"),
            RoastLevel::MediumLight => write!(f, "Medium Light"),
            RoastLevel::Medium => write!(f, "Medium"),
            RoastLevel::MediumDark => write!(f, "Medium Dark"),
            RoastLevel::Dark => write!(f, "Dark"),
        }
    }
}

/// Roast yield: roasted / batch × 100, rounded to 2 dp
pub fn calculate_roast_yield(batch_size: Decimal, roasted_weight: Decimal) -> Decimal {
    if batch_size.is_zero() {
        Decimal::ZERO
    } else {
        ((roasted_weight / batch_size) * Decimal::from(100)).round_dp(2)
    }
}

/// Calculate weight loss percentage
pub fn calculate_weight_loss(green_weight: Decimal, roasted_weight: Decimal) -> Decimal {
    if green_weight.is_zero() {
        Decimal::ZERO
    } else {
        ((green_weight - roasted_weight) / green_weight) * Decimal::from(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roast_yield() {
        assert_eq!(
            calculate_roast_yield(Decimal::from(10), Decimal::new(84, 1)),
            Decimal::from(84)
        );
        assert_eq!(calculate_roast_yield(Decimal::ZERO, Decimal::from(5)), Decimal::ZERO);
    }

    #[test]
    fn test_roast_yield_rounds() {
        // 2 / 3 = 66.666...
        assert_eq!(
            calculate_roast_yield(Decimal::from(3), Decimal::from(2)),
            Decimal::new(6667, 2)
        );
    }

    #[test]
    fn test_yield_and_loss_are_complementary() {
        let batch = Decimal::from(12);
        let roasted = Decimal::from(9);
        assert_eq!(
            calculate_roast_yield(batch, roasted) + calculate_weight_loss(batch, roasted),
            Decimal::from(100)
        );
    }
}
