//! Processing models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A processing batch started from a harvest lot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingBatch {
    pub id: String,
    pub harvest_lot_id: String,
    pub status: BatchStatus,
    pub process_type: ProcessType,
    pub start_date: NaiveDate,
    pub drying_log: Vec<DryingReading>,
    pub completion: Option<BatchCompletion>,
}

/// Kanban column of a processing batch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    ToProcess,
    Drying,
    Completed,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::ToProcess => "to_process",
            BatchStatus::Drying => "drying",
            BatchStatus::Completed => "completed",
        }
    }

    /// Kanban moves only go forward; `Completed` is terminal
    pub fn can_move_to(&self, next: BatchStatus) -> bool {
        matches!(
            (self, next),
            (BatchStatus::ToProcess, BatchStatus::Drying)
                | (BatchStatus::ToProcess, BatchStatus::Completed)
                | (BatchStatus::Drying, BatchStatus::Completed)
        )
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchStatus::ToProcess => write!(f, "To Process"),
            BatchStatus::Drying => write!(f, "Drying"),
            BatchStatus::Completed => write!(f, "Completed"),
        }
    }
}

/// Coffee processing methods
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProcessType {
    Washed,
    Natural,
    Honey,
    Anaerobic,
    WetHulled,
}

impl std::fmt::Display for ProcessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessType::Washed => write!(f, "Washed"),
            ProcessType::Natural => write!(f, "Natural"),
            ProcessType::Honey => write!(f, "Honey"),
            ProcessType::Anaerobic => write!(f, "Anaerobic"),
            ProcessType::WetHulled => write!(f, "Wet Hulled"),
        }
    }
}

/// One reading in the drying log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DryingReading {
    pub timestamp: DateTime<Utc>,
    pub moisture_percent: Decimal,
    pub temperature_celsius: Decimal,
    pub humidity_percent: Decimal,
}

/// Fields captured when a batch is moved to `Completed`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCompletion {
    pub completed_date: NaiveDate,
    pub final_moisture_percent: Decimal,
    pub parchment_weight_kg: Decimal,
}

/// Summary of a drying log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DryingSummary {
    pub readings: usize,
    pub first_moisture_percent: Option<Decimal>,
    pub last_moisture_percent: Option<Decimal>,
    pub max_temperature_celsius: Option<Decimal>,
    pub average_humidity_percent: Option<Decimal>,
}

impl ProcessingBatch {
    pub fn drying_summary(&self) -> DryingSummary {
        let readings = self.drying_log.len();
        let average_humidity_percent = if readings == 0 {
            None
        } else {
            let total: Decimal = self.drying_log.iter().map(|r| r.humidity_percent).sum();
            Some((total / Decimal::from(readings)).round_dp(2))
        };

        DryingSummary {
            readings,
            first_moisture_percent: self.drying_log.first().map(|r| r.moisture_percent),
            last_moisture_percent: self.drying_log.last().map(|r| r.moisture_percent),
            max_temperature_celsius: self.drying_log.iter().map(|r| r.temperature_celsius).max(),
            average_humidity_percent,
        }
    }
}

/// Calculate processing yield (parchment out of cherry, %)
pub fn calculate_processing_yield(cherry_weight: Decimal, output_weight: Decimal) -> Decimal {
    if cherry_weight.is_zero() {
        Decimal::ZERO
    } else {
        (output_weight / cherry_weight) * Decimal::from(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_moves_allowed() {
        assert!(BatchStatus::ToProcess.can_move_to(BatchStatus::Drying));
        assert!(BatchStatus::Drying.can_move_to(BatchStatus::Completed));
        assert!(BatchStatus::ToProcess.can_move_to(BatchStatus::Completed));
    }

    #[test]
    fn test_backward_and_same_moves_rejected() {
        assert!(!BatchStatus::Drying.can_move_to(BatchStatus::ToProcess));
        assert!(!BatchStatus::Completed.can_move_to(BatchStatus::Drying));
        assert!(!BatchStatus::Drying.can_move_to(BatchStatus::Drying));
    }

    #[test]
    fn test_processing_yield() {
        assert_eq!(
            calculate_processing_yield(Decimal::from(200), Decimal::from(40)),
            Decimal::from(20)
        );
        assert_eq!(
            calculate_processing_yield(Decimal::ZERO, Decimal::from(40)),
            Decimal::ZERO
        );
    }
}
