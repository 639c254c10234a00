//! Processing batch service
//!
//! Tracks wet processing and drying of harvest lots on a kanban board:
//! `to_process -> drying -> completed`. Completing a batch produces a
//! parchment lot for the dry mill.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    generate_id, validate_humidity, validate_moisture_content, validate_positive_weight,
    BatchCompletion, BatchStatus, DryingReading, HarvestLotStatus, IdKind, ParchmentLot,
    ParchmentStatus, ProcessType, ProcessingBatch,
};

use crate::error::{AppError, AppResult};
use crate::store::Store;

/// Processing service
#[derive(Clone)]
pub struct ProcessingService {
    store: Store,
}

/// Input for starting a batch
#[derive(Debug, Deserialize)]
pub struct StartBatchInput {
    pub harvest_lot_id: String,
    pub process_type: ProcessType,
    /// Defaults to today
    pub start_date: Option<NaiveDate>,
}

/// Input for a drying log reading
#[derive(Debug, Deserialize)]
pub struct DryingReadingInput {
    pub moisture_percent: Decimal,
    pub temperature_celsius: Decimal,
    pub humidity_percent: Decimal,
    /// Defaults to now
    pub timestamp: Option<DateTime<Utc>>,
}

/// Input for moving a batch on the board
#[derive(Debug, Deserialize)]
pub struct MoveBatchInput {
    pub status: BatchStatus,
    /// Required when moving to `completed`
    pub completion: Option<CompletionInput>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionInput {
    pub completed_date: NaiveDate,
    pub final_moisture_percent: Decimal,
    pub parchment_weight_kg: Decimal,
}

/// Result of a kanban move
#[derive(Debug, Serialize)]
pub struct MoveBatchResult {
    pub batch: ProcessingBatch,
    /// Present when the move completed the batch
    pub parchment_lot: Option<ParchmentLot>,
}

/// Batches grouped by column
#[derive(Debug, Default, Serialize)]
pub struct KanbanBoard {
    pub to_process: Vec<ProcessingBatch>,
    pub drying: Vec<ProcessingBatch>,
    pub completed: Vec<ProcessingBatch>,
}

impl ProcessingService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Start a batch from a harvest lot that is ready for processing
    pub async fn start_batch(&self, input: StartBatchInput) -> AppResult<ProcessingBatch> {
        let mut data = self.store.write().await;
        let lot = data
            .harvest_lots
            .iter_mut()
            .find(|l| l.id == input.harvest_lot_id)
            .ok_or_else(|| AppError::NotFound("Harvest lot".to_string()))?;

        if lot.status != HarvestLotStatus::Ready {
            tracing::warn!(lot_id = %lot.id, status = %lot.status, "Rejected batch start");
            return Err(AppError::InvalidStateTransition(format!(
                "Harvest lot {} is already {}",
                lot.id,
                lot.status.as_str()
            )));
        }

        let start_date = input.start_date.unwrap_or_else(|| Utc::now().date_naive());
        if start_date < lot.harvest_date {
            return Err(AppError::validation(
                "start_date",
                "Processing cannot start before the harvest date",
            ));
        }

        lot.status = HarvestLotStatus::Processing;
        let batch = ProcessingBatch {
            id: generate_id(IdKind::ProcessingBatch),
            harvest_lot_id: lot.id.clone(),
            status: BatchStatus::ToProcess,
            process_type: input.process_type,
            start_date,
            drying_log: vec![],
            completion: None,
        };
        data.processing_batches.push(batch.clone());

        tracing::info!(batch_id = %batch.id, lot_id = %batch.harvest_lot_id, process = %batch.process_type, "Processing batch started");
        Ok(batch)
    }

    /// Append a drying reading; a batch still waiting to be processed moves to `drying`
    pub async fn add_drying_reading(
        &self,
        batch_id: &str,
        input: DryingReadingInput,
    ) -> AppResult<ProcessingBatch> {
        validate_moisture_content(input.moisture_percent)
            .map_err(|msg| AppError::validation("moisture_percent", msg))?;
        validate_humidity(input.humidity_percent)
            .map_err(|msg| AppError::validation("humidity_percent", msg))?;

        let mut data = self.store.write().await;
        let batch = data
            .processing_batches
            .iter_mut()
            .find(|b| b.id == batch_id)
            .ok_or_else(|| AppError::NotFound("Processing batch".to_string()))?;

        if batch.status == BatchStatus::Completed {
            tracing::warn!(batch_id, "Rejected drying reading on completed batch");
            return Err(AppError::InvalidStateTransition(
                "Cannot log drying readings on a completed batch".to_string(),
            ));
        }

        batch.drying_log.push(DryingReading {
            timestamp: input.timestamp.unwrap_or_else(Utc::now),
            moisture_percent: input.moisture_percent,
            temperature_celsius: input.temperature_celsius,
            humidity_percent: input.humidity_percent,
        });
        batch.drying_log.sort_by_key(|r| r.timestamp);

        if batch.status == BatchStatus::ToProcess {
            batch.status = BatchStatus::Drying;
            tracing::info!(batch_id, "Batch moved to drying by first reading");
        }

        Ok(batch.clone())
    }

    /// Move a batch forward on the board
    pub async fn move_batch(
        &self,
        batch_id: &str,
        input: MoveBatchInput,
    ) -> AppResult<MoveBatchResult> {
        let mut data = self.store.write().await;
        let batch_idx = data
            .processing_batches
            .iter()
            .position(|b| b.id == batch_id)
            .ok_or_else(|| AppError::NotFound("Processing batch".to_string()))?;

        let current = data.processing_batches[batch_idx].status;
        if !current.can_move_to(input.status) {
            tracing::warn!(batch_id, from = %current, to = %input.status, "Rejected kanban move");
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot move batch from {} to {}",
                current.as_str(),
                input.status.as_str()
            )));
        }

        if input.status != BatchStatus::Completed {
            let batch = &mut data.processing_batches[batch_idx];
            batch.status = input.status;
            tracing::info!(batch_id, status = %batch.status, "Batch moved");
            return Ok(MoveBatchResult {
                batch: batch.clone(),
                parchment_lot: None,
            });
        }

        let completion = input.completion.ok_or_else(|| {
            AppError::validation("completion", "Completion details are required")
        })?;
        validate_positive_weight(completion.parchment_weight_kg)
            .map_err(|msg| AppError::validation("parchment_weight_kg", msg))?;
        validate_moisture_content(completion.final_moisture_percent)
            .map_err(|msg| AppError::validation("final_moisture_percent", msg))?;

        let batch = &data.processing_batches[batch_idx];
        if completion.completed_date < batch.start_date {
            return Err(AppError::validation(
                "completed_date",
                "Completion date cannot be before the start date",
            ));
        }
        if let Some(lot) = data.harvest_lot(&batch.harvest_lot_id) {
            if completion.parchment_weight_kg > lot.weight_kg {
                return Err(AppError::validation(
                    "parchment_weight_kg",
                    "Parchment weight cannot exceed the harvested cherry weight",
                ));
            }
        }

        let parchment = ParchmentLot {
            id: generate_id(IdKind::ParchmentLot),
            batch_id: batch_id.to_string(),
            weight_kg: completion.parchment_weight_kg,
            moisture_percent: completion.final_moisture_percent,
            status: ParchmentStatus::AwaitingHulling,
            lab_results: None,
        };

        let batch = &mut data.processing_batches[batch_idx];
        batch.status = BatchStatus::Completed;
        batch.completion = Some(BatchCompletion {
            completed_date: completion.completed_date,
            final_moisture_percent: completion.final_moisture_percent,
            parchment_weight_kg: completion.parchment_weight_kg,
        });
        let batch = batch.clone();
        data.parchment_lots.push(parchment.clone());

        tracing::info!(batch_id, parchment_id = %parchment.id, weight_kg = %parchment.weight_kg, "Batch completed");
        Ok(MoveBatchResult {
            batch,
            parchment_lot: Some(parchment),
        })
    }

    pub async fn list_batches(&self, status: Option<BatchStatus>) -> AppResult<Vec<ProcessingBatch>> {
        let data = self.store.read().await;
        let mut batches: Vec<ProcessingBatch> = data
            .processing_batches
            .iter()
            .filter(|b| status.map_or(true, |s| b.status == s))
            .cloned()
            .collect();
        batches.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(batches)
    }

    pub async fn get_batch(&self, batch_id: &str) -> AppResult<ProcessingBatch> {
        let data = self.store.read().await;
        data.batch(batch_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Processing batch".to_string()))
    }

    /// All batches grouped by kanban column
    pub async fn board(&self) -> AppResult<KanbanBoard> {
        let batches = self.list_batches(None).await?;
        let mut board = KanbanBoard::default();
        for batch in batches {
            match batch.status {
                BatchStatus::ToProcess => board.to_process.push(batch),
                BatchStatus::Drying => board.drying.push(batch),
                BatchStatus::Completed => board.completed.push(batch),
            }
        }
        Ok(board)
    }
}
