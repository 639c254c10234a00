//! Public traceability view
//!
//! Resolves a green bean lot (or a harvest lot) back through the provenance
//! chain. Links that no longer resolve are rendered as "N/A".

use std::fmt::Display;

use reqwest::Url;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    classify_by_score, DryingSummary, GreenBeanLot, HarvestLot, LotCuppingScore, ParchmentLot,
    PhysicalLabResults, ProcessingBatch, NOT_AVAILABLE,
};

use crate::config::TraceabilityConfig;
use crate::error::{AppError, AppResult};
use crate::store::{AppData, Store};

const QR_SIZE: &str = "200x200";

/// Traceability service
#[derive(Clone)]
pub struct TraceabilityService {
    store: Store,
    config: TraceabilityConfig,
}

/// Public traceability page payload
#[derive(Debug, Serialize)]
pub struct TraceabilityView {
    pub lot_id: String,
    pub page_url: String,
    pub qr_code_url: String,
    pub origin: OriginSection,
    pub processing: ProcessingSection,
    pub milling: MillingSection,
    pub cupping: CuppingSection,
    pub roasting: RoastingSection,
}

#[derive(Debug, Serialize)]
pub struct OriginSection {
    pub farm_id: String,
    pub farmer_name: String,
    pub location: String,
    pub harvest_lot_id: String,
    pub variety: String,
    pub plot: String,
    pub harvest_date: String,
    pub harvest_weight_kg: String,
}

#[derive(Debug, Serialize)]
pub struct ProcessingSection {
    pub batch_id: String,
    pub process_type: String,
    pub status: String,
    pub start_date: String,
    pub completed_date: String,
    pub drying: Option<DryingSummary>,
}

#[derive(Debug, Serialize)]
pub struct MillingSection {
    pub parchment_lot_id: String,
    pub parchment_moisture_percent: String,
    pub lab_results: Option<PhysicalLabResults>,
    pub grade: String,
    pub green_weight_kg: String,
}

#[derive(Debug, Serialize)]
pub struct CuppingSection {
    pub scores: Vec<LotCuppingScore>,
    pub average_score: String,
    pub classification: String,
}

#[derive(Debug, Serialize)]
pub struct RoastingSection {
    pub batches: Vec<RoastSummary>,
}

#[derive(Debug, Serialize)]
pub struct RoastSummary {
    pub roast_date: String,
    pub roast_level: String,
    pub batch_size_kg: Decimal,
    pub yield_percent: Decimal,
}

fn or_na<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

/// Public page URL and QR image URL for a lot
pub fn trace_urls(config: &TraceabilityConfig, lot_id: &str) -> AppResult<(String, String)> {
    let page_url = format!(
        "{}/trace/{}",
        config.public_base_url.trim_end_matches('/'),
        lot_id
    );
    let qr_url = Url::parse_with_params(
        &config.qr_api_url,
        &[("size", QR_SIZE), ("data", page_url.as_str())],
    )
    .map_err(|e| AppError::Configuration(format!("Invalid QR API URL: {}", e)))?;
    Ok((page_url, qr_url.to_string()))
}

struct Chain<'a> {
    harvest: Option<&'a HarvestLot>,
    batch: Option<&'a ProcessingBatch>,
    parchment: Option<&'a ParchmentLot>,
    green: Option<&'a GreenBeanLot>,
}

/// Walk the chain from whichever lot id was given
fn resolve<'a>(data: &'a AppData, lot_id: &str) -> Option<Chain<'a>> {
    if let Some(green) = data.green_lot(lot_id) {
        let parchment = data.parchment_lot(&green.parchment_lot_id);
        let batch = parchment.and_then(|p| data.batch(&p.batch_id));
        let harvest = batch.and_then(|b| data.harvest_lot(&b.harvest_lot_id));
        return Some(Chain {
            harvest,
            batch,
            parchment,
            green: Some(green),
        });
    }

    let harvest = data.harvest_lot(lot_id)?;
    let batch = data
        .processing_batches
        .iter()
        .filter(|b| b.harvest_lot_id == harvest.id)
        .min_by_key(|b| b.start_date);
    let parchment = batch.and_then(|b| data.parchment_lots.iter().find(|p| p.batch_id == b.id));
    Some(Chain {
        harvest: Some(harvest),
        batch,
        parchment,
        green: None,
    })
}

fn build_view(
    data: &AppData,
    chain: &Chain<'_>,
    lot_id: &str,
    urls: (String, String),
) -> TraceabilityView {
    let farm = chain.harvest.and_then(|h| data.farm(&h.farm_id));

    let origin = OriginSection {
        farm_id: or_na(chain.harvest.map(|h| &h.farm_id)),
        farmer_name: or_na(farm.map(|f| &f.farmer_name)),
        location: or_na(farm.map(|f| &f.location)),
        harvest_lot_id: or_na(chain.harvest.map(|h| &h.id)),
        variety: or_na(chain.harvest.map(|h| &h.variety)),
        plot: or_na(chain.harvest.map(|h| &h.plot)),
        harvest_date: or_na(chain.harvest.map(|h| h.harvest_date)),
        harvest_weight_kg: or_na(chain.harvest.map(|h| h.weight_kg)),
    };

    let completion = chain.batch.and_then(|b| b.completion.as_ref());
    let processing = ProcessingSection {
        batch_id: or_na(chain.batch.map(|b| &b.id)),
        process_type: or_na(chain.batch.map(|b| b.process_type)),
        status: or_na(chain.batch.map(|b| b.status)),
        start_date: or_na(chain.batch.map(|b| b.start_date)),
        completed_date: or_na(completion.map(|c| c.completed_date)),
        drying: chain
            .batch
            .map(|b| b.drying_summary())
            .filter(|s| s.readings > 0),
    };

    let milling = MillingSection {
        parchment_lot_id: or_na(chain.parchment.map(|p| &p.id)),
        parchment_moisture_percent: or_na(chain.parchment.map(|p| p.moisture_percent)),
        lab_results: chain.parchment.and_then(|p| p.lab_results.clone()),
        grade: or_na(chain.green.map(|g| g.grade)),
        green_weight_kg: or_na(chain.green.map(|g| g.initial_weight_kg)),
    };

    let average = chain.green.and_then(|g| g.average_cupping_score());
    let cupping = CuppingSection {
        scores: chain
            .green
            .map(|g| g.cupping_scores.clone())
            .unwrap_or_default(),
        average_score: or_na(average),
        classification: or_na(average.map(classify_by_score)),
    };

    let batches = match chain.green {
        Some(green) => data
            .roaster_inventory
            .iter()
            .filter(|i| i.green_bean_lot_id == green.id)
            .flat_map(move |item| {
                data.roast_batches
                    .iter()
                    .filter(move |b| b.inventory_item_id == item.id)
            })
            .map(|b| RoastSummary {
                roast_date: b.roast_date.to_string(),
                roast_level: b.roast_level.to_string(),
                batch_size_kg: b.batch_size_kg,
                yield_percent: b.yield_percent,
            })
            .collect(),
        None => vec![],
    };

    let (page_url, qr_code_url) = urls;
    TraceabilityView {
        lot_id: lot_id.to_string(),
        page_url,
        qr_code_url,
        origin,
        processing,
        milling,
        cupping,
        roasting: RoastingSection { batches },
    }
}

impl TraceabilityService {
    pub fn new(store: Store, config: TraceabilityConfig) -> Self {
        Self { store, config }
    }

    /// Public view of a lot's journey from farm to roaster
    pub async fn trace(&self, lot_id: &str) -> AppResult<TraceabilityView> {
        let data = self.store.read().await;
        let chain = resolve(&data, lot_id).ok_or_else(|| AppError::NotFound("Lot".to_string()))?;
        let urls = trace_urls(&self.config, lot_id)?;

        tracing::debug!(lot_id, "Traceability view served");
        Ok(build_view(&data, &chain, lot_id, urls))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_urls_encode_page_url() {
        let config = TraceabilityConfig {
            public_base_url: "https://trace.example.com/".to_string(),
            qr_api_url: "https://api.qrserver.com/v1/create-qr-code/".to_string(),
        };
        let (page, qr) = trace_urls(&config, "GB-1A2B3C4D").unwrap();
        assert_eq!(page, "https://trace.example.com/trace/GB-1A2B3C4D");
        assert!(qr.starts_with("https://api.qrserver.com/v1/create-qr-code/?size=200x200&data="));
        assert!(qr.contains("https%3A%2F%2Ftrace.example.com%2Ftrace%2FGB-1A2B3C4D"));
    }

    #[test]
    fn test_or_na() {
        assert_eq!(or_na(None::<String>), "N/A");
        assert_eq!(or_na(Some(Decimal::new(125, 1))), "12.5");
    }
}
