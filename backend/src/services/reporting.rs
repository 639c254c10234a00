//! Reporting service: CSV export and AI report data aggregation

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{Attribute, SessionStatus, NOT_AVAILABLE};

use crate::error::{AppError, AppResult};
use crate::external::ReportContext;
use crate::store::{AppData, Store};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    store: Store,
}

/// Mean of each attribute over a set of per-sample attribute maps
fn mean_attributes<'a, I>(maps: I) -> BTreeMap<Attribute, Decimal>
where
    I: IntoIterator<Item = &'a BTreeMap<Attribute, Decimal>>,
{
    let mut sums: BTreeMap<Attribute, (Decimal, u32)> = BTreeMap::new();
    for map in maps {
        for (attr, value) in map {
            let entry = sums.entry(*attr).or_insert((Decimal::ZERO, 0));
            entry.0 += *value;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(attr, (sum, n))| (attr, (sum / Decimal::from(n)).round_dp(2)))
        .collect()
}

fn lot_context(data: &AppData, lot_id: &str) -> AppResult<ReportContext> {
    let lot = data
        .green_lot(lot_id)
        .ok_or_else(|| AppError::NotFound("Green bean lot".to_string()))?;
    let parchment = data.parchment_lot(&lot.parchment_lot_id);
    let batch = parchment.and_then(|p| data.batch(&p.batch_id));
    let harvest = batch.and_then(|b| data.harvest_lot(&b.harvest_lot_id));
    let farm = harvest.and_then(|h| data.farm(&h.farm_id));

    let mut facts = vec![
        format!(
            "Farm: {} ({})",
            farm.map_or(NOT_AVAILABLE, |f| f.farmer_name.as_str()),
            farm.map_or(NOT_AVAILABLE, |f| f.location.as_str())
        ),
        format!(
            "Variety: {}, plot {}",
            harvest.map_or(NOT_AVAILABLE, |h| h.variety.as_str()),
            harvest.map_or(NOT_AVAILABLE, |h| h.plot.as_str())
        ),
        format!(
            "Process: {}",
            batch.map_or_else(|| NOT_AVAILABLE.to_string(), |b| b.process_type.to_string())
        ),
    ];
    if let Some(summary) = batch.map(|b| b.drying_summary()).filter(|s| s.readings > 0) {
        facts.push(format!(
            "Drying: {} readings, moisture {} -> {}%",
            summary.readings,
            summary.first_moisture_percent.unwrap_or_default(),
            summary.last_moisture_percent.unwrap_or_default()
        ));
    }
    if let Some(lab) = parchment.and_then(|p| p.lab_results.as_ref()) {
        facts.push(format!(
            "Lab: moisture {}%, water activity {}, {} primary / {} secondary defects",
            lab.moisture_percent, lab.water_activity, lab.primary_defects, lab.secondary_defects
        ));
    }
    facts.push(format!(
        "Grade {}, {} kg of {} kg remaining",
        lot.grade, lot.current_weight_kg, lot.initial_weight_kg
    ));
    for score in &lot.cupping_scores {
        facts.push(format!(
            "Cupped {} in \"{}\": {}",
            score.date, score.session_name, score.score
        ));
    }

    let attribute_means = mean_attributes(
        data.cupping_sessions
            .iter()
            .filter_map(|s| s.results.as_ref())
            .flatten()
            .filter(|r| r.green_bean_lot_id == lot.id)
            .map(|r| &r.average_attributes),
    );

    Ok(ReportContext {
        subject: format!("Green bean lot {} ({})", lot.id, lot.grade),
        facts,
        average_score: lot.average_cupping_score(),
        attribute_means,
    })
}

fn session_context(data: &AppData, session_id: &str) -> AppResult<ReportContext> {
    let session = data
        .session(session_id)
        .ok_or_else(|| AppError::NotFound("Cupping session".to_string()))?;
    let results = match (&session.results, session.status) {
        (Some(results), SessionStatus::Finalized) => results,
        _ => {
            return Err(AppError::InvalidStateTransition(
                "Reports are only available for finalized sessions".to_string(),
            ))
        }
    };

    let facts = results
        .iter()
        .map(|r| {
            format!(
                "#{} {} (lot {}): {} points, {} from {} judge(s)",
                r.rank, r.blind_code, r.green_bean_lot_id, r.total_score, r.classification, r.judge_count
            )
        })
        .collect();

    let average_score = if results.is_empty() {
        None
    } else {
        let total: Decimal = results.iter().map(|r| r.total_score).sum();
        Some((total / Decimal::from(results.len())).round_dp(2))
    };

    Ok(ReportContext {
        subject: format!("Cupping session \"{}\" on {}", session.name, session.date),
        facts,
        average_score,
        attribute_means: mean_attributes(results.iter().map(|r| &r.average_attributes)),
    })
}

impl ReportingService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Copy out everything a lot report needs
    pub async fn lot_report_context(&self, lot_id: &str) -> AppResult<ReportContext> {
        let data = self.store.read().await;
        lot_context(&data, lot_id)
    }

    /// Copy out everything a session report needs
    pub async fn session_report_context(&self, session_id: &str) -> AppResult<ReportContext> {
        let data = self.store.read().await;
        session_context(&data, session_id)
    }

    /// Export data to CSV format
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        id: String,
        weight_kg: Decimal,
    }

    #[test]
    fn test_export_to_csv_writes_header_and_rows() {
        let rows = vec![
            Row { id: "HL-1".to_string(), weight_kg: Decimal::new(1205, 1) },
            Row { id: "HL-2".to_string(), weight_kg: Decimal::from(80) },
        ];
        let csv = ReportingService::export_to_csv(&rows).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec!["id,weight_kg", "HL-1,120.5", "HL-2,80"]);
    }

    #[test]
    fn test_mean_attributes() {
        let mut a = BTreeMap::new();
        a.insert(Attribute::Flavor, Decimal::from(8));
        let mut b = BTreeMap::new();
        b.insert(Attribute::Flavor, Decimal::from(7));
        b.insert(Attribute::Body, Decimal::from(9));

        let means = mean_attributes([&a, &b]);
        assert_eq!(means[&Attribute::Flavor], Decimal::new(75, 1));
        assert_eq!(means[&Attribute::Body], Decimal::from(9));
    }
}
