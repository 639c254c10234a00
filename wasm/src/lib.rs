//! WebAssembly module for the Coffee Traceability & Quality Platform
//!
//! Provides client-side computation for:
//! - SCA score sheet totals and classification
//! - Competition ranking of sample totals
//! - Hull-and-grade split and withdrawal checks before submitting
//! - Roast yield and weight loss
//!
//! Weights and scores cross the boundary as decimal strings, matching the
//! JSON the API returns.

use std::str::FromStr;

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

use shared::models::{
    calculate_roast_yield, calculate_weight_loss, classify_by_score, competition_ranks,
    ScoreSheet,
};
use shared::validation::{is_ideal_moisture, validate_grade_split, validate_withdrawal};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("coffee-trace wasm ready"));
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value.trim()).map_err(|_| format!("{} is not a number: {:?}", field, value))
}

fn sheet_total(sheet_json: &str) -> Result<Decimal, String> {
    let sheet: ScoreSheet =
        serde_json::from_str(sheet_json).map_err(|e| format!("Invalid score sheet JSON: {}", e))?;
    sheet.defects.validate().map_err(str::to_string)?;
    if let Some(attr) = sheet.invalid_attribute() {
        return Err(format!("{} is out of range", attr.as_str()));
    }
    Ok(sheet.total())
}

fn ranks_for(totals_json: &str) -> Result<Vec<u32>, String> {
    let raw: Vec<String> =
        serde_json::from_str(totals_json).map_err(|e| format!("Invalid totals JSON: {}", e))?;
    let totals = raw
        .iter()
        .map(|t| parse_decimal("total", t).map(|d| d.round_dp(2)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(competition_ranks(&totals))
}

fn check_split(total: &str, splits_json: &str) -> Result<(), String> {
    let total = parse_decimal("total_green_weight_kg", total)?;
    let raw: Vec<String> =
        serde_json::from_str(splits_json).map_err(|e| format!("Invalid splits JSON: {}", e))?;
    let splits = raw
        .iter()
        .map(|w| parse_decimal("weight_kg", w))
        .collect::<Result<Vec<_>, _>>()?;
    validate_grade_split(total, &splits).map_err(str::to_string)
}

fn check_withdrawal(current: &str, amount: &str) -> Result<(), String> {
    let current = parse_decimal("current_weight_kg", current)?;
    let amount = parse_decimal("weight_kg", amount)?;
    validate_withdrawal(current, amount).map_err(str::to_string)
}

/// Total of an SCA sheet (JSON, decimal strings) after defect deductions
#[wasm_bindgen]
pub fn calculate_cupping_total(sheet_json: &str) -> Result<String, JsValue> {
    sheet_total(sheet_json)
        .map(|total| total.to_string())
        .map_err(|e| JsValue::from_str(&e))
}

/// Competition ranks ("1,1,3") for a JSON array of totals, in input order
#[wasm_bindgen]
pub fn rank_totals(totals_json: &str) -> Result<js_sys::Array, JsValue> {
    let ranks = ranks_for(totals_json).map_err(|e| JsValue::from_str(&e))?;
    Ok(ranks.into_iter().map(JsValue::from).collect())
}

/// Classify coffee by cupping score
#[wasm_bindgen]
pub fn classify_by_cupping_score(score: &str) -> Result<String, JsValue> {
    parse_decimal("score", score)
        .map(|s| classify_by_score(s).to_string())
        .map_err(|e| JsValue::from_str(&e))
}

/// Check a hull-and-grade split before it is submitted
#[wasm_bindgen]
pub fn validate_green_split(total: &str, splits_json: &str) -> Result<(), JsValue> {
    check_split(total, splits_json).map_err(|e| JsValue::from_str(&e))
}

fn weight_loss(green_weight: &str, roasted_weight: &str) -> Result<Decimal, String> {
    let green = parse_decimal("green_weight_kg", green_weight)?;
    let roasted = parse_decimal("roasted_weight_kg", roasted_weight)?;
    Ok(calculate_weight_loss(green, roasted).round_dp(2))
}

/// Check a green lot withdrawal before it is submitted
#[wasm_bindgen]
pub fn validate_green_withdrawal(current: &str, amount: &str) -> Result<(), JsValue> {
    check_withdrawal(current, amount).map_err(|e| JsValue::from_str(&e))
}

/// Roast yield percentage, 2 dp
#[wasm_bindgen]
pub fn calculate_roast_yield_percent(batch_size: &str, roasted_weight: &str) -> Result<String, JsValue> {
    let batch = parse_decimal("batch_size_kg", batch_size).map_err(|e| JsValue::from_str(&e))?;
    let roasted =
        parse_decimal("roasted_weight_kg", roasted_weight).map_err(|e| JsValue::from_str(&e))?;
    Ok(calculate_roast_yield(batch, roasted).to_string())
}

/// Roast weight loss percentage, 2 dp
#[wasm_bindgen]
pub fn calculate_roast_weight_loss(green_weight: &str, roasted_weight: &str) -> Result<String, JsValue> {
    weight_loss(green_weight, roasted_weight)
        .map(|loss| loss.to_string())
        .map_err(|e| JsValue::from_str(&e))
}

/// Whether a parchment moisture reading is ready for storage
#[wasm_bindgen]
pub fn is_storage_moisture(moisture: &str) -> bool {
    parse_decimal("moisture_percent", moisture)
        .map(is_ideal_moisture)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet_json(value: &str, taints: u32) -> String {
        format!(
            r#"{{"fragrance_aroma":"{v}","flavor":"{v}","aftertaste":"{v}","acidity":"{v}",
               "body":"{v}","balance":"{v}","uniformity":"10","clean_cup":"10",
               "sweetness":"10","overall":"{v}","defects":{{"taint_count":{t},"fault_count":0}}}}"#,
            v = value,
            t = taints
        )
    }

    #[test]
    fn test_sheet_total() {
        assert_eq!(sheet_total(&sheet_json("8", 0)).unwrap(), Decimal::from(86));
        assert_eq!(sheet_total(&sheet_json("8", 1)).unwrap(), Decimal::from(84));
    }

    #[test]
    fn test_sheet_out_of_range() {
        let err = sheet_total(&sheet_json("5.5", 0)).unwrap_err();
        assert!(err.contains("fragrance_aroma"));
        assert!(sheet_total("{}").is_err());
    }

    #[test]
    fn test_ranks_share_ties() {
        assert_eq!(ranks_for(r#"["86.5","88","86.5","80"]"#).unwrap(), vec![2, 1, 2, 4]);
        assert!(ranks_for(r#"["eighty"]"#).is_err());
    }

    #[test]
    fn test_split_check() {
        assert!(check_split("48", r#"["30","18"]"#).is_ok());
        assert!(check_split("48", r#"["30","17.995"]"#).is_ok());
        assert!(check_split("48", r#"["30","10"]"#).is_err());
        assert!(check_split("48", "[]").is_err());
    }

    #[test]
    fn test_withdrawal_check() {
        assert!(check_withdrawal("48", "48").is_ok());
        assert!(check_withdrawal("48", "48.5").is_err());
        assert!(check_withdrawal("48", "0").is_err());
    }

    #[test]
    fn test_weight_loss_rounded() {
        assert_eq!(weight_loss("6", "5.1").unwrap(), Decimal::from(15));
        assert_eq!(weight_loss("3", "2.5").unwrap().to_string(), "16.67");
        assert!(weight_loss("heavy", "2.5").unwrap_err().starts_with("green_weight_kg"));
    }

    #[test]
    fn test_storage_moisture() {
        assert!(is_storage_moisture("11"));
        assert!(!is_storage_moisture("25"));
        assert!(!is_storage_moisture("wet"));
    }
}
