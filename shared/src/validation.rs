//! Validation utilities for the Coffee Traceability & Quality Platform
//!
//! Business rules shared by the backend services and the browser client.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::types::weight_tolerance;

// ============================================================================
// Coffee Quality Validations
// ============================================================================

/// Validate cupping score is in valid range (SCA protocol)
///
/// Sensory attributes use 6-10; cup attributes (`is_full_range`) use 0-10.
pub fn validate_cupping_score(score: Decimal, is_full_range: bool) -> Result<(), &'static str> {
    let min = if is_full_range {
        Decimal::ZERO
    } else {
        Decimal::from(6)
    };
    let max = Decimal::from(10);

    if score < min || score > max {
        return Err("Cupping score out of valid range");
    }
    Ok(())
}

/// Validate moisture content is a percentage
pub fn validate_moisture_content(moisture: Decimal) -> Result<(), &'static str> {
    if moisture < Decimal::ZERO || moisture > Decimal::from(100) {
        return Err("Moisture content must be between 0 and 100%");
    }
    Ok(())
}

/// Check if moisture content is in ideal range for milling (10-12%)
pub fn is_ideal_moisture(moisture: Decimal) -> bool {
    moisture >= Decimal::from(10) && moisture <= Decimal::from(12)
}

/// Validate relative humidity reading
pub fn validate_humidity(humidity: Decimal) -> Result<(), &'static str> {
    if humidity < Decimal::ZERO || humidity > Decimal::from(100) {
        return Err("Humidity must be between 0 and 100%");
    }
    Ok(())
}

/// Validate water activity (aw, 0.0-1.0)
pub fn validate_water_activity(aw: Decimal) -> Result<(), &'static str> {
    if aw < Decimal::ZERO || aw > Decimal::ONE {
        return Err("Water activity must be between 0 and 1");
    }
    Ok(())
}

// ============================================================================
// Weight Validations
// ============================================================================

/// Validate a weight is strictly positive
pub fn validate_positive_weight(weight: Decimal) -> Result<(), &'static str> {
    if weight <= Decimal::ZERO {
        return Err("Weight must be greater than zero");
    }
    Ok(())
}

/// Validate a hull-and-grade split
///
/// Every split weight must be positive and the splits must add up to the
/// declared green weight within ±0.01 kg.
pub fn validate_grade_split(total: Decimal, splits: &[Decimal]) -> Result<(), &'static str> {
    validate_positive_weight(total)?;
    if splits.is_empty() {
        return Err("At least one graded lot is required");
    }
    if splits.iter().any(|w| *w <= Decimal::ZERO) {
        return Err("Graded lot weights must be greater than zero");
    }
    let sum = checked_sum(splits).ok_or("Graded lot weights are too large")?;
    if (sum - total).abs() > weight_tolerance() {
        return Err("Graded lot weights must sum to the total green bean weight");
    }
    Ok(())
}

/// Sum of weights, `None` on overflow
pub fn checked_sum(weights: &[Decimal]) -> Option<Decimal> {
    weights
        .iter()
        .try_fold(Decimal::ZERO, |acc, w| acc.checked_add(*w))
}

/// Validate a withdrawal against the lot's remaining weight
pub fn validate_withdrawal(current_weight: Decimal, amount: Decimal) -> Result<(), &'static str> {
    validate_positive_weight(amount)?;
    if amount > current_weight {
        return Err("Withdrawal exceeds the remaining lot weight");
    }
    Ok(())
}

/// Validate a roast batch against the roaster's remaining stock
pub fn validate_roast_batch(
    available: Decimal,
    batch_size: Decimal,
    roasted_weight: Decimal,
) -> Result<(), &'static str> {
    if batch_size <= Decimal::ZERO {
        return Err("Batch size must be greater than zero");
    }
    if batch_size > available {
        return Err("Batch size exceeds the remaining inventory");
    }
    if roasted_weight <= Decimal::ZERO {
        return Err("Roasted weight must be greater than zero");
    }
    if roasted_weight > batch_size {
        return Err("Roasted weight cannot exceed batch size");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate a harvest date is not in the future
pub fn validate_harvest_date(date: NaiveDate, today: NaiveDate) -> Result<(), &'static str> {
    if date > today {
        return Err("Harvest date cannot be in the future");
    }
    Ok(())
}

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    // ========================================================================
    // Coffee Quality Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_cupping_score_valid() {
        assert!(validate_cupping_score(Decimal::from(8), false).is_ok());
        assert!(validate_cupping_score(Decimal::from(6), false).is_ok());
        assert!(validate_cupping_score(Decimal::from(10), false).is_ok());
    }

    #[test]
    fn test_validate_cupping_score_full_range() {
        assert!(validate_cupping_score(Decimal::from(0), true).is_ok());
        assert!(validate_cupping_score(Decimal::from(5), true).is_ok());
    }

    #[test]
    fn test_validate_cupping_score_invalid() {
        assert!(validate_cupping_score(dec("5.99"), false).is_err());
        assert!(validate_cupping_score(Decimal::from(11), false).is_err());
        assert!(validate_cupping_score(Decimal::from(-1), true).is_err());
    }

    #[test]
    fn test_moisture_content_validation() {
        assert!(validate_moisture_content(Decimal::from(11)).is_ok());
        assert!(validate_moisture_content(Decimal::from(-1)).is_err());
        assert!(validate_moisture_content(Decimal::from(101)).is_err());
    }

    #[test]
    fn test_ideal_moisture() {
        assert!(is_ideal_moisture(Decimal::from(10)));
        assert!(is_ideal_moisture(dec("11.5")));
        assert!(!is_ideal_moisture(Decimal::from(13)));
    }

    #[test]
    fn test_water_activity() {
        assert!(validate_water_activity(dec("0.55")).is_ok());
        assert!(validate_water_activity(dec("1.2")).is_err());
    }

    // ========================================================================
    // Weight Validation Tests
    // ========================================================================

    #[test]
    fn test_grade_split_exact() {
        assert!(validate_grade_split(dec("100"), &[dec("60"), dec("40")]).is_ok());
    }

    #[test]
    fn test_grade_split_within_tolerance() {
        assert!(validate_grade_split(dec("100"), &[dec("60.005"), dec("40")]).is_ok());
        assert!(validate_grade_split(dec("100"), &[dec("59.99"), dec("40")]).is_ok());
    }

    #[test]
    fn test_grade_split_mismatch() {
        assert!(validate_grade_split(dec("100"), &[dec("59.98"), dec("40")]).is_err());
        assert!(validate_grade_split(dec("100"), &[dec("70"), dec("40")]).is_err());
    }

    #[test]
    fn test_grade_split_rejects_empty_and_zero() {
        assert!(validate_grade_split(dec("100"), &[]).is_err());
        assert!(validate_grade_split(dec("100"), &[dec("100"), dec("0")]).is_err());
        assert!(validate_grade_split(dec("0"), &[dec("0")]).is_err());
    }

    #[test]
    fn test_grade_split_overflow_is_rejected() {
        let splits = [Decimal::MAX, Decimal::MAX];
        assert_eq!(checked_sum(&splits), None);
        assert_eq!(
            validate_grade_split(dec("100"), &splits),
            Err("Graded lot weights are too large")
        );
    }

    #[test]
    fn test_withdrawal_limits() {
        assert!(validate_withdrawal(dec("50"), dec("50")).is_ok());
        assert!(validate_withdrawal(dec("50"), dec("50.01")).is_err());
        assert!(validate_withdrawal(dec("50"), dec("0")).is_err());
    }

    #[test]
    fn test_roast_batch_limits() {
        assert!(validate_roast_batch(dec("20"), dec("10"), dec("8.5")).is_ok());
        assert!(validate_roast_batch(dec("20"), dec("10"), dec("10")).is_ok());
        assert!(validate_roast_batch(dec("20"), dec("10"), dec("10.5")).is_err());
        assert!(validate_roast_batch(dec("5"), dec("10"), dec("8")).is_err());
        assert!(validate_roast_batch(dec("20"), dec("0"), dec("0")).is_err());
    }

    // ========================================================================
    // General Validation Tests
    // ========================================================================

    #[test]
    fn test_harvest_date_not_future() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(validate_harvest_date(today, today).is_ok());
        assert!(validate_harvest_date(today.succ_opt().unwrap(), today).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("short").is_err());
    }
}
