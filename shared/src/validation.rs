//! Input validation for plan entry forms
//!
//! Each check returns the message shown next to the offending input.

use validator::Validate;

use crate::calculations::animals::DEFAULT_COLLECTION_DAYS;
use crate::models::{FarmDetails, Field, SoilTest};

// ============================================================================
// Field Validations
// ============================================================================

/// Field area in acres must be positive
pub fn validate_field_area(area: f64) -> Result<(), &'static str> {
    if !area.is_finite() || area <= 0.0 {
        return Err("Field area must be greater than 0");
    }
    Ok(())
}

/// Field names must be unique within a plan year, ignoring case and surrounding spaces
pub fn validate_unique_field_names(fields: &[Field]) -> Result<(), &'static str> {
    let mut seen: Vec<String> = Vec::with_capacity(fields.len());
    for field in fields {
        let name = field.field_name.trim().to_lowercase();
        if seen.contains(&name) {
            return Err("Field name must be unique");
        }
        seen.push(name);
    }
    Ok(())
}

/// Run derive-based rules on every field, then the cross-field ones
pub fn validate_fields(fields: &[Field]) -> Result<(), &'static str> {
    for field in fields {
        if field.validate().is_err() {
            return Err("Field name and area are required");
        }
    }
    validate_unique_field_names(fields)
}

pub fn validate_farm_details(details: &FarmDetails) -> Result<(), &'static str> {
    if details.year.trim().is_empty() {
        return Err("Plan year is required");
    }
    if details.validate().is_err() {
        return Err("Farm name must be at most 100 characters");
    }
    Ok(())
}

/// A soil test needs a method and a readable sample month
pub fn validate_soil_test(soil_test: &SoilTest) -> Result<(), &'static str> {
    if soil_test.soil_test_id == 0 {
        return Err("Soil test method is required");
    }
    if soil_test.sample_month().is_none() {
        return Err("Sample Month is required");
    }
    Ok(())
}

// ============================================================================
// Measurement Validations
// ============================================================================

pub fn validate_percentage(value: f64) -> Result<(), &'static str> {
    if !(0.0..=100.0).contains(&value) {
        return Err("Percentage must be between 0 and 100");
    }
    Ok(())
}

pub fn validate_ph(ph: f64) -> Result<(), &'static str> {
    if !(0.0..=14.0).contains(&ph) {
        return Err("pH must be between 0 and 14");
    }
    Ok(())
}

/// Manure moisture content, percent
pub fn validate_moisture(moisture: f64) -> Result<(), &'static str> {
    if !(0.0..=100.0).contains(&moisture) {
        return Err("Moisture must be between 0 and 100%");
    }
    Ok(())
}

/// Days per year manure is collected from an animal group
pub fn validate_collection_days(days: f64) -> Result<(), &'static str> {
    if !(0.0..=DEFAULT_COLLECTION_DAYS).contains(&days) {
        return Err("Days collected must be between 0 and 365");
    }
    Ok(())
}

/// Solid/liquid separation must leave some liquid behind
pub fn validate_separation_percentage(percent: f64) -> Result<(), &'static str> {
    if !(0.0..100.0).contains(&percent) {
        return Err("Separation percentage must be at least 0 and less than 100");
    }
    Ok(())
}
