//! Error types for the nutrient management core
//!
//! Two families:
//! - [`NmpError`] is fail-fast. It aborts the current operation and the caller is
//!   expected to reset to a known-good document.
//! - [`CalcWarning`] is lenient-degrade. The calculation logs it and continues with a
//!   fallback value; it never propagates as an `Err`.

use thiserror::Error;

/// Structural or input-contract violations that must stop the plan
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NmpError {
    #[error("Reducer received nonexistent year: {0}")]
    MissingYear(String),

    #[error("Chosen {kind} is missing from list: {id}")]
    MissingReference { kind: &'static str, id: String },

    #[error("Invalid number of collection days: can only be 0-365 but received {0}")]
    InvalidCollectionDays(f64),

    #[error("Unable to calculate {0}")]
    SoilTestConversion(&'static str),

    #[error("No {kind} manure found with {key}")]
    UnassignedManure { kind: &'static str, key: String },

    #[error("Invalid NMP document: {0}")]
    InvalidDocument(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for NmpError {
    fn from(e: serde_json::Error) -> Self {
        NmpError::InvalidDocument(e.to_string())
    }
}

/// Result type alias for fail-fast operations
pub type NmpResult<T> = Result<T, NmpError>;

/// Catalog or unit inconsistencies that degrade to a fallback value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcWarning {
    #[error("Unrecognized {domain} unit: {id}")]
    UnknownUnit { domain: &'static str, id: i64 },

    #[error("Malformed nitrogen credit string: {0:?}")]
    MalformedCredit(String),

    #[error("No previous year manure application for frequency {0}")]
    UnknownFrequency(String),
}

/// A value produced under the lenient-degrade policy, with the warning that caused a
/// fallback (if any)
#[derive(Debug, Clone, PartialEq)]
pub struct Lenient<T> {
    pub value: T,
    pub warning: Option<CalcWarning>,
}

impl<T> Lenient<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    /// Log the warning and carry the fallback value
    pub fn fallback(value: T, warning: CalcWarning) -> Self {
        tracing::error!("{}", warning);
        Self {
            value,
            warning: Some(warning),
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn is_fallback(&self) -> bool {
        self.warning.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_year_message_names_year() {
        let err = NmpError::MissingYear("2025".to_string());
        assert_eq!(err.to_string(), "Reducer received nonexistent year: 2025");
    }

    #[test]
    fn test_lenient_fallback_keeps_warning() {
        let value = Lenient::fallback(
            0.0,
            CalcWarning::UnknownUnit {
                domain: "liquid fertilizer",
                id: 99,
            },
        );
        assert!(value.is_fallback());
        assert_eq!(value.into_value(), 0.0);
    }
}
