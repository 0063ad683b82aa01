//! Previous-year manure nitrogen credit

use serde::Serialize;

use crate::catalog::PreviousYearManureApplication;
use crate::error::{CalcWarning, Lenient};
use crate::models::Field;

/// Frequency code 0 means no manure went on the field last year
pub fn was_manure_added_in_previous_year(frequency: u32) -> bool {
    frequency > 0
}

/// Parse a credit list such as `"{22,30,45}"` into integers
pub fn parse_nitrogen_credits(credits: &str) -> Lenient<Vec<i64>> {
    let inner = credits.trim().trim_start_matches('{').trim_end_matches('}');
    if inner.trim().is_empty() {
        return Lenient::ok(Vec::new());
    }

    let parsed: Result<Vec<i64>, _> = inner.split(',').map(|v| v.trim().parse::<i64>()).collect();
    match parsed {
        Ok(values) => Lenient::ok(values),
        Err(_) => Lenient::fallback(Vec::new(), CalcWarning::MalformedCredit(credits.to_string())),
    }
}

/// Default nitrogen credit for a field's previous-year manure frequency.
///
/// Credits are indexed by the manure application history category, clamped to the
/// last entry. Missing rows and malformed credits log and yield 0.
pub fn calc_prev_year_manure_appl_default(
    frequency: u32,
    manure_application_history: u32,
    applications: &[PreviousYearManureApplication],
) -> Lenient<f64> {
    if !was_manure_added_in_previous_year(frequency) {
        return Lenient::ok(0.0);
    }

    let Some(application) = applications.iter().find(|a| a.frequency == frequency) else {
        return Lenient::fallback(0.0, CalcWarning::UnknownFrequency(frequency.to_string()));
    };

    let credits = parse_nitrogen_credits(&application.default_nitrogen_credit);
    if let Some(warning) = credits.warning {
        return Lenient {
            value: 0.0,
            warning: Some(warning),
        };
    }

    let credits = credits.value;
    let Some(last) = credits.len().checked_sub(1) else {
        return Lenient::ok(0.0);
    };
    let index = (manure_application_history as usize).min(last);
    Lenient::ok(credits[index] as f64)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreviousYearManureData {
    pub field_name: String,
    pub display: bool,
    pub nitrogen: f64,
}

/// Previous-year manure row for a field; a user-entered credit wins over the default
pub fn calculate_prev_year_manure(
    field: &Field,
    applications: &[PreviousYearManureApplication],
) -> PreviousYearManureData {
    let frequency = field.previous_year_manure_application_frequency;
    let nitrogen = match field.previous_year_manure_application_n_credit {
        Some(credit) => credit,
        None => calc_prev_year_manure_appl_default(
            frequency,
            field.manure_application_history(),
            applications,
        )
        .into_value(),
    };

    let field_name = if field.field_name.is_empty() {
        "Unnamed Field".to_string()
    } else {
        field.field_name.clone()
    };

    PreviousYearManureData {
        field_name,
        display: was_manure_added_in_previous_year(frequency),
        nitrogen,
    }
}
