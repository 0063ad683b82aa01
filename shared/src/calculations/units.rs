//! Unit conversion primitives
//!
//! Each table maps a small unit code onto one canonical unit for its domain. An
//! unknown code is a catalog inconsistency, not a user error: it is logged and the
//! input passes through unconverted.

use crate::error::{CalcWarning, Lenient};

pub const KG_TO_LB: f64 = 2.20462;
pub const G_TO_LB: f64 = 0.00220462;
pub const US_GAL_PER_IMP_GAL: f64 = 1.20095;
pub const LITRES_PER_IMP_GAL: f64 = 4.54609;
pub const LB_PER_IMP_GAL_TO_G_PER_L: f64 = 9.01;

/// Amount-to-dissolve units for dry fertigation
pub const DISSOLVE_UNITS: &[(i64, &str)] = &[(1, "lbs"), (2, "kgs"), (3, "grams")];
/// Tank volume units
pub const TANK_VOLUME_UNITS: &[(i64, &str)] =
    &[(1, "Imperial Gallons"), (2, "US Gallons"), (3, "Litres")];
/// Solubility units
pub const SOLUBILITY_UNITS: &[(i64, &str)] = &[(1, "g/L"), (2, "kg/L"), (3, "lb/imp. gallon")];
/// Injection-rate units
pub const INJECTION_RATE_UNITS: &[(i64, &str)] =
    &[(1, "US gallon/min"), (2, "L/min"), (3, "Imp. gallon/min")];

/// Factor that expresses an imperial-gallon volume in a liquid fertilizer unit.
///
/// Unknown units log and return 0.
pub fn fertilizer_unit_imp_gallon_conversion(unit_id: i64) -> Lenient<f64> {
    match unit_id {
        // L/ac, L/ha
        3 | 6 => Lenient::ok(4.546),
        // US gal/ac
        5 => Lenient::ok(1.201),
        // imp gal/ac
        4 => Lenient::ok(1.0),
        id => Lenient::fallback(
            0.0,
            CalcWarning::UnknownUnit {
                domain: "liquid fertilizer",
                id,
            },
        ),
    }
}

pub fn dissolve_amount_to_lb(amount: f64, unit_id: i64) -> Lenient<f64> {
    match unit_id {
        1 => Lenient::ok(amount),
        2 => Lenient::ok(amount * KG_TO_LB),
        3 => Lenient::ok(amount * G_TO_LB),
        id => unconverted(amount, "dissolve amount", id),
    }
}

pub fn tank_volume_to_imp_gal(volume: f64, unit_id: i64) -> Lenient<f64> {
    match unit_id {
        1 => Lenient::ok(volume),
        2 => Lenient::ok(volume / US_GAL_PER_IMP_GAL),
        3 => Lenient::ok(volume / LITRES_PER_IMP_GAL),
        id => unconverted(volume, "tank volume", id),
    }
}

pub fn solubility_to_g_per_l(solubility: f64, unit_id: i64) -> Lenient<f64> {
    match unit_id {
        1 => Lenient::ok(solubility),
        2 => Lenient::ok(solubility * 1000.0),
        3 => Lenient::ok(solubility / LB_PER_IMP_GAL_TO_G_PER_L),
        id => unconverted(solubility, "solubility", id),
    }
}

pub fn injection_rate_to_imp_gal_per_min(rate: f64, unit_id: i64) -> Lenient<f64> {
    match unit_id {
        1 => Lenient::ok(rate / US_GAL_PER_IMP_GAL),
        2 => Lenient::ok(rate / LITRES_PER_IMP_GAL),
        3 => Lenient::ok(rate),
        id => unconverted(rate, "injection rate", id),
    }
}

/// Dry application rate to lb/ac
pub fn dry_rate_to_lb_per_acre(rate: f64, unit_id: i64) -> Lenient<f64> {
    match unit_id {
        // lb/ac
        1 => Lenient::ok(rate),
        // kg/ha
        2 => Lenient::ok(rate * 0.4047),
        // lb/1000ft2
        7 => Lenient::ok(rate * 19.759),
        id => unconverted(rate, "dry fertilizer", id),
    }
}

fn unconverted(value: f64, domain: &'static str, id: i64) -> Lenient<f64> {
    Lenient::fallback(value, CalcWarning::UnknownUnit { domain, id })
}
