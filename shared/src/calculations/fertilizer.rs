//! Nutrients delivered by a broadcast fertilizer application

use crate::calculations::units::dry_rate_to_lb_per_acre;
use crate::catalog::{DensityUnit, FertilizerCatalogEntry, FertilizerUnit};
use crate::types::{round_whole, DryLiquid, NutrientTotals};

/// Density of a liquid product and the factor taking its unit to lb/imp gal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiquidDensity {
    pub density: f64,
    pub conv_factor: f64,
}

impl LiquidDensity {
    pub fn new(density: f64, unit: &DensityUnit) -> Self {
        Self {
            density,
            conv_factor: unit.conv_factor,
        }
    }

    fn lb_per_imp_gallon(&self) -> f64 {
        self.density * self.conv_factor
    }
}

/// Application rate normalized to lb/ac for dry products and imp gal/ac for liquids,
/// then weighted by density when one is known
pub fn normalized_application_rate(
    fertilizer: &FertilizerCatalogEntry,
    rate: f64,
    unit: &FertilizerUnit,
    density: Option<LiquidDensity>,
) -> f64 {
    match fertilizer.dryliquid {
        DryLiquid::Dry => {
            let factor = unit.farm_required_nutrients_std_units_area_conversion;
            if factor != 0.0 {
                rate * factor
            } else {
                dry_rate_to_lb_per_acre(rate, unit.id).into_value()
            }
        }
        DryLiquid::Liquid => {
            let gallons = rate * unit.conversion_to_imperial_gallons_per_acre;
            gallons * density.map_or(1.0, |d| d.lb_per_imp_gallon())
        }
    }
}

/// N, P2O5 and K2O in lb/ac, each rounded to a whole number
pub fn calc_fert_balance(
    fertilizer: &FertilizerCatalogEntry,
    rate: f64,
    unit: &FertilizerUnit,
    density: Option<LiquidDensity>,
) -> NutrientTotals {
    let converted = normalized_application_rate(fertilizer, rate, unit, density);
    NutrientTotals::new(
        round_whole(fertilizer.nitrogen / 100.0 * converted),
        round_whole(fertilizer.phosphorous / 100.0 * converted),
        round_whole(fertilizer.potassium / 100.0 * converted),
    )
}
