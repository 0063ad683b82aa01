//! Fertigation: fertilizer applied through the irrigation system

use serde::{Deserialize, Serialize};

use super::units::{
    dissolve_amount_to_lb, fertilizer_unit_imp_gallon_conversion,
    injection_rate_to_imp_gal_per_min, solubility_to_g_per_l, tank_volume_to_imp_gal,
    KG_TO_LB, LITRES_PER_IMP_GAL, US_GAL_PER_IMP_GAL,
};
use crate::catalog::{DensityUnit, FertilizerUnit, InjectionUnit};
use crate::models::DryAction;
use crate::types::{round_half_up, round_whole, NutrientTotals};

/// lb of water per U.S. gallon, used for the N kg/L concentration
pub const LB_PER_US_GAL_TO_KG_PER_L: f64 = 8.3454043;
/// Shared P2O5 and K2O lb/US gal to kg/L factor
pub const LB_PER_US_GAL_TO_KG_PER_L_PK: f64 = 0.119826;

// ============================================================================
// Liquid fertigation
// ============================================================================

/// Volume applied to the field in one event, imperial gallons
pub fn product_volume_in_imp_gallons(
    application_rate: f64,
    application_unit: &FertilizerUnit,
    area_acres: f64,
) -> f64 {
    product_volume_per_application(
        application_rate,
        application_unit.conversion_to_imperial_gallons_per_acre,
        area_acres,
    )
}

/// `rate × unit conversion factor × area`
pub fn product_volume_per_application(
    application_rate: f64,
    unit_conversion_factor: f64,
    area_acres: f64,
) -> f64 {
    application_rate * unit_conversion_factor * area_acres
}

/// Per-application volume expressed in the application unit's own volume unit
pub fn product_volume_in_application_unit(
    application_rate: f64,
    application_unit: &FertilizerUnit,
    area_acres: f64,
) -> f64 {
    product_volume_in_imp_gallons(application_rate, application_unit, area_acres)
        * fertilizer_unit_imp_gallon_conversion(application_unit.id).into_value()
}

pub fn product_volume_per_season(volume_per_application: f64, applications_per_season: f64) -> f64 {
    volume_per_application * applications_per_season
}

/// Minutes to inject one application
pub fn time_per_application(
    application_rate: f64,
    application_unit: &FertilizerUnit,
    area_acres: f64,
    injection_rate: f64,
    injection_unit: &InjectionUnit,
) -> f64 {
    let volume = product_volume_in_imp_gallons(application_rate, application_unit, area_acres);
    volume / (injection_rate * injection_unit.conversion_to_imp_gallons_per_minute)
}

pub fn product_weight_in_pounds(
    application_rate: f64,
    application_unit: &FertilizerUnit,
    area_acres: f64,
    density: f64,
    density_unit: &DensityUnit,
) -> f64 {
    let volume = product_volume_in_imp_gallons(application_rate, application_unit, area_acres);
    volume * density * density_unit.conv_factor
}

/// lb/ac of one nutrient delivered per application
pub fn applied_nutrient_per_application(weight_lb: f64, area_acres: f64, nutrient_percent: f64) -> f64 {
    weight_lb * (nutrient_percent / 100.0) / area_acres
}

pub fn applied_nutrient_per_season(applied_per_application: f64, applications_per_season: f64) -> f64 {
    applied_per_application * applications_per_season
}

/// Computed outputs for a liquid fertigation entry
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LiquidFertigationResult {
    pub volume_per_application: f64,
    pub volume_per_season: f64,
    pub application_time_minutes: f64,
    pub applied_per_application: NutrientTotals,
    pub applied_per_season: NutrientTotals,
}

/// Run the whole liquid chain for one product, rounding outputs to one decimal
#[allow(clippy::too_many_arguments)]
pub fn calculate_liquid_fertigation(
    application_rate: f64,
    application_unit: &FertilizerUnit,
    area_acres: f64,
    applications_per_season: f64,
    injection_rate: f64,
    injection_unit: &InjectionUnit,
    density: f64,
    density_unit: &DensityUnit,
    nutrient_percent: NutrientTotals,
) -> LiquidFertigationResult {
    let volume = product_volume_in_application_unit(application_rate, application_unit, area_acres);
    let weight = product_weight_in_pounds(
        application_rate,
        application_unit,
        area_acres,
        density,
        density_unit,
    );
    let per_application = |pct: f64| applied_nutrient_per_application(weight, area_acres, pct);
    let applied = NutrientTotals::new(
        per_application(nutrient_percent.n),
        per_application(nutrient_percent.p2o5),
        per_application(nutrient_percent.k2o),
    );
    let season = |v: f64| round_half_up(applied_nutrient_per_season(v, applications_per_season), 1);

    LiquidFertigationResult {
        volume_per_application: round_half_up(volume, 1),
        volume_per_season: round_half_up(product_volume_per_season(volume, applications_per_season), 1),
        application_time_minutes: round_half_up(
            time_per_application(
                application_rate,
                application_unit,
                area_acres,
                injection_rate,
                injection_unit,
            ),
            1,
        ),
        applied_per_application: NutrientTotals::new(
            round_half_up(applied.n, 1),
            round_half_up(applied.p2o5, 1),
            round_half_up(applied.k2o, 1),
        ),
        applied_per_season: NutrientTotals::new(season(applied.n), season(applied.p2o5), season(applied.k2o)),
    }
}

// ============================================================================
// Dry (solid) fertigation
// ============================================================================

/// Inputs for dissolving a dry product in a fertigation tank
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DryFertigationInput {
    pub amount_to_dissolve: f64,
    pub amount_to_dissolve_unit_id: i64,
    pub tank_volume: f64,
    pub tank_unit_id: i64,
    pub solubility: f64,
    pub solubility_unit_id: i64,
    pub injection_rate: f64,
    pub injection_unit_id: i64,
    pub field_area: f64,
    pub events_per_season: f64,
    /// Percent N, P2O5 and K2O of the product
    pub nutrient_percent: NutrientTotals,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DryFertigationResult {
    pub fertigation_time_minutes: f64,
    pub dry_action: DryAction,
    /// lb per U.S. gallon
    pub nutrient_concentration: NutrientTotals,
    /// kg per litre
    pub kgl_nutrient_concentration: NutrientTotals,
    /// lb/ac
    pub applied_per_application: NutrientTotals,
    /// lb/ac
    pub applied_per_season: NutrientTotals,
}

pub fn calculate_solid_fertigation(input: &DryFertigationInput) -> DryFertigationResult {
    let amount_lb = dissolve_amount_to_lb(input.amount_to_dissolve, input.amount_to_dissolve_unit_id)
        .into_value();
    let tank_imp_gal = tank_volume_to_imp_gal(input.tank_volume, input.tank_unit_id).into_value();
    let solubility_g_per_l =
        solubility_to_g_per_l(input.solubility, input.solubility_unit_id).into_value();
    let injection_imp_gal_per_min =
        injection_rate_to_imp_gal_per_min(input.injection_rate, input.injection_unit_id)
            .into_value();

    let fertigation_time_minutes = round_whole(tank_imp_gal / injection_imp_gal_per_min);

    let dissolve_kg = amount_lb / KG_TO_LB;
    let tank_litres = tank_imp_gal * LITRES_PER_IMP_GAL;
    let max_solubility_kg = tank_litres * solubility_g_per_l / 1000.0;

    if dissolve_kg > max_solubility_kg {
        return DryFertigationResult {
            fertigation_time_minutes,
            dry_action: DryAction::ReduceAmountToDissolve,
            nutrient_concentration: NutrientTotals::zero(),
            kgl_nutrient_concentration: NutrientTotals::zero(),
            applied_per_application: NutrientTotals::zero(),
            applied_per_season: NutrientTotals::zero(),
        };
    }

    let tank_us_gal = tank_imp_gal * US_GAL_PER_IMP_GAL;
    let concentration = |pct: f64| {
        if tank_us_gal > 0.0 {
            round_half_up(amount_lb * pct / 100.0 / tank_us_gal, 2)
        } else {
            0.0
        }
    };
    let nutrient_concentration = NutrientTotals::new(
        concentration(input.nutrient_percent.n),
        concentration(input.nutrient_percent.p2o5),
        concentration(input.nutrient_percent.k2o),
    );
    let kgl_nutrient_concentration = NutrientTotals::new(
        round_half_up(nutrient_concentration.n / LB_PER_US_GAL_TO_KG_PER_L, 2),
        round_half_up(nutrient_concentration.p2o5 * LB_PER_US_GAL_TO_KG_PER_L_PK, 2),
        round_half_up(nutrient_concentration.k2o * LB_PER_US_GAL_TO_KG_PER_L_PK, 2),
    );

    let per_application = |c: f64| {
        if input.field_area > 0.0 {
            round_half_up(c * tank_us_gal / input.field_area, 2)
        } else {
            0.0
        }
    };
    let applied_per_application = NutrientTotals::new(
        per_application(nutrient_concentration.n),
        per_application(nutrient_concentration.p2o5),
        per_application(nutrient_concentration.k2o),
    );
    let per_season = |v: f64| round_half_up(v * input.events_per_season, 2);
    let applied_per_season = NutrientTotals::new(
        per_season(applied_per_application.n),
        per_season(applied_per_application.p2o5),
        per_season(applied_per_application.k2o),
    );

    DryFertigationResult {
        fertigation_time_minutes,
        dry_action: DryAction::Soluble,
        nutrient_concentration,
        kgl_nutrient_concentration,
        applied_per_application,
        applied_per_season,
    }
}
