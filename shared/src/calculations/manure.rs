//! Manure density, separation, nutrient inputs and material-remaining calculations

use serde::Serialize;
use uuid::Uuid;

use crate::catalog::{CropConversionFactors, ManureCatalogEntry, ManureUnit, NMineralization};
use crate::error::{NmpError, NmpResult};
use crate::models::{
    AppliedManure, BalanceValues, Field, ImportedManure, ManureStorageSystem, NmpFileYear,
    NutrientAnalysis,
};
use crate::types::{round_whole, ManureType, NutrientTotals};

/// U.S. gallons per cubic metre
pub const US_GALLONS_PER_CUBIC_METRE: f64 = 264.172;
/// Tons of separated solids per cubic metre of separated volume
pub const SEPARATED_SOLIDS_TONS_PER_CUBIC_METRE: f64 = 0.5;
/// Manure application unit measured in cubic yards per acre
pub const CUBIC_YARDS_PER_ACRE_UNIT_ID: i64 = 6;
/// Analysis N, P and K are percent; NH4-N is ppm
const PPM_PER_PERCENT: f64 = 10_000.0;

/// Bulk density factor of solid manure from its moisture percentage
pub fn density_factor(moisture_percent: f64) -> f64 {
    if moisture_percent < 40.0 {
        return 0.27;
    }
    if moisture_percent > 82.0 {
        return 0.837;
    }
    let m = moisture_percent / 100.0;
    7.9386 * m.powi(3) - 16.43 * m.powi(2) + 11.993 * m - 2.3975
}

/// Split a liquid system's annual volume by the separated percentage.
///
/// Returns `(separated liquids in U.S. gallons, separated solids in tons)`, both rounded.
pub fn calculate_separated_solid_and_liquid(total_us_gallons: f64, percent_separated: f64) -> (f64, f64) {
    let solids_gallons = total_us_gallons * (percent_separated / 100.0);
    let liquids_gallons = total_us_gallons - solids_gallons;
    let solids_tons =
        solids_gallons / US_GALLONS_PER_CUBIC_METRE * SEPARATED_SOLIDS_TONS_PER_CUBIC_METRE;
    (round_whole(liquids_gallons), round_whole(solids_tons))
}

/// Annual amount in U.S. gallons for liquids, tons for solids
pub fn standardized_system_amount(system: &ManureStorageSystem) -> f64 {
    match system {
        ManureStorageSystem::Liquid(liquid) if liquid.separated_liquids_us_gallons > 0.0 => {
            liquid.separated_liquids_us_gallons
        }
        other => other.total_manure_amount(),
    }
}

pub fn standardized_imported_amount(manure: &ImportedManure) -> f64 {
    match manure.manure_type {
        ManureType::Liquid => manure
            .annual_amount_us_gallons_volume
            .unwrap_or(manure.annual_amount),
        ManureType::Solid => manure.annual_amount_tons_weight.unwrap_or(manure.annual_amount),
    }
}

/// Nutrients supplied by one manure application, lb/ac
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ManureNutrientInputs {
    pub first_year: NutrientTotals,
    pub long_term: NutrientTotals,
}

impl ManureNutrientInputs {
    /// First-year values feed the agronomic balance, long-term values the crop removal
    /// balance
    pub fn balance_values(&self) -> BalanceValues {
        BalanceValues {
            req_n: self.first_year.n,
            req_p2o5: self.first_year.p2o5,
            req_k2o: self.first_year.k2o,
            rem_n: self.long_term.n,
            rem_p2o5: self.long_term.p2o5,
            rem_k2o: self.long_term.k2o,
        }
    }
}

/// Mineralization row for a manure class at a location; id 0 means none
pub fn find_n_mineralization(
    rows: &[NMineralization],
    n_mineralization_id: i64,
    location_id: i64,
) -> Option<&NMineralization> {
    if n_mineralization_id == 0 || location_id == 0 {
        return None;
    }
    rows.iter()
        .find(|m| m.n_mineralization_id == n_mineralization_id && m.location_id == location_id)
}

/// First-year and long-term N, P2O5 and K2O from applying an analysed manure.
///
/// `unit` is the application's rate unit. A solid manure applied in cubic yards is
/// converted to tons with the book manure's bulk density, so `book_manure` is then
/// required. The application's `n_available` percent replaces the first-year
/// mineralization rate; the long-term rate comes from `mineralization` (0 without one).
pub fn manure_nutrient_inputs(
    analysis: &NutrientAnalysis,
    application: &AppliedManure,
    unit: &ManureUnit,
    book_manure: Option<&ManureCatalogEntry>,
    factors: &CropConversionFactors,
    mineralization: Option<&NMineralization>,
) -> NmpResult<ManureNutrientInputs> {
    let unit_conversion = if unit.conversion_lb_ton != 0.0 {
        unit.conversion_lb_ton
    } else {
        1.0
    };

    let mut rate = application.application_rate;
    if unit.id == CUBIC_YARDS_PER_ACRE_UNIT_ID && analysis.solid_liquid == Some(ManureType::Solid) {
        let book = book_manure.ok_or_else(|| NmpError::MissingReference {
            kind: "manure",
            id: analysis.manure_id.to_string(),
        })?;
        rate *= book.cubic_yard_conversion;
    }
    let lb_per_ton = factors.pound_per_ton;

    let k2o = |availability: f64| {
        round_whole(
            rate * analysis.k * lb_per_ton * factors.potassium_k_to_k2o * availability
                * unit_conversion,
        )
    };
    let p2o5 = |availability: f64| {
        round_whole(
            rate * analysis.p * lb_per_ton * factors.phosphorous_p_to_p2o5 * availability
                * unit_conversion,
        )
    };

    let organic_n = analysis.n - analysis.nh4n / PPM_PER_PERCENT;
    let retained_nh4_n = analysis.nh4n / PPM_PER_PERCENT * (application.nh4_retention / 100.0);
    let first_year_mineralized = application.n_available / 100.0;
    let long_term_mineralized = mineralization.map_or(0.0, |m| m.long_term_value);

    let n_first_year = retained_nh4_n
        + organic_n * first_year_mineralized
        + analysis.n / PPM_PER_PERCENT;
    let n_long_term = retained_nh4_n + organic_n * long_term_mineralized;

    Ok(ManureNutrientInputs {
        first_year: NutrientTotals::new(
            round_whole(rate * (n_first_year * lb_per_ton) * unit_conversion),
            p2o5(factors.phosphorous_availability_first_year),
            k2o(factors.potassium_availability_first_year),
        ),
        long_term: NutrientTotals::new(
            round_whole(rate * (n_long_term * lb_per_ton) * unit_conversion),
            p2o5(factors.phosphorous_availability_long_term),
            k2o(factors.potassium_availability_long_term),
        ),
    })
}

/// How much of one manure source has been spread on the fields
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppliedManureSummary {
    pub source_name: String,
    pub source_uuid: Uuid,
    pub manure_type: ManureType,
    pub total_annual_manure_to_apply: f64,
    pub total_applied: f64,
    pub total_annual_manure_remaining_to_apply: f64,
    pub whole_percent_applied: f64,
    pub whole_percent_remaining: f64,
}

impl AppliedManureSummary {
    fn new(
        source_name: &str,
        source_uuid: Uuid,
        manure_type: ManureType,
        total: f64,
        applied: f64,
    ) -> Self {
        let whole_percent_applied = if total == 0.0 {
            0.0
        } else {
            round_whole(applied / total * 100.0)
        };
        Self {
            source_name: source_name.to_string(),
            source_uuid,
            manure_type,
            total_annual_manure_to_apply: total,
            total_applied: applied,
            total_annual_manure_remaining_to_apply: (total - applied).max(0.0),
            whole_percent_applied,
            whole_percent_remaining: (100.0 - whole_percent_applied).max(0.0),
        }
    }

    fn low_stock_warning(&self) -> Option<String> {
        (self.whole_percent_remaining > 0.0 && self.whole_percent_remaining <= 10.0).then(|| {
            format!(
                "Alert: {} is running low ({}% remaining)",
                self.source_name, self.whole_percent_remaining
            )
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRemaining {
    pub applied_stored_manures: Vec<AppliedManureSummary>,
    pub applied_imported_manures: Vec<AppliedManureSummary>,
    pub warnings: Vec<String>,
}

fn applied_from_source(fields: &[Field], source_uuid: Uuid, units: &[ManureUnit]) -> f64 {
    fields
        .iter()
        .flat_map(|field| {
            field
                .manures
                .iter()
                .filter(move |m| m.source_uuid == source_uuid)
                .map(move |m| {
                    let mut applied = m.application_rate * field.area;
                    if let Some(unit) = units.iter().find(|u| u.id == m.appl_unit_id) {
                        if unit.conversion_lb_ton != 0.0 {
                            applied *= unit.conversion_lb_ton;
                        }
                    }
                    round_whole(applied)
                })
        })
        .sum()
}

/// Applied and remaining amounts for every storage system and imported manure
pub fn material_remaining(year: &NmpFileYear, units: &[ManureUnit]) -> MaterialRemaining {
    let applied_stored_manures: Vec<_> = year
        .manure_storage_systems
        .iter()
        .map(|system| {
            AppliedManureSummary::new(
                system.name(),
                system.uuid(),
                system.manure_type(),
                standardized_system_amount(system),
                applied_from_source(&year.fields, system.uuid(), units),
            )
        })
        .collect();

    let applied_imported_manures: Vec<_> = year
        .imported_manures
        .iter()
        .map(|manure| {
            AppliedManureSummary::new(
                &manure.managed_manure_name,
                manure.uuid,
                manure.manure_type,
                standardized_imported_amount(manure),
                applied_from_source(&year.fields, manure.uuid, units),
            )
        })
        .collect();

    let warnings = applied_stored_manures
        .iter()
        .chain(applied_imported_manures.iter())
        .filter_map(AppliedManureSummary::low_stock_warning)
        .collect();

    MaterialRemaining {
        applied_stored_manures,
        applied_imported_manures,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookLab;

    fn imported(uuid: Uuid, tons: f64) -> ImportedManure {
        ImportedManure {
            unique_material_name: "Compost".to_string(),
            manure_type: ManureType::Solid,
            annual_amount: tons,
            annual_amount_us_gallons_volume: None,
            annual_amount_cubic_yards_volume: None,
            annual_amount_cubic_meters_volume: None,
            annual_amount_tons_weight: Some(tons),
            annual_amount_display_volume: None,
            annual_amount_display_weight: None,
            units: None,
            moisture: Some(45.0),
            assigned_to_stored_system: false,
            managed_manure_name: "Compost".to_string(),
            uuid,
        }
    }

    fn application(source_uuid: Uuid, rate: f64) -> AppliedManure {
        AppliedManure {
            name: "Compost".to_string(),
            manure_id: 1,
            manure_name: "Compost".to_string(),
            application_id: 1,
            appl_unit_id: 1,
            application_rate: rate,
            nh4_retention: 0.0,
            n_available: 0.0,
            solid_liquid: Some(ManureType::Solid),
            source_uuid,
            balance: BalanceValues::default(),
        }
    }

    fn conversion_factors() -> CropConversionFactors {
        CropConversionFactors {
            kg_per_ha_to_lb_per_ac: 0.892176122,
            nitrogen_protein_conversion: 0.625,
            unit_conversion: 0.5,
            phosphorous_availability_first_year: 0.7,
            phosphorous_availability_long_term: 1.0,
            phosphorous_p_to_p2o5: 2.29,
            potassium_availability_first_year: 1.0,
            potassium_availability_long_term: 1.0,
            potassium_k_to_k2o: 1.2,
            pound_per_ton: 20.0,
            default_kelowna_phosphorous: 250.0,
            default_kelowna_potassium: 500.0,
        }
    }

    fn analysis(solid_liquid: Option<ManureType>) -> NutrientAnalysis {
        NutrientAnalysis {
            manure_id: 12,
            solid_liquid,
            moisture: Some(75.0),
            n: 0.5,
            nh4n: 1000.0,
            p: 0.1,
            k: 0.4,
            source_uuid: Uuid::new_v4(),
            source_name: "Pile".to_string(),
            n_mineralization_id: Some(1),
            book_lab: BookLab::Lab,
            unique_material_name: "Beef solids".to_string(),
            manure_name: "Beef solids".to_string(),
            annual_amount: 100.0,
        }
    }

    fn unit(id: i64, conversion_lb_ton: f64) -> ManureUnit {
        ManureUnit {
            id,
            name: "unit".to_string(),
            conversion_lb_ton,
        }
    }

    fn mineralization() -> NMineralization {
        NMineralization {
            id: 1,
            n_mineralization_id: 1,
            location_id: 2,
            name: "Solid".to_string(),
            first_year_value: 0.2,
            long_term_value: 0.1,
        }
    }

    #[test]
    fn test_manure_nutrient_inputs() {
        let mut applied = application(Uuid::new_v4(), 10.0);
        applied.nh4_retention = 50.0;
        applied.n_available = 30.0;

        let inputs = manure_nutrient_inputs(
            &analysis(Some(ManureType::Solid)),
            &applied,
            &unit(1, 0.0),
            None,
            &conversion_factors(),
            Some(&mineralization()),
        )
        .unwrap();

        // K2O: 10 × 0.4 × 20 × 1.2; P2O5: 10 × 0.1 × 20 × 2.29 × 0.7, then × 1.0
        assert_eq!(inputs.first_year.k2o, 96.0);
        assert_eq!(inputs.long_term.k2o, 96.0);
        assert_eq!(inputs.first_year.p2o5, 32.0);
        assert_eq!(inputs.long_term.p2o5, 46.0);
        // NH4-N 0.1% × 50% retained, organic N 0.4% × 30% (first year) or × 0.1 (long term)
        assert_eq!(inputs.first_year.n, 34.0);
        assert_eq!(inputs.long_term.n, 18.0);

        let balance = inputs.balance_values();
        assert_eq!(balance.req_n, 34.0);
        assert_eq!(balance.rem_p2o5, 46.0);
    }

    #[test]
    fn test_manure_inputs_without_mineralization_row() {
        let mut applied = application(Uuid::new_v4(), 10.0);
        applied.nh4_retention = 50.0;
        applied.n_available = 30.0;

        let inputs = manure_nutrient_inputs(
            &analysis(Some(ManureType::Solid)),
            &applied,
            &unit(1, 0.0),
            None,
            &conversion_factors(),
            None,
        )
        .unwrap();
        // Only the retained NH4-N remains long term: 10 × 0.05 × 20
        assert_eq!(inputs.long_term.n, 10.0);
        assert_eq!(inputs.first_year.n, 34.0);
    }

    #[test]
    fn test_solid_manure_in_cubic_yards_uses_bulk_density() {
        let applied = application(Uuid::new_v4(), 10.0);
        let book = ManureCatalogEntry {
            id: 12,
            name: "Beef solids".to_string(),
            n_mineralization_id: 1,
            cubic_yard_conversion: 0.5,
        };
        let solid = analysis(Some(ManureType::Solid));
        let cubic_yards = unit(CUBIC_YARDS_PER_ACRE_UNIT_ID, 0.0);

        let inputs = manure_nutrient_inputs(
            &solid,
            &applied,
            &cubic_yards,
            Some(&book),
            &conversion_factors(),
            None,
        )
        .unwrap();
        assert_eq!(inputs.first_year.k2o, 48.0);

        let err = manure_nutrient_inputs(
            &solid,
            &applied,
            &cubic_yards,
            None,
            &conversion_factors(),
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            NmpError::MissingReference {
                kind: "manure",
                id: "12".to_string()
            }
        );

        // Liquids are never converted by bulk density
        let liquid = manure_nutrient_inputs(
            &analysis(Some(ManureType::Liquid)),
            &applied,
            &cubic_yards,
            None,
            &conversion_factors(),
            None,
        )
        .unwrap();
        assert_eq!(liquid.first_year.k2o, 96.0);
    }

    #[test]
    fn test_find_n_mineralization() {
        let rows = vec![mineralization()];
        assert!(find_n_mineralization(&rows, 1, 2).is_some());
        assert!(find_n_mineralization(&rows, 1, 3).is_none());
        assert!(find_n_mineralization(&rows, 0, 2).is_none());
    }

    #[test]
    fn test_density_factor_bands() {
        assert_eq!(density_factor(30.0), 0.27);
        assert_eq!(density_factor(90.0), 0.837);
        let mid = density_factor(60.0);
        assert!((mid - (7.9386 * 0.216 - 16.43 * 0.36 + 11.993 * 0.6 - 2.3975)).abs() < 1e-9);
    }

    #[test]
    fn test_separation_split() {
        let (liquids, solids) = calculate_separated_solid_and_liquid(1_000_000.0, 10.0);
        assert_eq!(liquids, 900_000.0);
        // 100000 gal / 264.172 × 0.5
        assert_eq!(solids, 189.0);
    }

    #[test]
    fn test_material_remaining_low_stock() {
        let uuid = Uuid::new_v4();
        let mut year = NmpFileYear::new("2025");
        year.imported_manures.push(imported(uuid, 100.0));
        let mut field = Field::new("North", 10.0);
        field.manures.push(application(uuid, 9.5));
        year.fields.push(field);

        let units = vec![ManureUnit {
            id: 1,
            name: "tons/ac".to_string(),
            conversion_lb_ton: 1.0,
        }];
        let report = material_remaining(&year, &units);
        let summary = &report.applied_imported_manures[0];
        assert_eq!(summary.total_applied, 95.0);
        assert_eq!(summary.whole_percent_applied, 95.0);
        assert_eq!(summary.whole_percent_remaining, 5.0);
        assert_eq!(summary.total_annual_manure_remaining_to_apply, 5.0);
        assert_eq!(report.warnings, vec!["Alert: Compost is running low (5% remaining)"]);
    }

    #[test]
    fn test_material_remaining_never_negative() {
        let uuid = Uuid::new_v4();
        let mut year = NmpFileYear::new("2025");
        year.imported_manures.push(imported(uuid, 10.0));
        let mut field = Field::new("North", 10.0);
        field.manures.push(application(uuid, 5.0));
        year.fields.push(field);

        let report = material_remaining(&year, &[]);
        let summary = &report.applied_imported_manures[0];
        assert_eq!(summary.total_annual_manure_remaining_to_apply, 0.0);
        assert_eq!(summary.whole_percent_remaining, 0.0);
        assert!(report.warnings.is_empty());
    }
}
