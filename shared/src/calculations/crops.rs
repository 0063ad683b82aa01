//! Crop nutrient removal and agronomic requirements

use crate::catalog::{
    CropCatalogEntry, CropConversionFactors, CropSoilTestRegion, KelownaRange,
    SoilTestRecommendation,
};
use crate::error::{NmpError, NmpResult};
use crate::models::{BalanceValues, Crop, SoilTest};
use crate::types::{round_whole, NutrientTotals};

/// Catalog rows needed to turn one soil test reading into a requirement
#[derive(Debug, Clone, Copy)]
pub struct SoilTestTables<'a> {
    /// The crop's crop group in the farm's soil test region
    pub region: &'a CropSoilTestRegion,
    pub ranges: &'a [KelownaRange],
    pub recommendations: &'a [SoilTestRecommendation],
}

/// N, P2O5 and K2O carried off the field with the harvest, lb/ac.
///
/// A cover crop that is not harvested removes nothing. Nitrogen comes from the
/// entered crude protein when there is one, otherwise from the crop's removal factor.
pub fn crop_removal(
    crop: &Crop,
    entry: &CropCatalogEntry,
    factors: &CropConversionFactors,
) -> NutrientTotals {
    if crop.cover_crop_harvested == Some(false) {
        return NutrientTotals::zero();
    }

    let protein_divisor = factors.nitrogen_protein_conversion * factors.unit_conversion;
    let n = match crop.crude_protein {
        Some(protein) if protein != 0.0 && protein_divisor != 0.0 => {
            protein / protein_divisor * crop.crop_yield
        }
        _ => entry.removal_factor_nitrogen.unwrap_or(0.0) * crop.crop_yield,
    };

    NutrientTotals::new(
        round_whole(n),
        round_whole(entry.removal_factor_p2o5 * crop.crop_yield),
        round_whole(entry.removal_factor_k2o * crop.crop_yield),
    )
}

/// Agronomic N requirement less the crop's nitrogen credit, never below zero.
///
/// Recommendation kinds 1-3 are a flat lb/ac; kind 4 applies only to a crop with a
/// yield. Unknown kinds recommend nothing.
pub fn crop_requirement_n(crop: &Crop, entry: &CropCatalogEntry) -> f64 {
    let lb_per_ac = entry.nitrogen_recommendation_lb_per_ac.unwrap_or(0.0);
    let recommended = match entry.nitrogen_recommendation_id {
        1..=3 => lb_per_ac,
        4 if crop.crop_yield != 0.0 => round_whole(lb_per_ac),
        _ => 0.0,
    };
    round_whole((recommended - crop.n_credit).max(0.0))
}

/// Kelowna band holding a reading; readings are matched at whole ppm
pub fn kelowna_range_for_ppm(ranges: &[KelownaRange], ppm: f64) -> Option<&KelownaRange> {
    let ppm = round_whole(ppm);
    ranges.iter().find(|range| range.contains(ppm))
}

fn soil_test_requirement(
    reading: Option<f64>,
    default_ppm: f64,
    tables: &SoilTestTables<'_>,
    factors: &CropConversionFactors,
    kind: &'static str,
) -> NmpResult<f64> {
    let Some(crop_group) = tables.region.crop_group_region_code else {
        return Ok(0.0);
    };

    let ppm = match reading {
        Some(value) if value != 0.0 => value,
        _ => default_ppm,
    };
    let range = kelowna_range_for_ppm(tables.ranges, ppm).ok_or_else(|| {
        NmpError::MissingReference {
            kind: "Kelowna range",
            id: ppm.to_string(),
        }
    })?;

    let region_code = tables.region.soil_test_region_code;
    let recommendation = tables
        .recommendations
        .iter()
        .find(|r| {
            r.kelowna_range_id == range.id
                && r.soil_test_region_code == region_code
                && r.crop_group_region_code == crop_group
        })
        .ok_or_else(|| NmpError::MissingReference {
            kind,
            id: format!("{}/{}/{}", range.id, region_code, crop_group),
        })?;

    Ok(round_whole(recommendation.kg_per_ha * factors.kg_per_ha_to_lb_per_ac))
}

/// P2O5 requirement from the Kelowna P reading, or the default reading without a soil test
pub fn crop_requirement_p2o5(
    soil_test: Option<&SoilTest>,
    tables: &SoilTestTables<'_>,
    factors: &CropConversionFactors,
) -> NmpResult<f64> {
    soil_test_requirement(
        soil_test.and_then(|t| t.converted_kelowna_p),
        factors.default_kelowna_phosphorous,
        tables,
        factors,
        "phosphorous recommendation",
    )
}

/// K2O requirement from the Kelowna K reading, or the default reading without a soil test
pub fn crop_requirement_k2o(
    soil_test: Option<&SoilTest>,
    tables: &SoilTestTables<'_>,
    factors: &CropConversionFactors,
) -> NmpResult<f64> {
    soil_test_requirement(
        soil_test.and_then(|t| t.converted_kelowna_k),
        factors.default_kelowna_potassium,
        tables,
        factors,
        "potassium recommendation",
    )
}

/// Requirement (`req*`) and removal (`rem*`) values for a crop row
pub fn crop_balance_values(
    crop: &Crop,
    entry: &CropCatalogEntry,
    soil_test: Option<&SoilTest>,
    phosphorous: &SoilTestTables<'_>,
    potassium: &SoilTestTables<'_>,
    factors: &CropConversionFactors,
) -> NmpResult<BalanceValues> {
    let removal = crop_removal(crop, entry, factors);
    Ok(BalanceValues {
        req_n: crop_requirement_n(crop, entry),
        req_p2o5: crop_requirement_p2o5(soil_test, phosphorous, factors)?,
        req_k2o: crop_requirement_k2o(soil_test, potassium, factors)?,
        rem_n: removal.n,
        rem_p2o5: removal.p2o5,
        rem_k2o: removal.k2o,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factors() -> CropConversionFactors {
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

    fn green_beans() -> CropCatalogEntry {
        CropCatalogEntry {
            id: 28,
            crop_name: "Beans-green, wax".to_string(),
            crop_type_id: 5,
            removal_factor_nitrogen: Some(7.34),
            removal_factor_p2o5: 2.8,
            removal_factor_k2o: 6.78,
            nitrogen_recommendation_id: 2,
            nitrogen_recommendation_lb_per_ac: Some(35.68716488),
        }
    }

    fn planted_beans() -> Crop {
        Crop {
            name: "Beans-green, wax".to_string(),
            crop_id: 28,
            crop_type_id: 5,
            crop_yield: 2.9,
            crude_protein: Some(2.29375),
            prev_crop_id: Some(13),
            ..Default::default()
        }
    }

    fn range(id: i64, low: f64, high: f64) -> KelownaRange {
        KelownaRange {
            id,
            range_low: low,
            range_high: high,
        }
    }

    fn recommendation(range_id: i64, region: i64, kg_per_ha: f64) -> SoilTestRecommendation {
        SoilTestRecommendation {
            id: 0,
            kelowna_range_id: range_id,
            soil_test_region_code: region,
            crop_group_region_code: 4,
            kg_per_ha,
        }
    }

    struct Tables {
        p_region: CropSoilTestRegion,
        p_ranges: Vec<KelownaRange>,
        p_recommendations: Vec<SoilTestRecommendation>,
        k_region: CropSoilTestRegion,
        k_ranges: Vec<KelownaRange>,
        k_recommendations: Vec<SoilTestRecommendation>,
    }

    impl Tables {
        fn new() -> Self {
            Self {
                p_region: CropSoilTestRegion {
                    crop_id: 28,
                    soil_test_region_code: 2,
                    crop_group_region_code: Some(4),
                },
                p_ranges: vec![range(7, 31.0, 40.0), range(12, 101.0, 1000.0)],
                p_recommendations: vec![recommendation(7, 2, 70.0), recommendation(12, 2, 0.0)],
                k_region: CropSoilTestRegion {
                    crop_id: 28,
                    soil_test_region_code: 3,
                    crop_group_region_code: Some(4),
                },
                k_ranges: vec![range(2, 26.0, 35.0), range(14, 251.0, 1000.0)],
                k_recommendations: vec![recommendation(2, 3, 150.0), recommendation(14, 3, 0.0)],
            }
        }

        fn phosphorous(&self) -> SoilTestTables<'_> {
            SoilTestTables {
                region: &self.p_region,
                ranges: &self.p_ranges,
                recommendations: &self.p_recommendations,
            }
        }

        fn potassium(&self) -> SoilTestTables<'_> {
            SoilTestTables {
                region: &self.k_region,
                ranges: &self.k_ranges,
                recommendations: &self.k_recommendations,
            }
        }
    }

    fn soil_test() -> SoilTest {
        SoilTest {
            soil_test_id: 1,
            val_no3h: Some(44.0),
            val_p: Some(44.0),
            val_k: Some(44.0),
            val_ph: Some(7.0),
            converted_kelowna_k: Some(35.2),
            converted_kelowna_p: Some(32.56),
            sample_date: Some("2025-11-01T07:00:00.000Z".to_string()),
        }
    }

    #[test]
    fn test_removal_from_crude_protein() {
        // 2.29375 / (0.625 × 0.5) × 2.9 = 21.29
        let removal = crop_removal(&planted_beans(), &green_beans(), &factors());
        assert_eq!(removal, NutrientTotals::new(21.0, 8.0, 20.0));
    }

    #[test]
    fn test_removal_from_factor_without_protein() {
        let mut crop = planted_beans();
        crop.crude_protein = Some(0.0);
        // 7.34 × 2.9 = 21.29
        assert_eq!(crop_removal(&crop, &green_beans(), &factors()).n, 21.0);

        let mut entry = green_beans();
        entry.removal_factor_nitrogen = None;
        crop.crude_protein = None;
        assert_eq!(crop_removal(&crop, &entry, &factors()).n, 0.0);
    }

    #[test]
    fn test_unharvested_cover_crop_removes_nothing() {
        let mut crop = planted_beans();
        crop.cover_crop_harvested = Some(false);
        assert_eq!(crop_removal(&crop, &green_beans(), &factors()), NutrientTotals::zero());
    }

    #[test]
    fn test_requirement_n_less_credit() {
        let mut crop = planted_beans();
        assert_eq!(crop_requirement_n(&crop, &green_beans()), 36.0);
        crop.n_credit = 40.0;
        assert_eq!(crop_requirement_n(&crop, &green_beans()), 0.0);
        crop.n_credit = 10.0;
        assert_eq!(crop_requirement_n(&crop, &green_beans()), 26.0);
    }

    #[test]
    fn test_requirement_n_recommendation_kinds() {
        let mut crop = planted_beans();
        let mut entry = green_beans();

        entry.nitrogen_recommendation_lb_per_ac = None;
        assert_eq!(crop_requirement_n(&crop, &entry), 0.0);

        entry.nitrogen_recommendation_id = 4;
        entry.nitrogen_recommendation_lb_per_ac = Some(120.4);
        assert_eq!(crop_requirement_n(&crop, &entry), 120.0);
        crop.crop_yield = 0.0;
        assert_eq!(crop_requirement_n(&crop, &entry), 0.0);

        entry.nitrogen_recommendation_id = 9;
        assert_eq!(crop_requirement_n(&crop, &entry), 0.0);
    }

    #[test]
    fn test_requirements_without_soil_test_use_defaults() {
        let tables = Tables::new();
        assert_eq!(crop_requirement_p2o5(None, &tables.phosphorous(), &factors()), Ok(0.0));
        assert_eq!(crop_requirement_k2o(None, &tables.potassium(), &factors()), Ok(0.0));
    }

    #[test]
    fn test_requirements_from_soil_test() {
        let tables = Tables::new();
        let soil = soil_test();
        // 70 kg/ha and 150 kg/ha in lb/ac
        assert_eq!(crop_requirement_p2o5(Some(&soil), &tables.phosphorous(), &factors()), Ok(62.0));
        assert_eq!(crop_requirement_k2o(Some(&soil), &tables.potassium(), &factors()), Ok(134.0));
    }

    #[test]
    fn test_zero_reading_falls_back_to_default() {
        let tables = Tables::new();
        let mut soil = soil_test();
        soil.converted_kelowna_p = Some(0.0);
        assert_eq!(crop_requirement_p2o5(Some(&soil), &tables.phosphorous(), &factors()), Ok(0.0));
    }

    #[test]
    fn test_crop_without_group_needs_nothing() {
        let mut tables = Tables::new();
        tables.k_region.crop_group_region_code = None;
        assert_eq!(
            crop_requirement_k2o(Some(&soil_test()), &tables.potassium(), &factors()),
            Ok(0.0)
        );
    }

    #[test]
    fn test_missing_range_or_recommendation_is_an_error() {
        let mut tables = Tables::new();
        let mut soil = soil_test();
        soil.converted_kelowna_p = Some(60.0);
        assert!(matches!(
            crop_requirement_p2o5(Some(&soil), &tables.phosphorous(), &factors()),
            Err(NmpError::MissingReference { kind: "Kelowna range", .. })
        ));

        tables.k_recommendations.clear();
        assert_eq!(
            crop_requirement_k2o(Some(&soil_test()), &tables.potassium(), &factors()),
            Err(NmpError::MissingReference {
                kind: "potassium recommendation",
                id: "2/3/4".to_string(),
            })
        );
    }

    #[test]
    fn test_kelowna_lookup_rounds_to_whole_ppm() {
        let ranges = vec![range(2, 26.0, 35.0), range(3, 36.0, 45.0)];
        assert_eq!(kelowna_range_for_ppm(&ranges, 35.2).map(|r| r.id), Some(2));
        assert_eq!(kelowna_range_for_ppm(&ranges, 35.5).map(|r| r.id), Some(3));
        assert!(kelowna_range_for_ppm(&ranges, 12.0).is_none());
    }

    #[test]
    fn test_crop_balance_values() {
        let tables = Tables::new();
        let mut crop = planted_beans();
        crop.n_credit = 40.0;
        let balance = crop_balance_values(
            &crop,
            &green_beans(),
            Some(&soil_test()),
            &tables.phosphorous(),
            &tables.potassium(),
            &factors(),
        )
        .unwrap();
        assert_eq!(
            balance,
            BalanceValues {
                req_n: 0.0,
                req_p2o5: 62.0,
                req_k2o: 134.0,
                rem_n: 21.0,
                rem_p2o5: 8.0,
                rem_k2o: 20.0,
            }
        );
    }
}
