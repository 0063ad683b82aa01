//! Reference tables supplied by the catalog service
//!
//! Rows keep the service's column names on the wire. The calculation library takes
//! them as plain arguments and never fetches them itself.

use serde::{Deserialize, Serialize};

use crate::types::DryLiquid;

/// Application-rate unit for fertilizers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FertilizerUnit {
    pub id: i64,
    pub name: String,
    pub dryliquid: DryLiquid,
    #[serde(rename = "conversiontoimperialgallonsperacre", default)]
    pub conversion_to_imperial_gallons_per_acre: f64,
    #[serde(rename = "farmrequirednutrientsstdunitsconversion", default)]
    pub farm_required_nutrients_std_units_conversion: f64,
    #[serde(rename = "farmrequirednutrientsstdunitsareaconversion", default)]
    pub farm_required_nutrients_std_units_area_conversion: f64,
}

/// Liquid fertilizer density unit; `convfactor` converts to lb/imp gal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DensityUnit {
    pub id: i64,
    pub name: String,
    #[serde(rename = "convfactor")]
    pub conv_factor: f64,
}

/// Injection-rate unit with its factor to imperial gallons per minute
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InjectionUnit {
    pub id: i64,
    pub name: String,
    pub conversion_to_imp_gallons_per_minute: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FertilizerCatalogEntry {
    pub id: i64,
    pub name: String,
    pub dryliquid: DryLiquid,
    #[serde(default)]
    pub fertigation: bool,
    /// Percent N
    pub nitrogen: f64,
    /// Percent P2O5
    pub phosphorous: f64,
    /// Percent K2O
    pub potassium: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoilTestMethod {
    pub id: i64,
    pub name: String,
    #[serde(rename = "converttokelownaphlessthan72", default)]
    pub convert_to_kelowna_ph_less_than_72: Option<f64>,
    #[serde(rename = "converttokelownaphgreaterthan72", default)]
    pub convert_to_kelowna_ph_greater_than_72: Option<f64>,
    #[serde(rename = "converttokelownak", default)]
    pub convert_to_kelowna_k: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreviousYearManureApplication {
    pub id: i64,
    #[serde(rename = "fieldmanureapplicationhistory", default)]
    pub field_manure_application_history: u32,
    /// Credits by history category, e.g. `"{22,30,45}"`
    #[serde(rename = "defaultnitrogencredit")]
    pub default_nitrogen_credit: String,
    #[serde(rename = "previousyearmanureaplicationfrequency")]
    pub frequency: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimalSubtype {
    pub id: i64,
    pub name: String,
    #[serde(rename = "liquidpergalperanimalperday", default)]
    pub liquid_per_gal_per_animal_per_day: f64,
    #[serde(rename = "solidperpoundperanimalperday", default)]
    pub solid_per_pound_per_animal_per_day: f64,
    #[serde(rename = "solidliquidseparationpercentage", default)]
    pub solid_liquid_separation_percentage: f64,
    #[serde(rename = "washwater", default)]
    pub wash_water: f64,
    #[serde(rename = "milkproduction", default)]
    pub milk_production: f64,
    #[serde(rename = "animalid")]
    pub animal_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Breed {
    pub id: i64,
    #[serde(rename = "breedname")]
    pub breed_name: String,
    #[serde(rename = "animalid")]
    pub animal_id: i64,
    #[serde(rename = "breedmanurefactor")]
    pub breed_manure_factor: f64,
}

/// Manure application-rate unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManureUnit {
    pub id: i64,
    pub name: String,
    #[serde(rename = "conversionlbton", default)]
    pub conversion_lb_ton: f64,
}

/// Agronomic conversion constants, a single row from `api/cropsconversionfactors/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CropConversionFactors {
    #[serde(rename = "kilogramperhectaretopoundperacreconversion", default)]
    pub kg_per_ha_to_lb_per_ac: f64,
    #[serde(rename = "nitrogenproteinconversion", default)]
    pub nitrogen_protein_conversion: f64,
    #[serde(rename = "unitconversion", default)]
    pub unit_conversion: f64,
    #[serde(rename = "phosphorousavailabilityfirstyear", default)]
    pub phosphorous_availability_first_year: f64,
    #[serde(rename = "phosphorousavailabilitylongterm", default)]
    pub phosphorous_availability_long_term: f64,
    #[serde(rename = "phosphorousptop2o5conversion", default)]
    pub phosphorous_p_to_p2o5: f64,
    #[serde(rename = "potassiumavailabilityfirstyear", default)]
    pub potassium_availability_first_year: f64,
    #[serde(rename = "potassiumavailabilitylongterm", default)]
    pub potassium_availability_long_term: f64,
    #[serde(rename = "potassiumktok2oconversion", default)]
    pub potassium_k_to_k2o: f64,
    #[serde(rename = "poundpertonconversion", default)]
    pub pound_per_ton: f64,
    /// Kelowna P ppm assumed when a field has no soil test
    #[serde(rename = "defaultsoiltestkelownaphosphorous", default)]
    pub default_kelowna_phosphorous: f64,
    /// Kelowna K ppm assumed when a field has no soil test
    #[serde(rename = "defaultsoiltestkelownapotassium", default)]
    pub default_kelowna_potassium: f64,
}

/// Crop row with its removal factors and nitrogen recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropCatalogEntry {
    pub id: i64,
    #[serde(rename = "cropname", default)]
    pub crop_name: String,
    #[serde(rename = "croptypeid", default)]
    pub crop_type_id: i64,
    /// lb N removed per unit of yield
    #[serde(rename = "cropremovalfactornitrogen", default)]
    pub removal_factor_nitrogen: Option<f64>,
    #[serde(rename = "cropremovalfactorp2o5", default)]
    pub removal_factor_p2o5: f64,
    #[serde(rename = "cropremovalfactork2o", default)]
    pub removal_factor_k2o: f64,
    #[serde(rename = "nitrogenrecommendationid", default)]
    pub nitrogen_recommendation_id: i64,
    #[serde(rename = "nitrogenrecommendationpoundperacre", default)]
    pub nitrogen_recommendation_lb_per_ac: Option<f64>,
}

/// Kelowna soil test band, ppm inclusive at both ends
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct KelownaRange {
    pub id: i64,
    #[serde(rename = "rangelow")]
    pub range_low: f64,
    #[serde(rename = "rangehigh")]
    pub range_high: f64,
}

impl KelownaRange {
    pub fn contains(&self, ppm: f64) -> bool {
        self.range_low <= ppm && ppm <= self.range_high
    }
}

/// P2O5 or K2O recommendation for a Kelowna band in a region and crop group.
///
/// Phosphorous and potassium rows use different column names for the same shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoilTestRecommendation {
    #[serde(default)]
    pub id: i64,
    #[serde(alias = "soiltestphosphorouskelownarangeid", alias = "soiltestpotassiumkelownarangeid")]
    pub kelowna_range_id: i64,
    #[serde(alias = "soiltestphosphorousregioncode", alias = "soiltestpotassiumregioncode")]
    pub soil_test_region_code: i64,
    #[serde(alias = "phosphorouscropgroupregioncode", alias = "potassiumcropgroupregioncode")]
    pub crop_group_region_code: i64,
    #[serde(
        alias = "p2o5recommendationkilogramperhectare",
        alias = "k2orecommendationkilogramperhectare"
    )]
    pub kg_per_ha: f64,
}

/// A crop's crop group within a soil test region
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropSoilTestRegion {
    #[serde(alias = "cropid")]
    pub crop_id: i64,
    #[serde(alias = "soiltestphosphorousregioncode", alias = "soiltestpotassiumregioncode")]
    pub soil_test_region_code: i64,
    /// `None` when the crop has no P or K recommendation in the region
    #[serde(
        default,
        alias = "phosphorouscropgroupregioncode",
        alias = "potassiumcropgroupregioncode"
    )]
    pub crop_group_region_code: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Region {
    pub id: i64,
    pub name: String,
    #[serde(rename = "soiltestphosphorousregioncd", default)]
    pub soil_test_phosphorous_region_code: i64,
    #[serde(rename = "soiltestpotassiumregioncd", default)]
    pub soil_test_potassium_region_code: i64,
    #[serde(rename = "locationid", default)]
    pub location_id: i64,
}

/// Share of organic N that mineralizes, by manure class and location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NMineralization {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "nmineralizationid", default)]
    pub n_mineralization_id: i64,
    #[serde(rename = "locationid", default)]
    pub location_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "firstyearvalue", default)]
    pub first_year_value: f64,
    #[serde(rename = "longtermvalue", default)]
    pub long_term_value: f64,
}

/// Book manure row; only the volume conversion is used by the calculations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManureCatalogEntry {
    pub id: i64,
    pub name: String,
    #[serde(rename = "nmineralizationid", default)]
    pub n_mineralization_id: i64,
    /// Tons per cubic yard
    #[serde(rename = "cubicyardconversion", default)]
    pub cubic_yard_conversion: f64,
}

/// Which balance column a message band applies to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BalanceType {
    #[serde(rename = "reqN")]
    ReqN,
    #[serde(rename = "reqP2o5")]
    ReqP2o5,
    #[serde(rename = "reqK2o")]
    ReqK2o,
    #[serde(rename = "remP2O5")]
    RemP2o5,
}

impl BalanceType {
    pub fn is_agronomic(&self) -> bool {
        !matches!(self, BalanceType::RemP2o5)
    }
}

/// A balance message shown when a column value falls in its band
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NutrientMessage {
    pub id: i64,
    /// `{0}` is replaced with the balance magnitude
    pub text: String,
    pub balance_type: BalanceType,
    pub req_balance_low: f64,
    pub req_balance_high: f64,
    pub rem_balance_low: f64,
    pub rem_balance_high: f64,
}

/// Lookup tables needed while saving animals and reading soil tests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CatalogTables {
    #[serde(default)]
    pub animal_subtypes: Vec<AnimalSubtype>,
    #[serde(default)]
    pub breeds: Vec<Breed>,
    #[serde(default)]
    pub soil_test_methods: Vec<SoilTestMethod>,
    #[serde(default)]
    pub fertilizer_units: Vec<FertilizerUnit>,
    #[serde(default)]
    pub density_units: Vec<DensityUnit>,
    #[serde(default)]
    pub previous_year_manure_applications: Vec<PreviousYearManureApplication>,
    #[serde(default)]
    pub manure_units: Vec<ManureUnit>,
}

/// Solubility of a dry fertigation product in water
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DryFertilizerSolubility {
    pub fertilizer_id: i64,
    pub g_per_l: f64,
    pub kg_per_l: f64,
    pub lb_per_imp_gal: f64,
}

pub const DRY_FERTILIZER_SOLUBILITIES: &[DryFertilizerSolubility] = &[
    // Urea 46-0-0
    DryFertilizerSolubility {
        fertilizer_id: 1,
        g_per_l: 1080.0,
        kg_per_l: 1.08,
        lb_per_imp_gal: 9.01,
    },
    // Ammonium nitrate 34-0-0
    DryFertilizerSolubility {
        fertilizer_id: 6,
        g_per_l: 1900.0,
        kg_per_l: 1.9,
        lb_per_imp_gal: 19.02,
    },
    // Ammonium sulphate 21-0-0
    DryFertilizerSolubility {
        fertilizer_id: 7,
        g_per_l: 764.0,
        kg_per_l: 0.764,
        lb_per_imp_gal: 6.38,
    },
    // Calcium nitrate 15.5-0-0
    DryFertilizerSolubility {
        fertilizer_id: 29,
        g_per_l: 1444.0,
        kg_per_l: 1.444,
        lb_per_imp_gal: 12.03,
    },
];

pub fn dry_fertilizer_solubility(fertilizer_id: i64) -> Option<&'static DryFertilizerSolubility> {
    DRY_FERTILIZER_SOLUBILITIES
        .iter()
        .find(|s| s.fertilizer_id == fertilizer_id)
}

/// Injection-rate units offered for fertigation
pub fn default_injection_units() -> Vec<InjectionUnit> {
    [(1, "US gallon/min", 0.836), (2, "L/min", 0.22), (3, "Imp. gallon/min", 1.0)]
        .into_iter()
        .map(|(id, name, factor)| InjectionUnit {
            id,
            name: name.to_string(),
            conversion_to_imp_gallons_per_minute: factor,
        })
        .collect()
}

/// Default balance message bands
pub fn default_nutrient_messages() -> Vec<NutrientMessage> {
    let band = |id: i64, text: &str, balance_type: BalanceType, low: f64, high: f64| {
        NutrientMessage {
            id,
            text: text.to_string(),
            balance_type,
            req_balance_low: low,
            req_balance_high: high,
            rem_balance_low: 0.0,
            rem_balance_high: 0.0,
        }
    };

    vec![
        band(1, "Reduce N input by {0} lb/ac", BalanceType::ReqN, 15.0, 99999.0),
        band(2, "Crop requirement for N is met", BalanceType::ReqN, -5.0, 14.0),
        band(3, "Add {0} lb N/ac to meet crop requirements", BalanceType::ReqN, -99999.0, -6.0),
        band(
            4,
            "Crop requirement for P2O5 is met; {0} lb/ac adds no benefit to the crop",
            BalanceType::ReqP2o5,
            15.0,
            99999.0,
        ),
        band(5, "Crop requirement for P2O5 is met", BalanceType::ReqP2o5, -5.0, 14.0),
        band(
            6,
            "Add {0} lb P2O5/ac to meet crop requirements",
            BalanceType::ReqP2o5,
            -99999.0,
            -6.0,
        ),
        band(
            7,
            "Crop requirement for K2O is met, {0} lb/ac adds no benefit to the crop",
            BalanceType::ReqK2o,
            15.0,
            99999.0,
        ),
        band(8, "Crop requirement for K2O is met", BalanceType::ReqK2o, -5.0, 14.0),
        band(
            9,
            "Add {0} lb K2O/ac to meet crop requirements",
            BalanceType::ReqK2o,
            -99999.0,
            -6.0,
        ),
        NutrientMessage {
            id: 10,
            text: "Reduce crop P2O5 removal balance below 80 lb/ac per year in the long term."
                .to_string(),
            balance_type: BalanceType::RemP2o5,
            req_balance_low: 15.0,
            req_balance_high: 99999.0,
            rem_balance_low: 80.0,
            rem_balance_high: 99999.0,
        },
    ]
}
