//! Field models: crops, soil tests and every nutrient source applied to a field

use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::types::{ManureType, NutrientTotals};

/// Default field area in acres
pub const DEFAULT_FIELD_AREA: f64 = 1.0;

fn default_area() -> f64 {
    DEFAULT_FIELD_AREA
}

/// A field the plan allocates nutrients to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    #[validate(length(min = 1, max = 100))]
    pub field_name: String,
    /// Acres
    #[serde(default = "default_area")]
    #[validate(range(min = 0.0001))]
    pub area: f64,
    /// Previous-year manure application frequency code; 0 means none
    #[serde(rename = "previousYearManureApplicationId", default)]
    pub previous_year_manure_application_frequency: u32,
    #[serde(default)]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_test: Option<SoilTest>,
    #[serde(default)]
    pub crops: Vec<Crop>,
    #[serde(default)]
    pub fertilizers: Vec<AppliedFertilizer>,
    #[serde(default)]
    pub fertigations: Vec<Fertigation>,
    #[serde(default)]
    pub manures: Vec<AppliedManure>,
    #[serde(default)]
    pub other_nutrients: Vec<OtherNutrient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_year_manure_application_n_credit: Option<f64>,
    #[serde(default)]
    pub nutrient_rows: Vec<NutrientRow>,
}

impl Field {
    pub fn new(field_name: impl Into<String>, area: f64) -> Self {
        Self {
            field_name: field_name.into(),
            area,
            previous_year_manure_application_frequency: 0,
            comment: String::new(),
            soil_test: None,
            crops: Vec::new(),
            fertilizers: Vec::new(),
            fertigations: Vec::new(),
            manures: Vec::new(),
            other_nutrients: Vec::new(),
            previous_year_manure_application_n_credit: None,
            nutrient_rows: Vec::new(),
        }
    }

    /// Manure application history of the first crop, used to index nitrogen credits
    pub fn manure_application_history(&self) -> u32 {
        self.crops
            .first()
            .and_then(|c| c.manure_application_history)
            .unwrap_or(0)
    }
}

/// Agronomic requirement (`req*`) and crop removal (`rem*`) values, lb/ac
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BalanceValues {
    #[serde(default)]
    pub req_n: f64,
    #[serde(default)]
    pub req_p2o5: f64,
    #[serde(default)]
    pub req_k2o: f64,
    #[serde(default)]
    pub rem_n: f64,
    #[serde(default)]
    pub rem_p2o5: f64,
    #[serde(default)]
    pub rem_k2o: f64,
}

impl BalanceValues {
    pub fn required(&self) -> NutrientTotals {
        NutrientTotals::new(self.req_n, self.req_p2o5, self.req_k2o)
    }

    pub fn removal(&self) -> NutrientTotals {
        NutrientTotals::new(self.rem_n, self.rem_p2o5, self.rem_k2o)
    }

    /// Same values for requirement and removal, as fertilizer rows store them
    pub fn from_applied(applied: NutrientTotals) -> Self {
        Self {
            req_n: applied.n,
            req_p2o5: applied.p2o5,
            req_k2o: applied.k2o,
            rem_n: applied.n,
            rem_p2o5: applied.p2o5,
            rem_k2o: applied.k2o,
        }
    }
}

/// A crop grown on the field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Crop {
    #[serde(default)]
    pub name: String,
    pub crop_id: i64,
    pub crop_type_id: i64,
    #[serde(rename = "yield", default)]
    pub crop_yield: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crude_protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_crop_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_crop_harvested: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yield_harvest_unit: Option<String>,
    #[serde(default)]
    pub n_credit: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manure_application_history: Option<u32>,
    #[serde(flatten)]
    pub balance: BalanceValues,
}

/// Soil test readings for a field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SoilTest {
    pub soil_test_id: i64,
    #[serde(rename = "valNO3H", default, skip_serializing_if = "Option::is_none")]
    pub val_no3h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val_k: Option<f64>,
    #[serde(rename = "valPH", default, skip_serializing_if = "Option::is_none")]
    pub val_ph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converted_kelowna_k: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converted_kelowna_p: Option<f64>,
    /// Month the sample was taken, as `YYYY-MM` or a full timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_date: Option<String>,
}

impl SoilTest {
    /// First day of the sampled month, from either stored date form
    pub fn sample_month(&self) -> Option<NaiveDate> {
        let raw = self.sample_date.as_deref()?.trim();
        if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
            return stamp.date_naive().with_day(1);
        }
        NaiveDate::parse_from_str(&format!("{}-01", raw.get(..7)?), "%Y-%m-%d").ok()
    }
}

/// A fertilizer application
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFertilizer {
    #[serde(default)]
    pub name: String,
    pub fertilizer_type_id: i64,
    pub fertilizer_id: i64,
    pub application_rate: f64,
    pub appl_unit_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appl_date: Option<String>,
    #[serde(default)]
    pub application_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density_unit_id: Option<i64>,
    #[serde(flatten)]
    pub balance: BalanceValues,
}

/// Outcome of the dry fertigation solubility check
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DryAction {
    Soluble,
    #[serde(rename = "Reduce the amount to dissolve")]
    ReduceAmountToDissolve,
}

impl std::fmt::Display for DryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DryAction::Soluble => write!(f, "Soluble"),
            DryAction::ReduceAmountToDissolve => write!(f, "Reduce the amount to dissolve"),
        }
    }
}

/// A fertilizer applied through irrigation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Fertigation {
    #[serde(default)]
    pub name: String,
    pub fertilizer_type_id: i64,
    pub fertilizer_id: i64,
    #[serde(default)]
    pub application_rate: f64,
    #[serde(default)]
    pub appl_unit_id: i64,
    #[serde(default)]
    pub density: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density_unit_id: Option<i64>,
    #[serde(default)]
    pub tank_volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tank_unit_id: Option<i64>,
    #[serde(default)]
    pub solubility: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solubility_unit_id: Option<i64>,
    #[serde(default)]
    pub amount_to_dissolve: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_to_dissolve_unit_id: Option<i64>,
    #[serde(default)]
    pub injection_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injection_unit_id: Option<i64>,
    #[serde(default)]
    pub events_per_season: f64,
    #[serde(default)]
    pub application_period: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub volume_for_season: f64,
    #[serde(default)]
    pub application_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_action: Option<DryAction>,
    #[serde(rename = "nutrientConcentrationN", default, skip_serializing_if = "Option::is_none")]
    pub nutrient_concentration_n: Option<f64>,
    #[serde(rename = "nutrientConcentrationP2O5", default, skip_serializing_if = "Option::is_none")]
    pub nutrient_concentration_p2o5: Option<f64>,
    #[serde(rename = "nutrientConcentrationK2O", default, skip_serializing_if = "Option::is_none")]
    pub nutrient_concentration_k2o: Option<f64>,
    #[serde(flatten)]
    pub balance: BalanceValues,
}

/// A manure application
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppliedManure {
    #[serde(default)]
    pub name: String,
    pub manure_id: i64,
    #[serde(default)]
    pub manure_name: String,
    #[serde(default)]
    pub application_id: i64,
    pub appl_unit_id: i64,
    pub application_rate: f64,
    #[serde(default)]
    pub nh4_retention: f64,
    #[serde(default)]
    pub n_available: f64,
    #[serde(default, with = "crate::types::solid_liquid_label")]
    pub solid_liquid: Option<ManureType>,
    pub source_uuid: Uuid,
    #[serde(flatten)]
    pub balance: BalanceValues,
}

/// Any other nutrient source entered by hand
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OtherNutrient {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub balance: BalanceValues,
}

/// Kind of entry contributing to a field's nutrient balance
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum NutrientRowType {
    Crop,
    Fertilizer,
    Fertigation,
    Manure,
    Other,
    PreviousYearManure,
    SoilNitrate,
}

/// A row of the field's calculate-nutrients table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NutrientRow {
    pub id: u32,
    pub row_type: NutrientRowType,
    /// Position of the source entry in its list
    pub source_index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_defaults_area_to_one_acre() {
        let field: Field = serde_json::from_str(r#"{"fieldName":"North"}"#).unwrap();
        assert_eq!(field.area, DEFAULT_FIELD_AREA);
        assert!(field.crops.is_empty());
        assert!(field.nutrient_rows.is_empty());
    }

    #[test]
    fn test_crop_flattens_balance_values() {
        let json = r#"{"cropId":1,"cropTypeId":2,"yield":4.5,"reqN":80,"remP2o5":12}"#;
        let crop: Crop = serde_json::from_str(json).unwrap();
        assert_eq!(crop.crop_yield, 4.5);
        assert_eq!(crop.balance.req_n, 80.0);
        assert_eq!(crop.balance.rem_p2o5, 12.0);

        let back = serde_json::to_value(&crop).unwrap();
        assert_eq!(back["yield"], 4.5);
        assert_eq!(back["reqN"], 80.0);
    }

    #[test]
    fn test_previous_year_manure_application_id_name() {
        let json = r#"{"fieldName":"North","previousYearManureApplicationId":2}"#;
        let field: Field = serde_json::from_str(json).unwrap();
        assert_eq!(field.previous_year_manure_application_frequency, 2);

        let back = serde_json::to_value(&field).unwrap();
        assert_eq!(back["previousYearManureApplicationId"], 2);
    }

    #[test]
    fn test_sample_month_accepts_month_and_timestamp() {
        let mut soil = SoilTest {
            sample_date: Some("2024-03".to_string()),
            ..Default::default()
        };
        assert_eq!(soil.sample_month(), NaiveDate::from_ymd_opt(2024, 3, 1));

        soil.sample_date = Some("2023-11-15T08:00:00.000Z".to_string());
        assert_eq!(soil.sample_month(), NaiveDate::from_ymd_opt(2023, 11, 1));

        soil.sample_date = Some("March".to_string());
        assert_eq!(soil.sample_month(), None);
    }

    #[test]
    fn test_applied_manure_solid_liquid_labels() {
        let uuid = Uuid::new_v4();
        let json = format!(
            r#"{{"manureId":3,"applUnitId":1,"applicationRate":10,"solidLiquid":"","sourceUuid":"{}"}}"#,
            uuid
        );
        let manure: AppliedManure = serde_json::from_str(&json).unwrap();
        assert_eq!(manure.solid_liquid, None);

        let json = json.replace(r#""solidLiquid":"""#, r#""solidLiquid":"Solid""#);
        let manure: AppliedManure = serde_json::from_str(&json).unwrap();
        assert_eq!(manure.solid_liquid, Some(ManureType::Solid));
        assert_eq!(serde_json::to_value(&manure).unwrap()["solidLiquid"], "Solid");
    }

    #[test]
    fn test_soil_test_legacy_names() {
        let json = r#"{"soilTestId":3,"valNO3H":10,"valPH":6.8}"#;
        let soil: SoilTest = serde_json::from_str(json).unwrap();
        assert_eq!(soil.val_no3h, Some(10.0));
        assert_eq!(soil.val_ph, Some(6.8));
    }

    #[test]
    fn test_dry_action_serializes_message() {
        let json = serde_json::to_string(&DryAction::ReduceAmountToDissolve).unwrap();
        assert_eq!(json, "\"Reduce the amount to dissolve\"");
    }

    #[test]
    fn test_field_validation() {
        use validator::Validate;

        assert!(Field::new("North", 12.5).validate().is_ok());
        assert!(Field::new("", 12.5).validate().is_err());
        assert!(Field::new("North", 0.0).validate().is_err());
    }
}
