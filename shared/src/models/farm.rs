//! Farm and plan-year models

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{
    Animal, DerivedManure, FarmManure, Field, GeneratedManure, ImportedManure,
    ManureStorageSystem, NutrientAnalysis,
};

/// The whole nutrient management plan document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NmpFile {
    #[serde(default)]
    pub farm_details: FarmDetails,
    #[serde(default)]
    pub years: Vec<NmpFileYear>,
    #[serde(default)]
    pub unsaved: bool,
    #[serde(default)]
    pub nmp_release_version: u32,
}

impl NmpFile {
    pub fn year(&self, year: &str) -> Option<&NmpFileYear> {
        self.years.iter().find(|y| y.year == year)
    }

    pub fn year_mut(&mut self, year: &str) -> Option<&mut NmpFileYear> {
        self.years.iter_mut().find(|y| y.year == year)
    }
}

/// Farm profile captured on the first page of the plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FarmDetails {
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub farm_name: String,
    #[serde(default)]
    pub farm_region: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farm_subregion: Option<i64>,
    #[serde(default)]
    pub has_animals: bool,
    #[serde(default)]
    pub has_dairy_cows: bool,
    #[serde(default)]
    pub has_beef_cows: bool,
    #[serde(default)]
    pub has_poultry: bool,
    #[serde(default)]
    pub has_mixed_livestock: bool,
    #[serde(default)]
    pub has_horticultural_crops: bool,
    #[serde(default)]
    pub has_berries: bool,
    #[serde(default)]
    pub has_vegetables: bool,
    #[serde(default)]
    pub imports_manure_compost: bool,
    /// Animal type ids the farmer keeps
    #[serde(default)]
    pub farm_animals: Vec<String>,
    #[serde(default)]
    pub user_journey: u32,
}

/// One plan year
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NmpFileYear {
    pub year: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub farm_animals: Vec<Animal>,
    #[serde(default)]
    pub farm_manures: Vec<FarmManure>,
    #[serde(default)]
    pub generated_manures: Vec<GeneratedManure>,
    #[serde(default)]
    pub imported_manures: Vec<ImportedManure>,
    #[serde(default)]
    pub derived_manures: Vec<DerivedManure>,
    #[serde(default)]
    pub manure_storage_systems: Vec<ManureStorageSystem>,
    #[serde(default)]
    pub nutrient_analyses: Vec<NutrientAnalysis>,
}

impl NmpFileYear {
    pub fn new(year: impl Into<String>) -> Self {
        Self {
            year: year.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_has_no_years() {
        let file = NmpFile::default();
        assert!(file.years.is_empty());
        assert!(file.year("2025").is_none());
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let year: NmpFileYear = serde_json::from_str(r#"{"year":"2025"}"#).unwrap();
        assert_eq!(year, NmpFileYear::new("2025"));
    }

    #[test]
    fn test_farm_details_camel_case() {
        let details = FarmDetails {
            farm_name: "Hillside".to_string(),
            has_dairy_cows: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["farmName"], "Hillside");
        assert_eq!(json["hasDairyCows"], true);
        assert!(json.get("farmSubregion").is_none());
    }
}
