//! Manure source models: generated on-farm, imported, derived by separation, and
//! the farm manure list used for field applications

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ManureType;

/// Manure produced by the farm's animals
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedManure {
    /// Position in emission order
    #[serde(default)]
    pub index: u32,
    pub unique_material_name: String,
    pub manure_type: ManureType,
    pub annual_amount: f64,
    #[serde(rename = "annualAmountUSGallonsVolume", default, skip_serializing_if = "Option::is_none")]
    pub annual_amount_us_gallons_volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_amount_tons_weight: Option<f64>,
    #[serde(default)]
    pub annual_amount_display_weight: String,
    pub managed_manure_name: String,
    #[serde(default)]
    pub assigned_to_stored_system: bool,
    /// Same as the source animal's uuid
    pub uuid: Uuid,
    /// Milking cows only: manure before wash water was added
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_annual_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_wash_water_amount: Option<f64>,
}

/// Manure brought onto the farm
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportedManure {
    pub unique_material_name: String,
    pub manure_type: ManureType,
    pub annual_amount: f64,
    #[serde(rename = "annualAmountUSGallonsVolume", default, skip_serializing_if = "Option::is_none")]
    pub annual_amount_us_gallons_volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_amount_cubic_yards_volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_amount_cubic_meters_volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_amount_tons_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_amount_display_volume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_amount_display_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moisture: Option<f64>,
    #[serde(default)]
    pub assigned_to_stored_system: bool,
    pub managed_manure_name: String,
    pub uuid: Uuid,
}

/// Separated solids produced by a liquid storage system
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DerivedManure {
    pub unique_material_name: String,
    pub managed_manure_name: String,
    pub manure_type: ManureType,
    pub annual_amount: f64,
    pub annual_amount_tons_weight: f64,
    #[serde(default)]
    pub assigned_to_stored_system: bool,
    pub uuid: Uuid,
    /// Storage system the solids were separated from
    pub origin_uuid: Uuid,
}

/// Where a farm manure's nutrient values come from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookLab {
    #[serde(rename = "book")]
    Book,
    #[serde(rename = "lab")]
    Lab,
}

/// Nutrient content of a manure, per ton or per 1000 U.S. gallons
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ManureNutrients {
    #[serde(rename = "DMid", default)]
    pub dm_id: i64,
    #[serde(rename = "Moisture", default)]
    pub moisture: f64,
    #[serde(rename = "N", default)]
    pub n: f64,
    #[serde(rename = "NH4N", default)]
    pub nh4n: f64,
    #[serde(rename = "P2O5", default)]
    pub p2o5: f64,
    #[serde(rename = "K2O", default)]
    pub k2o: f64,
}

/// A manure available for field application
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FarmManure {
    pub manure_source: String,
    pub material_type: String,
    pub book_lab: BookLab,
    pub unique_material_name: String,
    pub nutrients: ManureNutrients,
}
