use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::BookLab;
use crate::types::ManureType;

/// Nutrient analysis attached to a stored or unstored manure source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NutrientAnalysis {
    pub manure_id: i64,
    #[serde(default, with = "crate::types::solid_liquid_label")]
    pub solid_liquid: Option<ManureType>,
    /// Book values store moisture as text
    #[serde(
        rename = "Moisture",
        default,
        with = "crate::types::lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub moisture: Option<f64>,
    #[serde(rename = "N", default)]
    pub n: f64,
    #[serde(rename = "NH4N", default)]
    pub nh4n: f64,
    #[serde(rename = "P", default)]
    pub p: f64,
    #[serde(rename = "K", default)]
    pub k: f64,
    /// Storage system or manure this analysis describes
    pub source_uuid: Uuid,
    #[serde(default)]
    pub source_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_mineralization_id: Option<i64>,
    pub book_lab: BookLab,
    #[serde(rename = "UniqueMaterialName", default)]
    pub unique_material_name: String,
    #[serde(default)]
    pub manure_name: String,
    #[serde(default)]
    pub annual_amount: f64,
}
