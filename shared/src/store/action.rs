//! Commands accepted by the document reducer

use serde::{Deserialize, Serialize};

use crate::models::{
    Animal, FarmDetails, FarmManure, Field, ImportedManure, ManureStorageSystem, NmpFile,
    NutrientAnalysis,
};

/// Every change to the plan goes through one of these
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    #[serde(rename_all = "camelCase")]
    SetShowAnimalsStep { show_animals_step: bool },
    #[serde(rename_all = "camelCase")]
    SaveFarmDetails { new_farm_details: FarmDetails },
    #[serde(rename_all = "camelCase")]
    SaveFields { year: String, new_fields: Vec<Field> },
    #[serde(rename_all = "camelCase")]
    SaveFarmManure {
        year: String,
        new_manures: Vec<FarmManure>,
    },
    #[serde(rename_all = "camelCase")]
    SaveImportedManure {
        year: String,
        new_manures: Vec<ImportedManure>,
    },
    #[serde(rename_all = "camelCase")]
    SaveNutrientAnalysis {
        year: String,
        new_nutrient_analyses: Vec<NutrientAnalysis>,
    },
    #[serde(rename_all = "camelCase")]
    SaveManureStorageSystems {
        year: String,
        new_manure_storage_systems: Vec<ManureStorageSystem>,
    },
    #[serde(rename_all = "camelCase")]
    SaveAnimals { year: String, new_animals: Vec<Animal> },
    #[serde(rename_all = "camelCase")]
    ClearAnimals { year: String },
    #[serde(rename = "OVERWRITE_NMPFILE", rename_all = "camelCase")]
    OverwriteNmpFile { new_file: Box<NmpFile> },
    #[serde(rename = "RESET_NMPFILE")]
    ResetNmpFile,
}

impl Action {
    /// Whether the action changes the plan document and must be persisted
    pub fn mutates_document(&self) -> bool {
        !matches!(self, Action::SetShowAnimalsStep { .. })
    }

    /// Wire name, for logging
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetShowAnimalsStep { .. } => "SET_SHOW_ANIMALS_STEP",
            Action::SaveFarmDetails { .. } => "SAVE_FARM_DETAILS",
            Action::SaveFields { .. } => "SAVE_FIELDS",
            Action::SaveFarmManure { .. } => "SAVE_FARM_MANURE",
            Action::SaveImportedManure { .. } => "SAVE_IMPORTED_MANURE",
            Action::SaveNutrientAnalysis { .. } => "SAVE_NUTRIENT_ANALYSIS",
            Action::SaveManureStorageSystems { .. } => "SAVE_MANURE_STORAGE_SYSTEMS",
            Action::SaveAnimals { .. } => "SAVE_ANIMALS",
            Action::ClearAnimals { .. } => "CLEAR_ANIMALS",
            Action::OverwriteNmpFile { .. } => "OVERWRITE_NMPFILE",
            Action::ResetNmpFile => "RESET_NMPFILE",
        }
    }

    /// Plan year the action targets, if any
    pub fn year(&self) -> Option<&str> {
        match self {
            Action::SaveFields { year, .. }
            | Action::SaveFarmManure { year, .. }
            | Action::SaveImportedManure { year, .. }
            | Action::SaveNutrientAnalysis { year, .. }
            | Action::SaveManureStorageSystems { year, .. }
            | Action::SaveAnimals { year, .. }
            | Action::ClearAnimals { year } => Some(year),
            _ => None,
        }
    }
}
