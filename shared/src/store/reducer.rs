//! Document reducer: clone the state, apply one action, return the new state

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::manure_systems::{
    reassign_stored_manures, sync_after_source_change, update_derived_manures,
    update_nutrient_analyses, SourceKind,
};
use super::reconcile::reconcile_nutrient_rows;
use crate::calculations::animals::{
    calculate_annual_wash_water, liquid_manure_display, solid_manure_display,
};
use crate::error::{NmpError, NmpResult};
use crate::models::{Animal, GeneratedManure, NmpFile, NmpFileYear, MILKING_COW_ID};
use crate::types::ManureType;

/// Everything the app holds in memory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub nmp_file: NmpFile,
    #[serde(default)]
    pub show_animals_step: bool,
}

/// Apply `action` to a copy of `state`; the input state is never touched
pub fn reduce(state: &AppState, action: Action) -> NmpResult<AppState> {
    let mut next = state.clone();

    match action {
        Action::SetShowAnimalsStep { show_animals_step } => {
            next.show_animals_step = show_animals_step;
        }
        Action::OverwriteNmpFile { new_file } => {
            next.nmp_file = *new_file;
        }
        Action::ResetNmpFile => {
            next.nmp_file = NmpFile::default();
        }
        Action::SaveFarmDetails { new_farm_details } => {
            let file = &mut next.nmp_file;
            let same_year = file
                .years
                .first()
                .is_some_and(|y| y.year == new_farm_details.year);
            if !same_year {
                file.years = vec![NmpFileYear::new(new_farm_details.year.clone())];
            } else if new_farm_details.farm_animals.is_empty() {
                if let Some(year) = file.years.first_mut() {
                    save_animals(year, Vec::new());
                }
            }
            file.farm_details = new_farm_details;
        }
        Action::SaveFields { year, new_fields } => {
            let year = find_year(&mut next.nmp_file, &year)?;
            year.fields = new_fields
                .into_iter()
                .map(|mut field| {
                    let rows = std::mem::take(&mut field.nutrient_rows);
                    field.nutrient_rows = reconcile_nutrient_rows(rows, field.crops.len());
                    field
                })
                .collect();
        }
        Action::SaveFarmManure { year, new_manures } => {
            find_year(&mut next.nmp_file, &year)?.farm_manures = new_manures;
        }
        Action::SaveNutrientAnalysis {
            year,
            new_nutrient_analyses,
        } => {
            find_year(&mut next.nmp_file, &year)?.nutrient_analyses = new_nutrient_analyses;
        }
        Action::SaveImportedManure { year, new_manures } => {
            let year = find_year(&mut next.nmp_file, &year)?;
            year.imported_manures = new_manures;
            sync_after_source_change(year, SourceKind::Imported);
        }
        Action::SaveManureStorageSystems {
            year,
            new_manure_storage_systems,
        } => {
            let year = find_year(&mut next.nmp_file, &year)?;
            year.manure_storage_systems = new_manure_storage_systems;
            update_derived_manures(year);
            reassign_stored_manures(year)?;
            update_nutrient_analyses(year);
        }
        Action::SaveAnimals { year, new_animals } => {
            save_animals(find_year(&mut next.nmp_file, &year)?, new_animals);
        }
        Action::ClearAnimals { year } => {
            save_animals(find_year(&mut next.nmp_file, &year)?, Vec::new());
        }
    }

    Ok(next)
}

fn find_year<'a>(file: &'a mut NmpFile, year: &str) -> NmpResult<&'a mut NmpFileYear> {
    file.year_mut(year)
        .ok_or_else(|| NmpError::MissingYear(year.to_string()))
}

fn save_animals(year: &mut NmpFileYear, animals: Vec<Animal>) {
    year.generated_manures = animals
        .iter()
        .filter(|a| a.common().manure_data.is_some())
        .enumerate()
        .map(|(index, a)| generated_manure(index as u32, a))
        .collect();
    year.farm_animals = animals;
    sync_after_source_change(year, SourceKind::Generated);
}

/// One generated manure per animal group: solid when a solid amount is known,
/// liquid otherwise
fn generated_manure(index: u32, animal: &Animal) -> GeneratedManure {
    let data = animal.common().manure_data.clone().unwrap_or_default();
    let group = animal.group_label();

    let mut manure = GeneratedManure {
        index,
        unique_material_name: data.name.clone(),
        manure_type: ManureType::Solid,
        annual_amount: 0.0,
        annual_amount_us_gallons_volume: None,
        annual_amount_tons_weight: None,
        annual_amount_display_weight: String::new(),
        managed_manure_name: String::new(),
        assigned_to_stored_system: false,
        uuid: animal.uuid(),
        original_annual_amount: None,
        original_wash_water_amount: None,
    };

    if let Some(tons) = data.annual_solid_manure {
        manure.annual_amount = tons;
        manure.annual_amount_tons_weight = Some(tons);
        manure.annual_amount_display_weight = solid_manure_display(tons);
        manure.managed_manure_name = format!("{}, {}, Solid", data.name, group);
        return manure;
    }

    let gallons = data.annual_liquid_manure.unwrap_or(0.0);
    manure.manure_type = ManureType::Liquid;
    manure.annual_amount = gallons;
    manure.managed_manure_name = format!("{}, {}, Liquid", data.name, group);

    if let Animal::DairyCattle(dairy) = animal {
        let milking = dairy.common.subtype.as_deref() == Some(MILKING_COW_ID);
        if let (true, Some(wash_water), Some(unit)) =
            (milking, dairy.wash_water, dairy.wash_water_unit)
        {
            let animals = f64::from(dairy.common.animals_per_farm.unwrap_or(0));
            let wash = calculate_annual_wash_water(wash_water, unit, animals);
            manure.original_annual_amount = Some(gallons);
            manure.original_wash_water_amount = Some(wash);
            manure.annual_amount = gallons + wash;
        }
    }

    manure.annual_amount_us_gallons_volume = Some(manure.annual_amount);
    manure.annual_amount_display_weight = liquid_manure_display(manure.annual_amount);
    manure
}
