//! Annual manure production by livestock

use crate::catalog::{AnimalSubtype, Breed};
use crate::error::{NmpError, NmpResult};
use crate::models::{Animal, DairyCattle, ManureData, WashWaterUnit, MILKING_COW_ID};
use crate::types::{round_whole, ManureType};

pub const DEFAULT_COLLECTION_DAYS: f64 = 365.0;
pub const LB_PER_US_TON: f64 = 2000.0;

fn collection_days(days: Option<f64>) -> NmpResult<f64> {
    let days = days.unwrap_or(DEFAULT_COLLECTION_DAYS);
    if !(0.0..=365.0).contains(&days) {
        return Err(NmpError::InvalidCollectionDays(days));
    }
    Ok(days)
}

// A zero coefficient counts as absent
fn coefficient_or_one(coefficient: Option<f64>) -> f64 {
    coefficient.filter(|c| *c != 0.0).unwrap_or(1.0)
}

/// Tons of solid manure per year
pub fn calculate_annual_solid_manure(
    pounds_per_animal_per_day: f64,
    animals: f64,
    days_collected: Option<f64>,
    coefficient: Option<f64>,
) -> NmpResult<f64> {
    let days = collection_days(days_collected)?;
    Ok(pounds_per_animal_per_day * animals * days * coefficient_or_one(coefficient) / LB_PER_US_TON)
}

/// U.S. gallons of liquid manure per year
pub fn calculate_annual_liquid_manure(
    gallons_per_animal_per_day: f64,
    animals: f64,
    days_collected: Option<f64>,
    coefficient: Option<f64>,
) -> NmpResult<f64> {
    let days = collection_days(days_collected)?;
    Ok(gallons_per_animal_per_day * animals * days * coefficient_or_one(coefficient))
}

/// Tons per year from `flocks_per_year` flocks of `birds_per_flock` birds
pub fn calculate_poultry_annual_solid_manure(
    pounds_per_bird_per_day: f64,
    birds_per_flock: f64,
    flocks_per_year: f64,
    days_per_flock: f64,
) -> NmpResult<f64> {
    let days = collection_days(Some(days_per_flock))?;
    Ok(pounds_per_bird_per_day * birds_per_flock * flocks_per_year * days / LB_PER_US_TON)
}

pub fn calculate_poultry_annual_liquid_manure(
    gallons_per_bird_per_day: f64,
    birds_per_flock: f64,
    flocks_per_year: f64,
    days_per_flock: f64,
) -> NmpResult<f64> {
    let days = collection_days(Some(days_per_flock))?;
    Ok(gallons_per_bird_per_day * birds_per_flock * flocks_per_year * days)
}

/// Breed manure factor, scaled for milking cows by actual over expected milk production.
///
/// Milk production within 1 lb of expected counts as exactly expected.
pub fn dairy_extra_coefficient(
    subtype: &AnimalSubtype,
    breed: &Breed,
    is_milking_cow: bool,
    milk_production: Option<f64>,
) -> f64 {
    if !is_milking_cow {
        return breed.breed_manure_factor;
    }
    let Some(milk) = milk_production else {
        return 0.0;
    };
    let expected = subtype.milk_production * breed.breed_manure_factor;
    let ratio = if (expected - milk).abs() < 1.0 {
        1.0
    } else {
        milk / expected
    };
    breed.breed_manure_factor * ratio
}

/// Default milk production for a milking cow of the given breed
pub fn expected_milk_production(milking_cow: &AnimalSubtype, breed: &Breed) -> f64 {
    milking_cow.milk_production * breed.breed_manure_factor
}

/// Milking centre wash water, U.S. gallons per year
pub fn calculate_annual_wash_water(wash_water: f64, unit: WashWaterUnit, animals: f64) -> f64 {
    let multiplier = match unit {
        WashWaterUnit::PerDayPerAnimal => animals,
        WashWaterUnit::PerDay => 1.0,
    };
    wash_water * 365.0 * multiplier
}

pub fn solid_manure_display(tons: f64) -> String {
    let rounded = round_whole(tons);
    if rounded == 1.0 {
        format!("{} ton", rounded)
    } else {
        format!("{} tons", rounded)
    }
}

pub fn liquid_manure_display(us_gallons: f64) -> String {
    let rounded = round_whole(us_gallons);
    if rounded == 1.0 {
        format!("{} U.S. gallon", rounded)
    } else {
        format!("{} U.S. gallons", rounded)
    }
}

fn find_subtype<'a>(subtypes: &'a [AnimalSubtype], id: &str) -> NmpResult<&'a AnimalSubtype> {
    subtypes
        .iter()
        .find(|s| s.id.to_string() == id)
        .ok_or_else(|| NmpError::MissingReference {
            kind: "subtype",
            id: id.to_string(),
        })
}

fn find_breed<'a>(breeds: &'a [Breed], id: &str) -> NmpResult<&'a Breed> {
    breeds
        .iter()
        .find(|b| b.id.to_string() == id)
        .ok_or_else(|| NmpError::MissingReference {
            kind: "breed",
            id: id.to_string(),
        })
}

fn manure_data(
    name: &str,
    manure_type: ManureType,
    solid: impl FnOnce() -> NmpResult<f64>,
    liquid: impl FnOnce() -> NmpResult<f64>,
) -> NmpResult<ManureData> {
    let (annual_solid_manure, annual_liquid_manure) = match manure_type {
        ManureType::Solid => (Some(solid()?), None),
        ManureType::Liquid => (None, Some(liquid()?)),
    };
    Ok(ManureData {
        name: name.to_string(),
        annual_solid_manure,
        annual_liquid_manure,
    })
}

/// Compute the annual manure for an animal group from the catalog coefficients.
///
/// Returns `Ok(None)` while the group is still missing a subtype; a subtype or breed id
/// absent from the catalog is an error.
pub fn compute_manure_data(
    animal: &Animal,
    subtypes: &[AnimalSubtype],
    breeds: &[Breed],
) -> NmpResult<Option<ManureData>> {
    let common = animal.common();
    let Some(subtype_id) = common.subtype.as_deref() else {
        return Ok(None);
    };
    let subtype = find_subtype(subtypes, subtype_id)?;
    let animals = f64::from(common.animals_per_farm.unwrap_or(0));

    let data = match animal {
        // Beef and other livestock are always handled as solid manure
        Animal::BeefCattle(_) | Animal::Other(_) => manure_data(
            &subtype.name,
            ManureType::Solid,
            || {
                calculate_annual_solid_manure(
                    subtype.solid_per_pound_per_animal_per_day,
                    animals,
                    common.days_collected,
                    None,
                )
            },
            || Ok(0.0),
        )?,
        Animal::DairyCattle(dairy) => dairy_manure_data(dairy, subtype, breeds, animals)?,
        Animal::Poultry(poultry) => {
            let birds = f64::from(poultry.birds_per_flock.unwrap_or(0));
            let flocks = f64::from(poultry.flocks_per_year.unwrap_or(0));
            let days = poultry.days_per_flock.unwrap_or(0.0);
            manure_data(
                &subtype.name,
                common.manure_type.unwrap_or(ManureType::Solid),
                || {
                    calculate_poultry_annual_solid_manure(
                        subtype.solid_per_pound_per_animal_per_day,
                        birds,
                        flocks,
                        days,
                    )
                },
                || {
                    calculate_poultry_annual_liquid_manure(
                        subtype.liquid_per_gal_per_animal_per_day,
                        birds,
                        flocks,
                        days,
                    )
                },
            )?
        }
    };
    Ok(Some(data))
}

fn dairy_manure_data(
    dairy: &DairyCattle,
    subtype: &AnimalSubtype,
    breeds: &[Breed],
    animals: f64,
) -> NmpResult<ManureData> {
    let breed_id = dairy.breed.as_deref().unwrap_or("1");
    let breed = find_breed(breeds, breed_id)?;
    let is_milking_cow = dairy.common.subtype.as_deref() == Some(MILKING_COW_ID);
    let coefficient = dairy_extra_coefficient(subtype, breed, is_milking_cow, dairy.milk_production);
    let non_grazing_days = Some(DEFAULT_COLLECTION_DAYS - dairy.grazing_days_per_year);

    manure_data(
        &subtype.name,
        dairy.common.manure_type.unwrap_or(ManureType::Liquid),
        || {
            calculate_annual_solid_manure(
                subtype.solid_per_pound_per_animal_per_day,
                animals,
                non_grazing_days,
                Some(coefficient),
            )
        },
        || {
            calculate_annual_liquid_manure(
                subtype.liquid_per_gal_per_animal_per_day,
                animals,
                non_grazing_days,
                Some(coefficient),
            )
        },
    )
}
