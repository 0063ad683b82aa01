//! Livestock models

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

use crate::types::ManureType;

pub const BEEF_COW_ID: &str = "1";
pub const DAIRY_COW_ID: &str = "2";
pub const POULTRY_ID: &str = "6";
/// Dairy subtype whose manure depends on milk production
pub const MILKING_COW_ID: &str = "9";

/// Annual manure produced by an animal group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ManureData {
    pub name: String,
    /// Tons per year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_solid_manure: Option<f64>,
    /// U.S. gallons per year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_liquid_manure: Option<f64>,
}

/// Fields every animal group carries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnimalCommon {
    pub uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animals_per_farm: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_collected: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manure_type: Option<ManureType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manure_data: Option<ManureData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl AnimalCommon {
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            subtype: None,
            animals_per_farm: None,
            days_collected: None,
            manure_type: None,
            manure_data: None,
            date: None,
        }
    }
}

impl Default for AnimalCommon {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BeefCattle {
    #[serde(flatten)]
    pub common: AnimalCommon,
}

/// Unit of the dairy wash water amount
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WashWaterUnit {
    PerDayPerAnimal,
    PerDay,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DairyCattle {
    #[serde(flatten)]
    pub common: AnimalCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default)]
    pub grazing_days_per_year: f64,
    /// Lb per cow per day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milk_production: Option<f64>,
    /// U.S. gallons per day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wash_water: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wash_water_unit: Option<WashWaterUnit>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Poultry {
    #[serde(flatten)]
    pub common: AnimalCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birds_per_flock: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flocks_per_year: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_per_flock: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OtherAnimal {
    #[serde(rename = "animalId")]
    pub other_id: String,
    #[serde(flatten)]
    pub common: AnimalCommon,
}

/// An animal group on the farm, keyed by its catalog animal id
#[derive(Debug, Clone, PartialEq)]
pub enum Animal {
    BeefCattle(BeefCattle),
    DairyCattle(DairyCattle),
    Poultry(Poultry),
    Other(OtherAnimal),
}

impl Animal {
    pub fn animal_id(&self) -> &str {
        match self {
            Animal::BeefCattle(_) => BEEF_COW_ID,
            Animal::DairyCattle(_) => DAIRY_COW_ID,
            Animal::Poultry(_) => POULTRY_ID,
            Animal::Other(a) => &a.other_id,
        }
    }

    pub fn common(&self) -> &AnimalCommon {
        match self {
            Animal::BeefCattle(a) => &a.common,
            Animal::DairyCattle(a) => &a.common,
            Animal::Poultry(a) => &a.common,
            Animal::Other(a) => &a.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut AnimalCommon {
        match self {
            Animal::BeefCattle(a) => &mut a.common,
            Animal::DairyCattle(a) => &mut a.common,
            Animal::Poultry(a) => &mut a.common,
            Animal::Other(a) => &mut a.common,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.common().uuid
    }

    /// Head count for livestock, flock count for poultry
    pub fn group_count(&self) -> u32 {
        match self {
            Animal::Poultry(p) => p.flocks_per_year.unwrap_or(0),
            other => other.common().animals_per_farm.unwrap_or(0),
        }
    }

    /// "3 animals", "1 flock"
    pub fn group_label(&self) -> String {
        let count = self.group_count();
        let noun = match self {
            Animal::Poultry(_) => "flock",
            _ => "animal",
        };
        if count == 1 {
            format!("{} {}", count, noun)
        } else {
            format!("{} {}s", count, noun)
        }
    }
}

impl Serialize for Animal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut value = match self {
            Animal::BeefCattle(a) => serde_json::to_value(a),
            Animal::DairyCattle(a) => serde_json::to_value(a),
            Animal::Poultry(a) => serde_json::to_value(a),
            Animal::Other(a) => serde_json::to_value(a),
        }
        .map_err(S::Error::custom)?;

        if let Value::Object(map) = &mut value {
            map.insert("animalId".to_string(), Value::from(self.animal_id()));
        }
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Animal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let animal_id = value
            .get("animalId")
            .and_then(Value::as_str)
            .ok_or_else(|| D::Error::missing_field("animalId"))?
            .to_string();

        let animal = match animal_id.as_str() {
            BEEF_COW_ID => serde_json::from_value(value).map(Animal::BeefCattle),
            DAIRY_COW_ID => serde_json::from_value(value).map(Animal::DairyCattle),
            POULTRY_ID => serde_json::from_value(value).map(Animal::Poultry),
            _ => serde_json::from_value(value).map(Animal::Other),
        };
        animal.map_err(D::Error::custom)
    }
}
