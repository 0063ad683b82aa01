//! Manure storage systems

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{DerivedManure, GeneratedManure, ImportedManure};
use crate::types::{round_whole, ManureType};

/// U.S. gallons in one cubic foot
pub const US_GALLONS_PER_CUBIC_FOOT: f64 = 7.48052;
const FREEBOARD_FT: f64 = 1.0;
const CIRCLE_PI: f64 = 3.1428;

/// A manure held by a storage system, tagged with its source list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum ManureInSystem {
    Generated(GeneratedManure),
    Imported(ImportedManure),
    Derived(DerivedManure),
}

impl ManureInSystem {
    pub fn managed_manure_name(&self) -> &str {
        match self {
            ManureInSystem::Generated(m) => &m.managed_manure_name,
            ManureInSystem::Imported(m) => &m.managed_manure_name,
            ManureInSystem::Derived(m) => &m.managed_manure_name,
        }
    }

    pub fn uuid(&self) -> Uuid {
        match self {
            ManureInSystem::Generated(m) => m.uuid,
            ManureInSystem::Imported(m) => m.uuid,
            ManureInSystem::Derived(m) => m.uuid,
        }
    }

    pub fn annual_amount(&self) -> f64 {
        match self {
            ManureInSystem::Generated(m) => m.annual_amount,
            ManureInSystem::Imported(m) => m.annual_amount,
            ManureInSystem::Derived(m) => m.annual_amount,
        }
    }
}

/// Tank or pit geometry, feet.
///
/// Tagged on a numeric `shape`: 1 rectangular, 2 circular, 3 sloped-wall rectangular.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageShape {
    Rectangular {
        length_ft: f64,
        width_ft: f64,
        height_ft: f64,
    },
    Circular {
        diameter_ft: f64,
        height_ft: f64,
    },
    /// `slope_of_wall` is rise over run of the inner wall
    SlopedWallRectangular {
        top_length_ft: f64,
        top_width_ft: f64,
        height_ft: f64,
        slope_of_wall: f64,
    },
}

impl StorageShape {
    /// Open surface exposed to precipitation, rounded to whole square feet
    pub fn surface_area_sq_ft(&self) -> f64 {
        let area = match *self {
            StorageShape::Rectangular {
                length_ft,
                width_ft,
                ..
            } => length_ft * width_ft,
            StorageShape::Circular { diameter_ft, .. } => CIRCLE_PI * (diameter_ft / 2.0).powi(2),
            StorageShape::SlopedWallRectangular {
                top_length_ft,
                top_width_ft,
                ..
            } => top_length_ft * top_width_ft,
        };
        round_whole(area)
    }

    /// Working volume; round tanks and sloped pits keep one foot of freeboard
    pub fn volume_cubic_feet(&self) -> f64 {
        match *self {
            StorageShape::Rectangular {
                length_ft,
                width_ft,
                height_ft,
            } => length_ft * height_ft * width_ft,
            StorageShape::Circular {
                diameter_ft,
                height_ft,
            } => (height_ft - FREEBOARD_FT) * CIRCLE_PI * (diameter_ft / 2.0).powi(2),
            StorageShape::SlopedWallRectangular {
                top_length_ft,
                top_width_ft,
                height_ft,
                slope_of_wall,
            } => {
                let active_height = height_ft - FREEBOARD_FT;
                let inset = if slope_of_wall > 0.0 {
                    2.0 * height_ft / slope_of_wall
                } else {
                    0.0
                };
                let area_bottom =
                    (top_length_ft - inset).max(0.0) * (top_width_ft - inset).max(0.0);
                let area_top = top_length_ft * top_width_ft;
                active_height / 3.0 * (area_bottom + area_top + (area_bottom * area_top).sqrt())
            }
        }
    }

    /// Working volume in U.S. gallons, rounded to whole gallons
    pub fn volume_us_gallons(&self) -> f64 {
        round_whole(self.volume_cubic_feet() * US_GALLONS_PER_CUBIC_FOOT)
    }
}

impl Serialize for StorageShape {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = match *self {
            StorageShape::Rectangular {
                length_ft,
                width_ft,
                height_ft,
            } => json!({
                "shape": 1,
                "lengthFt": length_ft,
                "widthFt": width_ft,
                "heightFt": height_ft,
            }),
            StorageShape::Circular {
                diameter_ft,
                height_ft,
            } => json!({
                "shape": 2,
                "diameterFt": diameter_ft,
                "heightFt": height_ft,
            }),
            StorageShape::SlopedWallRectangular {
                top_length_ft,
                top_width_ft,
                height_ft,
                slope_of_wall,
            } => json!({
                "shape": 3,
                "topLengthFt": top_length_ft,
                "topWidthFt": top_width_ft,
                "heightFt": height_ft,
                "slopeOfWall": slope_of_wall,
            }),
        };
        value.serialize(serializer)
    }
}

fn dimension<E: serde::de::Error>(value: &Value, name: &'static str) -> Result<f64, E> {
    value
        .get(name)
        .and_then(Value::as_f64)
        .ok_or_else(|| E::missing_field(name))
}

impl<'de> Deserialize<'de> for StorageShape {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let code = match value.get("shape") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(label)) => match label.as_str() {
                "Rectangular" => Some(1),
                "Circular" => Some(2),
                "SlopedWallRectangular" => Some(3),
                _ => None,
            },
            _ => return Err(D::Error::missing_field("shape")),
        };

        match code {
            Some(1) => Ok(StorageShape::Rectangular {
                length_ft: dimension(&value, "lengthFt")?,
                width_ft: dimension(&value, "widthFt")?,
                height_ft: dimension(&value, "heightFt")?,
            }),
            Some(2) => Ok(StorageShape::Circular {
                diameter_ft: dimension(&value, "diameterFt")?,
                height_ft: dimension(&value, "heightFt")?,
            }),
            Some(3) => Ok(StorageShape::SlopedWallRectangular {
                top_length_ft: dimension(&value, "topLengthFt")?,
                top_width_ft: dimension(&value, "topWidthFt")?,
                height_ft: dimension(&value, "heightFt")?,
                slope_of_wall: dimension(&value, "slopeOfWall")?,
            }),
            _ => Err(D::Error::custom("storage shape must be 1, 2 or 3")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LiquidStorage {
    pub name: String,
    #[serde(default)]
    pub is_structure_covered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncovered_area_sq_ft: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<StorageShape>,
    #[serde(rename = "volumeUSGallons", default)]
    pub volume_us_gallons: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SolidStorage {
    pub name: String,
    #[serde(default)]
    pub is_structure_covered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncovered_area_sq_ft: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LiquidStorageSystem {
    pub name: String,
    pub uuid: Uuid,
    #[serde(default)]
    pub manures_in_system: Vec<ManureInSystem>,
    #[serde(default)]
    pub gets_runoff: bool,
    #[serde(default)]
    pub runoff_area_sq_ft: f64,
    #[serde(rename = "hasSeperation", default)]
    pub has_separation: bool,
    #[serde(rename = "percentLiquidSeperation", default)]
    pub percent_liquid_separation: f64,
    #[serde(rename = "separatedLiquidsUSGallons", default)]
    pub separated_liquids_us_gallons: f64,
    #[serde(default)]
    pub separated_solids_tons: f64,
    #[serde(default)]
    pub manure_storages: Vec<LiquidStorage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_precipitation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_annual_manure_amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SolidStorageSystem {
    pub name: String,
    pub uuid: Uuid,
    #[serde(default)]
    pub manures_in_system: Vec<ManureInSystem>,
    pub manure_storage: SolidStorage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_precipitation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_annual_manure_amount: Option<f64>,
}

/// A storage system, tagged on the numeric `manureType` of what it holds
#[derive(Debug, Clone, PartialEq)]
pub enum ManureStorageSystem {
    Liquid(LiquidStorageSystem),
    Solid(SolidStorageSystem),
}

impl Serialize for ManureStorageSystem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut value = match self {
            ManureStorageSystem::Liquid(s) => serde_json::to_value(s),
            ManureStorageSystem::Solid(s) => serde_json::to_value(s),
        }
        .map_err(S::Error::custom)?;

        let tag = Value::from(self.manure_type().code());
        if let Value::Object(map) = &mut value {
            map.insert("manureType".to_string(), tag.clone());
            // Each storage carries its system's manure type as well
            if let Some(Value::Array(storages)) = map.get_mut("manureStorages") {
                for storage in storages.iter_mut().filter_map(Value::as_object_mut) {
                    storage.insert("manureType".to_string(), tag.clone());
                }
            }
            if let Some(Value::Object(storage)) = map.get_mut("manureStorage") {
                storage.insert("manureType".to_string(), tag);
            }
        }
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ManureStorageSystem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let manure_type = value
            .get("manureType")
            .cloned()
            .ok_or_else(|| D::Error::missing_field("manureType"))?;
        let manure_type: ManureType = serde_json::from_value(manure_type).map_err(D::Error::custom)?;

        let system = match manure_type {
            ManureType::Liquid => serde_json::from_value(value).map(ManureStorageSystem::Liquid),
            ManureType::Solid => serde_json::from_value(value).map(ManureStorageSystem::Solid),
        };
        system.map_err(D::Error::custom)
    }
}

impl ManureStorageSystem {
    pub fn manure_type(&self) -> ManureType {
        match self {
            ManureStorageSystem::Liquid(_) => ManureType::Liquid,
            ManureStorageSystem::Solid(_) => ManureType::Solid,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ManureStorageSystem::Liquid(s) => &s.name,
            ManureStorageSystem::Solid(s) => &s.name,
        }
    }

    pub fn uuid(&self) -> Uuid {
        match self {
            ManureStorageSystem::Liquid(s) => s.uuid,
            ManureStorageSystem::Solid(s) => s.uuid,
        }
    }

    pub fn manures_in_system(&self) -> &[ManureInSystem] {
        match self {
            ManureStorageSystem::Liquid(s) => &s.manures_in_system,
            ManureStorageSystem::Solid(s) => &s.manures_in_system,
        }
    }

    pub fn manures_in_system_mut(&mut self) -> &mut Vec<ManureInSystem> {
        match self {
            ManureStorageSystem::Liquid(s) => &mut s.manures_in_system,
            ManureStorageSystem::Solid(s) => &mut s.manures_in_system,
        }
    }

    /// Sum of the annual amounts of every manure in the system
    pub fn total_manure_amount(&self) -> f64 {
        self.manures_in_system()
            .iter()
            .map(ManureInSystem::annual_amount)
            .sum()
    }
}
