//! Common types used across the document model and calculations

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::{Add, AddAssign};

/// Nitrogen, phosphate and potash amounts (lb/ac unless stated otherwise)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct NutrientTotals {
    #[serde(rename = "N")]
    pub n: f64,
    #[serde(rename = "P2O5")]
    pub p2o5: f64,
    #[serde(rename = "K2O")]
    pub k2o: f64,
}

impl NutrientTotals {
    pub fn new(n: f64, p2o5: f64, k2o: f64) -> Self {
        Self { n, p2o5, k2o }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Per-nutrient `max(self - available, 0)`; never negative
    pub fn saturating_deficit(&self, available: &NutrientTotals) -> NutrientTotals {
        NutrientTotals {
            n: (self.n - available.n).max(0.0),
            p2o5: (self.p2o5 - available.p2o5).max(0.0),
            k2o: (self.k2o - available.k2o).max(0.0),
        }
    }
}

impl Add for NutrientTotals {
    type Output = NutrientTotals;

    fn add(self, rhs: NutrientTotals) -> NutrientTotals {
        NutrientTotals {
            n: self.n + rhs.n,
            p2o5: self.p2o5 + rhs.p2o5,
            k2o: self.k2o + rhs.k2o,
        }
    }
}

impl AddAssign for NutrientTotals {
    fn add_assign(&mut self, rhs: NutrientTotals) {
        *self = *self + rhs;
    }
}

/// Physical form of a manure or storage system.
///
/// Stored in `.nmp` files as a numeric code: 1 is liquid, 2 is solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManureType {
    Liquid,
    Solid,
}

impl ManureType {
    pub fn code(&self) -> u8 {
        match self {
            ManureType::Liquid => 1,
            ManureType::Solid => 2,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(ManureType::Liquid),
            2 => Some(ManureType::Solid),
            _ => None,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "liquid" => Some(ManureType::Liquid),
            "solid" => Some(ManureType::Solid),
            _ => None,
        }
    }
}

/// Wire forms accepted for a manure type: the numeric code, or its name
#[derive(Deserialize)]
#[serde(untagged)]
enum ManureTypeRepr {
    Code(u64),
    Label(String),
}

impl Serialize for ManureType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for ManureType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parsed = match ManureTypeRepr::deserialize(deserializer)? {
            ManureTypeRepr::Code(code) => ManureType::from_code(code),
            ManureTypeRepr::Label(label) => ManureType::from_label(&label),
        };
        parsed.ok_or_else(|| D::Error::custom("manure type must be 1 (Liquid) or 2 (Solid)"))
    }
}

/// Serde adapter for `solidLiquid` fields, written as `"Solid"`, `"Liquid"` or `""`
pub mod solid_liquid_label {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::ManureType;

    pub fn serialize<S: Serializer>(value: &Option<ManureType>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(manure_type) => serializer.serialize_str(&manure_type.to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<ManureType>, D::Error> {
        let label = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        if label.is_empty() {
            return Ok(None);
        }
        ManureType::from_label(&label)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown solid/liquid label {:?}", label)))
    }
}

impl std::fmt::Display for ManureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManureType::Liquid => write!(f, "Liquid"),
            ManureType::Solid => write!(f, "Solid"),
        }
    }
}

/// Whether a fertilizer product is applied dry or as a liquid
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DryLiquid {
    Dry,
    Liquid,
}

/// Serde adapter for optional numbers that may be stored as text, e.g. book moisture `"75"`
pub mod lenient_number {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        match Option::<NumberOrText>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumberOrText::Number(n)) => Ok(Some(n)),
            Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(None),
            Some(NumberOrText::Text(text)) => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("expected a number, got {:?}", text))),
        }
    }
}

/// Round half toward positive infinity at `decimals` places.
///
/// Matches `Math.round(value * 10^d) / 10^d`, which the stored documents were
/// produced with, so results stay bit-for-bit comparable.
pub fn round_half_up(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor + 0.5).floor() / factor
}

/// Round half up to a whole number
pub fn round_whole(value: f64) -> f64 {
    (value + 0.5).floor()
}
