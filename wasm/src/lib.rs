//! WebAssembly bindings for the Nutrient Management Plan core
//!
//! Exposes the calculation library and a localStorage-backed plan store to the
//! browser. Structured arguments and results cross the boundary as JSON strings.

use std::io;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::prelude::*;

use nmp_shared::calculations::animals::{
    calculate_annual_liquid_manure, calculate_annual_solid_manure,
};
use nmp_shared::calculations::balance::field_nutrient_balance;
use nmp_shared::calculations::crops::{crop_balance_values, SoilTestTables};
use nmp_shared::calculations::fertigation::{
    calculate_liquid_fertigation, calculate_solid_fertigation, DryFertigationInput,
};
use nmp_shared::calculations::manure::manure_nutrient_inputs;
use nmp_shared::calculations::previous_manure::calc_prev_year_manure_appl_default;
use nmp_shared::calculations::soil_test::soil_test_calculation;
use nmp_shared::calculations::units;
use nmp_shared::catalog::{
    CropCatalogEntry, CropConversionFactors, CropSoilTestRegion, DensityUnit, FertilizerUnit,
    InjectionUnit, KelownaRange, ManureCatalogEntry, ManureUnit, NMineralization,
    PreviousYearManureApplication, SoilTestMethod, SoilTestRecommendation,
};
use nmp_shared::store::{Action, DurableStorage, Store};
use nmp_shared::{
    AppliedManure, Crop, Field, NmpError, NmpResult, NutrientAnalysis, NutrientTotals, SoilTest,
};

// ============================================================================
// Logging
// ============================================================================

/// Buffers one formatted event and sends it to `console.log` when dropped
pub struct ConsoleWriter(Vec<u8>);

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.0);
        let line = line.trim_end();
        if !line.is_empty() {
            web_sys::console::log_1(&JsValue::from_str(line));
        }
    }
}

struct Console;

impl<'a> MakeWriter<'a> for Console {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter(Vec::new())
    }
}

/// Route `tracing` output to the browser console
#[wasm_bindgen(start)]
pub fn init() {
    // No clock on wasm32-unknown-unknown, so no timestamps
    let _ = tracing_subscriber::fmt()
        .with_writer(Console)
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::INFO)
        .try_init();
}

// ============================================================================
// Helpers
// ============================================================================

fn parse<T: DeserializeOwned>(json: &str, what: &str) -> Result<T, JsValue> {
    serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid {} JSON: {}", what, e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_error(e: NmpError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// ============================================================================
// Unit conversions
// ============================================================================

// Unit codes are `u32`, a plain JS number

#[wasm_bindgen(js_name = fertilizerUnitImpGallonConversion)]
pub fn fertilizer_unit_imp_gallon_conversion(unit_id: u32) -> f64 {
    units::fertilizer_unit_imp_gallon_conversion(i64::from(unit_id)).into_value()
}

#[wasm_bindgen(js_name = dissolveAmountToLb)]
pub fn dissolve_amount_to_lb(amount: f64, unit_id: u32) -> f64 {
    units::dissolve_amount_to_lb(amount, i64::from(unit_id)).into_value()
}

#[wasm_bindgen(js_name = tankVolumeToImpGal)]
pub fn tank_volume_to_imp_gal(volume: f64, unit_id: u32) -> f64 {
    units::tank_volume_to_imp_gal(volume, i64::from(unit_id)).into_value()
}

#[wasm_bindgen(js_name = injectionRateToImpGalPerMin)]
pub fn injection_rate_to_imp_gal_per_min(rate: f64, unit_id: u32) -> f64 {
    units::injection_rate_to_imp_gal_per_min(rate, i64::from(unit_id)).into_value()
}

// ============================================================================
// Calculations
// ============================================================================

/// Arguments for one liquid fertigation product
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidFertigationRequest {
    pub application_rate: f64,
    pub application_unit: FertilizerUnit,
    pub area_acres: f64,
    pub applications_per_season: f64,
    pub injection_rate: f64,
    pub injection_unit: InjectionUnit,
    pub density: f64,
    pub density_unit: DensityUnit,
    pub nutrient_percent: NutrientTotals,
}

#[wasm_bindgen(js_name = calculateLiquidFertigation)]
pub fn liquid_fertigation(request_json: &str) -> Result<String, JsValue> {
    let r: LiquidFertigationRequest = parse(request_json, "liquid fertigation")?;
    to_json(&calculate_liquid_fertigation(
        r.application_rate,
        &r.application_unit,
        r.area_acres,
        r.applications_per_season,
        r.injection_rate,
        &r.injection_unit,
        r.density,
        &r.density_unit,
        r.nutrient_percent,
    ))
}

#[wasm_bindgen(js_name = calculateSolidFertigation)]
pub fn solid_fertigation(input_json: &str) -> Result<String, JsValue> {
    let input: DryFertigationInput = parse(input_json, "dry fertigation")?;
    to_json(&calculate_solid_fertigation(&input))
}

/// Tons per year; `days_collected` defaults to a full year
#[wasm_bindgen(js_name = calculateAnnualSolidManure)]
pub fn annual_solid_manure(
    pounds_per_animal_per_day: f64,
    animals: f64,
    days_collected: Option<f64>,
) -> Result<f64, JsValue> {
    calculate_annual_solid_manure(pounds_per_animal_per_day, animals, days_collected, None)
        .map_err(js_error)
}

/// U.S. gallons per year
#[wasm_bindgen(js_name = calculateAnnualLiquidManure)]
pub fn annual_liquid_manure(
    gallons_per_animal_per_day: f64,
    animals: f64,
    days_collected: Option<f64>,
) -> Result<f64, JsValue> {
    calculate_annual_liquid_manure(gallons_per_animal_per_day, animals, days_collected, None)
        .map_err(js_error)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilTestRequest {
    pub methods: Vec<SoilTestMethod>,
    pub method_id: i64,
    pub soil_test: SoilTest,
}

#[wasm_bindgen(js_name = soilTestCalculation)]
pub fn soil_test(request_json: &str) -> Result<String, JsValue> {
    let r: SoilTestRequest = parse(request_json, "soil test")?;
    let values = soil_test_calculation(&r.methods, r.method_id, &r.soil_test).map_err(js_error)?;
    to_json(&values)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrevYearManureRequest {
    pub frequency: u32,
    pub manure_application_history: u32,
    pub applications: Vec<PreviousYearManureApplication>,
}

/// Default nitrogen credit in lb/ac; 0 when the catalog rows are unusable
#[wasm_bindgen(js_name = calcPrevYearManureApplDefault)]
pub fn prev_year_manure_default(request_json: &str) -> Result<f64, JsValue> {
    let r: PrevYearManureRequest = parse(request_json, "previous year manure")?;
    Ok(calc_prev_year_manure_appl_default(
        r.frequency,
        r.manure_application_history,
        &r.applications,
    )
    .into_value())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRequest {
    pub field: Field,
    #[serde(default)]
    pub fertilizer: Option<NutrientTotals>,
}

#[wasm_bindgen(js_name = fieldNutrientBalance)]
pub fn field_balance(request_json: &str) -> Result<String, JsValue> {
    let r: BalanceRequest = parse(request_json, "balance")?;
    to_json(&field_nutrient_balance(&r.field, r.fertilizer))
}

/// Catalog rows for one nutrient's soil test lookup
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilTestTablesRequest {
    pub region: CropSoilTestRegion,
    pub ranges: Vec<KelownaRange>,
    pub recommendations: Vec<SoilTestRecommendation>,
}

impl SoilTestTablesRequest {
    fn tables(&self) -> SoilTestTables<'_> {
        SoilTestTables {
            region: &self.region,
            ranges: &self.ranges,
            recommendations: &self.recommendations,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropNutrientsRequest {
    pub crop: Crop,
    pub entry: CropCatalogEntry,
    #[serde(default)]
    pub soil_test: Option<SoilTest>,
    pub phosphorous: SoilTestTablesRequest,
    pub potassium: SoilTestTablesRequest,
    pub factors: CropConversionFactors,
}

#[wasm_bindgen(js_name = cropNutrients)]
pub fn crop_nutrients(request_json: &str) -> Result<String, JsValue> {
    let r: CropNutrientsRequest = parse(request_json, "crop")?;
    let values = crop_balance_values(
        &r.crop,
        &r.entry,
        r.soil_test.as_ref(),
        &r.phosphorous.tables(),
        &r.potassium.tables(),
        &r.factors,
    )
    .map_err(js_error)?;
    to_json(&values)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManureInputsRequest {
    pub analysis: NutrientAnalysis,
    pub application: AppliedManure,
    pub unit: ManureUnit,
    #[serde(default)]
    pub book_manure: Option<ManureCatalogEntry>,
    pub factors: CropConversionFactors,
    #[serde(default)]
    pub mineralization: Option<NMineralization>,
}

#[wasm_bindgen(js_name = manureNutrientInputs)]
pub fn manure_inputs(request_json: &str) -> Result<String, JsValue> {
    let r: ManureInputsRequest = parse(request_json, "manure inputs")?;
    let inputs = manure_nutrient_inputs(
        &r.analysis,
        &r.application,
        &r.unit,
        r.book_manure.as_ref(),
        &r.factors,
        r.mineralization.as_ref(),
    )
    .map_err(js_error)?;
    to_json(&inputs)
}

// ============================================================================
// Plan store
// ============================================================================

/// `window.localStorage`
pub struct LocalStorage(web_sys::Storage);

impl LocalStorage {
    pub fn open() -> NmpResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| NmpError::Storage("no window".to_string()))?;
        window
            .local_storage()
            .map_err(|_| NmpError::Storage("localStorage is not accessible".to_string()))?
            .map(LocalStorage)
            .ok_or_else(|| NmpError::Storage("localStorage is unavailable".to_string()))
    }
}

impl DurableStorage for LocalStorage {
    fn read(&self, key: &str) -> NmpResult<Option<String>> {
        self.0
            .get_item(key)
            .map_err(|_| NmpError::Storage(format!("cannot read {}", key)))
    }

    fn write(&self, key: &str, value: &str) -> NmpResult<()> {
        // Throws when the origin's quota is exceeded
        self.0
            .set_item(key, value)
            .map_err(|_| NmpError::Storage(format!("cannot write {}", key)))
    }
}

/// The plan document for the page, saved to localStorage after every change
#[wasm_bindgen]
pub struct BrowserStore {
    inner: Store<LocalStorage>,
}

#[wasm_bindgen]
impl BrowserStore {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<BrowserStore, JsValue> {
        let storage = LocalStorage::open().map_err(js_error)?;
        Ok(BrowserStore {
            inner: Store::load(storage),
        })
    }

    /// Apply an action given as JSON. Returns whether the new state was saved.
    pub fn dispatch(&mut self, action_json: &str) -> Result<bool, JsValue> {
        let action: Action = parse(action_json, "action")?;
        let outcome = self.inner.dispatch(action).map_err(js_error)?;
        Ok(outcome.persisted)
    }

    #[wasm_bindgen(js_name = stateJson)]
    pub fn state_json(&self) -> Result<String, JsValue> {
        to_json(self.inner.state())
    }

    #[wasm_bindgen(js_name = exportNmp)]
    pub fn export_nmp(&self) -> Result<String, JsValue> {
        self.inner.export_nmp().map_err(js_error)
    }

    #[wasm_bindgen(js_name = importNmp)]
    pub fn import_nmp(&mut self, json: &str) -> Result<bool, JsValue> {
        let outcome = self.inner.import_nmp(json).map_err(js_error)?;
        Ok(outcome.persisted)
    }
}
