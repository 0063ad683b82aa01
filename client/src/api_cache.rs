//! Read-through cache in front of the catalog REST service
//!
//! Only successful responses are cached. Failures come back as a response value with
//! the upstream status (or 500 when the service could not be reached) so callers can
//! decide how to degrade.

use std::collections::HashMap;
use std::time::Duration;

use nmp_shared::catalog::{
    AnimalSubtype, Breed, CatalogTables, CropCatalogEntry, CropConversionFactors,
    CropSoilTestRegion, DensityUnit, FertilizerCatalogEntry, FertilizerUnit, KelownaRange,
    ManureCatalogEntry, NMineralization, PreviousYearManureApplication, Region,
    SoilTestMethod, SoilTestRecommendation,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};

/// Status and body of one catalog call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub data: Value,
}

impl ApiResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Animal row from `api/animals/`; only the id is needed to fetch its subtypes
#[derive(Debug, Deserialize)]
struct AnimalRow {
    id: i64,
}

/// Catalog client with an in-memory response cache
pub struct ApiCache {
    client: reqwest::Client,
    base_url: String,
    cache: RwLock<HashMap<String, Value>>,
}

impl ApiCache {
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn cache_key(endpoint: &str) -> String {
        endpoint.trim_start_matches('/').to_string()
    }

    /// Prime the cache, e.g. from a bundled snapshot of the catalog
    pub async fn seed(&self, endpoint: &str, data: Value) {
        self.cache
            .write()
            .await
            .insert(Self::cache_key(endpoint), data);
    }

    /// GET an endpoint, answering from the cache when possible
    pub async fn call_endpoint(&self, endpoint: &str) -> ApiResponse {
        let key = Self::cache_key(endpoint);
        if let Some(data) = self.cache.read().await.get(&key) {
            return ApiResponse {
                status: 200,
                data: data.clone(),
            };
        }

        let url = format!("{}/{}", self.base_url, key);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(endpoint = %key, "Catalog request failed: {}", e);
                return ApiResponse {
                    status: 500,
                    data: Value::Null,
                };
            }
        };

        let status = response.status().as_u16();
        let data = response.json::<Value>().await.unwrap_or(Value::Null);
        if status == 200 {
            self.cache.write().await.insert(key, data.clone());
        } else {
            tracing::warn!(endpoint = %key, status, "Catalog returned an error status");
        }
        ApiResponse { status, data }
    }

    /// GET an endpoint and decode its body, failing on any non-200 status
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> ClientResult<T> {
        let response = self.call_endpoint(endpoint).await;
        if !response.is_ok() {
            return Err(ClientError::Upstream {
                endpoint: Self::cache_key(endpoint),
                status: response.status,
            });
        }
        Ok(serde_json::from_value(response.data)?)
    }

    pub async fn fertilizers(&self) -> ClientResult<Vec<FertilizerCatalogEntry>> {
        self.get_json("api/fertilizers/").await
    }

    pub async fn fertilizer_units(&self) -> ClientResult<Vec<FertilizerUnit>> {
        self.get_json("api/fertilizerunits/").await
    }

    pub async fn density_units(&self) -> ClientResult<Vec<DensityUnit>> {
        self.get_json("api/densityunits/").await
    }

    pub async fn soil_test_methods(&self) -> ClientResult<Vec<SoilTestMethod>> {
        self.get_json("api/soiltestmethods/").await
    }

    pub async fn previous_year_manure_applications(
        &self,
    ) -> ClientResult<Vec<PreviousYearManureApplication>> {
        self.get_json("api/previousyearmanureapplications/").await
    }

    pub async fn breeds(&self) -> ClientResult<Vec<Breed>> {
        self.get_json("api/breeds/").await
    }

    pub async fn animal_subtypes(&self, animal_id: i64) -> ClientResult<Vec<AnimalSubtype>> {
        self.get_json(&format!("api/animal_subtypes/{}/", animal_id))
            .await
    }

    pub async fn crops(&self) -> ClientResult<Vec<CropCatalogEntry>> {
        self.get_json("api/crops/").await
    }

    /// The service returns a single conversion factor row inside a list
    pub async fn crop_conversion_factors(&self) -> ClientResult<CropConversionFactors> {
        let rows: Vec<CropConversionFactors> =
            self.get_json("api/cropsconversionfactors/").await?;
        rows.into_iter().next().ok_or(ClientError::Upstream {
            endpoint: "api/cropsconversionfactors/".to_string(),
            status: 404,
        })
    }

    pub async fn regions(&self) -> ClientResult<Vec<Region>> {
        self.get_json("api/regions/").await
    }

    pub async fn manures(&self) -> ClientResult<Vec<ManureCatalogEntry>> {
        self.get_json("api/manures/").await
    }

    pub async fn n_mineralizations(&self) -> ClientResult<Vec<NMineralization>> {
        self.get_json("api/nmineralization/").await
    }

    pub async fn phosphorous_kelowna_ranges(&self) -> ClientResult<Vec<KelownaRange>> {
        self.get_json("api/soiltestphosphorouskelonwaranges/").await
    }

    pub async fn potassium_kelowna_ranges(&self) -> ClientResult<Vec<KelownaRange>> {
        self.get_json("api/soiltestpotassiumkelonwaranges/").await
    }

    pub async fn phosphorous_recommendations(&self) -> ClientResult<Vec<SoilTestRecommendation>> {
        self.get_json("api/soiltestphosphorousrecommendation/").await
    }

    pub async fn potassium_recommendations(&self) -> ClientResult<Vec<SoilTestRecommendation>> {
        self.get_json("api/soiltestpotassiumrecommendation/").await
    }

    /// Crop group rows for a crop in the farm's phosphorous soil test region
    pub async fn crop_phosphorous_regions(
        &self,
        crop_id: i64,
        region_code: i64,
    ) -> ClientResult<Vec<CropSoilTestRegion>> {
        self.get_json(&format!(
            "api/cropsoiltestphosphorousregions/{}/{}/",
            crop_id, region_code
        ))
        .await
    }

    /// Crop group rows for a crop in the farm's potassium soil test region
    pub async fn crop_potassium_regions(
        &self,
        crop_id: i64,
        region_code: i64,
    ) -> ClientResult<Vec<CropSoilTestRegion>> {
        self.get_json(&format!(
            "api/cropsoilpotassiumregions/{}/{}/",
            crop_id, region_code
        ))
        .await
    }

    /// Fetch every lookup table the reducer and calculations take as arguments.
    ///
    /// The service has no manure unit endpoint, so `manure_units` is left empty.
    pub async fn catalog_tables(&self) -> ClientResult<CatalogTables> {
        let animals: Vec<AnimalRow> = self.get_json("api/animals/").await?;
        let mut animal_subtypes = Vec::new();
        for animal in &animals {
            animal_subtypes.extend(self.animal_subtypes(animal.id).await?);
        }

        Ok(CatalogTables {
            animal_subtypes,
            breeds: self.breeds().await?,
            soil_test_methods: self.soil_test_methods().await?,
            fertilizer_units: self.fertilizer_units().await?,
            density_units: self.density_units().await?,
            previous_year_manure_applications: self.previous_year_manure_applications().await?,
            manure_units: Vec::new(),
        })
    }
}
