//! CarbonCloud climate footprint API (API key header, primary research)

use super::http::{as_number, Auth, ProviderHttp};
use super::{provider_record, valid_factor, EmissionSource, SourceError};
use crate::types::{Category, DataQuality, EmissionFactorRecord, GLOBAL_COUNTRY};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

pub const NAME: &str = "carbon_cloud";
pub const DEFAULT_BASE_URL: &str = "https://api.carboncloud.com/v1";

const API_KEY_HEADER: &str = "X-API-Key";
const PAGE_SIZE: u32 = 500;

#[derive(Debug, Deserialize)]
struct FootprintPage {
    #[serde(default)]
    results: Vec<Footprint>,
}

#[derive(Debug, Deserialize)]
struct Footprint {
    name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    country: Option<String>,
    kg_co2e_per_kg: Option<Value>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

pub struct CarbonCloudSource {
    http: ProviderHttp,
}

impl CarbonCloudSource {
    pub fn new(api_key: String, base_url: Option<&str>, timeout: Duration) -> Self {
        Self {
            http: ProviderHttp::new(
                NAME,
                base_url.unwrap_or(DEFAULT_BASE_URL),
                Auth::Header(API_KEY_HEADER, api_key),
                timeout,
                10,
            ),
        }
    }

    fn page(body: &Value) -> Option<FootprintPage> {
        serde_json::from_value(body.clone()).ok()
    }

    /// First usable footprint of a search page
    pub fn parse_footprint(body: &Value) -> Option<f64> {
        Self::page(body)?
            .results
            .iter()
            .find_map(|f| f.kg_co2e_per_kg.as_ref().and_then(as_number).and_then(valid_factor))
    }

    pub fn parse_records(body: &Value) -> Vec<EmissionFactorRecord> {
        let Some(page) = Self::page(body) else {
            return Vec::new();
        };

        page.results
            .into_iter()
            .filter_map(|f| {
                let value = f.kg_co2e_per_kg.as_ref().and_then(as_number).and_then(valid_factor)?;
                let category = f
                    .category
                    .as_deref()
                    .and_then(Category::parse)
                    .unwrap_or(Category::Unknown);
                let country = f
                    .country
                    .map(|c| c.trim().to_lowercase())
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| GLOBAL_COUNTRY.to_string());

                let mut record = provider_record(
                    NAME,
                    DataQuality::PrimaryResearch,
                    category.as_str(),
                    &f.name.trim().to_lowercase(),
                    &country,
                    value,
                );
                if let Some(updated) = f.updated_at {
                    record.last_updated = updated;
                }
                Some(record)
            })
            .collect()
    }

    async fn list(&self, query: &[(&str, String)]) -> Result<Vec<EmissionFactorRecord>, SourceError> {
        let body = self.http.get_json("footprints", query).await?;
        Ok(body.map(|b| Self::parse_records(&b)).unwrap_or_default())
    }
}

#[async_trait]
impl EmissionSource for CarbonCloudSource {
    fn name(&self) -> &'static str {
        NAME
    }

    fn data_quality(&self) -> DataQuality {
        DataQuality::PrimaryResearch
    }

    async fn emission_factor(
        &self,
        _category: Category,
        item: &str,
        country: &str,
    ) -> Result<Option<f64>, SourceError> {
        let mut query = vec![("query", item.to_string()), ("page_size", "5".to_string())];
        if country != GLOBAL_COUNTRY {
            query.push(("country", country.to_string()));
        }
        let body = self.http.get_json("footprints", &query).await?;
        Ok(body.as_ref().and_then(Self::parse_footprint))
    }

    async fn initial_data(&self) -> Result<Vec<EmissionFactorRecord>, SourceError> {
        self.list(&[("page_size", PAGE_SIZE.to_string())]).await
    }

    async fn updates_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<EmissionFactorRecord>, SourceError> {
        self.list(&[
            ("page_size", PAGE_SIZE.to_string()),
            ("updated_since", since.to_rfc3339()),
        ])
        .await
    }
}
