//! Climatiq emission factor API (bearer token, secondary data)

use super::http::{as_number, Auth, ProviderHttp};
use super::{provider_record, valid_factor, EmissionSource, SourceError};
use crate::types::{Category, DataQuality, EmissionFactorRecord, GLOBAL_COUNTRY};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::time::Duration;

pub const NAME: &str = "climatiq";
pub const DEFAULT_BASE_URL: &str = "https://api.climatiq.io/data/v1";

const DATA_VERSION: &str = "^21";
const PAGE_SIZE: u32 = 100;

pub struct ClimatiqSource {
    http: ProviderHttp,
}

impl ClimatiqSource {
    pub fn new(api_key: String, base_url: Option<&str>, timeout: Duration) -> Self {
        Self {
            http: ProviderHttp::new(
                NAME,
                base_url.unwrap_or(DEFAULT_BASE_URL),
                Auth::Bearer(api_key),
                timeout,
                5,
            ),
        }
    }

    /// Activity id for a food item ("olive oil" → "consumer_goods-type_olive_oil")
    pub fn activity_id(item: &str) -> String {
        format!("consumer_goods-type_{}", item.trim().replace(' ', "_"))
    }

    /// Request body estimating one kilogram of `item`
    pub fn estimate_body(item: &str, country: &str) -> Value {
        let mut factor = json!({
            "activity_id": Self::activity_id(item),
            "data_version": DATA_VERSION,
        });
        if country != GLOBAL_COUNTRY {
            factor["region"] = json!(country.to_uppercase());
        }
        json!({
            "emission_factor": factor,
            "parameters": { "weight": 1, "weight_unit": "kg" },
        })
    }

    /// `co2e` of a one-kilogram estimate
    pub fn parse_estimate(body: &Value) -> Option<f64> {
        if body.get("co2e_unit").and_then(Value::as_str).map_or(false, |u| u != "kg") {
            return None;
        }
        body.get("co2e").and_then(as_number).and_then(valid_factor)
    }

    /// Search results → store records, optionally only those updated after `since`
    pub fn parse_search(body: &Value, since: Option<DateTime<Utc>>) -> Vec<EmissionFactorRecord> {
        let Some(results) = body.get("results").and_then(Value::as_array) else {
            return Vec::new();
        };

        results
            .iter()
            .filter_map(|r| {
                let name = r.get("name").and_then(Value::as_str)?.trim().to_lowercase();
                let value = r.get("factor").and_then(as_number).and_then(valid_factor)?;

                let updated = r
                    .get("last_updated")
                    .and_then(Value::as_str)
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|d| d.with_timezone(&Utc));
                if let (Some(since), Some(updated)) = (since, updated) {
                    if updated <= since {
                        return None;
                    }
                }

                let category = r
                    .get("category")
                    .and_then(Value::as_str)
                    .and_then(Category::parse)
                    .unwrap_or(Category::Unknown);
                let country = r
                    .get("region")
                    .and_then(Value::as_str)
                    .map(|c| c.to_lowercase())
                    .filter(|c| !c.is_empty() && c != "glo")
                    .unwrap_or_else(|| GLOBAL_COUNTRY.to_string());

                let mut record = provider_record(
                    NAME,
                    DataQuality::Secondary,
                    category.as_str(),
                    &name,
                    &country,
                    value,
                );
                if let Some(updated) = updated {
                    record.last_updated = updated;
                }
                Some(record)
            })
            .collect()
    }

    async fn search(&self, since: Option<DateTime<Utc>>) -> Result<Vec<EmissionFactorRecord>, SourceError> {
        let query = [
            ("query", "food".to_string()),
            ("category", "Food/Beverages/Tobacco".to_string()),
            ("data_version", DATA_VERSION.to_string()),
            ("results_per_page", PAGE_SIZE.to_string()),
        ];
        let body = self.http.get_json("search", &query).await?;
        Ok(body
            .map(|b| Self::parse_search(&b, since))
            .unwrap_or_default())
    }
}

#[async_trait]
impl EmissionSource for ClimatiqSource {
    fn name(&self) -> &'static str {
        NAME
    }

    fn data_quality(&self) -> DataQuality {
        DataQuality::Secondary
    }

    async fn emission_factor(
        &self,
        _category: Category,
        item: &str,
        country: &str,
    ) -> Result<Option<f64>, SourceError> {
        let body = self
            .http
            .post_json("estimate", &Self::estimate_body(item, country))
            .await?;
        Ok(body.as_ref().and_then(Self::parse_estimate))
    }

    async fn initial_data(&self) -> Result<Vec<EmissionFactorRecord>, SourceError> {
        self.search(None).await
    }

    async fn updates_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<EmissionFactorRecord>, SourceError> {
        self.search(Some(since)).await
    }
}
