//! MyEmissions food carbon calculator API (bearer token, secondary data)

use super::http::{as_number, Auth, ProviderHttp};
use super::{provider_record, valid_factor, EmissionSource, SourceError};
use crate::types::{Category, DataQuality, EmissionFactorRecord, GLOBAL_COUNTRY};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::time::Duration;

pub const NAME: &str = "my_emissions";
pub const DEFAULT_BASE_URL: &str = "https://api.myemissions.green/v1";

pub struct MyEmissionsSource {
    http: ProviderHttp,
}

impl MyEmissionsSource {
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

    /// Footprint request for one kilogram of `item`
    pub fn footprint_body(item: &str, country: &str) -> Value {
        let mut body = json!({
            "ingredients": [{ "name": item, "amount": 1000, "unit": "g" }],
        });
        if country != GLOBAL_COUNTRY {
            body["country"] = json!(country.to_uppercase());
        }
        body
    }

    /// Per-kilogram footprint of the single requested ingredient
    pub fn parse_footprint(body: &Value) -> Option<f64> {
        body.get("ingredients")?
            .as_array()?
            .first()?
            .get("co2e_kg")
            .and_then(as_number)
            .and_then(valid_factor)
    }

    pub fn parse_catalogue(body: &Value) -> Vec<EmissionFactorRecord> {
        let Some(rows) = body.get("data").and_then(Value::as_array) else {
            return Vec::new();
        };

        rows.iter()
            .filter_map(|row| {
                let name = row.get("name").and_then(Value::as_str)?.trim().to_lowercase();
                let value = row.get("co2e_per_kg").and_then(as_number).and_then(valid_factor)?;
                let category = row
                    .get("category")
                    .and_then(Value::as_str)
                    .and_then(Category::parse)
                    .unwrap_or(Category::Unknown);

                let mut record = provider_record(
                    NAME,
                    DataQuality::Secondary,
                    category.as_str(),
                    &name,
                    GLOBAL_COUNTRY,
                    value,
                );
                if let Some(updated) = row
                    .get("updated_at")
                    .and_then(Value::as_str)
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                {
                    record.last_updated = updated.with_timezone(&Utc);
                }
                Some(record)
            })
            .collect()
    }

    async fn catalogue(&self, query: &[(&str, String)]) -> Result<Vec<EmissionFactorRecord>, SourceError> {
        let body = self.http.get_json("ingredients", query).await?;
        Ok(body.map(|b| Self::parse_catalogue(&b)).unwrap_or_default())
    }
}

#[async_trait]
impl EmissionSource for MyEmissionsSource {
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
            .post_json("ingredients/footprint", &Self::footprint_body(item, country))
            .await?;
        Ok(body.as_ref().and_then(Self::parse_footprint))
    }

    async fn initial_data(&self) -> Result<Vec<EmissionFactorRecord>, SourceError> {
        self.catalogue(&[]).await
    }

    async fn updates_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<EmissionFactorRecord>, SourceError> {
        self.catalogue(&[("updated_since", since.to_rfc3339())]).await
    }
}
