//! Agribalyse (ADEME) public life-cycle dataset, primary research
//!
//! Queried through the data-fair "lines" endpoint. Values are the
//! `Changement_climatique` indicator in kg CO2e per kg of product.

use super::http::{as_number, Auth, ProviderHttp};
use super::{provider_record, valid_factor, EmissionSource, SourceError};
use crate::types::{Category, DataQuality, EmissionFactorRecord, GLOBAL_COUNTRY};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;

pub const NAME: &str = "agribalyse";
pub const DEFAULT_BASE_URL: &str =
    "https://data.ademe.fr/data-fair/api/v1/datasets/agribalyse-31-synthese";

const CLIMATE_FIELD: &str = "Changement_climatique";
const NAME_FIELD: &str = "LCI_Name";
const GROUP_FIELD: &str = "Groupe_d'aliment";
const PAGE_SIZE: u32 = 1000;

pub struct AgribalyseSource {
    http: ProviderHttp,
}

impl AgribalyseSource {
    pub fn new(base_url: Option<&str>, timeout: Duration) -> Self {
        Self {
            http: ProviderHttp::new(
                NAME,
                base_url.unwrap_or(DEFAULT_BASE_URL),
                Auth::None,
                timeout,
                5,
            ),
        }
    }

    /// Map an Agribalyse food group label onto a category
    pub fn category_of_group(group: &str) -> Category {
        let group = group.to_lowercase();
        let table: [(&str, Category); 9] = [
            ("viandes", Category::Meat),
            ("poissons", Category::Seafood),
            ("lait", Category::Dairy),
            ("oeufs", Category::Dairy),
            ("fruits, légumes", Category::Vegetables),
            ("légumineuses", Category::Legumes),
            ("céréales", Category::Grains),
            ("matières grasses", Category::Oils),
            ("noix", Category::NutsSeeds),
        ];
        table
            .iter()
            .find(|(needle, _)| group.contains(needle))
            .map(|(_, category)| *category)
            .unwrap_or(Category::Unknown)
    }

    pub fn parse_first(body: &Value) -> Option<f64> {
        body.get("results")?
            .as_array()?
            .iter()
            .find_map(|line| line.get(CLIMATE_FIELD).and_then(as_number).and_then(valid_factor))
    }

    pub fn parse_lines(body: &Value) -> Vec<EmissionFactorRecord> {
        let Some(lines) = body.get("results").and_then(Value::as_array) else {
            return Vec::new();
        };

        lines
            .iter()
            .filter_map(|line| {
                let name = line.get(NAME_FIELD).and_then(Value::as_str)?.trim().to_lowercase();
                let value = line.get(CLIMATE_FIELD).and_then(as_number).and_then(valid_factor)?;
                let category = line
                    .get(GROUP_FIELD)
                    .and_then(Value::as_str)
                    .map(Self::category_of_group)
                    .unwrap_or(Category::Unknown);

                let mut record = provider_record(
                    NAME,
                    DataQuality::PrimaryResearch,
                    category.as_str(),
                    &name,
                    GLOBAL_COUNTRY,
                    value,
                );
                record.metadata["group"] = line.get(GROUP_FIELD).cloned().unwrap_or(Value::Null);
                Some(record)
            })
            .collect()
    }

    async fn lines(&self, extra: Option<(&'static str, String)>) -> Result<Vec<EmissionFactorRecord>, SourceError> {
        let mut query = vec![
            ("size", PAGE_SIZE.to_string()),
            ("select", format!("{},{},{}", NAME_FIELD, GROUP_FIELD, CLIMATE_FIELD)),
        ];
        query.extend(extra);
        let body = self.http.get_json("lines", &query).await?;
        Ok(body.map(|b| Self::parse_lines(&b)).unwrap_or_default())
    }
}

#[async_trait]
impl EmissionSource for AgribalyseSource {
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
        _country: &str,
    ) -> Result<Option<f64>, SourceError> {
        let query = [
            ("q", item.to_string()),
            ("q_fields", NAME_FIELD.to_string()),
            ("size", "3".to_string()),
            ("select", format!("{},{}", NAME_FIELD, CLIMATE_FIELD)),
        ];
        let body = self.http.get_json("lines", &query).await?;
        Ok(body.as_ref().and_then(Self::parse_first))
    }

    async fn initial_data(&self) -> Result<Vec<EmissionFactorRecord>, SourceError> {
        self.lines(None).await
    }

    async fn updates_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<EmissionFactorRecord>, SourceError> {
        self.lines(Some(("qs", format!("_updatedAt:>{}", since.format("%Y-%m-%dT%H:%M:%SZ")))))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_of_group() {
        assert_eq!(
            AgribalyseSource::category_of_group("viandes, œufs, poissons"),
            Category::Meat
        );
        assert_eq!(
            AgribalyseSource::category_of_group("matières grasses"),
            Category::Oils
        );
        assert_eq!(
            AgribalyseSource::category_of_group("aides culinaires"),
            Category::Unknown
        );
    }

    #[test]
    fn test_parse_lines() {
        let body = json!({
            "total": 2,
            "results": [
                {"LCI_Name": "Lentil, dried", "Groupe_d'aliment": "fruits, légumes, légumineuses et oléagineux",
                 "Changement_climatique": 1.79},
                {"LCI_Name": "Water", "Changement_climatique": 0}
            ]
        });
        let records = AgribalyseSource::parse_lines(&body);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].item, "lentil, dried");
        assert_eq!(records[0].country, GLOBAL_COUNTRY);
        assert_eq!(records[0].source, NAME);
        assert_eq!(AgribalyseSource::parse_first(&body), Some(1.79));
    }
}
