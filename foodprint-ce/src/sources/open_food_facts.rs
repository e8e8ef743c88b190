//! Open Food Facts product search (public, secondary data)
//!
//! Products carry an Agribalyse-derived `co2_total` in their eco-score data.
//! The median over the first page of matching products is used. There is no
//! bulk export suitable for seeding, so `initial_data` and `updates_since`
//! return nothing.

use super::http::{as_number, Auth, ProviderHttp};
use super::{valid_factor, EmissionSource, SourceError};
use crate::types::{Category, DataQuality, EmissionFactorRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;

pub const NAME: &str = "open_food_facts";
pub const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org";

const PAGE_SIZE: u32 = 10;

pub struct OpenFoodFactsSource {
    http: ProviderHttp,
}

impl OpenFoodFactsSource {
    pub fn new(base_url: Option<&str>, timeout: Duration) -> Self {
        Self {
            http: ProviderHttp::new(
                NAME,
                base_url.unwrap_or(DEFAULT_BASE_URL),
                Auth::None,
                timeout,
                2,
            ),
        }
    }

    /// Median `co2_total` across products in a search page
    pub fn parse_products(body: &Value) -> Option<f64> {
        let mut values: Vec<f64> = body
            .get("products")?
            .as_array()?
            .iter()
            .filter_map(|p| {
                p.pointer("/ecoscore_data/agribalyse/co2_total")
                    .and_then(as_number)
                    .and_then(valid_factor)
            })
            .collect();

        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.total_cmp(b));
        let mid = values.len() / 2;
        Some(if values.len() % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        })
    }
}

#[async_trait]
impl EmissionSource for OpenFoodFactsSource {
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
        _country: &str,
    ) -> Result<Option<f64>, SourceError> {
        let query = [
            ("search_terms", item.to_string()),
            ("search_simple", "1".to_string()),
            ("json", "1".to_string()),
            ("page_size", PAGE_SIZE.to_string()),
            ("fields", "product_name,ecoscore_data".to_string()),
        ];
        let body = self.http.get_json("cgi/search.pl", &query).await?;
        Ok(body.as_ref().and_then(Self::parse_products))
    }

    async fn initial_data(&self) -> Result<Vec<EmissionFactorRecord>, SourceError> {
        Ok(Vec::new())
    }

    async fn updates_since(
        &self,
        _since: DateTime<Utc>,
    ) -> Result<Vec<EmissionFactorRecord>, SourceError> {
        Ok(Vec::new())
    }
}
