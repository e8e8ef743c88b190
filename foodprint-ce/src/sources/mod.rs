//! External emission data providers
//!
//! Five HTTP providers share the [`EmissionSource`] trait and are consulted
//! sequentially in priority order by the resolver. Providers needing a
//! credential are left out of the ranked list when none is configured.

pub mod agribalyse;
pub mod carbon_cloud;
pub mod climatiq;
pub mod http;
pub mod my_emissions;
pub mod open_food_facts;

use crate::types::{Category, DataQuality, EmissionFactorRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub use agribalyse::AgribalyseSource;
pub use carbon_cloud::CarbonCloudSource;
pub use climatiq::ClimatiqSource;
pub use my_emissions::MyEmissionsSource;
pub use open_food_facts::OpenFoodFactsSource;

/// Default provider priority, highest first
pub const DEFAULT_PRIORITY: [&str; 5] = [
    climatiq::NAME,
    carbon_cloud::NAME,
    agribalyse::NAME,
    my_emissions::NAME,
    open_food_facts::NAME,
];

/// Per-call timeout when none is configured
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Provider call failure
///
/// The resolver treats every variant as "no data from this provider".
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Provider {0} has no credential configured")]
    NotConfigured(&'static str),

    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

/// One ranked emission data provider
#[async_trait]
pub trait EmissionSource: Send + Sync {
    /// Stable provider name ("climatiq", ...), also the store `source` column
    fn name(&self) -> &'static str;

    /// Quality label attached to values from this provider
    fn data_quality(&self) -> DataQuality;

    /// Emission factor in kg CO2e per kg, `Ok(None)` when the provider has no data
    async fn emission_factor(
        &self,
        category: Category,
        item: &str,
        country: &str,
    ) -> Result<Option<f64>, SourceError>;

    /// Bulk dataset, pulled once on a provider's first sync
    async fn initial_data(&self) -> Result<Vec<EmissionFactorRecord>, SourceError>;

    /// Records changed after `since`
    async fn updates_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<EmissionFactorRecord>, SourceError>;
}

/// Resolved configuration for one provider
#[derive(Debug, Clone, Default)]
pub struct SourceSettings {
    pub name: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub enabled: bool,
}

/// Build the ranked provider list in `settings` order
///
/// Disabled providers, unknown names and keyed providers without a
/// credential are skipped.
pub fn build_ranked_sources(
    settings: &[SourceSettings],
    timeout: Duration,
) -> Vec<Arc<dyn EmissionSource>> {
    let mut sources: Vec<Arc<dyn EmissionSource>> = Vec::new();

    for s in settings {
        if !s.enabled {
            debug!(provider = %s.name, "Provider disabled");
            continue;
        }
        let key = s.api_key.clone().filter(|k| !k.trim().is_empty());
        let base_url = s.base_url.as_deref();

        let source: Result<Arc<dyn EmissionSource>, SourceError> = match s.name.as_str() {
            climatiq::NAME => key
                .ok_or(SourceError::NotConfigured(climatiq::NAME))
                .map(|k| Arc::new(ClimatiqSource::new(k, base_url, timeout)) as Arc<dyn EmissionSource>),
            carbon_cloud::NAME => key
                .ok_or(SourceError::NotConfigured(carbon_cloud::NAME))
                .map(|k| Arc::new(CarbonCloudSource::new(k, base_url, timeout)) as Arc<dyn EmissionSource>),
            agribalyse::NAME => Ok(Arc::new(AgribalyseSource::new(base_url, timeout)) as Arc<dyn EmissionSource>),
            my_emissions::NAME => key
                .ok_or(SourceError::NotConfigured(my_emissions::NAME))
                .map(|k| Arc::new(MyEmissionsSource::new(k, base_url, timeout)) as Arc<dyn EmissionSource>),
            open_food_facts::NAME => Ok(Arc::new(OpenFoodFactsSource::new(base_url, timeout)) as Arc<dyn EmissionSource>),
            other => {
                debug!(provider = other, "Unknown provider name ignored");
                continue;
            }
        };

        match source {
            Ok(source) => sources.push(source),
            Err(e) => info!(provider = %s.name, "Provider skipped: {}", e),
        }
    }

    sources
}

/// Build a store record from a provider value
pub fn provider_record(
    source: &str,
    quality: DataQuality,
    category: &str,
    item: &str,
    country: &str,
    value: f64,
) -> EmissionFactorRecord {
    EmissionFactorRecord {
        category: category.to_string(),
        item: item.to_string(),
        country: country.to_string(),
        value_kg_co2e_per_kg: value,
        source: source.to_string(),
        last_updated: Utc::now(),
        metadata: serde_json::json!({ "quality": quality.as_str() }),
    }
}

/// Accept only positive finite factors
pub(crate) fn valid_factor(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}
