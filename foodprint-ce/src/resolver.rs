//! Emission factor resolver
//!
//! Tiered lookup that always ends in a number:
//!
//! 1. memory cache keyed (country, category, item)
//! 2. structured store, exact country then `global`
//! 3. ranked external providers, sequentially, each with its own timeout
//! 4. category statistical average (3.0 when the category has no rows)
//! 5. hardcoded per-category constant, 2.5 ultimately
//!
//! Provider hits are upserted into the store. Every online result is cached
//! before it is returned.

use crate::cache::Cache;
use crate::sources::{provider_record, EmissionSource};
use crate::store::FactorStore;
use crate::types::{Category, DataQuality, ResolutionTier, ResolvedFactor, GLOBAL_COUNTRY};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Average used when the store holds no row for the category
pub const EMPTY_CATEGORY_AVERAGE: f64 = 3.0;

/// Ultimate fallback factor
pub const DEFAULT_FALLBACK_FACTOR: f64 = 2.5;

/// Hardcoded factor per coarse category
pub fn hardcoded_factor(category: Category) -> f64 {
    match category {
        Category::Meat => 20.0,
        Category::Dairy => 6.0,
        Category::Vegetables => 0.7,
        Category::Fruits => 0.8,
        Category::Grains => 1.6,
        Category::Legumes => 1.0,
        Category::Seafood => 7.0,
        Category::NutsSeeds | Category::Oils | Category::Unknown => DEFAULT_FALLBACK_FACTOR,
    }
}

/// Cache key for one lookup; unknown items share the category-level key
pub fn cache_key(category: Category, item: Option<&str>, country: &str) -> String {
    format!("{}|{}|{}", country, category.as_str(), item.unwrap_or("*"))
}

pub struct EmissionFactorResolver {
    cache: Arc<dyn Cache<ResolvedFactor>>,
    store: Arc<dyn FactorStore>,
    sources: RwLock<Vec<Arc<dyn EmissionSource>>>,
    client_timeout: Duration,
}

impl EmissionFactorResolver {
    pub fn new(
        cache: Arc<dyn Cache<ResolvedFactor>>,
        store: Arc<dyn FactorStore>,
        sources: Vec<Arc<dyn EmissionSource>>,
        client_timeout: Duration,
    ) -> Self {
        Self {
            cache,
            store,
            sources: RwLock::new(sources),
            client_timeout,
        }
    }

    /// Swap the ranked provider list (after a credential change)
    pub async fn replace_sources(&self, sources: Vec<Arc<dyn EmissionSource>>) {
        *self.sources.write().await = sources;
    }

    /// Active providers in priority order
    pub async fn sources(&self) -> Vec<Arc<dyn EmissionSource>> {
        self.sources.read().await.clone()
    }

    /// Names of the active providers in priority order
    pub async fn source_names(&self) -> Vec<&'static str> {
        self.sources.read().await.iter().map(|s| s.name()).collect()
    }

    pub fn store(&self) -> &Arc<dyn FactorStore> {
        &self.store
    }

    /// Factor in kg CO2e per kg, never failing
    pub async fn resolve(&self, category: Category, item: Option<&str>, country: &str) -> f64 {
        self.resolve_detailed(category, item, country).await.value
    }

    /// Factor with the data quality and tier that produced it
    pub async fn resolve_detailed(
        &self,
        category: Category,
        item: Option<&str>,
        country: &str,
    ) -> ResolvedFactor {
        let key = cache_key(category, item, country);

        if let Some(cached) = self.cache.get(&key).await {
            debug!(key = %key, "Factor cache hit");
            return ResolvedFactor {
                tier: ResolutionTier::Cache,
                source: "cache".to_string(),
                ..cached
            };
        }

        let resolved = match item {
            Some(item) if category != Category::Unknown => {
                match self.from_store(category, item, country).await {
                    Some(found) => found,
                    None => match self.from_sources(category, item, country).await {
                        Some(found) => found,
                        None => self.resolve_offline(category).await,
                    },
                }
            }
            _ => self.resolve_offline(category).await,
        };

        self.cache.set(key, resolved.clone()).await;
        resolved
    }

    /// Tiers 4 and 5 only; no network, never cached
    pub async fn resolve_offline(&self, category: Category) -> ResolvedFactor {
        if category != Category::Unknown {
            match self.store.category_average(category.as_str()).await {
                Ok(Some(avg)) if avg.is_finite() && avg > 0.0 => {
                    debug!(category = %category, avg, "Category average");
                    return ResolvedFactor {
                        value: avg,
                        quality: DataQuality::Extrapolated,
                        tier: ResolutionTier::CategoryAverage,
                        source: "category_average".to_string(),
                    };
                }
                Ok(Some(_)) => {}
                Ok(None) => {
                    return ResolvedFactor {
                        value: EMPTY_CATEGORY_AVERAGE,
                        quality: DataQuality::Default,
                        tier: ResolutionTier::CategoryAverage,
                        source: "category_average".to_string(),
                    };
                }
                Err(e) => warn!(category = %category, "Category average unavailable: {}", e),
            }
        }

        ResolvedFactor {
            value: hardcoded_factor(category),
            quality: DataQuality::ErrorFallback,
            tier: ResolutionTier::FallbackConstant,
            source: "fallback_constant".to_string(),
        }
    }

    async fn from_store(&self, category: Category, item: &str, country: &str) -> Option<ResolvedFactor> {
        let mut attempts = vec![(country, ResolutionTier::Store)];
        if country != GLOBAL_COUNTRY {
            attempts.push((GLOBAL_COUNTRY, ResolutionTier::StoreGlobal));
        }

        for (lookup_country, tier) in attempts {
            match self.store.get(category.as_str(), item, lookup_country).await {
                Ok(Some(record))
                    if record.value_kg_co2e_per_kg.is_finite() && record.value_kg_co2e_per_kg > 0.0 =>
                {
                    debug!(item, country = lookup_country, "Store hit");
                    return Some(ResolvedFactor {
                        value: record.value_kg_co2e_per_kg,
                        quality: record.quality(),
                        tier,
                        source: format!("store:{}", record.source),
                    });
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(item, country = lookup_country, "Store lookup failed: {}", e);
                    return None;
                }
            }
        }
        None
    }

    async fn from_sources(&self, category: Category, item: &str, country: &str) -> Option<ResolvedFactor> {
        let sources = self.sources.read().await.clone();

        for source in sources {
            let call = source.emission_factor(category, item, country);
            let value = match tokio::time::timeout(self.client_timeout, call).await {
                Ok(Ok(Some(value))) if value.is_finite() && value > 0.0 => value,
                Ok(Ok(_)) => {
                    debug!(provider = source.name(), item, "No data");
                    continue;
                }
                Ok(Err(e)) => {
                    warn!(provider = source.name(), item, "Provider failed: {}", e);
                    continue;
                }
                Err(_) => {
                    warn!(provider = source.name(), item, timeout_ms = self.client_timeout.as_millis() as u64, "Provider timed out");
                    continue;
                }
            };

            let quality = source.data_quality();
            let record = provider_record(source.name(), quality, category.as_str(), item, country, value);
            if let Err(e) = self.store.upsert(&record).await {
                warn!(provider = source.name(), item, "Could not persist provider factor: {}", e);
            }

            debug!(provider = source.name(), item, value, "Provider hit");
            return Some(ResolvedFactor {
                value,
                quality,
                tier: ResolutionTier::Provider,
                source: format!("provider:{}", source.name()),
            });
        }
        None
    }
}
