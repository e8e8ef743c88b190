//! Test Helper Utilities
//!
//! Fake providers, a scripted inference client and engine/app builders
//! shared by the integration tests.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use foodprint_ce::cache::MemoryCache;
use foodprint_ce::db::SqliteFactorStore;
use foodprint_ce::enrichment::{DisabledInference, EnrichedIngredient, InferenceClient};
use foodprint_ce::reference::ReferenceData;
use foodprint_ce::resolver::EmissionFactorResolver;
use foodprint_ce::sources::{EmissionSource, SourceError};
use foodprint_ce::store::{FactorStore, InMemoryFactorStore};
use foodprint_ce::types::{Category, DataQuality, EmissionFactorRecord, ResolvedFactor};
use foodprint_ce::{AppState, CarbonEngine, EngineSettings};
use foodprint_common::config::TomlConfig;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How a [`FakeSource`] answers
#[derive(Debug, Clone, Copy)]
pub enum FakeBehavior {
    /// Answer every lookup with this factor
    Value(f64),
    /// Answer `Ok(None)`
    NoData,
    /// Fail with a network error
    Fail,
    /// Sleep, then answer with the factor
    Slow(Duration, f64),
}

/// Provider double counting its calls
pub struct FakeSource {
    name: &'static str,
    behavior: FakeBehavior,
    calls: Arc<AtomicUsize>,
}

impl FakeSource {
    pub fn new(name: &'static str, behavior: FakeBehavior) -> Self {
        Self {
            name,
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter, readable after the source moved into a resolver
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl EmissionSource for FakeSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn data_quality(&self) -> DataQuality {
        DataQuality::Secondary
    }

    async fn emission_factor(
        &self,
        _category: Category,
        _item: &str,
        _country: &str,
    ) -> Result<Option<f64>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            FakeBehavior::Value(v) => Ok(Some(v)),
            FakeBehavior::NoData => Ok(None),
            FakeBehavior::Fail => Err(SourceError::Network("connection refused".to_string())),
            FakeBehavior::Slow(delay, v) => {
                tokio::time::sleep(delay).await;
                Ok(Some(v))
            }
        }
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

/// Inference double returning a fixed answer
pub struct ScriptedInference {
    answers: Option<Vec<EnrichedIngredient>>,
}

impl ScriptedInference {
    pub fn new(answers: Option<Vec<EnrichedIngredient>>) -> Self {
        Self { answers }
    }
}

#[async_trait]
impl InferenceClient for ScriptedInference {
    async fn enrich(&self, _dish_name: &str, ingredients: &[String]) -> Option<Vec<EnrichedIngredient>> {
        self.answers
            .clone()
            .filter(|answers| answers.len() == ingredients.len())
    }
}

pub fn enriched(name: &str, grams: f64, category: Category) -> EnrichedIngredient {
    EnrichedIngredient {
        name: name.to_string(),
        weight_grams: grams,
        category,
        processing: None,
        origin: None,
        season: None,
    }
}

pub fn record(category: &str, item: &str, country: &str, value: f64) -> EmissionFactorRecord {
    EmissionFactorRecord {
        category: category.to_string(),
        item: item.to_string(),
        country: country.to_string(),
        value_kg_co2e_per_kg: value,
        source: "fixture".to_string(),
        last_updated: Utc::now(),
        metadata: serde_json::json!({ "quality": "primary_research" }),
    }
}

/// In-memory sqlite pool with every table created
///
/// One connection, so every query sees the same `:memory:` database.
pub async fn create_test_pool() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await?;
    foodprint_common::db::init::create_all_tables(&pool).await?;
    Ok(pool)
}

pub fn resolver_with(
    store: Arc<dyn FactorStore>,
    sources: Vec<Arc<dyn EmissionSource>>,
    settings: &EngineSettings,
) -> Arc<EmissionFactorResolver> {
    Arc::new(EmissionFactorResolver::new(
        Arc::new(MemoryCache::<ResolvedFactor>::new(settings.factor_cache_ttl)),
        store,
        sources,
        settings.client_timeout,
    ))
}

pub fn engine_with(
    store: Arc<dyn FactorStore>,
    sources: Vec<Arc<dyn EmissionSource>>,
    inference: Arc<dyn InferenceClient>,
    settings: &EngineSettings,
) -> CarbonEngine {
    CarbonEngine::new(
        Arc::new(ReferenceData::builtin()),
        resolver_with(store, sources, settings),
        inference,
        settings,
    )
}

/// Engine with an empty store, no providers and no inference
pub fn offline_engine() -> CarbonEngine {
    engine_with(
        Arc::new(InMemoryFactorStore::new()),
        Vec::new(),
        Arc::new(DisabledInference),
        &EngineSettings::default(),
    )
}

/// App state over an in-memory database, no providers configured
pub async fn create_test_state() -> Result<AppState> {
    let pool = create_test_pool().await?;
    let settings = EngineSettings::default();
    let store = Arc::new(SqliteFactorStore::new(pool.clone(), settings.max_lock_wait_ms));
    let engine = engine_with(store, Vec::new(), Arc::new(DisabledInference), &settings);
    Ok(AppState::new(pool, Arc::new(engine), TomlConfig::default()))
}
