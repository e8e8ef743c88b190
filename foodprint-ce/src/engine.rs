//! Dish-level calculation
//!
//! `calculate` validates the request, serves repeated requests from a short
//! TTL result cache, tries one inference enrichment call, and otherwise runs
//! the deterministic matcher → portion → adjustments → resolver pipeline for
//! every ingredient. Ingredients are resolved concurrently with a bounded
//! window; when the request deadline passes, unfinished resolutions are
//! dropped and those ingredients use the offline fallback tiers.

use crate::aggregator::{finish_ingredient, AggregationPolicy};
use crate::cache::{Cache, MemoryCache};
use crate::enrichment::{EnrichedIngredient, InferenceClient};
use crate::error::EngineError;
use crate::factors::{AdjustmentFactors, Adjustments, IngredientContext};
use crate::portion;
use crate::reference::ReferenceData;
use crate::resolver::EmissionFactorResolver;
use crate::taxonomy::{TaxonomyMatch, TaxonomyMatcher};
use crate::types::{
    normalize_country, Category, ConfidenceLevel, DetailLevel, EmissionRange, EmissionsResult,
    IngredientEstimate, ResolvedFactor,
};
use crate::uncertainty::{enriched_uncertainty, uncertainty_of};
use chrono::Datelike;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub const DEFAULT_FACTOR_CACHE_TTL: Duration = Duration::from_secs(3600);
pub const DEFAULT_RESULT_CACHE_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_REQUEST_DEADLINE: Duration = Duration::from_secs(20);
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Prefix on `dataSource` when inference supplied weight and context
pub const INFERENCE_SOURCE_PREFIX: &str = "inference+";

/// Runtime tuning for [`CarbonEngine`]
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub factor_cache_ttl: Duration,
    pub result_cache_ttl: Duration,
    pub client_timeout: Duration,
    pub request_deadline: Duration,
    pub max_concurrency: usize,
    pub max_lock_wait_ms: u64,
    pub policy: AggregationPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            factor_cache_ttl: DEFAULT_FACTOR_CACHE_TTL,
            result_cache_ttl: DEFAULT_RESULT_CACHE_TTL,
            client_timeout: crate::sources::DEFAULT_CLIENT_TIMEOUT,
            request_deadline: DEFAULT_REQUEST_DEADLINE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            max_lock_wait_ms: crate::utils::db_retry::DEFAULT_MAX_LOCK_WAIT_MS,
            policy: AggregationPolicy::default(),
        }
    }
}

fn default_quantity() -> i64 {
    1
}

/// Calculation request as received over HTTP
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRequest {
    #[serde(default)]
    pub dish_name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub detail_level: DetailLevel,
    /// Reference month override, 1-12; the current month when absent
    #[serde(default)]
    pub month: Option<u32>,
}

impl CalculationRequest {
    pub fn new(dish_name: &str, ingredients: &[&str]) -> Self {
        Self {
            dish_name: dish_name.to_string(),
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            quantity: 1,
            ..Default::default()
        }
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_country(mut self, country: &str) -> Self {
        self.country = Some(country.to_string());
        self
    }

    pub fn with_month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn with_detail(mut self, detail_level: DetailLevel) -> Self {
        self.detail_level = detail_level;
        self
    }
}

/// Request after validation and defaulting
#[derive(Debug, Clone)]
struct ValidRequest {
    dish_name: String,
    ingredients: Vec<String>,
    quantity: u32,
    country: String,
    month: u32,
}

fn validate(request: &CalculationRequest) -> Result<ValidRequest, EngineError> {
    let dish_name = request.dish_name.trim();
    if dish_name.is_empty() {
        return Err(EngineError::InvalidRequest("dishName is required".into()));
    }

    if request.ingredients.iter().all(|i| i.trim().is_empty()) {
        return Err(EngineError::InvalidRequest(
            "ingredients must be a non-empty list".into(),
        ));
    }

    let quantity = u32::try_from(request.quantity)
        .ok()
        .filter(|q| *q >= 1)
        .ok_or_else(|| EngineError::InvalidRequest("quantity must be at least 1".into()))?;

    let month = match request.month {
        Some(m) if (1..=12).contains(&m) => m,
        Some(m) => {
            return Err(EngineError::InvalidRequest(format!(
                "month must be between 1 and 12, got {}",
                m
            )))
        }
        None => chrono::Utc::now().month(),
    };

    Ok(ValidRequest {
        dish_name: dish_name.to_string(),
        ingredients: request
            .ingredients
            .iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect(),
        quantity,
        country: normalize_country(request.country.as_deref()),
        month,
    })
}

/// Result cache key over everything that changes the answer
fn result_key(request: &ValidRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request.dish_name.as_bytes());
    for ingredient in &request.ingredients {
        hasher.update([0u8]);
        hasher.update(ingredient.as_bytes());
    }
    hasher.update([0xffu8]);
    hasher.update(request.quantity.to_le_bytes());
    hasher.update(request.country.as_bytes());
    hasher.update(request.month.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

pub struct CarbonEngine {
    matcher: TaxonomyMatcher,
    adjustments: AdjustmentFactors,
    resolver: Arc<EmissionFactorResolver>,
    inference: Arc<dyn InferenceClient>,
    results: Arc<dyn Cache<EmissionsResult>>,
    policy: AggregationPolicy,
    max_concurrency: usize,
    request_deadline: Duration,
}

impl CarbonEngine {
    pub fn new(
        reference: Arc<ReferenceData>,
        resolver: Arc<EmissionFactorResolver>,
        inference: Arc<dyn InferenceClient>,
        settings: &EngineSettings,
    ) -> Self {
        Self {
            matcher: TaxonomyMatcher::new(&reference.taxonomy),
            adjustments: AdjustmentFactors::new(reference),
            resolver,
            inference,
            results: Arc::new(MemoryCache::<EmissionsResult>::new(settings.result_cache_ttl)),
            policy: settings.policy.clone(),
            max_concurrency: settings.max_concurrency.max(1),
            request_deadline: settings.request_deadline,
        }
    }

    pub fn matcher(&self) -> &TaxonomyMatcher {
        &self.matcher
    }

    pub fn resolver(&self) -> &Arc<EmissionFactorResolver> {
        &self.resolver
    }

    /// Emissions estimate for a dish
    ///
    /// Fails only on a malformed request.
    pub async fn calculate(&self, request: &CalculationRequest) -> Result<EmissionsResult, EngineError> {
        let request = validate(request)?;
        let key = result_key(&request);

        if let Some(cached) = self.results.get(&key).await {
            debug!(dish = %request.dish_name, "Result cache hit");
            return Ok(cached);
        }

        let deadline = Instant::now() + self.request_deadline;

        let enriched = match tokio::time::timeout_at(
            deadline,
            self.inference.enrich(&request.dish_name, &request.ingredients),
        )
        .await
        {
            Ok(enriched) => enriched,
            Err(_) => {
                warn!(dish = %request.dish_name, "Inference enrichment hit the request deadline");
                None
            }
        };

        let per_ingredient = match &enriched {
            Some(answers) => self.estimate_enriched(&request, answers, deadline).await,
            None => self.estimate_deterministic(&request, deadline).await,
        };

        let result = self
            .policy
            .aggregate(per_ingredient, request.quantity, enriched.is_some());

        info!(
            dish = %request.dish_name,
            ingredients = request.ingredients.len(),
            quantity = request.quantity,
            country = %request.country,
            enriched = result.enriched,
            total_kg_co2e = result.total_kg_co2e,
            confidence = result.confidence.as_str(),
            "Emissions calculated"
        );

        self.results.set(key, result.clone()).await;
        Ok(result)
    }

    /// [`CarbonEngine::calculate`] shaped for the request's detail level
    pub async fn calculate_response(&self, request: &CalculationRequest) -> Result<Value, EngineError> {
        let result = self.calculate(request).await?;
        Ok(shape_response(&result, request.detail_level))
    }

    async fn estimate_deterministic(
        &self,
        request: &ValidRequest,
        deadline: Instant,
    ) -> Vec<IngredientEstimate> {
        stream::iter(request.ingredients.clone())
            .map(|raw| async move {
                let matched = self.matcher.match_ingredient(&raw);
                let grams = portion::estimate(&raw, &matched, &request.dish_name);
                let ctx = IngredientContext::new(&raw, matched.category, &request.country, request.month)
                    .with_taxonomy(matched.subcategory.as_deref(), matched.specific_item.as_deref());
                let adjustments = self.adjustments.apply(&ctx);
                let factor = self
                    .resolve_before(deadline, matched.category, matched.resolution_key(), &request.country)
                    .await;

                let uncertainty = uncertainty_of(factor.quality);
                build_estimate(&raw, &matched, grams, &adjustments, factor, uncertainty, false)
            })
            .buffered(self.max_concurrency)
            .collect()
            .await
    }

    async fn estimate_enriched(
        &self,
        request: &ValidRequest,
        answers: &[EnrichedIngredient],
        deadline: Instant,
    ) -> Vec<IngredientEstimate> {
        // Stream items must be owned; borrowed items break the handler's `Send` bound
        let pairs: Vec<(String, EnrichedIngredient)> = request
            .ingredients
            .iter()
            .cloned()
            .zip(answers.iter().cloned())
            .collect();

        stream::iter(pairs)
            .map(|(raw, answer)| async move {
                let matched = reconcile(self.matcher.match_ingredient(&raw), answer.category);

                let mut ctx = IngredientContext::new(&raw, matched.category, &request.country, request.month)
                    .with_taxonomy(matched.subcategory.as_deref(), matched.specific_item.as_deref());
                ctx.season = answer.season;
                ctx.origin = answer.origin;
                ctx.processing = answer.processing;

                let adjustments = self.adjustments.apply(&ctx);
                let factor = self
                    .resolve_before(deadline, matched.category, matched.resolution_key(), &request.country)
                    .await;

                let uncertainty = enriched_uncertainty(factor.quality);
                build_estimate(&raw, &matched, answer.weight_grams, &adjustments, factor, uncertainty, true)
            })
            .buffered(self.max_concurrency)
            .collect()
            .await
    }

    async fn resolve_before(
        &self,
        deadline: Instant,
        category: Category,
        item: Option<&str>,
        country: &str,
    ) -> ResolvedFactor {
        match tokio::time::timeout_at(deadline, self.resolver.resolve_detailed(category, item, country)).await {
            Ok(factor) => factor,
            Err(_) => {
                warn!(category = %category, item = ?item, "Resolution abandoned at request deadline");
                self.resolver.resolve_offline(category).await
            }
        }
    }
}

/// Keep the matcher's item only when it agrees with the inferred category
fn reconcile(matched: TaxonomyMatch, inferred: Category) -> TaxonomyMatch {
    if inferred == Category::Unknown || inferred == matched.category {
        return matched;
    }
    TaxonomyMatch {
        category: inferred,
        subcategory: None,
        specific_item: None,
        ..matched
    }
}

fn build_estimate(
    raw: &str,
    matched: &TaxonomyMatch,
    weight_grams: f64,
    adjustments: &Adjustments,
    factor: ResolvedFactor,
    uncertainty: f64,
    enriched: bool,
) -> IngredientEstimate {
    let data_source = if enriched {
        format!("{}{}", INFERENCE_SOURCE_PREFIX, factor.source)
    } else {
        factor.source
    };

    finish_ingredient(IngredientEstimate {
        raw_name: raw.to_string(),
        resolved_category: matched.category,
        subcategory: matched.subcategory.clone(),
        specific_item: matched.specific_item.clone(),
        match_confidence: matched.confidence,
        weight_grams,
        emission_factor: factor.value,
        seasonal_factor: adjustments.seasonal,
        regional_factor: adjustments.regional,
        processing_factor: adjustments.processing,
        waste_fraction: adjustments.waste_fraction,
        season_label: adjustments.season_label.clone(),
        origin: adjustments.origin.clone(),
        processing_method: adjustments.processing_method.clone(),
        data_quality: factor.quality,
        data_source,
        resolution_tier: factor.tier,
        emissions_kg_co2e: 0.0,
        range: EmissionRange { lower: 0.0, upper: 0.0 },
        uncertainty,
        confidence: ConfidenceLevel::VeryLow,
    })
}

/// Response body for a detail level
pub fn shape_response(result: &EmissionsResult, detail_level: DetailLevel) -> Value {
    let mut body = json!({
        "total": result.total_kg_co2e,
        "saved": result.saved_kg_co2e,
    });

    if detail_level == DetailLevel::Basic {
        return body;
    }

    body["range"] = json!(result.range);
    body["savedRange"] = json!(result.saved_range);
    body["confidence"] = json!(result.confidence);

    if detail_level == DetailLevel::Detailed {
        let ingredients: Vec<Value> = result
            .per_ingredient
            .iter()
            .map(|e| {
                json!({
                    "name": e.raw_name,
                    "weight": e.weight_grams,
                    "category": e.resolved_category,
                    "subcategory": e.subcategory,
                    "item": e.specific_item,
                    "emissions": e.emissions_kg_co2e,
                    "range": e.range,
                    "confidence": e.confidence,
                    "dataQuality": e.data_quality,
                    "dataSource": e.data_source,
                    "wasteFraction": e.waste_fraction,
                    "factors": {
                        "emission": e.emission_factor,
                        "regional": e.regional_factor,
                        "seasonal": e.seasonal_factor,
                        "processing": e.processing_factor,
                    },
                })
            })
            .collect();
        body["ingredients"] = Value::Array(ingredients);
    }

    body
}
