//! Inference enrichment
//!
//! One best-effort call per calculation asks an OpenAI-compatible chat
//! completions service for weight, category, processing, origin and season of
//! every ingredient. Any failure (unconfigured, network, timeout, bad JSON,
//! shape mismatch) yields `None` and the caller runs the deterministic path
//! for all ingredients.

use crate::types::Category;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Default request-level timeout
pub const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_secs(15);

const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Inference answer for one ingredient, already validated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedIngredient {
    pub name: String,
    pub weight_grams: f64,
    pub category: Category,
    pub processing: Option<String>,
    pub origin: Option<String>,
    pub season: Option<String>,
}

#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// `Some` only when every ingredient was answered with a valid shape
    async fn enrich(&self, dish_name: &str, ingredients: &[String]) -> Option<Vec<EnrichedIngredient>>;
}

/// Used when no inference endpoint is configured
pub struct DisabledInference;

#[async_trait]
impl InferenceClient for DisabledInference {
    async fn enrich(&self, _dish_name: &str, _ingredients: &[String]) -> Option<Vec<EnrichedIngredient>> {
        None
    }
}

/// OpenAI-compatible chat completions client with bearer auth
pub struct ChatCompletionsInference {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl ChatCompletionsInference {
    pub fn new(endpoint: &str, model: Option<&str>, api_key: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.unwrap_or(DEFAULT_MODEL).to_string(),
            api_key,
            timeout,
        }
    }

    fn request_body(&self, dish_name: &str, ingredients: &[String]) -> Value {
        let system = "You estimate food composition for carbon accounting. Reply with JSON only: \
            {\"ingredients\": [{\"name\": string, \"weight_grams\": number, \"category\": one of \
            meat|seafood|dairy|vegetables|fruits|grains|legumes|nuts_seeds|oils|unknown, \
            \"processing\": raw|cooked|frozen|canned|dried|smoked|processed, \"origin\": \
            local|regional|national|imported_ground|imported_sea|air_freighted, \"season\": \
            in_season|near_season|out_of_season}]}. One entry per ingredient, same order, \
            weights for one serving.";
        let user = json!({ "dish": dish_name, "ingredients": ingredients }).to_string();

        json!({
            "model": self.model,
            "temperature": 0,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        })
    }

    async fn call(&self, dish_name: &str, ingredients: &[String]) -> Result<String, String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(dish_name, ingredients))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("status {}", status));
        }

        let body: Value = response.json().await.map_err(|e| e.to_string())?;
        body.pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| "response has no message content".to_string())
    }
}

#[async_trait]
impl InferenceClient for ChatCompletionsInference {
    async fn enrich(&self, dish_name: &str, ingredients: &[String]) -> Option<Vec<EnrichedIngredient>> {
        let content = match tokio::time::timeout(self.timeout, self.call(dish_name, ingredients)).await {
            Ok(Ok(content)) => content,
            Ok(Err(e)) => {
                warn!(dish = dish_name, "Inference call failed: {}", e);
                return None;
            }
            Err(_) => {
                warn!(dish = dish_name, timeout_ms = self.timeout.as_millis() as u64, "Inference call timed out");
                return None;
            }
        };

        let parsed = parse_enrichment(&content, ingredients.len());
        if parsed.is_none() {
            debug!(dish = dish_name, "Inference response rejected");
        }
        parsed
    }
}

/// Remove a surrounding Markdown code fence (```json ... ```)
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Validate an inference reply against the request
///
/// Accepts a bare array or `{"ingredients": [...]}`. Rejects the whole reply
/// when the length differs, a weight is not a positive number, or a category
/// label is unrecognised.
pub fn parse_enrichment(content: &str, expected_len: usize) -> Option<Vec<EnrichedIngredient>> {
    let value: Value = serde_json::from_str(strip_code_fence(content)).ok()?;
    let entries = match &value {
        Value::Array(entries) => entries,
        Value::Object(map) => map.get("ingredients")?.as_array()?,
        _ => return None,
    };

    if entries.len() != expected_len {
        return None;
    }

    entries.iter().map(parse_entry).collect()
}

fn parse_entry(entry: &Value) -> Option<EnrichedIngredient> {
    let weight = entry
        .get("weight_grams")
        .or_else(|| entry.get("weight"))
        .and_then(Value::as_f64)
        .filter(|w| w.is_finite() && *w > 0.0)?;

    let category = Category::parse(entry.get("category")?.as_str()?)?;

    let label = |key: &str| {
        entry
            .get(key)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_lowercase().replace([' ', '-'], "_"))
            .filter(|s| !s.is_empty())
    };

    Some(EnrichedIngredient {
        name: entry
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        weight_grams: weight,
        category,
        processing: label("processing"),
        origin: label("origin"),
        season: label("season"),
    })
}
