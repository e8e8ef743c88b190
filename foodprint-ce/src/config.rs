//! Configuration resolution for foodprint-ce
//!
//! Provider credentials resolve Database → ENV → TOML. Engine tuning and the
//! inference client come from the TOML file with compiled defaults.

use crate::aggregator::AggregationPolicy;
use crate::engine::EngineSettings;
use crate::enrichment::{ChatCompletionsInference, DisabledInference, InferenceClient, DEFAULT_INFERENCE_TIMEOUT};
use crate::sources::{SourceSettings, DEFAULT_PRIORITY};
use crate::sync::DEFAULT_SYNC_INTERVAL;
use foodprint_common::config::{EngineConfig, InferenceConfig, SyncConfig, TomlConfig};
use foodprint_common::{Error, Result};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Environment variable carrying the inference service credential
pub const INFERENCE_API_KEY_ENV: &str = "FOODPRINT_INFERENCE_API_KEY";

/// Environment variable carrying a provider credential
///
/// `carbon_cloud` → `FOODPRINT_CARBON_CLOUD_API_KEY`
pub fn provider_env_var(provider: &str) -> String {
    format!("FOODPRINT_{}_API_KEY", provider.to_uppercase())
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve one provider credential
///
/// **Priority:** Database → ENV → TOML. `None` when no tier has a valid key;
/// public providers need none.
pub async fn resolve_provider_api_key(
    db: &Pool<Sqlite>,
    toml_config: &TomlConfig,
    provider: &str,
) -> Result<Option<String>> {
    let db_key = crate::db::settings::get_provider_api_key(db, provider)
        .await?
        .filter(|k| is_valid_key(k));
    let env_key = std::env::var(provider_env_var(provider))
        .ok()
        .filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .providers
        .get(provider)
        .and_then(|p| p.api_key.clone())
        .filter(|k| is_valid_key(k));

    let sources: Vec<&str> = [
        db_key.as_ref().map(|_| "database"),
        env_key.as_ref().map(|_| "environment"),
        toml_key.as_ref().map(|_| "TOML"),
    ]
    .into_iter()
    .flatten()
    .collect();

    if sources.len() > 1 {
        warn!(
            provider,
            "API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    match sources.first() {
        Some(source) => info!(provider, "API key loaded from {}", source),
        None => debug!(provider, "No API key configured"),
    }

    Ok(db_key.or(env_key).or(toml_key))
}

/// Settings for every known provider in default priority order
pub async fn resolve_source_settings(
    db: &Pool<Sqlite>,
    toml_config: &TomlConfig,
) -> Result<Vec<SourceSettings>> {
    let mut settings = Vec::with_capacity(DEFAULT_PRIORITY.len());

    for name in DEFAULT_PRIORITY {
        let provider = toml_config.providers.get(name);
        settings.push(SourceSettings {
            name: name.to_string(),
            api_key: resolve_provider_api_key(db, toml_config, name).await?,
            base_url: provider.and_then(|p| p.base_url.clone()),
            enabled: provider.and_then(|p| p.enabled).unwrap_or(true),
        });
    }

    for name in toml_config.providers.keys() {
        if !DEFAULT_PRIORITY.contains(&name.as_str()) {
            warn!(provider = %name, "Ignoring unknown provider in TOML config");
        }
    }

    Ok(settings)
}

/// Engine tuning with compiled defaults for absent fields
pub fn engine_settings(config: &EngineConfig) -> EngineSettings {
    let defaults = EngineSettings::default();
    let secs = |value: Option<u64>, default: Duration| {
        value.filter(|s| *s > 0).map(Duration::from_secs).unwrap_or(default)
    };

    let default_policy = AggregationPolicy::default();
    let policy = AggregationPolicy {
        saved_ratio: config
            .saved_ratio
            .filter(|r| r.is_finite() && *r >= 0.0)
            .unwrap_or(default_policy.saved_ratio),
        perishable_boost: config
            .perishable_boost
            .filter(|b| b.is_finite() && *b > 0.0)
            .unwrap_or(default_policy.perishable_boost),
        perishable_keywords: config
            .perishable_keywords
            .as_ref()
            .map(|words| words.iter().map(|w| w.trim().to_lowercase()).filter(|w| !w.is_empty()).collect())
            .unwrap_or(default_policy.perishable_keywords),
    };

    EngineSettings {
        factor_cache_ttl: secs(config.factor_cache_ttl_secs, defaults.factor_cache_ttl),
        result_cache_ttl: secs(config.result_cache_ttl_secs, defaults.result_cache_ttl),
        client_timeout: secs(config.client_timeout_secs, defaults.client_timeout),
        request_deadline: secs(config.request_deadline_secs, defaults.request_deadline),
        max_concurrency: config
            .max_concurrency
            .filter(|c| *c > 0)
            .unwrap_or(defaults.max_concurrency),
        max_lock_wait_ms: config
            .database_max_lock_wait_ms
            .unwrap_or(defaults.max_lock_wait_ms),
        policy,
    }
}

/// Refresh interval, `None` when the refresh job is disabled
pub fn sync_interval(config: &SyncConfig) -> Option<Duration> {
    if config.enabled == Some(false) {
        return None;
    }
    Some(
        config
            .interval_hours
            .filter(|h| *h > 0)
            .map(|h| Duration::from_secs(h * 60 * 60))
            .unwrap_or(DEFAULT_SYNC_INTERVAL),
    )
}

/// Inference client from configuration
///
/// Without an endpoint and a credential (ENV → TOML) enrichment is disabled
/// and every calculation takes the deterministic path.
pub fn build_inference_client(config: &InferenceConfig) -> Arc<dyn InferenceClient> {
    let api_key = std::env::var(INFERENCE_API_KEY_ENV)
        .ok()
        .filter(|k| is_valid_key(k))
        .or_else(|| config.api_key.clone().filter(|k| is_valid_key(k)));

    match (config.endpoint.as_deref(), api_key) {
        (Some(endpoint), Some(api_key)) if !endpoint.trim().is_empty() => {
            let timeout = config
                .timeout_secs
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_INFERENCE_TIMEOUT);
            info!(endpoint, timeout_secs = timeout.as_secs(), "Inference enrichment enabled");
            Arc::new(ChatCompletionsInference::new(
                endpoint,
                config.model.as_deref(),
                api_key,
                timeout,
            ))
        }
        (Some(_), None) => {
            warn!("Inference endpoint configured without credential, enrichment disabled");
            Arc::new(DisabledInference)
        }
        _ => {
            debug!("Inference enrichment not configured");
            Arc::new(DisabledInference)
        }
    }
}

// ============================================================================
// Settings Write-Back
// ============================================================================

/// Copy a provider credential into the TOML file (best-effort backup)
///
/// A failed write is logged and swallowed; the database copy is authoritative.
pub fn sync_provider_key_to_toml(provider: &str, key: &str, toml_path: &Path) -> Result<()> {
    let mut config = if toml_path.exists() {
        let content = std::fs::read_to_string(toml_path)
            .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?
    } else {
        TomlConfig::default()
    };

    config
        .providers
        .entry(provider.to_string())
        .or_default()
        .api_key = Some(key.to_string());

    match foodprint_common::config::write_toml_config(&config, toml_path) {
        Ok(()) => {
            info!(provider, "Provider key synced to TOML: {}", toml_path.display());
            Ok(())
        }
        Err(e) => {
            warn!(provider, "TOML write failed (database write succeeded): {}", e);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_env_var() {
        assert_eq!(provider_env_var("climatiq"), "FOODPRINT_CLIMATIQ_API_KEY");
        assert_eq!(provider_env_var("carbon_cloud"), "FOODPRINT_CARBON_CLOUD_API_KEY");
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("abc"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }

    #[test]
    fn test_engine_defaults() {
        let settings = engine_settings(&EngineConfig::default());
        assert_eq!(settings.factor_cache_ttl, Duration::from_secs(3600));
        assert_eq!(settings.result_cache_ttl, Duration::from_secs(300));
        assert_eq!(settings.client_timeout, Duration::from_secs(10));
        assert_eq!(settings.max_concurrency, 8);
        assert_eq!(settings.policy, AggregationPolicy::default());
    }

    #[test]
    fn test_engine_overrides() {
        let config = EngineConfig {
            client_timeout_secs: Some(3),
            max_concurrency: Some(0),
            saved_ratio: Some(0.5),
            perishable_keywords: Some(vec![" Tofu ".into(), "".into()]),
            ..Default::default()
        };
        let settings = engine_settings(&config);
        assert_eq!(settings.client_timeout, Duration::from_secs(3));
        assert_eq!(settings.max_concurrency, 8, "zero concurrency falls back");
        assert_eq!(settings.policy.saved_ratio, 0.5);
        assert_eq!(settings.policy.perishable_keywords, vec!["tofu".to_string()]);
    }

    #[test]
    fn test_sync_interval() {
        assert_eq!(sync_interval(&SyncConfig::default()), Some(DEFAULT_SYNC_INTERVAL));
        let hourly = SyncConfig {
            interval_hours: Some(1),
            enabled: None,
        };
        assert_eq!(sync_interval(&hourly), Some(Duration::from_secs(3600)));
        let off = SyncConfig {
            interval_hours: None,
            enabled: Some(false),
        };
        assert_eq!(sync_interval(&off), None);
    }
}
