//! Integration tests for configuration resolution
//!
//! Provider credentials resolve Database → ENV → TOML.
//!
//! Note: tests touching `FOODPRINT_*_API_KEY` variables are `#[serial]` so
//! they never observe each other's environment.

mod helpers;

use foodprint_ce::config::{
    build_inference_client, provider_env_var, resolve_provider_api_key, resolve_source_settings,
    sync_provider_key_to_toml,
};
use foodprint_ce::db::settings::set_provider_api_key;
use foodprint_ce::enrichment::InferenceClient;
use foodprint_ce::sources::DEFAULT_PRIORITY;
use foodprint_common::config::{load_toml_config, InferenceConfig, ProviderConfig, TomlConfig};
use serial_test::serial;
use tempfile::TempDir;

fn toml_with_key(provider: &str, key: &str) -> TomlConfig {
    let mut config = TomlConfig::default();
    config.providers.insert(
        provider.to_string(),
        ProviderConfig {
            api_key: Some(key.to_string()),
            ..Default::default()
        },
    );
    config
}

#[tokio::test]
#[serial]
async fn test_database_overrides_env_and_toml() {
    let pool = helpers::create_test_pool().await.unwrap();
    set_provider_api_key(&pool, "climatiq", "db-key".to_string())
        .await
        .unwrap();
    std::env::set_var(provider_env_var("climatiq"), "env-key");

    let result = resolve_provider_api_key(&pool, &toml_with_key("climatiq", "toml-key"), "climatiq")
        .await
        .unwrap();
    assert_eq!(result.as_deref(), Some("db-key"));

    std::env::remove_var(provider_env_var("climatiq"));
}

#[tokio::test]
#[serial]
async fn test_env_fallback_when_database_empty() {
    let pool = helpers::create_test_pool().await.unwrap();
    std::env::set_var(provider_env_var("carbon_cloud"), "env-key");

    let result = resolve_provider_api_key(&pool, &toml_with_key("carbon_cloud", "toml-key"), "carbon_cloud")
        .await
        .unwrap();
    assert_eq!(result.as_deref(), Some("env-key"));

    std::env::remove_var(provider_env_var("carbon_cloud"));
}

#[tokio::test]
#[serial]
async fn test_toml_fallback_when_database_and_env_empty() {
    let pool = helpers::create_test_pool().await.unwrap();
    std::env::remove_var(provider_env_var("my_emissions"));

    let result = resolve_provider_api_key(&pool, &toml_with_key("my_emissions", "toml-key"), "my_emissions")
        .await
        .unwrap();
    assert_eq!(result.as_deref(), Some("toml-key"));
}

#[tokio::test]
#[serial]
async fn test_whitespace_keys_are_ignored() {
    let pool = helpers::create_test_pool().await.unwrap();
    set_provider_api_key(&pool, "climatiq", "   ".to_string())
        .await
        .unwrap();
    std::env::set_var(provider_env_var("climatiq"), "");

    let result = resolve_provider_api_key(&pool, &toml_with_key("climatiq", "toml-key"), "climatiq")
        .await
        .unwrap();
    assert_eq!(result.as_deref(), Some("toml-key"));

    std::env::remove_var(provider_env_var("climatiq"));
}

#[tokio::test]
#[serial]
async fn test_no_key_anywhere_is_none() {
    let pool = helpers::create_test_pool().await.unwrap();
    std::env::remove_var(provider_env_var("climatiq"));

    let result = resolve_provider_api_key(&pool, &TomlConfig::default(), "climatiq")
        .await
        .unwrap();
    assert_eq!(result, None);
}

#[tokio::test]
#[serial]
async fn test_source_settings_follow_priority_and_enabled_flag() {
    let pool = helpers::create_test_pool().await.unwrap();
    let mut config = TomlConfig::default();
    config.providers.insert(
        "open_food_facts".to_string(),
        ProviderConfig {
            enabled: Some(false),
            ..Default::default()
        },
    );

    let settings = resolve_source_settings(&pool, &config).await.unwrap();

    let names: Vec<&str> = settings.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, DEFAULT_PRIORITY.to_vec());
    let off = settings.iter().find(|s| s.name == "open_food_facts").unwrap();
    assert!(!off.enabled);
    assert!(settings.iter().filter(|s| s.name != "open_food_facts").all(|s| s.enabled));
}

#[test]
fn test_toml_sync_creates_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("foodprint-ce.toml");

    sync_provider_key_to_toml("climatiq", "ck-new", &path).unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(
        config.providers.get("climatiq").and_then(|p| p.api_key.as_deref()),
        Some("ck-new")
    );
}

#[test]
fn test_toml_sync_preserves_other_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("foodprint-ce.toml");
    std::fs::write(
        &path,
        r#"
port = 6000

[logging]
level = "debug"

[providers.agribalyse]
base_url = "http://localhost:9000"
"#,
    )
    .unwrap();

    sync_provider_key_to_toml("carbon_cloud", "cc-key", &path).unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.port, Some(6000));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.providers.get("agribalyse").and_then(|p| p.base_url.as_deref()),
        Some("http://localhost:9000")
    );
    assert_eq!(
        config.providers.get("carbon_cloud").and_then(|p| p.api_key.as_deref()),
        Some("cc-key")
    );
}

#[tokio::test]
#[serial]
async fn test_inference_disabled_without_credential() {
    std::env::remove_var(foodprint_ce::config::INFERENCE_API_KEY_ENV);
    let client = build_inference_client(&InferenceConfig {
        endpoint: Some("http://127.0.0.1:9/v1".to_string()),
        ..Default::default()
    });

    let answer = client.enrich("Stew", &["beef".to_string()]).await;
    assert!(answer.is_none());
}
