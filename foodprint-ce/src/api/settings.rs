//! Settings API endpoint
//!
//! Provides POST /api/settings/provider_key for provider credentials

use crate::sources::{build_ranked_sources, DEFAULT_PRIORITY};
use crate::{ApiError, ApiResult, AppState};
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Request payload for setting a provider credential
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetProviderKeyRequest {
    /// Provider name ("climatiq", "carbon_cloud", ...)
    pub provider: String,
    /// The credential to store
    pub api_key: String,
}

/// Response payload for credential configuration
#[derive(Debug, Serialize)]
pub struct SetProviderKeyResponse {
    /// Whether the operation succeeded
    pub success: bool,
    /// Human-readable status message
    pub message: String,
    /// Active providers after the change, in priority order
    pub providers: Vec<&'static str>,
}

/// POST /api/settings/provider_key handler
///
/// **Request:** `{"provider": "climatiq", "apiKey": "..."}`
///
/// **Behavior:**
/// 1. Validate provider name and key
/// 2. Write to database (authoritative)
/// 3. Sync to TOML (best-effort backup)
/// 4. Rebuild the resolver's ranked provider list
///
/// **Errors:**
/// - 400 Bad Request: unknown provider, empty or whitespace-only key
/// - 500 Internal Server Error: database write failure
pub async fn set_provider_key(
    State(state): State<AppState>,
    Json(payload): Json<SetProviderKeyRequest>,
) -> ApiResult<Json<SetProviderKeyResponse>> {
    let provider = payload.provider.trim().to_lowercase();
    if !DEFAULT_PRIORITY.contains(&provider.as_str()) {
        return Err(ApiError::BadRequest(format!(
            "Unknown provider '{}', expected one of: {}",
            payload.provider,
            DEFAULT_PRIORITY.join(", ")
        )));
    }

    if !crate::config::is_valid_key(&payload.api_key) {
        return Err(ApiError::BadRequest(
            "API key cannot be empty or whitespace-only".to_string(),
        ));
    }
    let api_key = payload.api_key.trim().to_string();

    if let Err(e) = crate::db::settings::set_provider_api_key(&state.db, &provider, api_key.clone()).await {
        let message = format!("Failed to save API key to database: {}", e);
        *state.last_error.write().await = Some(message.clone());
        return Err(ApiError::Internal(message));
    }

    info!(provider = %provider, "Provider API key configured");

    if let Some(toml_path) = state.config_path.as_deref() {
        if let Err(e) = crate::config::sync_provider_key_to_toml(&provider, &api_key, toml_path) {
            warn!(provider = %provider, "TOML sync failed (database write succeeded): {}", e);
        }
    }

    let settings = crate::config::resolve_source_settings(&state.db, &state.toml_config).await?;
    let resolver = state.engine.resolver();
    resolver
        .replace_sources(build_ranked_sources(&settings, state.client_timeout))
        .await;

    Ok(Json(SetProviderKeyResponse {
        success: true,
        message: format!("{} API key configured successfully", provider),
        providers: resolver.source_names().await,
    }))
}

/// Build settings routes
pub fn settings_routes() -> Router<AppState> {
    Router::new().route("/api/settings/provider_key", post(set_provider_key))
}
