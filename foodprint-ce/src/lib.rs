//! foodprint-ce library interface
//!
//! Carbon engine: classifies free-text ingredients, resolves emission factors
//! through cache → store → providers → fallbacks, applies adjustment factors
//! and aggregates a dish-level estimate with an uncertainty band.

pub mod aggregator;
pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod engine;
pub mod enrichment;
pub mod error;
pub mod factors;
pub mod portion;
pub mod reference;
pub mod resolver;
pub mod sources;
pub mod store;
pub mod sync;
pub mod taxonomy;
pub mod types;
pub mod uncertainty;
pub mod utils;

pub use crate::engine::{CalculationRequest, CarbonEngine, EngineSettings};
pub use crate::error::{ApiError, ApiResult, EngineError};

use axum::Router;
use chrono::{DateTime, Utc};
use foodprint_common::config::TomlConfig;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Reference store connection pool
    pub db: SqlitePool,
    /// Calculation engine (owns the resolver)
    pub engine: Arc<CarbonEngine>,
    /// Bootstrap configuration as loaded at startup
    pub toml_config: Arc<TomlConfig>,
    /// TOML file receiving credential backups, if any
    pub config_path: Option<PathBuf>,
    /// Per-call provider timeout used when rebuilding providers
    pub client_timeout: Duration,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(db: SqlitePool, engine: Arc<CarbonEngine>, toml_config: TomlConfig) -> Self {
        Self {
            db,
            engine,
            toml_config: Arc::new(toml_config),
            config_path: None,
            client_timeout: sources::DEFAULT_CLIENT_TIMEOUT,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn with_client_timeout(mut self, timeout: Duration) -> Self {
        self.client_timeout = timeout;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::emissions_routes())
        .merge(api::settings_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
