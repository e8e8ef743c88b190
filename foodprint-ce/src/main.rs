//! foodprint-ce - Carbon Engine microservice
//!
//! **Module Identity:**
//! - Name: foodprint-ce (Carbon Engine)
//! - Port: 5790
//!
//! Estimates the CO2-equivalent footprint of a dish from its free-text
//! ingredient list and serves it over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use foodprint_common::config::{
    default_config_path, load_toml_config, RootFolderInitializer, RootFolderResolver, DEFAULT_PORT,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use foodprint_ce::cache::MemoryCache;
use foodprint_ce::db::SqliteFactorStore;
use foodprint_ce::reference::ReferenceData;
use foodprint_ce::resolver::EmissionFactorResolver;
use foodprint_ce::types::ResolvedFactor;
use foodprint_ce::sources::build_ranked_sources;
use foodprint_ce::sync::{seed_emission_factors, seed_reference_tables, RefreshJob};
use foodprint_ce::{config, AppState, CarbonEngine};

const SERVICE_NAME: &str = "foodprint-ce";

/// Command-line arguments for foodprint-ce
#[derive(Parser, Debug)]
#[command(name = "foodprint-ce")]
#[command(about = "Carbon footprint engine for surplus-food dishes")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides TOML `port`)
    #[arg(short, long, env = "FOODPRINT_CE_PORT")]
    port: Option<u16>,

    /// Root folder holding the reference store database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Bootstrap TOML config file
    #[arg(short, long, env = "FOODPRINT_CE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| default_config_path(SERVICE_NAME));
    let toml_config = load_toml_config(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;

    // RUST_LOG wins over the TOML level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("foodprint_ce={0},foodprint_common={0},tower_http=info", toml_config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting foodprint-ce (Carbon Engine) microservice");
    info!(
        "Version: {} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Config: {}", config_path.display());

    // Step 1: Resolve and create root folder
    let root_folder = RootFolderResolver::new(SERVICE_NAME)
        .with_cli_arg(args.root_folder.clone())
        .with_toml_config(&toml_config)
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    // Step 2: Open or create the reference store
    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let db_pool = foodprint_ce::db::init_database_pool(&db_path).await?;

    // Step 3: Reference tables, written once on first run
    seed_reference_tables(&db_pool)
        .await
        .context("Failed to seed reference tables")?;
    let reference = match foodprint_ce::db::reference::load_reference_data(&db_pool).await {
        Ok(reference) if !reference.taxonomy.is_empty() => reference,
        Ok(_) => {
            warn!("Stored taxonomy is empty, using built-in reference tables");
            ReferenceData::builtin()
        }
        Err(e) => {
            warn!("Could not load reference tables ({}), using built-in ones", e);
            ReferenceData::builtin()
        }
    };
    let reference = Arc::new(reference);

    // Step 4: Resolver, providers, inference and engine
    let settings = config::engine_settings(&toml_config.engine);
    let source_settings = config::resolve_source_settings(&db_pool, &toml_config).await?;
    let sources = build_ranked_sources(&source_settings, settings.client_timeout);
    info!(
        providers = ?sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
        "Emission data providers ranked"
    );

    let store = Arc::new(SqliteFactorStore::new(db_pool.clone(), settings.max_lock_wait_ms));
    seed_emission_factors(store.as_ref(), &reference)
        .await
        .context("Failed to seed emission factors")?;
    let resolver = Arc::new(EmissionFactorResolver::new(
        Arc::new(MemoryCache::<ResolvedFactor>::new(settings.factor_cache_ttl)),
        store,
        sources,
        settings.client_timeout,
    ));
    let inference = config::build_inference_client(&toml_config.inference);
    let engine = Arc::new(CarbonEngine::new(
        Arc::clone(&reference),
        Arc::clone(&resolver),
        inference,
        &settings,
    ));

    // Step 5: Background provider pull and refresh
    let cancel = CancellationToken::new();
    let refresh = match config::sync_interval(&toml_config.sync) {
        Some(interval) => {
            let job = RefreshJob::new(db_pool.clone(), Arc::clone(&resolver), &reference, interval);
            let cancel = cancel.clone();
            Some(tokio::spawn(async move {
                job.pull_initial_data().await;
                job.run(cancel).await;
            }))
        }
        None => {
            info!("Provider refresh disabled");
            None
        }
    };

    // Step 6: HTTP server
    let port = args.port.or(toml_config.port).unwrap_or(DEFAULT_PORT);
    let client_timeout = settings.client_timeout;
    let state = AppState::new(db_pool, engine, toml_config)
        .with_config_path(config_path)
        .with_client_timeout(client_timeout);
    let app = foodprint_ce::build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    cancel.cancel();
    if let Some(handle) = refresh {
        if let Err(e) = handle.await {
            warn!("Refresh task ended abnormally: {}", e);
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
