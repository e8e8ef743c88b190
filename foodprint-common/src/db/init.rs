//! Database initialization
//!
//! Creates the structured reference store on first run:
//! - `emission_factors` keyed by (category, item, country), upsert-only
//! - taxonomy and the four adjustment factor tables
//! - `settings` key/value table (credentials, refresh timestamps)
//!
//! All statements are `CREATE TABLE IF NOT EXISTS`, so initialisation is
//! idempotent and safe on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets request handlers read while the refresh job writes
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 250")
        .execute(&pool)
        .await?;

    create_all_tables(&pool).await?;

    Ok(pool)
}

/// Create every reference store table (idempotent)
pub async fn create_all_tables(pool: &SqlitePool) -> Result<()> {
    create_settings_table(pool).await?;
    create_emission_factors_table(pool).await?;
    create_taxonomy_tables(pool).await?;
    create_adjustment_factor_tables(pool).await?;
    Ok(())
}

/// Create the settings table
///
/// Stores application configuration key-value pairs.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the emission factor record table
///
/// Rows are never deleted, only superseded through upsert on the primary key.
pub async fn create_emission_factors_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS emission_factors (
            category TEXT NOT NULL,
            item TEXT NOT NULL,
            country TEXT NOT NULL DEFAULT 'global',
            value_kg_co2e_per_kg REAL NOT NULL,
            source TEXT NOT NULL,
            last_updated TEXT NOT NULL,
            metadata TEXT NOT NULL DEFAULT '{}',
            PRIMARY KEY (category, item, country)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_emission_factors_category ON emission_factors(category)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create taxonomy node and alias tables
pub async fn create_taxonomy_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS taxonomy_nodes (
            name TEXT PRIMARY KEY,
            level TEXT NOT NULL CHECK (level IN ('item', 'subtypology', 'typology')),
            parent TEXT,
            emission_factor REAL NOT NULL,
            uncertainty TEXT NOT NULL CHECK (uncertainty IN ('low', 'high')),
            position INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS taxonomy_aliases (
            alias TEXT PRIMARY KEY,
            item TEXT NOT NULL,
            position INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the seasonal, regional, processing and waste factor tables
pub async fn create_adjustment_factor_tables(pool: &SqlitePool) -> Result<()> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS seasonal_calendar (
            country TEXT NOT NULL,
            item TEXT NOT NULL,
            in_season_months TEXT NOT NULL,
            near_season_months TEXT NOT NULL DEFAULT '',
            PRIMARY KEY (country, item)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS seasonal_factors (
            key TEXT PRIMARY KEY,
            value REAL NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS regional_factors (
            key TEXT PRIMARY KEY,
            value REAL NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS regional_special_cases (
            item TEXT NOT NULL,
            origin TEXT NOT NULL,
            season TEXT NOT NULL,
            value REAL NOT NULL,
            PRIMARY KEY (item, origin, season)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS processing_factors (
            method TEXT NOT NULL,
            category TEXT NOT NULL,
            value REAL NOT NULL,
            PRIMARY KEY (method, category)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS waste_factors (
            category TEXT NOT NULL,
            stage TEXT NOT NULL,
            value REAL NOT NULL,
            PRIMARY KEY (category, stage)
        )
        "#,
    ];

    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

/// Ensure a setting exists, writing the default when missing or NULL
pub async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let current: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    match current {
        Some(Some(_)) => Ok(()),
        Some(None) => {
            sqlx::query("UPDATE settings SET value = ? WHERE key = ?")
                .bind(default_value)
                .bind(key)
                .execute(pool)
                .await?;
            info!("Reset NULL setting '{}' to default: {}", key, default_value);
            Ok(())
        }
        None => {
            sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(default_value)
                .execute(pool)
                .await?;
            info!("Initialized setting '{}' with default value: {}", key, default_value);
            Ok(())
        }
    }
}
