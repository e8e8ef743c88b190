//! Settings database operations
//!
//! Key/value accessors over the `settings` table: provider credentials and
//! per-provider refresh timestamps.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};
use foodprint_common::{Error, Result};

/// Settings key holding a provider's API key
pub fn provider_key_setting(provider: &str) -> String {
    format!("{}_api_key", provider)
}

/// Settings key holding a provider's last successful refresh
pub fn sync_timestamp_setting(provider: &str) -> String {
    format!("sync_last_{}", provider)
}

/// Get a provider API key from database
///
/// **Returns:** Some(key) if set and non-empty, None otherwise
pub async fn get_provider_api_key(db: &Pool<Sqlite>, provider: &str) -> Result<Option<String>> {
    let key: Option<String> = get_setting(db, &provider_key_setting(provider)).await?;
    Ok(key.filter(|k| !k.trim().is_empty()))
}

/// Set a provider API key in database
pub async fn set_provider_api_key(db: &Pool<Sqlite>, provider: &str, key: String) -> Result<()> {
    set_setting(db, &provider_key_setting(provider), key).await
}

/// Last successful refresh of a provider
pub async fn get_sync_timestamp(db: &Pool<Sqlite>, provider: &str) -> Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = get_setting(db, &sync_timestamp_setting(provider)).await?;
    match raw {
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| Error::Config(format!("Invalid sync timestamp for {}: {}", provider, e))),
        None => Ok(None),
    }
}

/// Record a provider refresh
pub async fn set_sync_timestamp(db: &Pool<Sqlite>, provider: &str, at: DateTime<Utc>) -> Result<()> {
    set_setting(db, &sync_timestamp_setting(provider), at.to_rfc3339()).await
}

/// Generic setting getter
///
/// A NULL value reads as unset.
pub async fn get_setting<T>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let row: Option<(Option<String>,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await
        .map_err(Error::Database)?;

    match row {
        Some((Some(value),)) => {
            let parsed = value
                .parse::<T>()
                .map_err(|e| Error::Config(format!("Parse setting '{}' failed: {}", key, e)))?;
            Ok(Some(parsed))
        }
        _ => Ok(None),
    }
}

/// Generic setting setter (upsert)
pub async fn set_setting<T>(db: &Pool<Sqlite>, key: &str, value: T) -> Result<()>
where
    T: std::fmt::Display,
{
    sqlx::query(
        "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await
    .map_err(Error::Database)?;

    Ok(())
}
