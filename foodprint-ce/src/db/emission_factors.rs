//! Emission factor record persistence
//!
//! Rows are unique on (category, item, country) and only ever superseded.
//! Writes go through [`retry_on_lock`] because request handlers and the
//! refresh job write concurrently.

use crate::store::FactorStore;
use crate::types::EmissionFactorRecord;
use crate::utils::retry_on_lock;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use foodprint_common::{Error, Result};
use sqlx::{Row, SqlitePool};

/// Load one record
pub async fn load_emission_factor(
    pool: &SqlitePool,
    category: &str,
    item: &str,
    country: &str,
) -> Result<Option<EmissionFactorRecord>> {
    let row = sqlx::query(
        r#"
        SELECT category, item, country, value_kg_co2e_per_kg, source, last_updated, metadata
        FROM emission_factors
        WHERE category = ? AND item = ? AND country = ?
        "#,
    )
    .bind(category)
    .bind(item)
    .bind(country)
    .fetch_optional(pool)
    .await?;

    row.map(|row| -> Result<EmissionFactorRecord> {
        let last_updated: String = row.get("last_updated");
        let metadata: String = row.get("metadata");

        Ok(EmissionFactorRecord {
            category: row.get("category"),
            item: row.get("item"),
            country: row.get("country"),
            value_kg_co2e_per_kg: row.get("value_kg_co2e_per_kg"),
            source: row.get("source"),
            last_updated: DateTime::parse_from_rfc3339(&last_updated)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| Error::Internal(format!("Invalid last_updated '{}': {}", last_updated, e)))?,
            metadata: serde_json::from_str(&metadata).unwrap_or_else(|_| serde_json::json!({})),
        })
    })
    .transpose()
}

/// Insert or supersede one record
pub async fn save_emission_factor(pool: &SqlitePool, record: &EmissionFactorRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO emission_factors (
            category, item, country, value_kg_co2e_per_kg, source, last_updated, metadata
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(category, item, country) DO UPDATE SET
            value_kg_co2e_per_kg = excluded.value_kg_co2e_per_kg,
            source = excluded.source,
            last_updated = excluded.last_updated,
            metadata = excluded.metadata
        "#,
    )
    .bind(&record.category)
    .bind(&record.item)
    .bind(&record.country)
    .bind(record.value_kg_co2e_per_kg)
    .bind(&record.source)
    .bind(record.last_updated.to_rfc3339())
    .bind(record.metadata.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert or supersede many records in one transaction
pub async fn save_emission_factors(pool: &SqlitePool, records: &[EmissionFactorRecord]) -> Result<usize> {
    let mut tx = pool.begin().await?;

    for record in records {
        sqlx::query(
            r#"
            INSERT INTO emission_factors (
                category, item, country, value_kg_co2e_per_kg, source, last_updated, metadata
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(category, item, country) DO UPDATE SET
                value_kg_co2e_per_kg = excluded.value_kg_co2e_per_kg,
                source = excluded.source,
                last_updated = excluded.last_updated,
                metadata = excluded.metadata
            "#,
        )
        .bind(&record.category)
        .bind(&record.item)
        .bind(&record.country)
        .bind(record.value_kg_co2e_per_kg)
        .bind(&record.source)
        .bind(record.last_updated.to_rfc3339())
        .bind(record.metadata.to_string())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(records.len())
}

/// Mean value of a category, `None` when it has no rows
pub async fn category_average(pool: &SqlitePool, category: &str) -> Result<Option<f64>> {
    let avg: Option<f64> =
        sqlx::query_scalar("SELECT AVG(value_kg_co2e_per_kg) FROM emission_factors WHERE category = ?")
            .bind(category)
            .fetch_one(pool)
            .await?;
    Ok(avg)
}

/// Total number of records
pub async fn count_emission_factors(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM emission_factors")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// [`FactorStore`] over the SQLite reference store
#[derive(Clone)]
pub struct SqliteFactorStore {
    pool: SqlitePool,
    max_lock_wait_ms: u64,
}

impl SqliteFactorStore {
    pub fn new(pool: SqlitePool, max_lock_wait_ms: u64) -> Self {
        Self {
            pool,
            max_lock_wait_ms,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl FactorStore for SqliteFactorStore {
    async fn get(
        &self,
        category: &str,
        item: &str,
        country: &str,
    ) -> Result<Option<EmissionFactorRecord>> {
        load_emission_factor(&self.pool, category, item, country).await
    }

    async fn category_average(&self, category: &str) -> Result<Option<f64>> {
        category_average(&self.pool, category).await
    }

    async fn upsert(&self, record: &EmissionFactorRecord) -> Result<()> {
        retry_on_lock("upsert emission factor", self.max_lock_wait_ms, || {
            save_emission_factor(&self.pool, record)
        })
        .await
    }

    async fn upsert_many(&self, records: &[EmissionFactorRecord]) -> Result<usize> {
        retry_on_lock("upsert emission factors", self.max_lock_wait_ms, || {
            save_emission_factors(&self.pool, records)
        })
        .await
    }

    async fn count(&self) -> Result<i64> {
        count_emission_factors(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        foodprint_common::db::init::create_all_tables(&pool).await.unwrap();
        pool
    }

    fn record(category: &str, item: &str, country: &str, value: f64) -> EmissionFactorRecord {
        EmissionFactorRecord {
            category: category.into(),
            item: item.into(),
            country: country.into(),
            value_kg_co2e_per_kg: value,
            source: "agribalyse".into(),
            last_updated: Utc::now(),
            metadata: serde_json::json!({"quality": "primary_research"}),
        }
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let pool = setup_test_db().await;
        save_emission_factor(&pool, &record("meat", "beef", "fr", 33.0)).await.unwrap();

        let loaded = load_emission_factor(&pool, "meat", "beef", "fr").await.unwrap().unwrap();
        assert_eq!(loaded.value_kg_co2e_per_kg, 33.0);
        assert_eq!(loaded.metadata["quality"], "primary_research");

        assert!(load_emission_factor(&pool, "meat", "beef", "gb").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_supersedes_without_duplicates() {
        let pool = setup_test_db().await;
        let store = SqliteFactorStore::new(pool, 1_000);

        store.upsert(&record("dairy", "milk", "global", 3.2)).await.unwrap();
        store.upsert(&record("dairy", "milk", "global", 2.9)).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let milk = store.get("dairy", "milk", "global").await.unwrap().unwrap();
        assert_eq!(milk.value_kg_co2e_per_kg, 2.9);
    }

    #[tokio::test]
    async fn test_category_average() {
        let pool = setup_test_db().await;
        let store = SqliteFactorStore::new(pool, 1_000);

        assert_eq!(store.category_average("grains").await.unwrap(), None);

        store
            .upsert_many(&[
                record("grains", "rice", "global", 4.0),
                record("grains", "oat", "global", 2.0),
            ])
            .await
            .unwrap();

        assert_eq!(store.category_average("grains").await.unwrap(), Some(3.0));
    }
}
