//! Structured emission factor store abstraction
//!
//! The resolver and the refresh job only see [`FactorStore`]. Production uses
//! the SQLite implementation in [`crate::db::emission_factors`]; the in-memory
//! store backs tests and runs without a database.

use crate::types::EmissionFactorRecord;
use async_trait::async_trait;
use foodprint_common::Result;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Emission factor records keyed by (category, item, country)
#[async_trait]
pub trait FactorStore: Send + Sync {
    /// Exact lookup
    async fn get(
        &self,
        category: &str,
        item: &str,
        country: &str,
    ) -> Result<Option<EmissionFactorRecord>>;

    /// Mean stored value for a category, `None` when it has no rows
    async fn category_average(&self, category: &str) -> Result<Option<f64>>;

    /// Insert or supersede one record
    async fn upsert(&self, record: &EmissionFactorRecord) -> Result<()>;

    /// Insert or supersede many records, returning how many were written
    async fn upsert_many(&self, records: &[EmissionFactorRecord]) -> Result<usize> {
        for record in records {
            self.upsert(record).await?;
        }
        Ok(records.len())
    }

    /// Total number of records
    async fn count(&self) -> Result<i64>;
}

type Key = (String, String, String);

/// Process-local store
#[derive(Default)]
pub struct InMemoryFactorStore {
    records: RwLock<BTreeMap<Key, EmissionFactorRecord>>,
}

impl InMemoryFactorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = EmissionFactorRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|r| ((r.category.clone(), r.item.clone(), r.country.clone()), r))
            .collect();
        Self {
            records: RwLock::new(map),
        }
    }
}

#[async_trait]
impl FactorStore for InMemoryFactorStore {
    async fn get(
        &self,
        category: &str,
        item: &str,
        country: &str,
    ) -> Result<Option<EmissionFactorRecord>> {
        let key = (category.to_string(), item.to_string(), country.to_string());
        Ok(self.records.read().await.get(&key).cloned())
    }

    async fn category_average(&self, category: &str) -> Result<Option<f64>> {
        let records = self.records.read().await;
        let values: Vec<f64> = records
            .values()
            .filter(|r| r.category == category)
            .map(|r| r.value_kg_co2e_per_kg)
            .collect();

        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
    }

    async fn upsert(&self, record: &EmissionFactorRecord) -> Result<()> {
        let key = (
            record.category.clone(),
            record.item.clone(),
            record.country.clone(),
        );
        self.records.write().await.insert(key, record.clone());
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.records.read().await.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(category: &str, item: &str, country: &str, value: f64) -> EmissionFactorRecord {
        EmissionFactorRecord {
            category: category.into(),
            item: item.into(),
            country: country.into(),
            value_kg_co2e_per_kg: value,
            source: "test".into(),
            last_updated: Utc::now(),
            metadata: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn test_upsert_supersedes() {
        let store = InMemoryFactorStore::new();
        store.upsert(&record("meat", "beef", "gb", 50.0)).await.unwrap();
        store.upsert(&record("meat", "beef", "gb", 48.0)).await.unwrap();

        let found = store.get("meat", "beef", "gb").await.unwrap().unwrap();
        assert_eq!(found.value_kg_co2e_per_kg, 48.0);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_category_average() {
        let store = InMemoryFactorStore::with_records([
            record("grains", "rice", "global", 4.0),
            record("grains", "oat", "global", 2.0),
            record("meat", "beef", "global", 60.0),
        ]);

        assert_eq!(store.category_average("grains").await.unwrap(), Some(3.0));
        assert_eq!(store.category_average("oils").await.unwrap(), None);
    }
}
