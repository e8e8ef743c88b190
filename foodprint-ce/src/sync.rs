//! Reference store population and periodic provider refresh
//!
//! On first run the taxonomy, adjustment tables and taxonomy-derived emission
//! records are written before the server accepts requests. The background
//! job then pulls the bulk dataset of every provider that has never synced
//! and afterwards asks each provider for records changed since its last
//! successful refresh. A provider's sync timestamp only advances once its
//! records are stored.

use crate::db::{reference, settings};
use crate::reference::ReferenceData;
use crate::resolver::EmissionFactorResolver;
use crate::sources::EmissionSource;
use crate::store::FactorStore;
use crate::taxonomy::{normalize, TaxonomyMatcher};
use crate::types::{
    normalize_country, Category, EmissionFactorRecord, TaxonomyLevel, GLOBAL_COUNTRY,
};
use chrono::Utc;
use foodprint_common::Result;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default time between refresh runs
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// `source` of records derived from taxonomy node factors
pub const REFERENCE_SOURCE: &str = "reference_taxonomy";

/// Write the built-in reference tables when the store has none
///
/// Returns whether anything was written.
pub async fn seed_reference_tables(pool: &SqlitePool) -> Result<bool> {
    if !reference::is_reference_empty(pool).await? {
        return Ok(false);
    }
    info!("Reference store is empty, writing built-in taxonomy and adjustment tables");
    reference::save_reference_data(pool, &ReferenceData::builtin()).await?;
    Ok(true)
}

/// Emission records for every item and sub-typology node, country `global`
pub fn taxonomy_records(reference: &ReferenceData) -> Vec<EmissionFactorRecord> {
    let taxonomy = &reference.taxonomy;
    let now = Utc::now();

    taxonomy
        .nodes()
        .iter()
        .filter(|node| node.level != TaxonomyLevel::Typology)
        .filter(|node| node.emission_factor_kg_per_kg.is_finite() && node.emission_factor_kg_per_kg > 0.0)
        .filter_map(|node| {
            let category = taxonomy.category_of(&node.name);
            if category == Category::Unknown {
                return None;
            }
            Some(EmissionFactorRecord {
                category: category.as_str().to_string(),
                item: node.name.clone(),
                country: GLOBAL_COUNTRY.to_string(),
                value_kg_co2e_per_kg: node.emission_factor_kg_per_kg,
                source: REFERENCE_SOURCE.to_string(),
                last_updated: now,
                metadata: serde_json::json!({
                    "quality": node.uncertainty.seeded_quality().as_str(),
                    "level": node.level.as_str(),
                }),
            })
        })
        .collect()
}

/// Write taxonomy-derived emission records into an empty store
///
/// Returns the number of records written; zero when the store already held
/// rows.
pub async fn seed_emission_factors(store: &dyn FactorStore, reference: &ReferenceData) -> Result<usize> {
    if store.count().await? > 0 {
        debug!("Emission factor store already populated");
        return Ok(0);
    }

    let seeded = store.upsert_many(&taxonomy_records(reference)).await?;
    info!(records = seeded, "Seeded emission factors from taxonomy");
    Ok(seeded)
}

/// Re-key a provider record onto the taxonomy so the resolver can find it
///
/// Provider item names ("Beef, minced, raw") are matched like ingredients.
/// Records that match nothing keep their own category when it is a known
/// one and are dropped otherwise.
pub fn canonicalize(matcher: &TaxonomyMatcher, mut record: EmissionFactorRecord) -> Option<EmissionFactorRecord> {
    if !(record.value_kg_co2e_per_kg.is_finite() && record.value_kg_co2e_per_kg > 0.0) {
        return None;
    }

    let matched = matcher.match_ingredient(&record.item);
    match matched.resolution_key() {
        Some(key) if matched.category != Category::Unknown => {
            if let Some(metadata) = record.metadata.as_object_mut() {
                metadata.insert("provider_item".into(), record.item.clone().into());
            }
            record.item = key.to_string();
            record.category = matched.category.as_str().to_string();
        }
        _ => {
            let category = Category::parse(&record.category).filter(|c| *c != Category::Unknown)?;
            let item = normalize(&record.item);
            if item.is_empty() {
                return None;
            }
            record.item = item;
            record.category = category.as_str().to_string();
        }
    }

    record.country = normalize_country(Some(&record.country));
    Some(record)
}

/// Outcome of one refresh pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshSummary {
    pub providers_ok: usize,
    pub providers_failed: usize,
    pub records_written: usize,
}

/// Background population and refresh of emission factor records
pub struct RefreshJob {
    pool: SqlitePool,
    store: Arc<dyn FactorStore>,
    resolver: Arc<EmissionFactorResolver>,
    matcher: TaxonomyMatcher,
    interval: Duration,
}

impl RefreshJob {
    pub fn new(
        pool: SqlitePool,
        resolver: Arc<EmissionFactorResolver>,
        reference: &ReferenceData,
        interval: Duration,
    ) -> Self {
        Self {
            pool,
            store: Arc::clone(resolver.store()),
            resolver,
            matcher: TaxonomyMatcher::new(&reference.taxonomy),
            interval,
        }
    }

    /// Pull the bulk dataset of every provider that has never synced
    pub async fn pull_initial_data(&self) -> RefreshSummary {
        let mut summary = RefreshSummary::default();

        for source in self.resolver.sources().await {
            match settings::get_sync_timestamp(&self.pool, source.name()).await {
                Ok(Some(_)) => continue,
                Ok(None) => {}
                Err(e) => warn!(provider = source.name(), "Ignoring unreadable sync timestamp: {}", e),
            }

            let records = match source.initial_data().await {
                Ok(records) => records,
                Err(e) => {
                    warn!(provider = source.name(), "Initial data unavailable: {}", e);
                    summary.providers_failed += 1;
                    continue;
                }
            };
            self.store_and_mark(source.as_ref(), records, &mut summary).await;
        }

        info!(
            providers_ok = summary.providers_ok,
            providers_failed = summary.providers_failed,
            records = summary.records_written,
            "Initial provider data pulled"
        );
        summary
    }

    /// One pass of `updates_since(last refresh)` over every provider
    pub async fn refresh_once(&self) -> RefreshSummary {
        let mut summary = RefreshSummary::default();

        for source in self.resolver.sources().await {
            let since = match settings::get_sync_timestamp(&self.pool, source.name()).await {
                Ok(Some(at)) => at,
                Ok(None) => Utc::now() - chrono::Duration::from_std(self.interval).unwrap_or_else(|_| chrono::Duration::days(1)),
                Err(e) => {
                    warn!(provider = source.name(), "Ignoring unreadable sync timestamp: {}", e);
                    Utc::now() - chrono::Duration::days(1)
                }
            };

            match source.updates_since(since).await {
                Ok(records) => self.store_and_mark(source.as_ref(), records, &mut summary).await,
                Err(e) => {
                    warn!(provider = source.name(), since = %since, "Refresh failed: {}", e);
                    summary.providers_failed += 1;
                }
            }
        }

        info!(
            providers_ok = summary.providers_ok,
            providers_failed = summary.providers_failed,
            records = summary.records_written,
            "Provider refresh complete"
        );
        summary
    }

    /// Refresh every `interval` until `cancel` fires
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        info!(interval_secs = self.interval.as_secs(), "Provider refresh scheduled");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Provider refresh stopped");
                    break;
                }
                _ = ticker.tick() => {
                    self.refresh_once().await;
                }
            }
        }
    }

    /// Store a provider's records; the sync timestamp moves only on success
    async fn store_and_mark(
        &self,
        source: &dyn EmissionSource,
        records: Vec<EmissionFactorRecord>,
        summary: &mut RefreshSummary,
    ) {
        match self.write_provider_records(source, records).await {
            Ok(written) => {
                summary.records_written += written;
                summary.providers_ok += 1;
                self.mark_synced(source.name()).await;
            }
            Err(e) => {
                warn!(provider = source.name(), "Could not store provider records: {}", e);
                summary.providers_failed += 1;
            }
        }
    }

    async fn write_provider_records(
        &self,
        source: &dyn EmissionSource,
        records: Vec<EmissionFactorRecord>,
    ) -> Result<usize> {
        let received = records.len();
        let canonical: Vec<EmissionFactorRecord> = records
            .into_iter()
            .filter_map(|r| canonicalize(&self.matcher, r))
            .collect();

        let written = self.store.upsert_many(&canonical).await?;
        debug!(provider = source.name(), received, written, "Provider records stored");
        Ok(written)
    }

    async fn mark_synced(&self, provider: &str) {
        if let Err(e) = settings::set_sync_timestamp(&self.pool, provider, Utc::now()).await {
            warn!(provider, "Could not record sync timestamp: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::db::SqliteFactorStore;
    use crate::sources::{provider_record, SourceError};
    use crate::types::DataQuality;
    use async_trait::async_trait;
    use chrono::DateTime;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct BulkSource {
        fail_updates: bool,
        update_calls: AtomicUsize,
    }

    #[async_trait]
    impl EmissionSource for BulkSource {
        fn name(&self) -> &'static str {
            "bulk"
        }

        fn data_quality(&self) -> DataQuality {
            DataQuality::PrimaryResearch
        }

        async fn emission_factor(
            &self,
            _category: Category,
            _item: &str,
            _country: &str,
        ) -> std::result::Result<Option<f64>, SourceError> {
            Ok(None)
        }

        async fn initial_data(&self) -> std::result::Result<Vec<EmissionFactorRecord>, SourceError> {
            Ok(vec![
                provider_record("bulk", DataQuality::PrimaryResearch, "meat", "Beef, minced, raw", "FR", 33.0),
                provider_record("bulk", DataQuality::PrimaryResearch, "unknown", "qwxz", "fr", 1.0),
            ])
        }

        async fn updates_since(&self, _since: DateTime<Utc>) -> std::result::Result<Vec<EmissionFactorRecord>, SourceError> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_updates {
                return Err(SourceError::Network("unreachable".into()));
            }
            Ok(vec![provider_record("bulk", DataQuality::PrimaryResearch, "dairy", "Whole milk", "fr", 1.3)])
        }
    }

    /// Store whose writes always fail
    struct ReadOnlyStore;

    #[async_trait]
    impl FactorStore for ReadOnlyStore {
        async fn get(&self, _category: &str, _item: &str, _country: &str) -> Result<Option<EmissionFactorRecord>> {
            Ok(None)
        }

        async fn category_average(&self, _category: &str) -> Result<Option<f64>> {
            Ok(None)
        }

        async fn upsert(&self, _record: &EmissionFactorRecord) -> Result<()> {
            Err(foodprint_common::Error::Internal("store is read-only".into()))
        }

        async fn count(&self) -> Result<i64> {
            Ok(0)
        }
    }

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        foodprint_common::db::init::create_all_tables(&pool).await.unwrap();
        pool
    }

    fn job_over(pool: &SqlitePool, store: Arc<dyn FactorStore>, source: Arc<BulkSource>) -> RefreshJob {
        let resolver = Arc::new(EmissionFactorResolver::new(
            Arc::new(MemoryCache::<crate::types::ResolvedFactor>::new(Duration::from_secs(60))),
            store,
            vec![source as Arc<dyn EmissionSource>],
            Duration::from_secs(1),
        ));
        RefreshJob::new(pool.clone(), resolver, &ReferenceData::builtin(), DEFAULT_SYNC_INTERVAL)
    }

    fn bulk_source(fail_updates: bool) -> Arc<BulkSource> {
        Arc::new(BulkSource {
            fail_updates,
            update_calls: AtomicUsize::new(0),
        })
    }

    async fn setup(fail_updates: bool) -> (RefreshJob, Arc<BulkSource>, SqlitePool) {
        let pool = test_pool().await;
        let source = bulk_source(fail_updates);
        let store = Arc::new(SqliteFactorStore::new(pool.clone(), 1_000));
        let job = job_over(&pool, store, source.clone());
        (job, source, pool)
    }

    #[test]
    fn test_taxonomy_records_cover_items_and_subtypologies() {
        let reference = ReferenceData::builtin();
        let records = taxonomy_records(&reference);

        let beef = records.iter().find(|r| r.item == "beef").unwrap();
        assert_eq!(beef.category, "meat");
        assert_eq!(beef.country, GLOBAL_COUNTRY);
        assert_eq!(beef.source, REFERENCE_SOURCE);

        assert!(records.iter().any(|r| r.metadata["level"] == "subtypology"));
        assert!(records.iter().all(|r| r.metadata["level"] != "typology"));
    }

    #[test]
    fn test_canonicalize() {
        let matcher = TaxonomyMatcher::new(&ReferenceData::builtin().taxonomy);

        let beef = provider_record("x", DataQuality::Secondary, "food", "Beef", "FR", 30.0);
        let beef = canonicalize(&matcher, beef).unwrap();
        assert_eq!(beef.item, "beef");
        assert_eq!(beef.category, "meat");
        assert_eq!(beef.country, "fr");
        assert_eq!(beef.metadata["provider_item"], "Beef");

        let junk = provider_record("x", DataQuality::Secondary, "unknown", "qwxz", "fr", 1.0);
        assert!(canonicalize(&matcher, junk).is_none());

        let zero = provider_record("x", DataQuality::Secondary, "meat", "beef", "fr", 0.0);
        assert!(canonicalize(&matcher, zero).is_none());
    }

    #[tokio::test]
    async fn test_seed_only_when_empty() {
        let (job, _source, _pool) = setup(false).await;
        let reference = ReferenceData::builtin();

        let seeded = seed_emission_factors(job.store.as_ref(), &reference).await.unwrap();
        assert!(seeded > 0);
        assert!(job.store.get("meat", "beef", GLOBAL_COUNTRY).await.unwrap().is_some());

        assert_eq!(seed_emission_factors(job.store.as_ref(), &reference).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_initial_data_pulled_once() {
        let (job, _source, pool) = setup(false).await;

        let first = job.pull_initial_data().await;
        assert_eq!(first.providers_ok, 1);
        assert_eq!(first.records_written, 1);
        let beef_fr = job.store.get("meat", "beef", "fr").await.unwrap().unwrap();
        assert_eq!(beef_fr.value_kg_co2e_per_kg, 33.0);
        assert!(settings::get_sync_timestamp(&pool, "bulk").await.unwrap().is_some());

        let second = job.pull_initial_data().await;
        assert_eq!(second, RefreshSummary::default());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_sync_timestamp() {
        let pool = test_pool().await;
        let job = job_over(&pool, Arc::new(ReadOnlyStore), bulk_source(false));

        let summary = job.refresh_once().await;
        assert_eq!(summary.providers_ok, 0);
        assert_eq!(summary.providers_failed, 1);
        assert_eq!(summary.records_written, 0);
        assert!(settings::get_sync_timestamp(&pool, "bulk").await.unwrap().is_none());

        let initial = job.pull_initial_data().await;
        assert_eq!(initial.providers_failed, 1);
        assert!(settings::get_sync_timestamp(&pool, "bulk").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_refresh_records_timestamp() {
        let (job, source, pool) = setup(false).await;

        let summary = job.refresh_once().await;
        assert_eq!(summary.providers_ok, 1);
        assert_eq!(summary.records_written, 1);
        assert_eq!(source.update_calls.load(Ordering::SeqCst), 1);
        assert!(settings::get_sync_timestamp(&pool, "bulk").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_refresh_failure_is_skipped() {
        let (job, _source, pool) = setup(true).await;

        let summary = job.refresh_once().await;
        assert_eq!(summary.providers_failed, 1);
        assert_eq!(summary.records_written, 0);
        assert!(settings::get_sync_timestamp(&pool, "bulk").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let (job, _source, _pool) = setup(false).await;
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(job.run(cancel.clone()));

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[test]
    fn test_seeded_quality_from_uncertainty() {
        let records = taxonomy_records(&ReferenceData::builtin());
        let beef = records.iter().find(|r| r.item == "beef").unwrap();
        assert_eq!(beef.quality(), DataQuality::Extrapolated);
    }
}
