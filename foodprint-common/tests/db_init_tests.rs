//! Unit tests for reference store initialization
//!
//! - Database file created automatically on first run
//! - Existing database reopens without error (idempotent schema)
//! - Every reference table exists after init
//! - ensure_setting writes defaults without clobbering existing values

use foodprint_common::db::init::{ensure_setting, init_database};
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("sub").join("foodprint.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("foodprint.db");

    let pool1 = init_database(&db_path).await.unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_all_reference_tables_created() {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("foodprint.db"))
        .await
        .unwrap();

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for expected in [
        "emission_factors",
        "processing_factors",
        "regional_factors",
        "regional_special_cases",
        "seasonal_calendar",
        "seasonal_factors",
        "settings",
        "taxonomy_aliases",
        "taxonomy_nodes",
        "waste_factors",
    ] {
        assert!(
            tables.iter().any(|t| t == expected),
            "Missing table '{}', found {:?}",
            expected,
            tables
        );
    }
}

#[tokio::test]
async fn test_ensure_setting_keeps_existing_value() {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("foodprint.db"))
        .await
        .unwrap();

    ensure_setting(&pool, "sync_interval_hours", "24").await.unwrap();
    sqlx::query("UPDATE settings SET value = '12' WHERE key = 'sync_interval_hours'")
        .execute(&pool)
        .await
        .unwrap();
    ensure_setting(&pool, "sync_interval_hours", "24").await.unwrap();

    let value: String =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = 'sync_interval_hours'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(value, "12");
}

#[tokio::test]
async fn test_ensure_setting_resets_null() {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("foodprint.db"))
        .await
        .unwrap();

    sqlx::query("INSERT INTO settings (key, value) VALUES ('sync_interval_hours', NULL)")
        .execute(&pool)
        .await
        .unwrap();
    ensure_setting(&pool, "sync_interval_hours", "24").await.unwrap();

    let value: Option<String> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = 'sync_interval_hours'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(value.as_deref(), Some("24"));
}
