//! Database access for foodprint-ce
//!
//! Schema creation lives in `foodprint_common::db`; this module holds the
//! engine's queries over it.

pub mod emission_factors;
pub mod reference;
pub mod settings;

pub use emission_factors::SqliteFactorStore;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::path::Path;

/// Open (creating if needed) the reference store in `db_path`
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    tracing::debug!("Connecting to database: {}", db_path.display());

    foodprint_common::db::init_database(db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))
}
