//! Taxonomy and adjustment table persistence
//!
//! Reference tables are written once when the store is empty and read back
//! into an immutable [`ReferenceData`] at startup. Declaration order of nodes
//! and aliases is kept in a `position` column because matcher precedence
//! depends on it.

use crate::reference::{RegionalSpecialCase, ReferenceData, SeasonalWindow, Taxonomy};
use crate::types::{NodeUncertainty, TaxonomyLevel, TaxonomyNode};
use foodprint_common::Result;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use tracing::{info, warn};

/// True when no taxonomy has been stored yet
pub async fn is_reference_empty(pool: &SqlitePool) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM taxonomy_nodes")
        .fetch_one(pool)
        .await?;
    Ok(count == 0)
}

fn months_to_text(months: &[u32]) -> String {
    months
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn months_from_text(text: &str) -> Vec<u32> {
    text.split(',')
        .filter_map(|m| m.trim().parse::<u32>().ok())
        .filter(|m| (1..=12).contains(m))
        .collect()
}

/// Write every reference table in one transaction, replacing existing rows
pub async fn save_reference_data(pool: &SqlitePool, reference: &ReferenceData) -> Result<()> {
    let mut tx = pool.begin().await?;

    for (position, node) in reference.taxonomy.nodes().iter().enumerate() {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO taxonomy_nodes (name, level, parent, emission_factor, uncertainty, position)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&node.name)
        .bind(node.level.as_str())
        .bind(&node.parent)
        .bind(node.emission_factor_kg_per_kg)
        .bind(node.uncertainty.as_str())
        .bind(position as i64)
        .execute(&mut *tx)
        .await?;
    }

    for (position, (alias, item)) in reference.taxonomy.aliases().iter().enumerate() {
        sqlx::query("INSERT OR REPLACE INTO taxonomy_aliases (alias, item, position) VALUES (?, ?, ?)")
            .bind(alias)
            .bind(item)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
    }

    for window in &reference.seasonal_calendar {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO seasonal_calendar (country, item, in_season_months, near_season_months)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&window.country)
        .bind(&window.item)
        .bind(months_to_text(&window.in_season))
        .bind(months_to_text(&window.near_season))
        .execute(&mut *tx)
        .await?;
    }

    for (key, value) in &reference.seasonal_factors {
        sqlx::query("INSERT OR REPLACE INTO seasonal_factors (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
    }

    for (key, value) in &reference.regional_factors {
        sqlx::query("INSERT OR REPLACE INTO regional_factors (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
    }

    for case in &reference.regional_special_cases {
        sqlx::query(
            "INSERT OR REPLACE INTO regional_special_cases (item, origin, season, value) VALUES (?, ?, ?, ?)",
        )
        .bind(&case.item)
        .bind(&case.origin)
        .bind(&case.season)
        .bind(case.value)
        .execute(&mut *tx)
        .await?;
    }

    for ((method, category), value) in &reference.processing_factors {
        sqlx::query("INSERT OR REPLACE INTO processing_factors (method, category, value) VALUES (?, ?, ?)")
            .bind(method)
            .bind(category)
            .bind(value)
            .execute(&mut *tx)
            .await?;
    }

    for ((category, stage), value) in &reference.waste_factors {
        sqlx::query("INSERT OR REPLACE INTO waste_factors (category, stage, value) VALUES (?, ?, ?)")
            .bind(category)
            .bind(stage)
            .bind(value)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    info!(
        nodes = reference.taxonomy.nodes().len(),
        aliases = reference.taxonomy.aliases().len(),
        calendar = reference.seasonal_calendar.len(),
        "Reference tables written"
    );
    Ok(())
}

async fn load_taxonomy(pool: &SqlitePool) -> Result<Taxonomy> {
    let rows = sqlx::query(
        "SELECT name, level, parent, emission_factor, uncertainty FROM taxonomy_nodes ORDER BY position",
    )
    .fetch_all(pool)
    .await?;

    let mut nodes = Vec::with_capacity(rows.len());
    for row in rows {
        let name: String = row.get("name");
        let level: String = row.get("level");
        let uncertainty: String = row.get("uncertainty");

        let (Some(level), Some(uncertainty)) = (
            TaxonomyLevel::parse(&level),
            NodeUncertainty::parse(&uncertainty),
        ) else {
            warn!(node = %name, "Skipping taxonomy node with invalid level or uncertainty");
            continue;
        };

        nodes.push(TaxonomyNode {
            name,
            level,
            parent: row.get("parent"),
            emission_factor_kg_per_kg: row.get("emission_factor"),
            uncertainty,
        });
    }

    let aliases: Vec<(String, String)> =
        sqlx::query_as("SELECT alias, item FROM taxonomy_aliases ORDER BY position")
            .fetch_all(pool)
            .await?;

    Ok(Taxonomy::new(nodes, aliases))
}

async fn load_keyed(pool: &SqlitePool, table: &str) -> Result<HashMap<String, f64>> {
    let rows: Vec<(String, f64)> = sqlx::query_as(&format!("SELECT key, value FROM {}", table))
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().collect())
}

/// Read every reference table
pub async fn load_reference_data(pool: &SqlitePool) -> Result<ReferenceData> {
    let taxonomy = load_taxonomy(pool).await?;

    let calendar: Vec<(String, String, String, String)> = sqlx::query_as(
        "SELECT country, item, in_season_months, near_season_months FROM seasonal_calendar",
    )
    .fetch_all(pool)
    .await?;
    let seasonal_calendar = calendar
        .into_iter()
        .map(|(country, item, in_season, near_season)| SeasonalWindow {
            country,
            item,
            in_season: months_from_text(&in_season),
            near_season: months_from_text(&near_season),
        })
        .collect();

    let special: Vec<(String, String, String, f64)> =
        sqlx::query_as("SELECT item, origin, season, value FROM regional_special_cases")
            .fetch_all(pool)
            .await?;
    let regional_special_cases = special
        .into_iter()
        .map(|(item, origin, season, value)| RegionalSpecialCase {
            item,
            origin,
            season,
            value,
        })
        .collect();

    let processing: Vec<(String, String, f64)> =
        sqlx::query_as("SELECT method, category, value FROM processing_factors")
            .fetch_all(pool)
            .await?;
    let waste: Vec<(String, String, f64)> =
        sqlx::query_as("SELECT category, stage, value FROM waste_factors")
            .fetch_all(pool)
            .await?;

    Ok(ReferenceData {
        taxonomy,
        seasonal_calendar,
        seasonal_factors: load_keyed(pool, "seasonal_factors").await?,
        regional_factors: load_keyed(pool, "regional_factors").await?,
        regional_special_cases,
        processing_factors: processing
            .into_iter()
            .map(|(method, category, value)| ((method, category), value))
            .collect(),
        waste_factors: waste
            .into_iter()
            .map(|(category, stage, value)| ((category, stage), value))
            .collect(),
    })
}
