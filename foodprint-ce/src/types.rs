//! Core types shared by the resolution engine
//!
//! Reference data (taxonomy nodes, emission factor records) is immutable once
//! loaded. Per-request values (ingredient estimates, emissions results) are
//! built once and discarded after the response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Country key used when no country-specific data exists
pub const GLOBAL_COUNTRY: &str = "global";

/// Normalise a caller-supplied country code ("GB " → "gb", "" → "global")
pub fn normalize_country(country: Option<&str>) -> String {
    match country.map(|c| c.trim().to_lowercase()) {
        Some(c) if !c.is_empty() => c,
        _ => GLOBAL_COUNTRY.to_string(),
    }
}

// ============================================================================
// Taxonomy
// ============================================================================

/// Coarse food category (taxonomy typology)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Meat,
    Seafood,
    Dairy,
    Vegetables,
    Fruits,
    Grains,
    Legumes,
    NutsSeeds,
    Oils,
    Unknown,
}

impl Category {
    /// Every known category, `Unknown` last
    pub const ALL: [Category; 10] = [
        Category::Meat,
        Category::Seafood,
        Category::Dairy,
        Category::Vegetables,
        Category::Fruits,
        Category::Grains,
        Category::Legumes,
        Category::NutsSeeds,
        Category::Oils,
        Category::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Meat => "meat",
            Category::Seafood => "seafood",
            Category::Dairy => "dairy",
            Category::Vegetables => "vegetables",
            Category::Fruits => "fruits",
            Category::Grains => "grains",
            Category::Legumes => "legumes",
            Category::NutsSeeds => "nuts_seeds",
            Category::Oils => "oils",
            Category::Unknown => "unknown",
        }
    }

    /// Parse a category label, tolerating the loose spellings inference
    /// services produce ("Nuts & Seeds", "vegetable", "fish")
    pub fn parse(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();

        match normalized.trim_matches('_') {
            "meat" | "meats" | "poultry" => Some(Category::Meat),
            "seafood" | "fish" | "shellfish" => Some(Category::Seafood),
            "dairy" | "dairy_eggs" | "dairy___eggs" | "eggs" => Some(Category::Dairy),
            "vegetables" | "vegetable" | "veg" => Some(Category::Vegetables),
            "fruits" | "fruit" => Some(Category::Fruits),
            "grains" | "grain" | "cereals" => Some(Category::Grains),
            "legumes" | "legume" | "pulses" => Some(Category::Legumes),
            "nuts_seeds" | "nuts___seeds" | "nuts_and_seeds" | "nuts" | "seeds" => {
                Some(Category::NutsSeeds)
            }
            "oils" | "oil" | "fats" => Some(Category::Oils),
            "unknown" => Some(Category::Unknown),
            _ => None,
        }
    }

    /// Produce is biased to out-of-season when no calendar entry exists
    pub fn is_produce(&self) -> bool {
        matches!(self, Category::Vegetables | Category::Fruits)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Taxonomy level of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyLevel {
    Item,
    Subtypology,
    Typology,
}

impl TaxonomyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxonomyLevel::Item => "item",
            TaxonomyLevel::Subtypology => "subtypology",
            TaxonomyLevel::Typology => "typology",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "item" => Some(TaxonomyLevel::Item),
            "subtypology" => Some(TaxonomyLevel::Subtypology),
            "typology" => Some(TaxonomyLevel::Typology),
            _ => None,
        }
    }
}

/// Reference data uncertainty of a taxonomy node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeUncertainty {
    Low,
    High,
}

impl NodeUncertainty {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeUncertainty::Low => "low",
            NodeUncertainty::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(NodeUncertainty::Low),
            "high" => Some(NodeUncertainty::High),
            _ => None,
        }
    }

    /// Data quality assigned to store rows seeded from this node
    pub fn seeded_quality(&self) -> DataQuality {
        match self {
            NodeUncertainty::Low => DataQuality::Secondary,
            NodeUncertainty::High => DataQuality::Extrapolated,
        }
    }
}

/// One node of the item → sub-typology → typology tree
///
/// `parent` holds the parent's name, never the node itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyNode {
    pub name: String,
    pub level: TaxonomyLevel,
    pub parent: Option<String>,
    pub emission_factor_kg_per_kg: f64,
    pub uncertainty: NodeUncertainty,
}

// ============================================================================
// Emission factors
// ============================================================================

/// Stored emission factor, unique on (category, item, country)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactorRecord {
    pub category: String,
    pub item: String,
    pub country: String,
    pub value_kg_co2e_per_kg: f64,
    pub source: String,
    pub last_updated: DateTime<Utc>,
    pub metadata: serde_json::Value,
}

impl EmissionFactorRecord {
    /// Data quality recorded in `metadata.quality`, `Default` when absent
    pub fn quality(&self) -> DataQuality {
        self.metadata
            .get("quality")
            .and_then(|q| q.as_str())
            .and_then(DataQuality::parse)
            .unwrap_or(DataQuality::Default)
    }
}

/// Data-source quality label driving the uncertainty band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataQuality {
    PrimaryResearch,
    Secondary,
    InferenceEstimated,
    Extrapolated,
    ErrorFallback,
    Default,
}

impl DataQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataQuality::PrimaryResearch => "primary_research",
            DataQuality::Secondary => "secondary",
            DataQuality::InferenceEstimated => "inference_estimated",
            DataQuality::Extrapolated => "extrapolated",
            DataQuality::ErrorFallback => "error_fallback",
            DataQuality::Default => "default",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "primary_research" => Some(DataQuality::PrimaryResearch),
            "secondary" => Some(DataQuality::Secondary),
            "inference_estimated" => Some(DataQuality::InferenceEstimated),
            "extrapolated" => Some(DataQuality::Extrapolated),
            "error_fallback" => Some(DataQuality::ErrorFallback),
            "default" => Some(DataQuality::Default),
            _ => None,
        }
    }
}

/// Tier of the resolver chain that produced a factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    Cache,
    Store,
    StoreGlobal,
    Provider,
    CategoryAverage,
    FallbackConstant,
}

impl ResolutionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionTier::Cache => "cache",
            ResolutionTier::Store => "store",
            ResolutionTier::StoreGlobal => "store_global",
            ResolutionTier::Provider => "provider",
            ResolutionTier::CategoryAverage => "category_average",
            ResolutionTier::FallbackConstant => "fallback_constant",
        }
    }
}

/// Emission factor with provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFactor {
    /// kg CO2e per kg of food
    pub value: f64,
    pub quality: DataQuality,
    pub tier: ResolutionTier,
    /// Origin label ("store:climatiq", "provider:agribalyse", "category_average", ...)
    pub source: String,
}

// ============================================================================
// Results
// ============================================================================

/// Five-level confidence label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    #[serde(rename = "very high")]
    VeryHigh,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "very low")]
    VeryLow,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::VeryHigh => "very high",
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::VeryLow => "very low",
        }
    }
}

/// Response verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Basic,
    #[default]
    Standard,
    Detailed,
}

/// Symmetric uncertainty range in kg CO2e
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionRange {
    pub lower: f64,
    pub upper: f64,
}

impl EmissionRange {
    pub fn around(value: f64, uncertainty: f64) -> Self {
        Self {
            lower: value * (1.0 - uncertainty),
            upper: value * (1.0 + uncertainty),
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            lower: self.lower * factor,
            upper: self.upper * factor,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Request-scoped estimate for one ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientEstimate {
    pub raw_name: String,
    pub resolved_category: Category,
    pub subcategory: Option<String>,
    pub specific_item: Option<String>,
    pub match_confidence: f64,
    pub weight_grams: f64,
    pub emission_factor: f64,
    pub seasonal_factor: f64,
    pub regional_factor: f64,
    pub processing_factor: f64,
    pub waste_fraction: f64,
    pub season_label: String,
    pub origin: String,
    pub processing_method: String,
    pub data_quality: DataQuality,
    pub data_source: String,
    pub resolution_tier: ResolutionTier,
    /// Per-serving emissions, rounded to 3 decimals
    pub emissions_kg_co2e: f64,
    pub range: EmissionRange,
    pub uncertainty: f64,
    pub confidence: ConfidenceLevel,
}

/// Dish-level result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionsResult {
    pub per_ingredient: Vec<IngredientEstimate>,
    pub total_kg_co2e: f64,
    pub saved_kg_co2e: f64,
    pub range: EmissionRange,
    pub saved_range: EmissionRange,
    pub confidence: ConfidenceLevel,
    /// Internal only: whether the inference path produced the estimates
    #[serde(skip)]
    pub enriched: bool,
}
