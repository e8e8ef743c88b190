//! Adjustment factor providers
//!
//! Seasonal, regional/transport, processing and waste. Each provider picks a
//! key for the ingredient (season label, origin, method, lifecycle stage) and
//! looks it up with the fallback chain specific key → `default` key →
//! hardcoded constant, so a lookup never fails.

pub mod processing;
pub mod regional;
pub mod seasonal;
pub mod waste;

use crate::reference::ReferenceData;
use crate::types::Category;
use std::sync::Arc;

pub use processing::ProcessingFactors;
pub use regional::RegionalFactors;
pub use seasonal::SeasonalFactors;
pub use waste::WasteFactors;

/// Key used by every table for "no specific entry"
pub const DEFAULT_KEY: &str = "default";

/// Everything a provider may consult about one ingredient
#[derive(Debug, Clone)]
pub struct IngredientContext {
    pub raw_name: String,
    pub category: Category,
    pub subcategory: Option<String>,
    pub item: Option<String>,
    /// Normalised country code
    pub country: String,
    /// Reference month, 1-12
    pub month: u32,
    /// Labels supplied by inference enrichment, validated by each provider
    pub season: Option<String>,
    pub origin: Option<String>,
    pub processing: Option<String>,
}

impl IngredientContext {
    pub fn new(raw_name: &str, category: Category, country: &str, month: u32) -> Self {
        Self {
            raw_name: raw_name.to_string(),
            category,
            subcategory: None,
            item: None,
            country: country.to_string(),
            month,
            season: None,
            origin: None,
            processing: None,
        }
    }

    pub fn with_taxonomy(mut self, subcategory: Option<&str>, item: Option<&str>) -> Self {
        self.subcategory = subcategory.map(str::to_string);
        self.item = item.map(str::to_string);
        self
    }
}

/// Common shape of the four providers
pub trait AdjustmentProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Table key selected for this ingredient
    fn key(&self, ctx: &IngredientContext) -> String;

    /// Multiplier (or loss fraction for waste) for this ingredient
    fn value(&self, ctx: &IngredientContext) -> f64;
}

/// Adjustments applied to one ingredient
#[derive(Debug, Clone, PartialEq)]
pub struct Adjustments {
    pub seasonal: f64,
    pub season_label: String,
    pub regional: f64,
    pub origin: String,
    pub processing: f64,
    pub processing_method: String,
    pub waste_fraction: f64,
}

impl Adjustments {
    /// Product of the multipliers that scale emissions (waste excluded)
    pub fn multiplier(&self) -> f64 {
        self.seasonal * self.regional * self.processing
    }
}

/// The four providers over one set of reference tables
pub struct AdjustmentFactors {
    pub seasonal: SeasonalFactors,
    pub regional: RegionalFactors,
    pub processing: ProcessingFactors,
    pub waste: WasteFactors,
}

impl AdjustmentFactors {
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self {
            seasonal: SeasonalFactors::new(Arc::clone(&reference)),
            regional: RegionalFactors::new(Arc::clone(&reference)),
            processing: ProcessingFactors::new(Arc::clone(&reference)),
            waste: WasteFactors::new(reference),
        }
    }

    /// Resolve every adjustment for one ingredient
    ///
    /// The season label feeds the regional special-case table, so it is
    /// computed first.
    pub fn apply(&self, ctx: &IngredientContext) -> Adjustments {
        let season_label = self.seasonal.key(ctx);
        let seasonal = self.seasonal.value(ctx);

        let mut seasoned = ctx.clone();
        seasoned.season = Some(season_label.clone());

        Adjustments {
            seasonal,
            season_label,
            regional: self.regional.value(&seasoned),
            origin: self.regional.key(&seasoned),
            processing: self.processing.value(ctx),
            processing_method: self.processing.key(ctx),
            waste_fraction: self.waste.value(ctx),
        }
    }
}

/// `table[key]` → `table["default"]` → `constant`
pub(crate) fn lookup_with_default(
    table: &std::collections::HashMap<String, f64>,
    key: &str,
    constant: f64,
) -> f64 {
    table
        .get(key)
        .or_else(|| table.get(DEFAULT_KEY))
        .copied()
        .filter(|v| v.is_finite())
        .unwrap_or(constant)
}
