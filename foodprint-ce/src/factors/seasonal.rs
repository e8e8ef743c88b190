//! Seasonal adjustment
//!
//! The reference month is matched against the per-country growing calendar
//! (global calendar as fallback). Produce without a calendar entry is assumed
//! out of season; everything else is seasonally neutral.

use super::{lookup_with_default, AdjustmentProvider, IngredientContext, DEFAULT_KEY};
use crate::reference::{defaults::HEATED_GREENHOUSE_COUNTRIES, ReferenceData};
use std::sync::Arc;

pub const IN_SEASON: &str = "in_season";
pub const NEAR_SEASON: &str = "near_season";
pub const OUT_OF_SEASON: &str = "out_of_season";

pub const FALLBACK_SEASONAL_FACTOR: f64 = 1.0;
const FALLBACK_GREENHOUSE_LEAFY: f64 = 1.5;
const FALLBACK_GREENHOUSE_FRUITING: f64 = 1.8;

/// Every label the provider accepts from enrichment
pub const SEASON_LABELS: [&str; 4] = [IN_SEASON, NEAR_SEASON, OUT_OF_SEASON, DEFAULT_KEY];

pub struct SeasonalFactors {
    reference: Arc<ReferenceData>,
}

impl SeasonalFactors {
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self { reference }
    }

    /// Heated-greenhouse multiplier for out-of-season leafy or fruiting crops
    fn greenhouse(&self, ctx: &IngredientContext) -> Option<f64> {
        if !HEATED_GREENHOUSE_COUNTRIES.contains(&ctx.country.as_str()) {
            return None;
        }
        let (key, constant) = match ctx.subcategory.as_deref() {
            Some("leafy_vegetables") => ("greenhouse_leafy", FALLBACK_GREENHOUSE_LEAFY),
            Some("fruiting_vegetables") => ("greenhouse_fruiting", FALLBACK_GREENHOUSE_FRUITING),
            _ => return None,
        };
        Some(
            self.reference
                .seasonal_factors
                .get(key)
                .copied()
                .unwrap_or(constant),
        )
    }
}

impl AdjustmentProvider for SeasonalFactors {
    fn name(&self) -> &'static str {
        "seasonal"
    }

    fn key(&self, ctx: &IngredientContext) -> String {
        if let Some(label) = ctx.season.as_deref() {
            if SEASON_LABELS.contains(&label) {
                return label.to_string();
            }
        }

        let window = ctx
            .item
            .as_deref()
            .and_then(|item| self.reference.seasonal_window(&ctx.country, item));

        let label = match window {
            Some(w) if w.in_season.contains(&ctx.month) => IN_SEASON,
            Some(w) if w.near_season.contains(&ctx.month) => NEAR_SEASON,
            Some(_) => OUT_OF_SEASON,
            None if ctx.category.is_produce() => OUT_OF_SEASON,
            None => DEFAULT_KEY,
        };
        label.to_string()
    }

    fn value(&self, ctx: &IngredientContext) -> f64 {
        let label = self.key(ctx);
        if label == OUT_OF_SEASON {
            if let Some(factor) = self.greenhouse(ctx) {
                return factor;
            }
        }
        lookup_with_default(&self.reference.seasonal_factors, &label, FALLBACK_SEASONAL_FACTOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn provider() -> SeasonalFactors {
        SeasonalFactors::new(Arc::new(ReferenceData::builtin()))
    }

    fn lettuce(country: &str, month: u32) -> IngredientContext {
        IngredientContext::new("lettuce", Category::Vegetables, country, month)
            .with_taxonomy(Some("leafy_vegetables"), Some("lettuce"))
    }

    #[test]
    fn test_in_near_out_of_season() {
        let p = provider();
        assert_eq!(p.key(&lettuce("global", 7)), IN_SEASON);
        assert_eq!(p.value(&lettuce("global", 7)), 1.0);
        assert_eq!(p.key(&lettuce("global", 4)), NEAR_SEASON);
        assert_eq!(p.value(&lettuce("global", 4)), 1.1);
        assert_eq!(p.key(&lettuce("global", 1)), OUT_OF_SEASON);
        assert_eq!(p.value(&lettuce("global", 1)), 1.2);
    }

    #[test]
    fn test_heated_greenhouse_countries() {
        let p = provider();
        assert_eq!(p.value(&lettuce("gb", 1)), 1.5);

        let tomato = IngredientContext::new("tomato", Category::Vegetables, "de", 2)
            .with_taxonomy(Some("fruiting_vegetables"), Some("tomato"));
        assert_eq!(p.value(&tomato), 1.8);

        // Spain grows lettuce outdoors in winter
        assert_eq!(p.value(&lettuce("es", 1)), 1.0);
        // Not a greenhouse country
        assert_eq!(p.value(&lettuce("us", 1)), 1.2);
    }

    #[test]
    fn test_produce_without_calendar_is_out_of_season() {
        let banana = IngredientContext::new("banana", Category::Fruits, "gb", 6)
            .with_taxonomy(Some("tropical_fruits"), Some("banana"));
        assert_eq!(provider().key(&banana), OUT_OF_SEASON);
        assert_eq!(provider().value(&banana), 1.2);
    }

    #[test]
    fn test_non_produce_is_default() {
        let rice = IngredientContext::new("rice", Category::Grains, "gb", 6)
            .with_taxonomy(Some("rice_products"), Some("rice"));
        assert_eq!(provider().key(&rice), DEFAULT_KEY);
        assert_eq!(provider().value(&rice), 1.0);
    }

    #[test]
    fn test_enrichment_label_overrides_calendar() {
        let mut ctx = lettuce("global", 1);
        ctx.season = Some(IN_SEASON.to_string());
        assert_eq!(provider().value(&ctx), 1.0);

        ctx.season = Some("monsoon".to_string());
        assert_eq!(provider().key(&ctx), OUT_OF_SEASON);
    }
}
