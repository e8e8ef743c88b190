//! Dish-level aggregation
//!
//! Per-ingredient emissions are `grams / 1000 × factor × seasonal × regional ×
//! processing`. The dish total is their sum scaled by the serving quantity;
//! "saved" is a fixed share of the total, boosted when a perishable
//! ingredient is present. Sums use unrounded values; per-serving figures are
//! rounded to 2 decimals before the quantity is applied.

use crate::types::{EmissionRange, EmissionsResult, IngredientEstimate};
use crate::uncertainty::{confidence_of, relative_half_width};

pub const DEFAULT_SAVED_RATIO: f64 = 0.70;
pub const DEFAULT_PERISHABLE_BOOST: f64 = 1.2;
pub const DEFAULT_PERISHABLE_KEYWORDS: [&str; 8] = [
    "bread", "banana", "strawberry", "fish", "salad", "milk", "cream", "mushroom",
];

/// Named, overridable aggregation constants
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationPolicy {
    pub saved_ratio: f64,
    pub perishable_boost: f64,
    pub perishable_keywords: Vec<String>,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self {
            saved_ratio: DEFAULT_SAVED_RATIO,
            perishable_boost: DEFAULT_PERISHABLE_BOOST,
            perishable_keywords: DEFAULT_PERISHABLE_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

fn round_range(range: EmissionRange, decimals: i32) -> EmissionRange {
    EmissionRange {
        lower: round_to(range.lower, decimals),
        upper: round_to(range.upper, decimals),
    }
}

/// Unrounded per-serving emissions of one ingredient in kg CO2e
pub fn ingredient_emissions(estimate: &IngredientEstimate) -> f64 {
    estimate.weight_grams / 1000.0
        * estimate.emission_factor
        * estimate.seasonal_factor
        * estimate.regional_factor
        * estimate.processing_factor
}

/// Fill in emissions, range and confidence from the estimate's factors
pub fn finish_ingredient(mut estimate: IngredientEstimate) -> IngredientEstimate {
    let emissions = ingredient_emissions(&estimate);
    estimate.emissions_kg_co2e = round_to(emissions, 3);
    estimate.range = round_range(EmissionRange::around(emissions, estimate.uncertainty), 3);
    estimate.confidence = confidence_of(estimate.uncertainty);
    estimate
}

impl AggregationPolicy {
    /// Whether any ingredient name or resolved item contains a perishable keyword
    pub fn is_perishable(&self, ingredients: &[IngredientEstimate]) -> bool {
        ingredients.iter().any(|e| {
            let name = e.raw_name.to_lowercase();
            let item = e.specific_item.as_deref().unwrap_or_default();
            self.perishable_keywords
                .iter()
                .any(|k| name.contains(k.as_str()) || item.contains(k.as_str()))
        })
    }

    /// Effective saved share of the total
    pub fn saved_share(&self, ingredients: &[IngredientEstimate]) -> f64 {
        if self.is_perishable(ingredients) {
            self.saved_ratio * self.perishable_boost
        } else {
            self.saved_ratio
        }
    }

    /// Roll finished ingredients up into the dish result
    ///
    /// Per-serving figures are rounded first and then multiplied by the
    /// quantity, so the reported total and saved values are exactly linear in
    /// the quantity.
    pub fn aggregate(
        &self,
        per_ingredient: Vec<IngredientEstimate>,
        quantity: u32,
        enriched: bool,
    ) -> EmissionsResult {
        let (total, lower, upper) = per_ingredient.iter().fold((0.0, 0.0, 0.0), |acc, e| {
            let emissions = ingredient_emissions(e);
            let range = EmissionRange::around(emissions, e.uncertainty);
            (acc.0 + emissions, acc.1 + range.lower, acc.2 + range.upper)
        });
        let range = EmissionRange { lower, upper };

        let share = self.saved_share(&per_ingredient);
        let confidence = confidence_of(relative_half_width(&range, total));

        let scale = |serving: f64| round_to(round_to(serving, 2) * f64::from(quantity), 2);
        let scale_range = |serving: EmissionRange| EmissionRange {
            lower: scale(serving.lower),
            upper: scale(serving.upper),
        };

        EmissionsResult {
            per_ingredient,
            total_kg_co2e: scale(total),
            saved_kg_co2e: scale(total * share),
            range: scale_range(range),
            saved_range: scale_range(range.scaled(share)),
            confidence,
            enriched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, ConfidenceLevel, DataQuality, ResolutionTier};

    fn estimate(name: &str, grams: f64, factor: f64, uncertainty: f64) -> IngredientEstimate {
        finish_ingredient(IngredientEstimate {
            raw_name: name.to_string(),
            resolved_category: Category::Grains,
            subcategory: None,
            specific_item: None,
            match_confidence: 1.0,
            weight_grams: grams,
            emission_factor: factor,
            seasonal_factor: 1.0,
            regional_factor: 1.0,
            processing_factor: 1.0,
            waste_fraction: 0.0,
            season_label: "default".into(),
            origin: "default".into(),
            processing_method: "default".into(),
            data_quality: DataQuality::Secondary,
            data_source: "test".into(),
            resolution_tier: ResolutionTier::Store,
            emissions_kg_co2e: 0.0,
            range: EmissionRange { lower: 0.0, upper: 0.0 },
            uncertainty,
            confidence: ConfidenceLevel::VeryLow,
        })
    }

    #[test]
    fn test_finish_ingredient() {
        let e = estimate("rice", 75.0, 4.5, 0.2);
        assert_eq!(e.emissions_kg_co2e, 0.338);
        assert_eq!(e.range.lower, 0.27);
        assert_eq!(e.range.upper, 0.405);
        assert_eq!(e.confidence, ConfidenceLevel::High);
    }

    #[test]
    fn test_total_and_saved() {
        let policy = AggregationPolicy::default();
        let result = policy.aggregate(
            vec![estimate("rice", 100.0, 4.0, 0.2), estimate("oats", 100.0, 2.0, 0.2)],
            1,
            false,
        );
        assert_eq!(result.total_kg_co2e, 0.6);
        assert_eq!(result.saved_kg_co2e, 0.42);
        assert_eq!(result.range.lower, 0.48);
        assert_eq!(result.range.upper, 0.72);
        assert_eq!(result.confidence, ConfidenceLevel::High);
    }

    #[test]
    fn test_perishable_boost() {
        let policy = AggregationPolicy::default();
        let result = policy.aggregate(vec![estimate("sourdough bread", 100.0, 1.0, 0.2)], 1, false);
        assert_eq!(result.total_kg_co2e, 0.1);
        assert_eq!(result.saved_kg_co2e, 0.08);
    }

    #[test]
    fn test_quantity_scales_linearly() {
        let policy = AggregationPolicy::default();
        let one = policy.aggregate(vec![estimate("rice", 120.0, 4.5, 0.2)], 1, false);
        let two = policy.aggregate(vec![estimate("rice", 120.0, 4.5, 0.2)], 2, false);
        assert_eq!(two.total_kg_co2e, 2.0 * one.total_kg_co2e);
        assert_eq!(two.saved_kg_co2e, 2.0 * one.saved_kg_co2e);
        assert_eq!(two.range.upper, 2.0 * one.range.upper);
    }

    #[test]
    fn test_small_totals_double_exactly() {
        let policy = AggregationPolicy::default();
        for factor in [0.3, 0.7, 1.0, 1.3, 2.2, 3.7, 4.5, 6.1, 9.9] {
            let one = policy.aggregate(vec![estimate("rice", 75.0, factor, 0.2)], 1, false);
            let two = policy.aggregate(vec![estimate("rice", 75.0, factor, 0.2)], 2, false);
            assert_eq!(two.total_kg_co2e, 2.0 * one.total_kg_co2e, "factor {}", factor);
            assert_eq!(two.saved_kg_co2e, 2.0 * one.saved_kg_co2e, "factor {}", factor);
        }
    }

    #[test]
    fn test_dish_confidence_matches_single_ingredient() {
        let policy = AggregationPolicy::default();
        for uncertainty in [0.10, 0.20, 0.25, 0.30, 0.50] {
            let e = estimate("beef", 150.0, 60.0, uncertainty);
            let expected = e.confidence;
            let result = policy.aggregate(vec![e], 1, false);
            assert_eq!(result.confidence, expected, "uncertainty {}", uncertainty);
        }
    }

    #[test]
    fn test_empty_dish_is_very_low_confidence() {
        let result = AggregationPolicy::default().aggregate(Vec::new(), 1, false);
        assert_eq!(result.total_kg_co2e, 0.0);
        assert_eq!(result.confidence, ConfidenceLevel::VeryLow);
    }

    #[test]
    fn test_custom_policy() {
        let policy = AggregationPolicy {
            saved_ratio: 0.5,
            perishable_boost: 1.0,
            perishable_keywords: Vec::new(),
        };
        let result = policy.aggregate(vec![estimate("bread", 1000.0, 1.0, 0.1)], 1, false);
        assert_eq!(result.saved_kg_co2e, 0.5);
    }
}
