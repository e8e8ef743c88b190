//! Waste (loss fraction) lookup
//!
//! Reported per ingredient for loss accounting. The fraction is never folded
//! into the emissions figure.

use super::{AdjustmentProvider, IngredientContext, DEFAULT_KEY};
use crate::reference::ReferenceData;
use std::sync::Arc;

/// Lifecycle stage reported for marketplace surplus
pub const RETAIL_STAGE: &str = "retail";

pub const FALLBACK_WASTE_FRACTION: f64 = 0.0;

pub struct WasteFactors {
    reference: Arc<ReferenceData>,
    stage: String,
}

impl WasteFactors {
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self::for_stage(reference, RETAIL_STAGE)
    }

    pub fn for_stage(reference: Arc<ReferenceData>, stage: &str) -> Self {
        Self {
            reference,
            stage: stage.to_string(),
        }
    }
}

impl AdjustmentProvider for WasteFactors {
    fn name(&self) -> &'static str {
        "waste"
    }

    fn key(&self, _ctx: &IngredientContext) -> String {
        self.stage.clone()
    }

    /// (category, stage) → (category, default) → (default, default) → 0.0
    fn value(&self, ctx: &IngredientContext) -> f64 {
        let table = &self.reference.waste_factors;
        let category = ctx.category.as_str();

        [
            (category, self.stage.as_str()),
            (category, DEFAULT_KEY),
            (DEFAULT_KEY, DEFAULT_KEY),
        ]
        .iter()
        .find_map(|(c, s)| table.get(&(c.to_string(), s.to_string())))
        .copied()
        .filter(|v| v.is_finite() && (0.0..=1.0).contains(v))
        .unwrap_or(FALLBACK_WASTE_FRACTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    #[test]
    fn test_stage_then_category_default_then_global_default() {
        let reference = Arc::new(ReferenceData::builtin());
        let retail = WasteFactors::new(Arc::clone(&reference));

        let fruit = IngredientContext::new("apple", Category::Fruits, "gb", 1);
        assert_eq!(retail.value(&fruit), 0.10);

        let lentils = IngredientContext::new("lentils", Category::Legumes, "gb", 1);
        assert_eq!(retail.value(&lentils), 0.05);

        let unknown = IngredientContext::new("xyz", Category::Unknown, "gb", 1);
        assert_eq!(retail.value(&unknown), 0.05);

        let consumption = WasteFactors::for_stage(reference, "consumption");
        assert_eq!(consumption.value(&fruit), 0.19);
    }

    #[test]
    fn test_empty_table_is_zero() {
        let waste = WasteFactors::new(Arc::new(ReferenceData::default()));
        let ctx = IngredientContext::new("apple", Category::Fruits, "gb", 1);
        assert_eq!(waste.value(&ctx), 0.0);
        assert_eq!(waste.name(), "waste");
    }
}
