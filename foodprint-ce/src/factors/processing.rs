//! Processing method adjustment

use super::{AdjustmentProvider, IngredientContext, DEFAULT_KEY};
use crate::reference::ReferenceData;
use crate::taxonomy::normalize::fold_diacritics;
use std::sync::Arc;

pub const FALLBACK_PROCESSING_FACTOR: f64 = 1.0;

/// Items that are processed meat by nature
const PROCESSED_MEATS: &[&str] = &["ham", "bacon", "sausage", "salami", "chorizo"];

/// (method, trigger words) checked in order against the raw name
const METHOD_WORDS: &[(&str, &[&str])] = &[
    ("frozen", &["frozen"]),
    ("canned", &["canned", "tinned", "can of", "tin of"]),
    ("dried", &["dried", "dehydrated", "sun dried"]),
    ("smoked", &["smoked"]),
    (
        "cooked",
        &["cooked", "roasted", "fried", "boiled", "grilled", "baked", "steamed"],
    ),
    ("raw", &["raw"]),
];

pub struct ProcessingFactors {
    reference: Arc<ReferenceData>,
}

impl ProcessingFactors {
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self { reference }
    }

    /// Method named in the raw ingredient text, or implied by the item
    pub fn detect_method(ctx: &IngredientContext) -> &'static str {
        let name = fold_diacritics(&ctx.raw_name.to_lowercase());
        let padded = format!(" {} ", name);

        for (method, words) in METHOD_WORDS {
            if words.iter().any(|w| padded.contains(&format!(" {} ", w))) {
                return method;
            }
        }

        if ctx
            .item
            .as_deref()
            .map_or(false, |item| PROCESSED_MEATS.contains(&item))
        {
            return "processed";
        }

        DEFAULT_KEY
    }

    fn is_known_method(&self, method: &str) -> bool {
        self.reference
            .processing_factors
            .keys()
            .any(|(m, _)| m == method)
    }
}

impl AdjustmentProvider for ProcessingFactors {
    fn name(&self) -> &'static str {
        "processing"
    }

    fn key(&self, ctx: &IngredientContext) -> String {
        match ctx.processing.as_deref() {
            Some(method) if self.is_known_method(method) => method.to_string(),
            _ => Self::detect_method(ctx).to_string(),
        }
    }

    /// (method, category) → (method, default) → (default, default) → 1.0
    fn value(&self, ctx: &IngredientContext) -> f64 {
        let method = self.key(ctx);
        let table = &self.reference.processing_factors;
        let category = ctx.category.as_str();

        [
            (method.as_str(), category),
            (method.as_str(), DEFAULT_KEY),
            (DEFAULT_KEY, DEFAULT_KEY),
        ]
        .iter()
        .find_map(|(m, c)| table.get(&(m.to_string(), c.to_string())))
        .copied()
        .filter(|v| v.is_finite())
        .unwrap_or(FALLBACK_PROCESSING_FACTOR)
    }
}
