//! Regional / transport adjustment

use super::{lookup_with_default, AdjustmentProvider, IngredientContext, DEFAULT_KEY};
use crate::reference::ReferenceData;
use crate::types::Category;
use std::sync::Arc;

pub const FALLBACK_REGIONAL_FACTOR: f64 = 1.0;

/// Special-case season wildcard
pub const ANY_SEASON: &str = "any";

/// Every origin label the provider accepts from enrichment
pub const ORIGIN_LABELS: [&str; 7] = [
    "local",
    "regional",
    "national",
    "imported_ground",
    "imported_sea",
    "air_freighted",
    DEFAULT_KEY,
];

pub struct RegionalFactors {
    reference: Arc<ReferenceData>,
}

impl RegionalFactors {
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self { reference }
    }

    /// Origin assumed when nothing better is known
    pub fn infer_origin(ctx: &IngredientContext) -> &'static str {
        match (ctx.category, ctx.subcategory.as_deref()) {
            (_, Some("tropical_fruits")) => "imported_sea",
            (Category::Seafood, _) => "national",
            _ => DEFAULT_KEY,
        }
    }

    /// Season-specific special case first, then the `any` wildcard
    fn special_case(&self, item: &str, origin: &str, season: Option<&str>) -> Option<f64> {
        let cases = &self.reference.regional_special_cases;
        season
            .and_then(|season| {
                cases
                    .iter()
                    .find(|c| c.item == item && c.origin == origin && c.season == season)
            })
            .or_else(|| {
                cases
                    .iter()
                    .find(|c| c.item == item && c.origin == origin && c.season == ANY_SEASON)
            })
            .map(|c| c.value)
    }
}

impl AdjustmentProvider for RegionalFactors {
    fn name(&self) -> &'static str {
        "regional"
    }

    fn key(&self, ctx: &IngredientContext) -> String {
        match ctx.origin.as_deref() {
            Some(origin) if ORIGIN_LABELS.contains(&origin) => origin.to_string(),
            _ => Self::infer_origin(ctx).to_string(),
        }
    }

    fn value(&self, ctx: &IngredientContext) -> f64 {
        let origin = self.key(ctx);

        if let Some(item) = ctx.item.as_deref() {
            if let Some(value) = self.special_case(item, &origin, ctx.season.as_deref()) {
                return value;
            }
        }

        lookup_with_default(&self.reference.regional_factors, &origin, FALLBACK_REGIONAL_FACTOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> RegionalFactors {
        RegionalFactors::new(Arc::new(ReferenceData::builtin()))
    }

    fn ctx(item: &str, category: Category, sub: &str, origin: Option<&str>) -> IngredientContext {
        let mut ctx = IngredientContext::new(item, category, "gb", 6)
            .with_taxonomy(Some(sub), Some(item));
        ctx.origin = origin.map(str::to_string);
        ctx
    }

    #[test]
    fn test_origin_table() {
        let p = provider();
        let cases = [
            ("local", 0.9),
            ("regional", 0.95),
            ("national", 1.0),
            ("imported_ground", 1.15),
            ("imported_sea", 1.1),
            ("air_freighted", 2.5),
            ("default", 1.0),
        ];
        for (origin, expected) in cases {
            let c = ctx("carrot", Category::Vegetables, "root_vegetables", Some(origin));
            assert_eq!(p.value(&c), expected, "{}", origin);
        }
    }

    #[test]
    fn test_inferred_origin() {
        let p = provider();
        let mango = ctx("mango", Category::Fruits, "tropical_fruits", None);
        assert_eq!(p.key(&mango), "imported_sea");
        assert_eq!(p.value(&mango), 1.1);

        let cod = ctx("cod", Category::Seafood, "fish", None);
        assert_eq!(p.key(&cod), "national");

        let rice = ctx("rice", Category::Grains, "rice_products", None);
        assert_eq!(p.key(&rice), DEFAULT_KEY);
    }

    #[test]
    fn test_special_case_precedence() {
        let p = provider();
        // "any" wildcard
        let avocado = ctx("avocado", Category::Fruits, "tropical_fruits", None);
        assert_eq!(p.value(&avocado), 1.25);

        // Season-specific case only applies in that season
        let mut strawberry = ctx("strawberry", Category::Fruits, "berries", Some("air_freighted"));
        strawberry.season = Some("out_of_season".to_string());
        assert_eq!(p.value(&strawberry), 3.0);
        strawberry.season = Some("in_season".to_string());
        assert_eq!(p.value(&strawberry), 2.5);
    }

    #[test]
    fn test_unknown_origin_label_is_inferred() {
        let c = ctx("carrot", Category::Vegetables, "root_vegetables", Some("teleported"));
        assert_eq!(provider().key(&c), DEFAULT_KEY);
    }
}
