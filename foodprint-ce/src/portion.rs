//! Portion size estimation
//!
//! Fixed gram table per category with a few name-driven cases. Main
//! ingredients of protein and staple categories get a larger portion.

use crate::taxonomy::{normalize, TaxonomyMatch};
use crate::types::Category;
use once_cell::sync::Lazy;
use regex::Regex;

/// Grams returned when nothing better is known
pub const DEFAULT_PORTION_GRAMS: f64 = 50.0;

/// Scale applied to main meat, seafood, legume and grain ingredients
pub const MAIN_INGREDIENT_MULTIPLIER: f64 = 1.5;

static DISH_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\w+)\s+(?:soup|salad|curry|stew|bowl|risotto|burger)s?\b")
        .expect("valid dish shape regex")
});

/// Base grams for one serving of an ingredient
pub fn base_grams(category: Category, name: &str, subcategory: Option<&str>) -> f64 {
    let has = |words: &[&str]| words.iter().any(|w| name.contains(w));

    match category {
        Category::Meat | Category::Seafood => 100.0,
        Category::Dairy => {
            if has(&["butter"]) {
                10.0
            } else if has(&["egg"]) || subcategory == Some("eggs") {
                50.0
            } else if has(&["cheese", "cream"]) || subcategory == Some("cheese_butter") {
                30.0
            } else if has(&["milk", "yogurt", "yoghurt"]) || subcategory == Some("fresh_dairy") {
                100.0
            } else {
                40.0
            }
        }
        Category::Vegetables => {
            if has(&["salad", "lettuce", "leaf", "leaves"])
                || subcategory == Some("leafy_vegetables")
            {
                30.0
            } else if has(&["potato"]) || subcategory == Some("root_vegetables") {
                80.0
            } else if has(&["onion", "garlic"]) || subcategory == Some("allium") {
                30.0
            } else {
                60.0
            }
        }
        Category::Fruits => 80.0,
        Category::Grains => {
            if has(&["rice"]) || subcategory == Some("rice_products") {
                75.0
            } else if has(&["pasta", "noodle", "spaghetti"]) {
                80.0
            } else if has(&["bread"]) {
                50.0
            } else {
                60.0
            }
        }
        Category::Legumes => 60.0,
        Category::NutsSeeds => 20.0,
        Category::Oils => 10.0,
        Category::Unknown => DEFAULT_PORTION_GRAMS,
    }
}

/// Whether the ingredient is the star of the dish
///
/// True when the dish name mentions the ingredient (or its resolved item), or
/// when the dish reads "<word> soup|salad|curry|..." with `<word>` one of the
/// ingredient's tokens.
pub fn is_main_ingredient(ingredient: &str, item: Option<&str>, dish_name: &str) -> bool {
    let dish = normalize(dish_name);
    if dish.is_empty() {
        return false;
    }
    let padded_dish = format!(" {} ", dish);

    let ingredient = normalize(ingredient);
    let mentioned = |needle: &str| !needle.is_empty() && padded_dish.contains(&format!(" {} ", needle));

    if mentioned(&ingredient) || item.map_or(false, mentioned) {
        return true;
    }

    DISH_SHAPE.captures_iter(&dish).any(|caps| {
        let word = &caps[1];
        ingredient.split_whitespace().any(|token| token == word)
            || item.map_or(false, |item| item.split_whitespace().any(|t| t == word))
    })
}

/// Estimate the grams of one ingredient in one serving of `dish_name`
///
/// Never fails: any non-finite or non-positive result becomes
/// [`DEFAULT_PORTION_GRAMS`].
pub fn estimate(ingredient: &str, matched: &TaxonomyMatch, dish_name: &str) -> f64 {
    let name = normalize(ingredient);
    let mut grams = base_grams(matched.category, &name, matched.subcategory.as_deref());

    let boosted = matches!(
        matched.category,
        Category::Meat | Category::Seafood | Category::Legumes | Category::Grains
    );
    if boosted && is_main_ingredient(ingredient, matched.specific_item.as_deref(), dish_name) {
        grams *= MAIN_INGREDIENT_MULTIPLIER;
    }

    if grams.is_finite() && grams > 0.0 {
        grams
    } else {
        DEFAULT_PORTION_GRAMS
    }
}
