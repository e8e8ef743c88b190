//! Keyword pattern cascade
//!
//! Rules are evaluated top-down; the first category rule that hits wins, then
//! its sub-rules pick a sub-typology. Ordering runs from the most specific
//! vocabulary (oils, seafood) to the broadest (vegetables) so that
//! "fish sauce" is not classified by "sauce" and "peanut oil" lands in oils.

use crate::types::Category;
use once_cell::sync::Lazy;
use regex::Regex;

/// Bumped whenever a rule or its position changes
pub const PATTERN_RULES_VERSION: u32 = 3;

/// One category rule with ordered sub-typology rules
pub struct PatternRule {
    pub category: Category,
    pub pattern: Regex,
    pub subrules: Vec<(&'static str, Regex)>,
}

impl PatternRule {
    /// Sub-typology of the first sub-rule that matches
    pub fn subtypology(&self, input: &str) -> Option<&'static str> {
        self.subrules
            .iter()
            .find(|(_, re)| re.is_match(input))
            .map(|(name, _)| *name)
    }
}

fn word_regex(alternatives: &str) -> Regex {
    // Patterns are compile-time constants exercised by the unit tests
    Regex::new(&format!(r"\b(?:{})\b", alternatives)).expect("valid pattern rule")
}

fn rule(category: Category, pattern: &str, subrules: &[(&'static str, &str)]) -> PatternRule {
    PatternRule {
        category,
        pattern: word_regex(pattern),
        subrules: subrules
            .iter()
            .map(|&(name, alternatives)| (name, word_regex(alternatives)))
            .collect(),
    }
}

/// The ordered rule table
pub static PATTERN_RULES: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    vec![
        rule(
            Category::Oils,
            r"oils?|ghee|lard|margarine|shortening|dripping",
            &[
                ("tropical_oils", r"palm|coconut"),
                (
                    "plant_oils",
                    r"olive|sunflower|rapeseed|canola|vegetable|sesame|peanut|corn|avocado|soy|soya",
                ),
            ],
        ),
        rule(
            Category::Seafood,
            r"fish|seafood|shellfish|prawns?|shrimps?|clams?|octopus|calamari|crayfish|langoustines?|eel|halibut|sea ?bass|snapper|herring|sole|pollock|hake|caviar|roe|kipper",
            &[
                (
                    "shellfish",
                    r"shellfish|prawns?|shrimps?|clams?|octopus|calamari|crayfish|langoustines?",
                ),
                (
                    "fish",
                    r"fish|eel|halibut|sea ?bass|snapper|herring|sole|pollock|hake|caviar|roe|kipper",
                ),
            ],
        ),
        rule(
            Category::Meat,
            r"meat|mince|steak|burgers?|meatballs?|sausages?|bacon|jerky|pepperoni|hot ?dogs?|kebabs?|ribs?|chops?|rabbit|pheasant|quail|goose|poultry|wings?|drumsticks?|liver|oxtail|gammon|mortadella|pastrami",
            &[
                ("poultry", r"poultry|wings?|drumsticks?|goose|quail|pheasant"),
                (
                    "pork_meat",
                    r"sausages?|bacon|pepperoni|hot ?dogs?|jerky|ribs?|chops?|gammon|mortadella",
                ),
                ("ruminant_meat", r"steak|burgers?|mince|oxtail|meatballs?|pastrami"),
            ],
        ),
        rule(
            Category::Dairy,
            r"dairy|cheese|milk|cream|yogh?urt|kefir|curds?|whey|ricotta|mascarpone|paneer|halloumi|camembert|custard|eggs?|omelett?e",
            &[
                ("eggs", r"eggs?|omelett?e"),
                (
                    "cheese_butter",
                    r"cheese|ricotta|mascarpone|paneer|halloumi|camembert|curds?",
                ),
                ("fresh_dairy", r"milk|cream|yogh?urt|kefir|whey|custard"),
            ],
        ),
        rule(
            Category::Legumes,
            r"beans?|lentils?|chickpeas?|peas|legumes?|pulses?|soy|soya|tofu|tempeh|edamame|falafel|miso",
            &[
                ("soy_products", r"soy|soya|tofu|tempeh|edamame|miso"),
                ("pulses", r"beans?|lentils?|chickpeas?|peas|legumes?|pulses?|falafel"),
            ],
        ),
        rule(
            Category::NutsSeeds,
            r"nuts?|seeds?|pecans?|macadamias?|flax ?seeds?|linseeds?|tahini|pine nuts?",
            &[
                ("seeds", r"seeds?|flax|linseeds?|tahini"),
                ("groundnuts", r"peanuts?"),
                ("tree_nuts", r"nuts?|pecans?|macadamias?"),
            ],
        ),
        rule(
            Category::Grains,
            r"grains?|cereals?|wheat|flour|buns?|rolls?|noodles?|oatmeal|granola|muesli|rye|millet|buckwheat|bulgur|polenta|tortillas?|wraps?|crackers?|semolina|spelt|pitas?|bagels?|croissants?|risotto|pilaf",
            &[
                ("rice_products", r"risotto|pilaf"),
                (
                    "wheat_products",
                    r"wheat|flour|buns?|rolls?|noodles?|tortillas?|wraps?|crackers?|semolina|spelt|pitas?|bagels?|croissants?|bulgur",
                ),
                (
                    "other_grains",
                    r"oatmeal|granola|muesli|rye|millet|buckwheat|polenta|grains?|cereals?",
                ),
            ],
        ),
        rule(
            Category::Fruits,
            r"fruits?|berry|berries|melons?|watermelons?|figs?|dates|pomegranates?|passion ?fruits?|lychees?|guavas?|nectarines?|currants?|raisins?|sultanas?|cranberry|cranberries|blackberry|blackberries|tangerines?|clementines?|citrus|coconuts?|rhubarb",
            &[
                (
                    "berries",
                    r"berry|berries|cranberry|cranberries|blackberry|blackberries|currants?",
                ),
                ("citrus", r"citrus|tangerines?|clementines?"),
                (
                    "tropical_fruits",
                    r"melons?|watermelons?|pomegranates?|passion ?fruits?|lychees?|guavas?|coconuts?|dates|figs?",
                ),
                ("temperate_fruits", r"nectarines?|raisins?|sultanas?|rhubarb"),
            ],
        ),
        rule(
            Category::Vegetables,
            r"vegetables?|veg|veggies|greens|salads?|leaves|chard|watercress|endives?|turnips?|swede|cassava|fennel|artichokes?|okra|peppers?|chill?i(?:es|s)?|jalapenos?|sprouts|chives|herbs?|basil|parsley|coriander|cilantro|mint|gourds?",
            &[
                (
                    "leafy_vegetables",
                    r"greens|salads?|leaves|chard|watercress|endives?|herbs?|basil|parsley|coriander|cilantro|mint",
                ),
                ("root_vegetables", r"turnips?|swede|cassava"),
                ("allium", r"chives"),
                (
                    "fruiting_vegetables",
                    r"peppers?|chill?i(?:es|s)?|jalapenos?|okra|gourds?",
                ),
                ("brassicas", r"sprouts"),
                ("other_vegetables", r"fennel|artichokes?"),
            ],
        ),
    ]
});
