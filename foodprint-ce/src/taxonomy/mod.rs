//! Taxonomy matcher
//!
//! Maps an arbitrary ingredient string onto the item → sub-typology → typology
//! tree. Tiers are tried in order and the first hit wins:
//!
//! | tier | rule | confidence |
//! |---|---|---|
//! | exact | normalised input equals an item name | 1.0 |
//! | alias | normalised input equals an alias | 0.95 |
//! | substring | input contains a name/alias, or a name contains the input | 0.8 |
//! | fuzzy | Damerau-Levenshtein similarity above 0.85 | 0.75 |
//! | pattern | keyword rule table ([`rules`]) | 0.8 / 0.7 |
//! | unknown | nothing matched | 0.3 |
//!
//! Matching never fails.

pub mod normalize;
pub mod rules;

use crate::reference::Taxonomy;
use crate::types::Category;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

pub use normalize::normalize;
pub use rules::PATTERN_RULES_VERSION;

/// Confidence per matching tier
pub const EXACT_CONFIDENCE: f64 = 1.0;
pub const ALIAS_CONFIDENCE: f64 = 0.95;
pub const SUBSTRING_CONFIDENCE: f64 = 0.8;
pub const FUZZY_CONFIDENCE: f64 = 0.75;
pub const PATTERN_SUBTYPOLOGY_CONFIDENCE: f64 = 0.8;
pub const PATTERN_CATEGORY_CONFIDENCE: f64 = 0.7;
pub const UNKNOWN_CONFIDENCE: f64 = 0.3;

/// Minimum similarity for the fuzzy tier
pub const FUZZY_THRESHOLD: f64 = 0.85;

/// Inputs shorter than this never match by reverse containment or fuzzily
const MIN_PARTIAL_LEN: usize = 4;

/// Which tier produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Exact,
    Alias,
    Substring,
    Fuzzy,
    Pattern,
    Unknown,
}

/// Result of matching one ingredient string
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxonomyMatch {
    pub category: Category,
    pub subcategory: Option<String>,
    pub specific_item: Option<String>,
    pub confidence: f64,
    pub method: MatchMethod,
}

impl TaxonomyMatch {
    pub fn unknown() -> Self {
        Self {
            category: Category::Unknown,
            subcategory: None,
            specific_item: None,
            confidence: UNKNOWN_CONFIDENCE,
            method: MatchMethod::Unknown,
        }
    }

    /// Most specific taxonomy name available, used as the resolver's item key
    pub fn resolution_key(&self) -> Option<&str> {
        self.specific_item
            .as_deref()
            .or(self.subcategory.as_deref())
    }
}

/// One matchable term (item name or alias) in declaration order
#[derive(Debug, Clone)]
struct Term {
    text: String,
    item: String,
    category: Category,
    subcategory: Option<String>,
}

/// Precomputed lookup tables over a [`Taxonomy`]
#[derive(Debug, Clone)]
pub struct TaxonomyMatcher {
    /// Item names first, then aliases
    terms: Vec<Term>,
    item_count: usize,
    by_item_name: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
}

impl TaxonomyMatcher {
    pub fn new(taxonomy: &Taxonomy) -> Self {
        let mut terms = Vec::new();
        let mut by_item_name = HashMap::new();
        let mut by_alias = HashMap::new();

        for item in taxonomy.items() {
            let text = normalize(&item.name);
            if text.is_empty() {
                continue;
            }
            by_item_name.entry(text.clone()).or_insert(terms.len());
            terms.push(Term {
                text,
                item: item.name.clone(),
                category: taxonomy.category_of(&item.name),
                subcategory: taxonomy.subtypology_of(&item.name).map(str::to_string),
            });
        }
        let item_count = terms.len();

        for (alias, item) in taxonomy.aliases() {
            let text = normalize(alias);
            if text.is_empty() {
                continue;
            }
            by_alias.entry(text.clone()).or_insert(terms.len());
            terms.push(Term {
                text,
                item: item.clone(),
                category: taxonomy.category_of(item),
                subcategory: taxonomy.subtypology_of(item).map(str::to_string),
            });
        }

        Self {
            terms,
            item_count,
            by_item_name,
            by_alias,
        }
    }

    /// Classify a raw ingredient string
    pub fn match_ingredient(&self, raw: &str) -> TaxonomyMatch {
        let input = normalize(raw);
        if input.is_empty() {
            debug!(raw, "Empty ingredient after normalisation");
            return TaxonomyMatch::unknown();
        }

        let singular = normalize::singular(&input);
        let forms: Vec<&str> = std::iter::once(input.as_str())
            .chain(singular.as_deref())
            .collect();

        let found = self
            .lookup(&forms, &self.by_item_name, EXACT_CONFIDENCE, MatchMethod::Exact)
            .or_else(|| self.lookup(&forms, &self.by_alias, ALIAS_CONFIDENCE, MatchMethod::Alias))
            .or_else(|| self.substring(&forms))
            .or_else(|| self.fuzzy(&forms))
            .or_else(|| pattern(&input))
            .unwrap_or_else(TaxonomyMatch::unknown);

        debug!(
            raw,
            normalized = %input,
            method = ?found.method,
            category = %found.category,
            item = ?found.specific_item,
            confidence = found.confidence,
            "Ingredient classified"
        );
        found
    }

    fn hit(&self, index: usize, confidence: f64, method: MatchMethod) -> TaxonomyMatch {
        let term = &self.terms[index];
        TaxonomyMatch {
            category: term.category,
            subcategory: term.subcategory.clone(),
            specific_item: Some(term.item.clone()),
            confidence,
            method,
        }
    }

    fn lookup(
        &self,
        forms: &[&str],
        table: &HashMap<String, usize>,
        confidence: f64,
        method: MatchMethod,
    ) -> Option<TaxonomyMatch> {
        forms
            .iter()
            .find_map(|form| table.get(*form))
            .map(|&i| self.hit(i, confidence, method))
    }

    /// Word-bounded containment
    ///
    /// Forward (input contains term): longest term wins. Reverse (item name
    /// contains input): shortest item wins. Ties keep declaration order.
    fn substring(&self, forms: &[&str]) -> Option<TaxonomyMatch> {
        let mut forward: Option<usize> = None;
        for form in forms {
            let padded_input = format!(" {} ", form);
            for (i, term) in self.terms.iter().enumerate() {
                if term.text.len() < 3 || term.text.as_str() == *form {
                    continue;
                }
                if padded_input.contains(&format!(" {} ", term.text)) {
                    let better = match forward {
                        Some(best) => term.text.len() > self.terms[best].text.len(),
                        None => true,
                    };
                    if better {
                        forward = Some(i);
                    }
                }
            }
        }
        if let Some(i) = forward {
            return Some(self.hit(i, SUBSTRING_CONFIDENCE, MatchMethod::Substring));
        }

        let mut reverse: Option<usize> = None;
        for form in forms.iter().filter(|f| f.len() >= MIN_PARTIAL_LEN) {
            let padded_form = format!(" {} ", form);
            for (i, term) in self.terms[..self.item_count].iter().enumerate() {
                if format!(" {} ", term.text).contains(&padded_form) {
                    let better = match reverse {
                        Some(best) => term.text.len() < self.terms[best].text.len(),
                        None => true,
                    };
                    if better {
                        reverse = Some(i);
                    }
                }
            }
        }
        reverse.map(|i| self.hit(i, SUBSTRING_CONFIDENCE, MatchMethod::Substring))
    }

    /// Highest similarity above the threshold, ties keep declaration order
    fn fuzzy(&self, forms: &[&str]) -> Option<TaxonomyMatch> {
        let mut best: Option<(usize, f64)> = None;
        for form in forms.iter().filter(|f| f.len() >= MIN_PARTIAL_LEN) {
            for (i, term) in self.terms.iter().enumerate() {
                let similarity = strsim::normalized_damerau_levenshtein(form, &term.text);
                if similarity <= FUZZY_THRESHOLD {
                    continue;
                }
                if best.map_or(true, |(_, s)| similarity > s) {
                    best = Some((i, similarity));
                }
            }
        }
        best.map(|(i, _)| self.hit(i, FUZZY_CONFIDENCE, MatchMethod::Fuzzy))
    }
}

fn pattern(input: &str) -> Option<TaxonomyMatch> {
    let rule = rules::PATTERN_RULES
        .iter()
        .find(|rule| rule.pattern.is_match(input))?;

    let subcategory = rule.subtypology(input);
    let confidence = if subcategory.is_some() {
        PATTERN_SUBTYPOLOGY_CONFIDENCE
    } else {
        PATTERN_CATEGORY_CONFIDENCE
    };

    Some(TaxonomyMatch {
        category: rule.category,
        subcategory: subcategory.map(str::to_string),
        specific_item: None,
        confidence,
        method: MatchMethod::Pattern,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceData;

    fn matcher() -> TaxonomyMatcher {
        TaxonomyMatcher::new(&ReferenceData::builtin().taxonomy)
    }

    #[test]
    fn test_exact_match() {
        let m = matcher().match_ingredient("Beef");
        assert_eq!(m.method, MatchMethod::Exact);
        assert_eq!(m.category, Category::Meat);
        assert_eq!(m.subcategory.as_deref(), Some("ruminant_meat"));
        assert_eq!(m.specific_item.as_deref(), Some("beef"));
        assert_eq!(m.confidence, 1.0);
    }

    #[test]
    fn test_exact_match_after_normalisation_and_plural() {
        let m = matcher().match_ingredient("400g Tomatoes (ripe)");
        assert_eq!(m.method, MatchMethod::Exact);
        assert_eq!(m.specific_item.as_deref(), Some("tomato"));
    }

    #[test]
    fn test_multilingual_alias() {
        let matcher = matcher();
        for (raw, item) in [
            ("Rindfleisch", "beef"),
            ("pollo", "chicken"),
            ("Riz", "rice"),
            ("aubergine", "eggplant"),
            ("Jamón", "ham"),
            ("huile d'olive", "olive oil"),
        ] {
            let m = matcher.match_ingredient(raw);
            assert_eq!(m.method, MatchMethod::Alias, "{}", raw);
            assert_eq!(m.specific_item.as_deref(), Some(item), "{}", raw);
            assert_eq!(m.confidence, 0.95);
        }
    }

    #[test]
    fn test_substring_prefers_longest_contained_name() {
        let m = matcher().match_ingredient("sweet potato mash");
        assert_eq!(m.method, MatchMethod::Substring);
        assert_eq!(m.specific_item.as_deref(), Some("sweet potato"));
        assert_eq!(m.confidence, 0.8);
    }

    #[test]
    fn test_substring_reverse_containment() {
        let m = matcher().match_ingredient("olive");
        assert_eq!(m.method, MatchMethod::Substring);
        assert_eq!(m.specific_item.as_deref(), Some("olive oil"));
    }

    #[test]
    fn test_substring_respects_word_boundaries() {
        // "ham" must not match inside "graham"
        let m = matcher().match_ingredient("graham crackers");
        assert_ne!(m.specific_item.as_deref(), Some("ham"));
    }

    #[test]
    fn test_fuzzy_catches_misspelling() {
        let m = matcher().match_ingredient("chiken");
        assert_eq!(m.method, MatchMethod::Fuzzy);
        assert_eq!(m.specific_item.as_deref(), Some("chicken"));
        assert_eq!(m.confidence, 0.75);
    }

    #[test]
    fn test_pattern_cascade() {
        let m = matcher().match_ingredient("langoustines");
        assert_eq!(m.method, MatchMethod::Pattern);
        assert_eq!(m.category, Category::Seafood);
        assert_eq!(m.subcategory.as_deref(), Some("shellfish"));
        assert!(m.specific_item.is_none());
        assert_eq!(m.resolution_key(), Some("shellfish"));
        assert_eq!(m.confidence, 0.8);
    }

    #[test]
    fn test_unknown_ingredient() {
        let m = matcher().match_ingredient("xyzfood123");
        assert_eq!(m.category, Category::Unknown);
        assert!(m.confidence <= 0.3);
        assert!(m.resolution_key().is_none());
    }

    #[test]
    fn test_blank_ingredient_is_unknown() {
        let m = matcher().match_ingredient("  2 cups ");
        assert_eq!(m.method, MatchMethod::Unknown);
    }
}
