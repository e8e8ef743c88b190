//! Reference data: taxonomy tree, aliases, seasonal calendar and the four
//! adjustment factor tables
//!
//! Loaded once at startup (from the structured store, or from the built-in
//! tables when the store is unavailable) and shared read-only behind an `Arc`.

pub mod defaults;

use crate::types::{Category, NodeUncertainty, TaxonomyLevel, TaxonomyNode, GLOBAL_COUNTRY};
use std::collections::HashMap;

/// Item → sub-typology → typology tree with ordered aliases
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    nodes: Vec<TaxonomyNode>,
    index: HashMap<String, usize>,
    aliases: Vec<(String, String)>,
}

impl Taxonomy {
    /// Build from nodes and `(alias, item)` pairs, both in declaration order
    ///
    /// Aliases pointing at unknown items are dropped.
    pub fn new(nodes: Vec<TaxonomyNode>, aliases: Vec<(String, String)>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.name.clone(), i))
            .collect::<HashMap<_, _>>();

        let aliases = aliases
            .into_iter()
            .filter(|(_, item)| index.contains_key(item))
            .collect();

        Self {
            nodes,
            index,
            aliases,
        }
    }

    pub fn node(&self, name: &str) -> Option<&TaxonomyNode> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    pub fn nodes(&self) -> &[TaxonomyNode] {
        &self.nodes
    }

    pub fn aliases(&self) -> &[(String, String)] {
        &self.aliases
    }

    /// Item-level nodes in declaration order
    pub fn items(&self) -> impl Iterator<Item = &TaxonomyNode> {
        self.nodes
            .iter()
            .filter(|node| node.level == TaxonomyLevel::Item)
    }

    pub fn parent_of(&self, node: &TaxonomyNode) -> Option<&TaxonomyNode> {
        node.parent.as_deref().and_then(|p| self.node(p))
    }

    /// Nearest ancestor (or self) at `level`
    pub fn ancestor_at(&self, name: &str, level: TaxonomyLevel) -> Option<&TaxonomyNode> {
        let mut current = self.node(name)?;
        // Depth is at most three; the bound guards against a cyclic store
        for _ in 0..4 {
            if current.level == level {
                return Some(current);
            }
            current = self.parent_of(current)?;
        }
        None
    }

    /// Category of any node, `Unknown` when the chain is broken
    pub fn category_of(&self, name: &str) -> Category {
        self.ancestor_at(name, TaxonomyLevel::Typology)
            .and_then(|typology| Category::parse(&typology.name))
            .unwrap_or(Category::Unknown)
    }

    pub fn subtypology_of(&self, name: &str) -> Option<&str> {
        self.ancestor_at(name, TaxonomyLevel::Subtypology)
            .map(|node| node.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Per-country growing calendar for one item
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalWindow {
    pub country: String,
    pub item: String,
    pub in_season: Vec<u32>,
    pub near_season: Vec<u32>,
}

/// Regional multiplier overriding the origin table for one item
#[derive(Debug, Clone, PartialEq)]
pub struct RegionalSpecialCase {
    pub item: String,
    pub origin: String,
    /// Season label, or `any`
    pub season: String,
    pub value: f64,
}

/// Every table the engine consults besides emission factor records
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub taxonomy: Taxonomy,
    pub seasonal_calendar: Vec<SeasonalWindow>,
    pub seasonal_factors: HashMap<String, f64>,
    pub regional_factors: HashMap<String, f64>,
    pub regional_special_cases: Vec<RegionalSpecialCase>,
    /// Keyed (method, category)
    pub processing_factors: HashMap<(String, String), f64>,
    /// Keyed (category, stage)
    pub waste_factors: HashMap<(String, String), f64>,
}

impl ReferenceData {
    /// Tables compiled into the binary
    pub fn builtin() -> Self {
        let mut nodes = Vec::new();
        for &(name, factor, uncertainty) in defaults::TYPOLOGIES {
            nodes.push(node(name, TaxonomyLevel::Typology, None, factor, uncertainty));
        }
        for &(name, parent, factor, uncertainty) in defaults::SUBTYPOLOGIES {
            nodes.push(node(
                name,
                TaxonomyLevel::Subtypology,
                Some(parent),
                factor,
                uncertainty,
            ));
        }
        for &(name, parent, factor, uncertainty) in defaults::ITEMS {
            nodes.push(node(name, TaxonomyLevel::Item, Some(parent), factor, uncertainty));
        }

        let aliases = defaults::ALIASES
            .iter()
            .map(|&(alias, item)| (alias.to_string(), item.to_string()))
            .collect();

        let seasonal_calendar = defaults::SEASONAL_CALENDAR
            .iter()
            .map(|&(country, item, in_season, near_season)| SeasonalWindow {
                country: country.to_string(),
                item: item.to_string(),
                in_season: in_season.to_vec(),
                near_season: near_season.to_vec(),
            })
            .collect();

        let regional_special_cases = defaults::REGIONAL_SPECIAL_CASES
            .iter()
            .map(|&(item, origin, season, value)| RegionalSpecialCase {
                item: item.to_string(),
                origin: origin.to_string(),
                season: season.to_string(),
                value,
            })
            .collect();

        Self {
            taxonomy: Taxonomy::new(nodes, aliases),
            seasonal_calendar,
            seasonal_factors: keyed(defaults::SEASONAL_FACTORS),
            regional_factors: keyed(defaults::REGIONAL_FACTORS),
            regional_special_cases,
            processing_factors: pair_keyed(defaults::PROCESSING_FACTORS),
            waste_factors: pair_keyed(defaults::WASTE_FACTORS),
        }
    }

    /// Calendar entry for (country, item), falling back to the global calendar
    pub fn seasonal_window(&self, country: &str, item: &str) -> Option<&SeasonalWindow> {
        self.seasonal_calendar
            .iter()
            .find(|w| w.country == country && w.item == item)
            .or_else(|| {
                self.seasonal_calendar
                    .iter()
                    .find(|w| w.country == GLOBAL_COUNTRY && w.item == item)
            })
    }
}

fn node(
    name: &str,
    level: TaxonomyLevel,
    parent: Option<&str>,
    factor: f64,
    uncertainty: NodeUncertainty,
) -> TaxonomyNode {
    TaxonomyNode {
        name: name.to_string(),
        level,
        parent: parent.map(str::to_string),
        emission_factor_kg_per_kg: factor,
        uncertainty,
    }
}

fn keyed(table: &[(&str, f64)]) -> HashMap<String, f64> {
    table.iter().map(|&(k, v)| (k.to_string(), v)).collect()
}

fn pair_keyed(table: &[(&str, &str, f64)]) -> HashMap<(String, String), f64> {
    table
        .iter()
        .map(|&(a, b, v)| ((a.to_string(), b.to_string()), v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_every_item_reaches_a_typology() {
        let data = ReferenceData::builtin();
        for item in data.taxonomy.items() {
            assert_ne!(
                data.taxonomy.category_of(&item.name),
                Category::Unknown,
                "{} has no typology",
                item.name
            );
            assert!(data.taxonomy.subtypology_of(&item.name).is_some());
        }
    }

    #[test]
    fn test_builtin_aliases_all_resolve() {
        let data = ReferenceData::builtin();
        assert_eq!(data.taxonomy.aliases().len(), defaults::ALIASES.len());
    }

    #[test]
    fn test_category_of_walks_the_tree() {
        let data = ReferenceData::builtin();
        assert_eq!(data.taxonomy.category_of("beef"), Category::Meat);
        assert_eq!(data.taxonomy.subtypology_of("beef"), Some("ruminant_meat"));
        assert_eq!(data.taxonomy.category_of("pulses"), Category::Legumes);
        assert_eq!(data.taxonomy.category_of("nuts_seeds"), Category::NutsSeeds);
        assert_eq!(data.taxonomy.category_of("gravel"), Category::Unknown);
    }

    #[test]
    fn test_every_dimension_has_a_default_key() {
        let data = ReferenceData::builtin();
        assert!(data.seasonal_factors.contains_key("default"));
        assert!(data.regional_factors.contains_key("default"));
        assert!(data
            .processing_factors
            .contains_key(&("default".to_string(), "default".to_string())));
        assert!(data
            .waste_factors
            .contains_key(&("default".to_string(), "default".to_string())));
    }

    #[test]
    fn test_seasonal_window_falls_back_to_global() {
        let data = ReferenceData::builtin();
        let gb = data.seasonal_window("gb", "lettuce").unwrap();
        assert_eq!(gb.country, "gb");

        let fallback = data.seasonal_window("de", "lettuce").unwrap();
        assert_eq!(fallback.country, GLOBAL_COUNTRY);

        assert!(data.seasonal_window("gb", "banana").is_none());
    }

    #[test]
    fn test_dangling_alias_dropped() {
        let taxonomy = Taxonomy::new(
            vec![node("beef", TaxonomyLevel::Item, None, 60.0, NodeUncertainty::High)],
            vec![
                ("boeuf".into(), "beef".into()),
                ("ghost".into(), "missing".into()),
            ],
        );
        assert_eq!(taxonomy.aliases().len(), 1);
    }
}
