//! Free-text ingredient normalisation
//!
//! "200g Fresh Crème Fraîche (optional)" → "creme fraiche"

use once_cell::sync::Lazy;
use regex::Regex;

static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)|\[[^\]]*\]").expect("valid bracket regex"));

static QUANTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+(?:[.,/]\d+)?(?:g|gr|kg|mg|ml|cl|dl|l|oz|lb|lbs|x)?$")
        .expect("valid quantity regex")
});

const UNITS: &[&str] = &[
    "g", "gr", "gram", "grams", "kg", "kilo", "kilos", "mg", "ml", "cl", "dl", "l", "litre",
    "litres", "liter", "liters", "oz", "ounce", "ounces", "lb", "lbs", "pound", "pounds", "cup",
    "cups", "tbsp", "tsp", "tablespoon", "tablespoons", "teaspoon", "teaspoons", "piece",
    "pieces", "slice", "slices", "can", "cans", "tin", "tins", "handful", "pinch", "bunch",
    "dash", "x", "½", "¼", "¾",
];

const STOPWORDS: &[&str] = &["a", "an", "of", "the", "some", "to", "taste", "and", "or"];

/// Preparation and marketing words that never change what the food is
const DESCRIPTORS: &[&str] = &[
    "fresh", "freshly", "chopped", "diced", "sliced", "minced", "grated", "shredded", "peeled",
    "crushed", "ground", "organic", "large", "small", "medium", "whole", "raw", "ripe",
    "boneless", "skinless", "finely", "roughly", "thinly", "cubed", "halved", "optional",
    "frozen", "canned", "tinned", "dried", "smoked", "cooked", "roasted", "fried", "boiled",
    "grilled", "baked", "steamed", "lean", "extra", "free", "range", "wild", "farmed",
    "unsalted", "salted", "plain", "low", "fat", "skimmed", "semi",
];

/// Lowercase, fold diacritics, strip quantities, bracketed notes,
/// punctuation and descriptors, collapse whitespace
pub fn normalize(raw: &str) -> String {
    let folded = fold_diacritics(&raw.to_lowercase());
    let unbracketed = BRACKETED.replace_all(&folded, " ");

    let spaced: String = unbracketed
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == ',' || c == '/' || c == '½' || c == '¼' || c == '¾' {
                c
            } else {
                ' '
            }
        })
        .collect();

    let kept: Vec<&str> = spaced
        .split_whitespace()
        .map(|token| token.trim_matches(|c| c == '.' || c == ',' || c == '/'))
        .filter(|token| !token.is_empty())
        .filter(|token| !QUANTITY.is_match(token))
        .filter(|token| !UNITS.contains(token))
        .filter(|token| !STOPWORDS.contains(token))
        .filter(|token| !DESCRIPTORS.contains(token))
        .collect();

    kept.join(" ")
}

/// Map accented Latin letters to their ASCII base ("jamón" → "jamon")
pub fn fold_diacritics(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => out.push('a'),
            'ç' | 'ć' | 'č' => out.push('c'),
            'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' => out.push('e'),
            'ì' | 'í' | 'î' | 'ï' => out.push('i'),
            'ñ' | 'ń' => out.push('n'),
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' => out.push('o'),
            'ù' | 'ú' | 'û' | 'ü' | 'ū' => out.push('u'),
            'ý' | 'ÿ' => out.push('y'),
            'ś' | 'š' => out.push('s'),
            'ź' | 'ż' | 'ž' => out.push('z'),
            'ł' => out.push('l'),
            'ß' => out.push_str("ss"),
            'æ' => out.push_str("ae"),
            'œ' => out.push_str("oe"),
            other => out.push(other),
        }
    }
    out
}

/// Naive English singular of the last word ("tomatoes" → "tomato")
///
/// Returns `None` when the phrase does not look plural.
pub fn singular(phrase: &str) -> Option<String> {
    let (head, last) = match phrase.rsplit_once(' ') {
        Some((head, last)) => (Some(head), last),
        None => (None, phrase),
    };

    let stem = if let Some(stem) = last.strip_suffix("ies") {
        format!("{}y", stem)
    } else if let Some(stem) = last.strip_suffix("oes") {
        format!("{}o", stem)
    } else if ["ches", "shes", "sses", "xes"].iter().any(|s| last.ends_with(s)) {
        last[..last.len() - 2].to_string()
    } else if last.ends_with('s') && !last.ends_with("ss") && last.len() > 3 {
        last[..last.len() - 1].to_string()
    } else {
        return None;
    };

    Some(match head {
        Some(head) => format!("{} {}", head, stem),
        None => stem,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_quantities_and_units() {
        assert_eq!(normalize("200g beef"), "beef");
        assert_eq!(normalize("2 cups of Rice"), "rice");
        assert_eq!(normalize("1.5 kg potatoes"), "potatoes");
        assert_eq!(normalize("½ tsp garlic"), "garlic");
    }

    #[test]
    fn test_strips_notes_and_descriptors() {
        assert_eq!(normalize("Fresh Spinach (washed)"), "spinach");
        assert_eq!(normalize("finely chopped red onion"), "red onion");
        assert_eq!(normalize("frozen peas"), "peas");
    }

    #[test]
    fn test_folds_diacritics() {
        assert_eq!(normalize("Crème Fraîche"), "creme fraiche");
        assert_eq!(normalize("Jamón"), "jamon");
        assert_eq!(normalize("Süßkartoffel"), "susskartoffel");
        assert_eq!(normalize("bœuf"), "boeuf");
    }

    #[test]
    fn test_punctuation_becomes_space() {
        assert_eq!(normalize("huile d'olive"), "huile d olive");
        assert_eq!(normalize("salt & pepper"), "salt pepper");
    }

    #[test]
    fn test_blank_input() {
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("100g"), "");
    }

    #[test]
    fn test_singular() {
        assert_eq!(singular("tomatoes").as_deref(), Some("tomato"));
        assert_eq!(singular("strawberries").as_deref(), Some("strawberry"));
        assert_eq!(singular("brussels sprouts").as_deref(), Some("brussels sprout"));
        assert_eq!(singular("peaches").as_deref(), Some("peach"));
        assert_eq!(singular("lentils").as_deref(), Some("lentil"));
        assert_eq!(singular("grass"), None);
        assert_eq!(singular("rice"), None);
    }
}
