//! Built-in reference tables
//!
//! Seeded into the structured store on first run and used directly when no
//! database is available. Emission factors are kg CO2e per kg of food at the
//! retail gate; values follow published life-cycle meta-analyses rounded to
//! one decimal. Declaration order matters: it is the final tie-breaker of the
//! taxonomy matcher.

use crate::types::NodeUncertainty::{self, High, Low};

/// (typology, emission factor, uncertainty)
pub const TYPOLOGIES: &[(&str, f64, NodeUncertainty)] = &[
    ("meat", 20.0, High),
    ("seafood", 7.0, High),
    ("dairy", 6.0, Low),
    ("vegetables", 0.7, Low),
    ("fruits", 0.8, Low),
    ("grains", 1.6, Low),
    ("legumes", 1.0, Low),
    ("nuts_seeds", 2.0, Low),
    ("oils", 5.0, Low),
];

/// (sub-typology, parent typology, emission factor, uncertainty)
pub const SUBTYPOLOGIES: &[(&str, &str, f64, NodeUncertainty)] = &[
    ("ruminant_meat", "meat", 45.0, High),
    ("pork_meat", "meat", 7.5, Low),
    ("poultry", "meat", 6.5, Low),
    ("fish", "seafood", 8.0, High),
    ("shellfish", "seafood", 11.0, High),
    ("fresh_dairy", "dairy", 3.0, Low),
    ("cheese_butter", "dairy", 18.0, Low),
    ("eggs", "dairy", 4.5, Low),
    ("leafy_vegetables", "vegetables", 0.6, Low),
    ("root_vegetables", "vegetables", 0.4, Low),
    ("allium", "vegetables", 0.5, Low),
    ("fruiting_vegetables", "vegetables", 1.5, High),
    ("brassicas", "vegetables", 0.6, Low),
    ("mushrooms", "vegetables", 1.0, Low),
    ("other_vegetables", "vegetables", 0.8, Low),
    ("citrus", "fruits", 0.4, Low),
    ("berries", "fruits", 1.4, High),
    ("tropical_fruits", "fruits", 1.2, High),
    ("temperate_fruits", "fruits", 0.6, Low),
    ("rice_products", "grains", 4.0, High),
    ("wheat_products", "grains", 1.5, Low),
    ("other_grains", "grains", 1.6, Low),
    ("pulses", "legumes", 1.0, Low),
    ("soy_products", "legumes", 2.5, Low),
    ("tree_nuts", "nuts_seeds", 2.0, High),
    ("groundnuts", "nuts_seeds", 3.2, Low),
    ("seeds", "nuts_seeds", 1.2, Low),
    ("plant_oils", "oils", 4.0, Low),
    ("tropical_oils", "oils", 7.0, High),
];

/// (item, parent sub-typology, emission factor, uncertainty)
pub const ITEMS: &[(&str, &str, f64, NodeUncertainty)] = &[
    // meat
    ("beef", "ruminant_meat", 60.0, High),
    ("lamb", "ruminant_meat", 24.0, High),
    ("veal", "ruminant_meat", 28.0, High),
    ("goat", "ruminant_meat", 20.0, High),
    ("venison", "ruminant_meat", 15.0, High),
    ("pork", "pork_meat", 7.2, Low),
    ("ham", "pork_meat", 7.5, Low),
    ("bacon", "pork_meat", 7.6, Low),
    ("sausage", "pork_meat", 7.0, Low),
    ("salami", "pork_meat", 8.0, Low),
    ("chorizo", "pork_meat", 7.8, Low),
    ("chicken", "poultry", 6.1, Low),
    ("turkey", "poultry", 7.0, Low),
    ("duck", "poultry", 6.5, Low),
    // seafood
    ("salmon", "fish", 11.9, High),
    ("tuna", "fish", 6.1, High),
    ("cod", "fish", 5.4, High),
    ("trout", "fish", 6.0, High),
    ("haddock", "fish", 5.0, High),
    ("mackerel", "fish", 3.0, High),
    ("sardine", "fish", 2.0, Low),
    ("anchovy", "fish", 1.5, Low),
    ("tilapia", "fish", 6.0, High),
    ("shrimp", "shellfish", 12.0, High),
    ("mussel", "shellfish", 0.6, Low),
    ("oyster", "shellfish", 1.0, Low),
    ("crab", "shellfish", 10.0, High),
    ("lobster", "shellfish", 20.0, High),
    ("squid", "shellfish", 3.0, High),
    ("scallop", "shellfish", 8.0, High),
    // dairy
    ("soy milk", "soy_products", 1.0, Low),
    ("milk", "fresh_dairy", 3.2, Low),
    ("cream", "fresh_dairy", 5.6, Low),
    ("yogurt", "fresh_dairy", 2.5, Low),
    ("cheese", "cheese_butter", 21.2, High),
    ("mozzarella", "cheese_butter", 14.0, High),
    ("parmesan", "cheese_butter", 22.0, High),
    ("feta", "cheese_butter", 12.0, High),
    ("butter", "cheese_butter", 11.9, Low),
    ("egg", "eggs", 4.7, Low),
    // vegetables
    ("lettuce", "leafy_vegetables", 0.5, Low),
    ("spinach", "leafy_vegetables", 0.5, Low),
    ("kale", "leafy_vegetables", 0.4, Low),
    ("cabbage", "leafy_vegetables", 0.4, Low),
    ("arugula", "leafy_vegetables", 0.6, Low),
    ("sweet potato", "root_vegetables", 0.6, Low),
    ("potato", "root_vegetables", 0.5, Low),
    ("carrot", "root_vegetables", 0.4, Low),
    ("beetroot", "root_vegetables", 0.4, Low),
    ("parsnip", "root_vegetables", 0.4, Low),
    ("radish", "root_vegetables", 0.4, Low),
    ("onion", "allium", 0.5, Low),
    ("garlic", "allium", 0.6, Low),
    ("leek", "allium", 0.6, Low),
    ("tomato", "fruiting_vegetables", 2.1, High),
    ("cucumber", "fruiting_vegetables", 1.0, High),
    ("bell pepper", "fruiting_vegetables", 1.5, High),
    ("zucchini", "fruiting_vegetables", 0.6, Low),
    ("eggplant", "fruiting_vegetables", 0.8, Low),
    ("pumpkin", "fruiting_vegetables", 0.5, Low),
    ("broccoli", "brassicas", 0.9, Low),
    ("cauliflower", "brassicas", 0.8, Low),
    ("brussels sprout", "brassicas", 0.9, Low),
    ("mushroom", "mushrooms", 1.0, Low),
    ("asparagus", "other_vegetables", 1.3, High),
    ("celery", "other_vegetables", 0.4, Low),
    ("green bean", "other_vegetables", 1.0, Low),
    // fruits
    ("orange", "citrus", 0.4, Low),
    ("lemon", "citrus", 0.4, Low),
    ("lime", "citrus", 0.4, Low),
    ("grapefruit", "citrus", 0.4, Low),
    ("mandarin", "citrus", 0.4, Low),
    ("strawberry", "berries", 1.4, High),
    ("raspberry", "berries", 1.5, High),
    ("blueberry", "berries", 1.5, High),
    ("banana", "tropical_fruits", 0.9, Low),
    ("mango", "tropical_fruits", 1.4, High),
    ("pineapple", "tropical_fruits", 0.9, Low),
    ("avocado", "tropical_fruits", 2.5, High),
    ("papaya", "tropical_fruits", 1.0, High),
    ("kiwi", "tropical_fruits", 0.8, Low),
    ("apple", "temperate_fruits", 0.4, Low),
    ("pear", "temperate_fruits", 0.4, Low),
    ("peach", "temperate_fruits", 0.8, Low),
    ("cherry", "temperate_fruits", 1.0, Low),
    ("grape", "temperate_fruits", 1.4, High),
    ("plum", "temperate_fruits", 0.6, Low),
    ("apricot", "temperate_fruits", 0.8, Low),
    // grains
    ("rice", "rice_products", 4.5, High),
    ("bread", "wheat_products", 1.6, Low),
    ("pasta", "wheat_products", 1.7, Low),
    ("flour", "wheat_products", 1.4, Low),
    ("couscous", "wheat_products", 1.5, Low),
    ("noodle", "wheat_products", 1.7, Low),
    ("wheat", "wheat_products", 1.4, Low),
    ("oat", "other_grains", 2.5, High),
    ("corn", "other_grains", 1.7, Low),
    ("barley", "other_grains", 1.2, Low),
    ("quinoa", "other_grains", 1.2, Low),
    // legumes
    ("lentil", "pulses", 1.8, Low),
    ("chickpea", "pulses", 1.6, Low),
    ("bean", "pulses", 2.0, Low),
    ("pea", "pulses", 1.0, Low),
    ("tofu", "soy_products", 3.2, Low),
    ("tempeh", "soy_products", 2.0, Low),
    ("soybean", "soy_products", 2.0, Low),
    // nuts & seeds
    ("almond", "tree_nuts", 2.3, High),
    ("walnut", "tree_nuts", 2.0, High),
    ("cashew", "tree_nuts", 2.5, High),
    ("hazelnut", "tree_nuts", 1.5, High),
    ("pistachio", "tree_nuts", 2.0, High),
    ("peanut", "groundnuts", 3.2, Low),
    ("sunflower seed", "seeds", 1.5, Low),
    ("sesame seed", "seeds", 1.2, Low),
    ("chia seed", "seeds", 1.0, Low),
    ("pumpkin seed", "seeds", 1.5, Low),
    // oils
    ("olive oil", "plant_oils", 5.4, Low),
    ("sunflower oil", "plant_oils", 3.6, Low),
    ("rapeseed oil", "plant_oils", 3.7, Low),
    ("palm oil", "tropical_oils", 7.3, High),
    ("coconut oil", "tropical_oils", 4.0, High),
];

/// (alias, item) - synonyms, regional names and translations
pub const ALIASES: &[(&str, &str)] = &[
    ("rindfleisch", "beef"),
    ("boeuf", "beef"),
    ("carne de res", "beef"),
    ("ternera", "beef"),
    ("manzo", "beef"),
    ("mince", "beef"),
    ("steak", "beef"),
    ("brisket", "beef"),
    ("sirloin", "beef"),
    ("mutton", "lamb"),
    ("agneau", "lamb"),
    ("cordero", "lamb"),
    ("lammfleisch", "lamb"),
    ("porc", "pork"),
    ("cerdo", "pork"),
    ("schweinefleisch", "pork"),
    ("maiale", "pork"),
    ("pork belly", "pork"),
    ("jambon", "ham"),
    ("jamon", "ham"),
    ("schinken", "ham"),
    ("prosciutto", "ham"),
    ("pancetta", "bacon"),
    ("lardons", "bacon"),
    ("pollo", "chicken"),
    ("poulet", "chicken"),
    ("hahnchen", "chicken"),
    ("huhn", "chicken"),
    ("chicken breast", "chicken"),
    ("chicken thigh", "chicken"),
    ("dinde", "turkey"),
    ("pavo", "turkey"),
    ("pute", "turkey"),
    ("saumon", "salmon"),
    ("lachs", "salmon"),
    ("salmone", "salmon"),
    ("thon", "tuna"),
    ("atun", "tuna"),
    ("thunfisch", "tuna"),
    ("tonno", "tuna"),
    ("cabillaud", "cod"),
    ("bacalao", "cod"),
    ("kabeljau", "cod"),
    ("merluzzo", "cod"),
    ("prawn", "shrimp"),
    ("gambas", "shrimp"),
    ("crevette", "shrimp"),
    ("garnelen", "shrimp"),
    ("gamberi", "shrimp"),
    ("moules", "mussel"),
    ("mejillones", "mussel"),
    ("miesmuscheln", "mussel"),
    ("cozze", "mussel"),
    ("lait", "milk"),
    ("leche", "milk"),
    ("milch", "milk"),
    ("latte", "milk"),
    ("soya milk", "soy milk"),
    ("fromage", "cheese"),
    ("queso", "cheese"),
    ("kase", "cheese"),
    ("formaggio", "cheese"),
    ("cheddar", "cheese"),
    ("gouda", "cheese"),
    ("brie", "cheese"),
    ("emmental", "cheese"),
    ("gruyere", "cheese"),
    ("parmigiano", "parmesan"),
    ("beurre", "butter"),
    ("mantequilla", "butter"),
    ("burro", "butter"),
    ("creme", "cream"),
    ("creme fraiche", "cream"),
    ("nata", "cream"),
    ("sahne", "cream"),
    ("panna", "cream"),
    ("heavy cream", "cream"),
    ("sour cream", "cream"),
    ("yoghurt", "yogurt"),
    ("yogourt", "yogurt"),
    ("yaourt", "yogurt"),
    ("joghurt", "yogurt"),
    ("yogur", "yogurt"),
    ("oeuf", "egg"),
    ("huevo", "egg"),
    ("ei", "egg"),
    ("eier", "egg"),
    ("uovo", "egg"),
    ("uova", "egg"),
    ("salad", "lettuce"),
    ("mixed salad", "lettuce"),
    ("salad leaves", "lettuce"),
    ("laitue", "lettuce"),
    ("lechuga", "lettuce"),
    ("kopfsalat", "lettuce"),
    ("lattuga", "lettuce"),
    ("romaine", "lettuce"),
    ("iceberg", "lettuce"),
    ("epinards", "spinach"),
    ("espinaca", "spinach"),
    ("spinat", "spinach"),
    ("spinaci", "spinach"),
    ("grunkohl", "kale"),
    ("cavolo nero", "kale"),
    ("chou", "cabbage"),
    ("kohl", "cabbage"),
    ("rocket", "arugula"),
    ("roquette", "arugula"),
    ("rucola", "arugula"),
    ("carotte", "carrot"),
    ("zanahoria", "carrot"),
    ("karotte", "carrot"),
    ("mohre", "carrot"),
    ("carota", "carrot"),
    ("pomme de terre", "potato"),
    ("patata", "potato"),
    ("papa", "potato"),
    ("kartoffel", "potato"),
    ("yam", "sweet potato"),
    ("batata", "sweet potato"),
    ("patate douce", "sweet potato"),
    ("susskartoffel", "sweet potato"),
    ("beet", "beetroot"),
    ("oignon", "onion"),
    ("cebolla", "onion"),
    ("zwiebel", "onion"),
    ("cipolla", "onion"),
    ("scallion", "onion"),
    ("spring onion", "onion"),
    ("green onion", "onion"),
    ("shallot", "onion"),
    ("ail", "garlic"),
    ("ajo", "garlic"),
    ("knoblauch", "garlic"),
    ("aglio", "garlic"),
    ("poireau", "leek"),
    ("cherry tomato", "tomato"),
    ("tomate", "tomato"),
    ("pomodoro", "tomato"),
    ("concombre", "cucumber"),
    ("pepino", "cucumber"),
    ("gurke", "cucumber"),
    ("cetriolo", "cucumber"),
    ("poivron", "bell pepper"),
    ("pimiento", "bell pepper"),
    ("capsicum", "bell pepper"),
    ("red pepper", "bell pepper"),
    ("green pepper", "bell pepper"),
    ("sweet pepper", "bell pepper"),
    ("courgette", "zucchini"),
    ("calabacin", "zucchini"),
    ("zucchina", "zucchini"),
    ("aubergine", "eggplant"),
    ("berenjena", "eggplant"),
    ("melanzana", "eggplant"),
    ("squash", "pumpkin"),
    ("citrouille", "pumpkin"),
    ("calabaza", "pumpkin"),
    ("brocoli", "broccoli"),
    ("champignon", "mushroom"),
    ("champinon", "mushroom"),
    ("seta", "mushroom"),
    ("pilz", "mushroom"),
    ("funghi", "mushroom"),
    ("portobello", "mushroom"),
    ("shiitake", "mushroom"),
    ("asperge", "asparagus"),
    ("esparrago", "asparagus"),
    ("spargel", "asparagus"),
    ("haricot vert", "green bean"),
    ("string bean", "green bean"),
    ("naranja", "orange"),
    ("arancia", "orange"),
    ("citron", "lemon"),
    ("limon", "lemon"),
    ("zitrone", "lemon"),
    ("fraise", "strawberry"),
    ("fresa", "strawberry"),
    ("erdbeere", "strawberry"),
    ("fragola", "strawberry"),
    ("framboise", "raspberry"),
    ("myrtille", "blueberry"),
    ("arandano", "blueberry"),
    ("banane", "banana"),
    ("platano", "banana"),
    ("pomme", "apple"),
    ("manzana", "apple"),
    ("apfel", "apple"),
    ("mela", "apple"),
    ("poire", "pear"),
    ("pera", "pear"),
    ("birne", "pear"),
    ("raisin", "grape"),
    ("uva", "grape"),
    ("riz", "rice"),
    ("arroz", "rice"),
    ("reis", "rice"),
    ("riso", "rice"),
    ("basmati", "rice"),
    ("arborio", "rice"),
    ("pain", "bread"),
    ("pan", "bread"),
    ("brot", "bread"),
    ("pane", "bread"),
    ("baguette", "bread"),
    ("sourdough", "bread"),
    ("toast", "bread"),
    ("spaghetti", "pasta"),
    ("penne", "pasta"),
    ("macaroni", "pasta"),
    ("fusilli", "pasta"),
    ("tagliatelle", "pasta"),
    ("lasagne", "pasta"),
    ("farine", "flour"),
    ("harina", "flour"),
    ("mehl", "flour"),
    ("ramen", "noodle"),
    ("udon", "noodle"),
    ("soba", "noodle"),
    ("porridge", "oat"),
    ("maize", "corn"),
    ("mais", "corn"),
    ("maiz", "corn"),
    ("sweetcorn", "corn"),
    ("lentille", "lentil"),
    ("lenteja", "lentil"),
    ("linsen", "lentil"),
    ("dal", "lentil"),
    ("dhal", "lentil"),
    ("garbanzo", "chickpea"),
    ("pois chiche", "chickpea"),
    ("kichererbsen", "chickpea"),
    ("ceci", "chickpea"),
    ("hummus", "chickpea"),
    ("haricot", "bean"),
    ("frijol", "bean"),
    ("frijoles", "bean"),
    ("bohnen", "bean"),
    ("fagioli", "bean"),
    ("kidney bean", "bean"),
    ("black bean", "bean"),
    ("petit pois", "pea"),
    ("guisante", "pea"),
    ("bean curd", "tofu"),
    ("edamame", "soybean"),
    ("peanut butter", "peanut"),
    ("groundnut", "peanut"),
    ("cacahuete", "peanut"),
    ("cacahuate", "peanut"),
    ("erdnuss", "peanut"),
    ("amande", "almond"),
    ("almendra", "almond"),
    ("mandel", "almond"),
    ("noix", "walnut"),
    ("nuez", "walnut"),
    ("huile d olive", "olive oil"),
    ("aceite de oliva", "olive oil"),
    ("olivenol", "olive oil"),
    ("olio d oliva", "olive oil"),
    ("evoo", "olive oil"),
    ("extra virgin olive oil", "olive oil"),
    ("huile de tournesol", "sunflower oil"),
    ("aceite de girasol", "sunflower oil"),
    ("canola oil", "rapeseed oil"),
    ("colza", "rapeseed oil"),
    ("vegetable oil", "rapeseed oil"),
    ("huile de palme", "palm oil"),
    ("aceite de palma", "palm oil"),
];

/// (country, item, in-season months, near-season months)
pub const SEASONAL_CALENDAR: &[(&str, &str, &[u32], &[u32])] = &[
    // northern temperate default
    ("global", "lettuce", &[5, 6, 7, 8, 9], &[4, 10]),
    ("global", "spinach", &[3, 4, 5, 9, 10], &[2, 6, 11]),
    ("global", "kale", &[1, 2, 3, 10, 11, 12], &[4, 9]),
    ("global", "cabbage", &[1, 2, 3, 9, 10, 11, 12], &[4, 8]),
    ("global", "arugula", &[5, 6, 7, 8, 9], &[4, 10]),
    ("global", "carrot", &[6, 7, 8, 9, 10, 11], &[5, 12]),
    ("global", "potato", &[6, 7, 8, 9, 10], &[5, 11]),
    ("global", "beetroot", &[6, 7, 8, 9, 10], &[5, 11]),
    ("global", "onion", &[7, 8, 9, 10], &[6, 11]),
    ("global", "leek", &[1, 2, 3, 9, 10, 11, 12], &[4, 8]),
    ("global", "tomato", &[7, 8, 9], &[6, 10]),
    ("global", "cucumber", &[6, 7, 8, 9], &[5, 10]),
    ("global", "bell pepper", &[7, 8, 9], &[6, 10]),
    ("global", "zucchini", &[6, 7, 8, 9], &[5, 10]),
    ("global", "eggplant", &[7, 8, 9], &[6, 10]),
    ("global", "pumpkin", &[9, 10, 11], &[8, 12]),
    ("global", "broccoli", &[6, 7, 8, 9, 10], &[5, 11]),
    ("global", "cauliflower", &[6, 7, 8, 9, 10, 11], &[5, 12]),
    ("global", "brussels sprout", &[10, 11, 12, 1, 2], &[9, 3]),
    ("global", "asparagus", &[4, 5, 6], &[3, 7]),
    ("global", "mushroom", &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12], &[]),
    ("global", "green bean", &[7, 8, 9], &[6, 10]),
    ("global", "apple", &[8, 9, 10, 11], &[7, 12]),
    ("global", "pear", &[8, 9, 10, 11], &[7, 12]),
    ("global", "strawberry", &[6, 7], &[5, 8]),
    ("global", "raspberry", &[7, 8], &[6, 9]),
    ("global", "blueberry", &[7, 8], &[6, 9]),
    ("global", "cherry", &[6, 7], &[5, 8]),
    ("global", "peach", &[7, 8], &[6, 9]),
    ("global", "plum", &[8, 9], &[7, 10]),
    ("global", "grape", &[9, 10], &[8, 11]),
    ("global", "orange", &[12, 1, 2, 3], &[11, 4]),
    // United Kingdom
    ("gb", "lettuce", &[6, 7, 8, 9], &[5, 10]),
    ("gb", "tomato", &[7, 8, 9], &[6, 10]),
    ("gb", "strawberry", &[6, 7, 8], &[5, 9]),
    ("gb", "asparagus", &[5, 6], &[4, 7]),
    ("gb", "apple", &[9, 10, 11, 12], &[8, 1]),
    // Spain
    ("es", "lettuce", &[10, 11, 12, 1, 2, 3, 4, 5], &[6, 9]),
    ("es", "tomato", &[6, 7, 8, 9, 10], &[5, 11]),
    ("es", "strawberry", &[2, 3, 4, 5], &[1, 6]),
    ("es", "orange", &[12, 1, 2, 3, 4], &[11, 5]),
    ("es", "lemon", &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12], &[]),
    // United States
    ("us", "lettuce", &[5, 6, 7, 8, 9, 10], &[4, 11]),
    ("us", "strawberry", &[4, 5, 6, 7], &[3, 8]),
    ("us", "tomato", &[7, 8, 9], &[6, 10]),
];

/// Seasonal label → multiplier (greenhouse keys apply to heated production)
pub const SEASONAL_FACTORS: &[(&str, f64)] = &[
    ("in_season", 1.0),
    ("near_season", 1.1),
    ("out_of_season", 1.2),
    ("greenhouse_leafy", 1.5),
    ("greenhouse_fruiting", 1.8),
    ("default", 1.0),
];

/// Countries where out-of-season salad and fruiting crops come from heated glass
pub const HEATED_GREENHOUSE_COUNTRIES: &[&str] = &[
    "gb", "de", "fr", "nl", "be", "dk", "se", "no", "fi", "pl", "ie", "at", "ch",
];

/// Origin label → transport multiplier
pub const REGIONAL_FACTORS: &[(&str, f64)] = &[
    ("local", 0.9),
    ("regional", 0.95),
    ("national", 1.0),
    ("imported_ground", 1.15),
    ("imported_sea", 1.1),
    ("air_freighted", 2.5),
    ("default", 1.0),
];

/// (item, origin, season label or "any", multiplier), precedes REGIONAL_FACTORS
pub const REGIONAL_SPECIAL_CASES: &[(&str, &str, &str, f64)] = &[
    ("asparagus", "air_freighted", "out_of_season", 3.5),
    ("strawberry", "air_freighted", "out_of_season", 3.0),
    ("blueberry", "air_freighted", "any", 2.8),
    ("green bean", "air_freighted", "any", 3.2),
    ("mango", "air_freighted", "any", 3.0),
    ("pineapple", "air_freighted", "any", 3.0),
    ("avocado", "imported_sea", "any", 1.25),
    ("banana", "imported_sea", "any", 1.05),
    ("tomato", "local", "out_of_season", 1.3),
    ("lettuce", "local", "out_of_season", 1.25),
];

/// (processing method, category, multiplier)
pub const PROCESSING_FACTORS: &[(&str, &str, f64)] = &[
    ("raw", "default", 1.0),
    ("fresh", "default", 1.0),
    ("cooked", "default", 1.05),
    ("frozen", "vegetables", 1.3),
    ("frozen", "fruits", 1.3),
    ("frozen", "seafood", 1.2),
    ("frozen", "default", 1.25),
    ("canned", "vegetables", 1.4),
    ("canned", "legumes", 1.2),
    ("canned", "seafood", 1.3),
    ("canned", "default", 1.35),
    ("dried", "fruits", 1.5),
    ("dried", "legumes", 1.0),
    ("dried", "default", 1.3),
    ("smoked", "default", 1.1),
    ("processed", "meat", 1.15),
    ("processed", "default", 1.2),
    ("default", "default", 1.0),
];

/// (category, lifecycle stage, fraction lost)
pub const WASTE_FACTORS: &[(&str, &str, f64)] = &[
    ("fruits", "retail", 0.10),
    ("fruits", "consumption", 0.19),
    ("fruits", "default", 0.12),
    ("vegetables", "retail", 0.09),
    ("vegetables", "consumption", 0.17),
    ("vegetables", "default", 0.11),
    ("meat", "retail", 0.04),
    ("meat", "consumption", 0.11),
    ("meat", "default", 0.06),
    ("seafood", "retail", 0.09),
    ("seafood", "consumption", 0.12),
    ("seafood", "default", 0.10),
    ("dairy", "retail", 0.05),
    ("dairy", "consumption", 0.07),
    ("dairy", "default", 0.05),
    ("grains", "retail", 0.02),
    ("grains", "consumption", 0.25),
    ("grains", "default", 0.08),
    ("legumes", "default", 0.05),
    ("nuts_seeds", "default", 0.03),
    ("oils", "default", 0.02),
    ("default", "default", 0.05),
];
