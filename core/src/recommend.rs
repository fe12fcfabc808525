//! Per-diet food recommendation tables.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{NutritionError, Result};
use crate::models::DietPlan;

/// Anything that can list candidate foods for a diet.
pub trait RecommendationSource {
    /// `None` when the source has no list for `diet`.
    fn candidates(&self, diet: DietPlan) -> Option<Vec<String>>;
}

const LOW_CARB: &[&str] = &[
    "Eggs",
    "Avocado",
    "Fish",
    "Walnuts",
    "Cauliflower",
    "Spinach",
    "Broccoli",
    "Olive oil",
    "Almonds",
    "Cheese",
    "Mushrooms",
    "Beef",
    "Salmon",
    "Asparagus",
    "Lettuce",
    "Carrot",
    "Tomato",
    "Cucumber",
    "Bell pepper",
    "Eggplant",
    "Zucchini",
    "Brazil nuts",
    "Celery",
    "Olives",
    "Chia seeds",
    "Flaxseeds",
    "Coconut",
    "Raspberries",
    "Strawberries",
    "Cabbage",
    "Artichoke",
    "Onion",
    "Garlic",
    "Arugula",
    "Basil",
    "Parsley",
    "Endive",
    "Capers",
    "Chili pepper",
    "Snow peas",
    "Lemon",
    "Orange",
    "Pork",
    "Chicken",
    "Plain yogurt",
    "Ricotta",
    "Green tea",
    "Sparkling water",
    "Apple cider vinegar",
    "Coffee",
];

const KETOGENIC: &[&str] = &[
    "Bacon",
    "Cheddar cheese",
    "Lamb",
    "Butter",
    "Cream",
    "Coconut oil",
    "Wild salmon",
    "Free-range eggs",
    "Spinach",
    "Kale",
    "Broccoli",
    "Cauliflower",
    "Avocado",
    "Walnuts",
    "Nuts",
    "Pumpkin seeds",
    "Olives",
    "Mint tea",
    "Unsweetened coffee",
    "Parmesan cheese",
    "Free-range chicken",
    "Ground beef",
    "Shrimp",
    "Tuna",
    "Asparagus",
    "Zucchini",
    "Mushrooms",
    "Garlic",
    "Onion",
    "Chili pepper",
    "Fresh herbs",
    "Lettuce",
    "Arugula",
    "Parsley",
    "Basil",
    "Fresh cream",
    "Heavy cream",
    "MCT oil",
    "Chamomile tea",
    "Mozzarella cheese",
    "Beef",
    "Pork",
    "Fatty fish",
    "Chia seeds",
    "Flaxseeds",
    "Lemon",
    "Apple cider vinegar",
    "Mineral water",
];

const HIGH_PROTEIN: &[&str] = &[
    "Chicken breast",
    "Egg whites",
    "Lean meat",
    "Fish",
    "Cottage cheese",
    "Greek yogurt",
    "Tuna",
    "Lean beef",
    "Salmon",
    "Whole eggs",
    "Tofu",
    "Tempeh",
    "Lentils",
    "Beans",
    "Quinoa",
    "Almonds",
    "Walnuts",
    "Pumpkin seeds",
    "Shrimp",
    "Protein isolate",
    "Skim milk",
    "Ricotta",
    "Broccoli",
    "Cauliflower",
    "Spinach",
    "Carrot",
    "Zucchini",
    "Lettuce",
    "Tomato",
    "Cucumber",
    "Bell pepper",
    "Olive oil",
    "Green tea",
    "Water",
];

const BULKING: &[&str] = &[
    "Brown rice",
    "Sweet potato",
    "Oats",
    "Whole wheat pasta",
    "Red meat",
    "Chicken breast",
    "Eggs",
    "Salmon",
    "Tuna",
    "Quinoa",
    "Beans",
    "Chickpeas",
    "Lentils",
    "Whole milk",
    "Plain yogurt",
    "Cheese",
    "Walnuts",
    "Almonds",
    "Brazil nuts",
    "Avocado",
    "Banana",
    "Strawberries",
    "Spinach",
    "Broccoli",
    "Carrot",
    "Zucchini",
    "Tomato",
    "Cucumber",
    "Bell pepper",
    "Olive oil",
    "Peanut butter",
    "Green tea",
    "Water",
    "Honey",
    "Dark chocolate",
    "Potato",
    "Corn",
    "Whole wheat bread",
    "Chia seeds",
    "Flaxseeds",
    "Peas",
];

/// The stock tables that ship with the application.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinRecommendations;

impl RecommendationSource for BuiltinRecommendations {
    fn candidates(&self, diet: DietPlan) -> Option<Vec<String>> {
        let list = match diet {
            DietPlan::LowCarb => LOW_CARB,
            DietPlan::Ketogenic => KETOGENIC,
            DietPlan::HighProtein => HIGH_PROTEIN,
            DietPlan::Bulking => BULKING,
        };
        Some(list.iter().map(|s| (*s).to_string()).collect())
    }
}

/// Tables loaded from a JSON object mapping diet names to food lists:
///
/// ```json
/// { "LowCarb": ["Eggs", "Avocado"], "keto": ["Bacon"] }
/// ```
///
/// Keys go through the same lenient parsing as stored diets.
#[derive(Debug, Clone, Default)]
pub struct RecommendationTable {
    tables: HashMap<DietPlan, Vec<String>>,
}

impl RecommendationTable {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: HashMap<String, Vec<String>> = serde_json::from_str(json)?;
        let mut tables = HashMap::new();
        for (key, foods) in raw {
            let plan = DietPlan::parse(&key).ok_or_else(|| {
                NutritionError::Validation(format!("Unknown diet '{key}' in recommendation table"))
            })?;
            let foods: Vec<String> = foods
                .into_iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect();
            tables.entry(plan).or_insert_with(Vec::new).extend(foods);
        }
        Ok(Self { tables })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        log::debug!("Loading recommendation table from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    #[must_use]
    pub fn diets(&self) -> Vec<DietPlan> {
        DietPlan::ALL
            .into_iter()
            .filter(|d| self.tables.contains_key(d))
            .collect()
    }
}

impl RecommendationSource for RecommendationTable {
    fn candidates(&self, diet: DietPlan) -> Option<Vec<String>> {
        self.tables.get(&diet).filter(|l| !l.is_empty()).cloned()
    }
}
