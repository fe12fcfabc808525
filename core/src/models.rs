use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveTime};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::accounting::round2;
use crate::error::{NutritionError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Food {
    pub id: i64,
    pub name: String,
    pub calories_per_100g: f64,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewFood {
    pub name: String,
    pub calories_per_100g: f64,
}

// --- Diet plans ---

/// Calorie multiplier (kcal per kg of body weight) for a diet that isn't one of the known plans.
pub const DEFAULT_CALORIE_MULTIPLIER: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DietPlan {
    LowCarb,
    Ketogenic,
    HighProtein,
    Bulking,
}

impl DietPlan {
    pub const ALL: [DietPlan; 4] = [
        DietPlan::LowCarb,
        DietPlan::Ketogenic,
        DietPlan::HighProtein,
        DietPlan::Bulking,
    ];

    /// kcal per kg of body weight.
    #[must_use]
    pub fn calorie_multiplier(self) -> f64 {
        match self {
            DietPlan::LowCarb => 25.0,
            DietPlan::Ketogenic => 27.0,
            DietPlan::HighProtein => 30.0,
            DietPlan::Bulking => 35.0,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DietPlan::LowCarb => "LowCarb",
            DietPlan::Ketogenic => "Ketogenic",
            DietPlan::HighProtein => "HighProtein",
            DietPlan::Bulking => "Bulking",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            DietPlan::LowCarb => {
                "Low carbohydrate intake to help with weight loss and blood sugar control."
            }
            DietPlan::Ketogenic => {
                "High fat, very low carbohydrate; pushes the body to burn fat for energy."
            }
            DietPlan::HighProtein => "High protein intake for muscle gain and recovery.",
            DietPlan::Bulking => {
                "Calorie surplus with balanced macronutrients for gaining muscle mass."
            }
        }
    }

    /// Lenient parse: accepts canonical names, separator variants
    /// (`low-carb`, `low_carb`, `Low carb`), short aliases and the legacy
    /// Portuguese labels.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();
        match key.as_str() {
            "lowcarb" => Some(DietPlan::LowCarb),
            "ketogenic" | "keto" | "cetogênica" | "cetogenica" => Some(DietPlan::Ketogenic),
            "highprotein" | "hiperproteica" => Some(DietPlan::HighProtein),
            "bulking" | "bulk" => Some(DietPlan::Bulking),
            _ => None,
        }
    }
}

impl fmt::Display for DietPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DietPlan {
    type Err = NutritionError;

    fn from_str(s: &str) -> Result<Self> {
        DietPlan::parse(s).ok_or_else(|| NutritionError::DietNotRecognized(s.to_string()))
    }
}

// --- Profiles ---

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub email: String,
    /// Stored verbatim; values that don't parse as a [`DietPlan`] are legal.
    pub diet: String,
    pub weight_kg: f64,
    pub height_m: f64,
    pub bmi: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl UserProfile {
    #[must_use]
    pub fn diet_plan(&self) -> Option<DietPlan> {
        DietPlan::parse(&self.diet)
    }

    #[must_use]
    pub fn bmi_category(&self) -> BmiCategory {
        BmiCategory::from_bmi(self.bmi)
    }
}

#[derive(Debug, Clone)]
pub struct NewUserProfile {
    pub email: String,
    pub diet: String,
    pub weight_kg: f64,
    pub height_m: f64,
}

impl NewUserProfile {
    #[must_use]
    pub fn new(email: &str, diet: DietPlan, weight_kg: f64, height_m: f64) -> Self {
        Self {
            email: email.trim().to_string(),
            diet: diet.as_str().to_string(),
            weight_kg,
            height_m,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub weight_kg: f64,
    pub height_m: f64,
    pub diet: DietPlan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    ObesityClass1,
    ObesityClass2,
    ObesityClass3,
}

impl BmiCategory {
    #[must_use]
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else if bmi < 35.0 {
            BmiCategory::ObesityClass1
        } else if bmi < 40.0 {
            BmiCategory::ObesityClass2
        } else {
            BmiCategory::ObesityClass3
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::ObesityClass1 => "Obesity class I",
            BmiCategory::ObesityClass2 => "Obesity class II",
            BmiCategory::ObesityClass3 => "Obesity class III",
        }
    }
}

/// Body mass index rounded to two decimals.
#[must_use]
pub fn calculate_bmi(weight_kg: f64, height_m: f64) -> f64 {
    round2(weight_kg / height_m.powi(2))
}

// --- Meal events ---

#[derive(Debug, Clone, Serialize)]
pub struct MealEvent {
    pub id: i64,
    pub uuid: String,
    pub owner_email: String,
    pub food_name: String,
    pub quantity_grams: f64,
    /// Snapshot of `calories_per_100g * quantity_grams / 100` at insertion time.
    pub calories: f64,
    pub logged_at: String,
    pub date: String,
}

#[derive(Debug, Clone)]
pub struct NewMealEvent {
    pub owner_email: String,
    pub food_name: String,
    pub quantity_grams: f64,
    pub calories: f64,
    pub logged_at: DateTime<Local>,
}

/// One of the day's events joined with the food's current catalog value.
#[derive(Debug, Clone)]
pub struct DayIntake {
    pub food_name: String,
    pub quantity_grams: f64,
    pub current_calories_per_100g: f64,
    pub snapshot_calories: f64,
}

// --- Daily accounting ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalorieStatus {
    Under,
    OnTarget,
    Over,
}

impl CalorieStatus {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            CalorieStatus::Under => {
                "You ate fewer calories than recommended for your diet today."
            }
            CalorieStatus::OnTarget => "Calorie intake is within today's target. Good job!",
            CalorieStatus::Over => "You ate more calories than recommended for your diet today.",
        }
    }
}

impl fmt::Display for CalorieStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CalorieStatus::Under => "under",
            CalorieStatus::OnTarget => "on target",
            CalorieStatus::Over => "over",
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    pub owner_email: String,
    pub date: String,
    pub diet: String,
    /// Recomputed from current catalog values, rounded to 2dp.
    pub total_calories: f64,
    /// Sum of the frozen per-event snapshots, rounded to 2dp.
    pub snapshot_calories: f64,
    pub target_calories: f64,
    pub status: CalorieStatus,
    pub meal_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoodRanking {
    pub food_name: String,
    pub total_grams: f64,
}

// --- Meal schedule & feedback ---

#[derive(Debug, Clone, Serialize)]
pub struct MealSchedule {
    pub owner_email: String,
    pub breakfast: NaiveTime,
    pub lunch: NaiveTime,
    pub dinner: NaiveTime,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewMealSchedule {
    pub owner_email: String,
    pub breakfast: NaiveTime,
    pub lunch: NaiveTime,
    pub dinner: NaiveTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub id: i64,
    pub owner_email: String,
    pub satisfaction: u8,
    pub ease_of_use: u8,
    pub would_recommend: bool,
    pub comment: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub owner_email: String,
    pub satisfaction: u8,
    pub ease_of_use: u8,
    pub would_recommend: bool,
    pub comment: String,
}

// --- Validation ---

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").expect("email pattern is valid")
});

/// Catalog key form of a food name: trimmed and lowercased.
#[must_use]
pub fn normalize_food_name(name: &str) -> String {
    name.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<()> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(NutritionError::Validation(format!(
            "Invalid e-mail address '{email}'"
        )))
    }
}

pub fn validate_quantity(quantity_grams: f64) -> Result<f64> {
    if !quantity_grams.is_finite() || quantity_grams <= 0.0 {
        return Err(NutritionError::InvalidQuantity(format!(
            "{quantity_grams} (must be a positive number of grams)"
        )));
    }
    Ok(quantity_grams)
}

pub fn validate_new_food(food: &NewFood) -> Result<()> {
    if food.name.trim().is_empty() {
        return Err(NutritionError::Validation(
            "Food name must not be empty".to_string(),
        ));
    }
    if !food.calories_per_100g.is_finite() || food.calories_per_100g <= 0.0 {
        return Err(NutritionError::Validation(
            "calories_per_100g must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_body_measurements(weight_kg: f64, height_m: f64) -> Result<()> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(NutritionError::Validation(
            "weight_kg must be greater than 0".to_string(),
        ));
    }
    if !height_m.is_finite() || height_m <= 0.0 {
        return Err(NutritionError::Validation(
            "height_m must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_rating(field: &str, value: u8) -> Result<()> {
    if (1..=5).contains(&value) {
        Ok(())
    } else {
        Err(NutritionError::Validation(format!(
            "{field} must be between 1 and 5 (got {value})"
        )))
    }
}

/// Parse a meal time given as `HH:MM`.
pub fn parse_meal_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|_| {
        NutritionError::Validation(format!("Invalid time '{s}'. Use HH:MM, e.g. 07:30"))
    })
}
