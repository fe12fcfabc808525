//! Daily accounting: closing a day against the diet target, drawing food
//! recommendations and ranking the most eaten foods.

use chrono::NaiveDate;
use rand::Rng;

use crate::db::Database;
use crate::error::{NutritionError, Result};
use crate::models::{
    CalorieStatus, DEFAULT_CALORIE_MULTIPLIER, DailySummary, DietPlan, FoodRanking,
};
use crate::recommend::RecommendationSource;

/// Totals below this fraction of the target are `Under`.
pub const UNDER_TARGET_RATIO: f64 = 0.9;
/// Totals above this fraction of the target are `Over`.
pub const OVER_TARGET_RATIO: f64 = 1.1;
pub const DEFAULT_RANKING_LIMIT: usize = 10;
pub const RECOMMENDATION_COUNT: usize = 4;

/// Round to two decimals using the exact binary value, ties to even.
/// `1574.995` is stored just below the tie and becomes `1574.99`.
#[must_use]
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Daily calorie target for a body weight. `None` is an unrecognized diet.
#[must_use]
pub fn target_calories(diet: Option<DietPlan>, weight_kg: f64) -> f64 {
    let multiplier = diet.map_or(DEFAULT_CALORIE_MULTIPLIER, DietPlan::calorie_multiplier);
    weight_kg * multiplier
}

/// Classify an already rounded total. Both bounds count as on target.
#[must_use]
pub fn classify(total_calories: f64, target_calories: f64) -> CalorieStatus {
    if total_calories < UNDER_TARGET_RATIO * target_calories {
        CalorieStatus::Under
    } else if total_calories > OVER_TARGET_RATIO * target_calories {
        CalorieStatus::Over
    } else {
        CalorieStatus::OnTarget
    }
}

/// Sum one user's intake for `day` using the foods' current catalog values
/// and compare it with the diet target.
pub fn close_day(db: &Database, owner_email: &str, day: NaiveDate) -> Result<DailySummary> {
    let profile = db
        .get_profile(owner_email)?
        .ok_or_else(|| NutritionError::UserNotFound(owner_email.to_string()))?;

    let intake = db.day_intake(owner_email, day)?;
    if intake.is_empty() {
        return Err(NutritionError::NoMealsRecorded {
            email: owner_email.to_string(),
            date: day,
        });
    }

    let live: f64 = intake
        .iter()
        .map(|row| row.current_calories_per_100g * row.quantity_grams / 100.0)
        .sum();
    let snapshot: f64 = intake.iter().map(|row| row.snapshot_calories).sum();

    let total_calories = round2(live);
    let target = target_calories(profile.diet_plan(), profile.weight_kg);
    let status = classify(total_calories, target);

    log::debug!(
        "Closed {day} for {owner_email}: {total_calories} kcal against {target} ({status})"
    );

    Ok(DailySummary {
        owner_email: profile.email,
        date: day.format("%Y-%m-%d").to_string(),
        diet: profile.diet,
        total_calories,
        snapshot_calories: round2(snapshot),
        target_calories: target,
        status,
        meal_count: intake.len(),
    })
}

/// Draw up to [`RECOMMENDATION_COUNT`] distinct foods suited to the user's diet.
pub fn recommend_foods<R: Rng + ?Sized>(
    db: &Database,
    owner_email: &str,
    source: &dyn RecommendationSource,
    rng: &mut R,
) -> Result<Vec<String>> {
    let profile = db
        .get_profile(owner_email)?
        .ok_or_else(|| NutritionError::UserNotFound(owner_email.to_string()))?;

    let plan = profile
        .diet_plan()
        .ok_or_else(|| NutritionError::DietNotRecognized(profile.diet.clone()))?;

    let mut candidates = source.candidates(plan).unwrap_or_default();
    let mut seen = std::collections::HashSet::new();
    candidates.retain(|name| seen.insert(name.to_lowercase()));
    if candidates.is_empty() {
        return Err(NutritionError::DietNotRecognized(profile.diet));
    }

    let amount = RECOMMENDATION_COUNT.min(candidates.len());
    let picks = rand::seq::index::sample(rng, candidates.len(), amount)
        .into_iter()
        .map(|i| candidates[i].clone())
        .collect();
    Ok(picks)
}

pub fn rank_top_foods(db: &Database, owner_email: &str, limit: usize) -> Result<Vec<FoodRanking>> {
    db.food_ranking(owner_email, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger;
    use crate::models::{NewFood, NewUserProfile};
    use crate::recommend::BuiltinRecommendations;
    use chrono::{Local, TimeZone};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const OWNER: &str = "ana@example.com";

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn noon() -> chrono::DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn setup(diet: &str, weight_kg: f64) -> Database {
        let db = Database::open_in_memory().unwrap();
        db.insert_profile(&NewUserProfile {
            email: OWNER.to_string(),
            diet: diet.to_string(),
            weight_kg,
            height_m: 1.75,
        })
        .unwrap();
        db
    }

    fn add_food(db: &Database, name: &str, kcal: f64) {
        db.insert_food(&NewFood {
            name: name.to_string(),
            calories_per_100g: kcal,
        })
        .unwrap();
    }

    struct EmptySource;

    impl RecommendationSource for EmptySource {
        fn candidates(&self, _diet: DietPlan) -> Option<Vec<String>> {
            None
        }
    }

    #[test]
    fn test_round2() {
        assert!((round2(1574.996) - 1575.0).abs() < f64::EPSILON);
        assert!((round2(22.857_142) - 22.86).abs() < f64::EPSILON);
        assert!((round2(0.125) - 0.12).abs() < f64::EPSILON);
        assert!((round2(0.375) - 0.38).abs() < f64::EPSILON);
        assert!((round2(2.675) - 2.67).abs() < f64::EPSILON);
        assert!((round2(1574.995) - 1574.99).abs() < f64::EPSILON);
    }

    #[test]
    fn test_target_calories() {
        assert!((target_calories(Some(DietPlan::LowCarb), 70.0) - 1750.0).abs() < 0.01);
        assert!((target_calories(Some(DietPlan::Ketogenic), 70.0) - 1890.0).abs() < 0.01);
        assert!((target_calories(Some(DietPlan::HighProtein), 70.0) - 2100.0).abs() < 0.01);
        assert!((target_calories(Some(DietPlan::Bulking), 70.0) - 2450.0).abs() < 0.01);
        assert!((target_calories(None, 70.0) - 2100.0).abs() < 0.01);
    }

    #[test]
    fn test_classify_bounds() {
        assert_eq!(classify(1574.99, 1750.0), CalorieStatus::Under);
        assert_eq!(classify(1575.0, 1750.0), CalorieStatus::OnTarget);
        assert_eq!(classify(1925.0, 1750.0), CalorieStatus::OnTarget);
        assert_eq!(classify(1925.01, 1750.0), CalorieStatus::Over);
    }

    #[test]
    fn test_close_day_on_target() {
        let db = setup("LowCarb", 70.0);
        add_food(&db, "steak", 175.0);
        ledger::record_at(&db, OWNER, "steak", 1000.0, noon()).unwrap();

        let summary = close_day(&db, OWNER, day()).unwrap();
        assert!((summary.total_calories - 1750.0).abs() < 0.01);
        assert!((summary.target_calories - 1750.0).abs() < 0.01);
        assert_eq!(summary.status, CalorieStatus::OnTarget);
        assert_eq!(summary.meal_count, 1);
        assert_eq!(summary.date, "2024-06-15");
    }

    #[test]
    fn test_close_day_under_and_over() {
        let db = setup("LowCarb", 70.0);
        add_food(&db, "fish", 150.0);
        ledger::record_at(&db, OWNER, "fish", 1000.0, noon()).unwrap();
        let summary = close_day(&db, OWNER, day()).unwrap();
        assert!((summary.total_calories - 1500.0).abs() < 0.01);
        assert_eq!(summary.status, CalorieStatus::Under);

        let db = setup("LowCarb", 70.0);
        add_food(&db, "cheese", 200.0);
        ledger::record_at(&db, OWNER, "cheese", 1000.0, noon()).unwrap();
        let summary = close_day(&db, OWNER, day()).unwrap();
        assert!((summary.total_calories - 2000.0).abs() < 0.01);
        assert_eq!(summary.status, CalorieStatus::Over);
    }

    #[test]
    fn test_close_day_rounds_before_classifying() {
        // 157.4996 kcal/100g * 1000 g = 1574.996, which rounds to the lower bound.
        let db = setup("LowCarb", 70.0);
        add_food(&db, "oddity", 157.4996);
        ledger::record_at(&db, OWNER, "oddity", 1000.0, noon()).unwrap();

        let summary = close_day(&db, OWNER, day()).unwrap();
        assert!((summary.total_calories - 1575.0).abs() < f64::EPSILON);
        assert_eq!(summary.status, CalorieStatus::OnTarget);
    }

    #[test]
    fn test_close_day_total_just_below_lower_bound() {
        // 314.999 kcal/100g * 500 g is stored as 1574.99499..., which stays under.
        let db = setup("LowCarb", 70.0);
        add_food(&db, "oddity", 314.999);
        ledger::record_at(&db, OWNER, "oddity", 500.0, noon()).unwrap();

        let summary = close_day(&db, OWNER, day()).unwrap();
        assert!((summary.total_calories - 1574.99).abs() < f64::EPSILON);
        assert_eq!(summary.status, CalorieStatus::Under);
    }

    #[test]
    fn test_close_day_no_meals() {
        let db = setup("LowCarb", 70.0);
        let err = close_day(&db, OWNER, day()).unwrap_err();
        assert!(matches!(err, NutritionError::NoMealsRecorded { .. }));
    }

    #[test]
    fn test_close_day_unknown_user() {
        let db = Database::open_in_memory().unwrap();
        let err = close_day(&db, "ghost@example.com", day()).unwrap_err();
        assert!(matches!(err, NutritionError::UserNotFound(_)));
    }

    #[test]
    fn test_close_day_uses_live_catalog_value() {
        let db = setup("LowCarb", 70.0);
        add_food(&db, "steak", 175.0);
        let event = ledger::record_at(&db, OWNER, "steak", 1000.0, noon()).unwrap();
        db.update_food_calories("steak", 200.0).unwrap();

        let summary = close_day(&db, OWNER, day()).unwrap();
        assert!((summary.total_calories - 2000.0).abs() < 0.01);
        assert!((summary.snapshot_calories - 1750.0).abs() < 0.01);
        assert_eq!(summary.status, CalorieStatus::Over);

        let stored = db.get_meal_event(event.id).unwrap();
        assert!((stored.calories - 1750.0).abs() < 0.01);
    }

    #[test]
    fn test_close_day_after_food_deleted() {
        let db = setup("LowCarb", 70.0);
        add_food(&db, "steak", 175.0);
        ledger::record_at(&db, OWNER, "steak", 1000.0, noon()).unwrap();
        db.delete_food("steak").unwrap();

        let err = close_day(&db, OWNER, day()).unwrap_err();
        assert!(matches!(err, NutritionError::NoMealsRecorded { .. }));
    }

    #[test]
    fn test_close_day_unrecognized_diet() {
        let db = setup("paleo", 70.0);
        add_food(&db, "steak", 210.0);
        ledger::record_at(&db, OWNER, "steak", 1000.0, noon()).unwrap();

        let summary = close_day(&db, OWNER, day()).unwrap();
        assert!((summary.target_calories - 2100.0).abs() < 0.01);
        assert_eq!(summary.status, CalorieStatus::OnTarget);
        assert_eq!(summary.diet, "paleo");
    }

    #[test]
    fn test_close_day_ignores_other_days() {
        let db = setup("LowCarb", 70.0);
        add_food(&db, "steak", 175.0);
        ledger::record_at(&db, OWNER, "steak", 1000.0, noon()).unwrap();
        let next = Local.with_ymd_and_hms(2024, 6, 16, 9, 0, 0).unwrap();
        ledger::record_at(&db, OWNER, "steak", 500.0, next).unwrap();

        let summary = close_day(&db, OWNER, day()).unwrap();
        assert_eq!(summary.meal_count, 1);
        assert!((summary.total_calories - 1750.0).abs() < 0.01);
    }

    #[test]
    fn test_recommend_foods_distinct_members() {
        let db = setup("Ketogenic", 70.0);
        let source = BuiltinRecommendations;
        let mut rng = StdRng::seed_from_u64(42);

        let picks = recommend_foods(&db, OWNER, &source, &mut rng).unwrap();
        assert_eq!(picks.len(), RECOMMENDATION_COUNT);

        let table = source.candidates(DietPlan::Ketogenic).unwrap();
        for pick in &picks {
            assert!(table.contains(pick), "{pick} not in the ketogenic table");
        }
        let unique: std::collections::HashSet<_> = picks.iter().collect();
        assert_eq!(unique.len(), picks.len());
    }

    #[test]
    fn test_recommend_foods_seed_is_deterministic() {
        let db = setup("Bulking", 80.0);
        let a = recommend_foods(
            &db,
            OWNER,
            &BuiltinRecommendations,
            &mut StdRng::seed_from_u64(7),
        )
        .unwrap();
        let b = recommend_foods(
            &db,
            OWNER,
            &BuiltinRecommendations,
            &mut StdRng::seed_from_u64(7),
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_recommend_foods_unrecognized_diet() {
        let db = setup("paleo", 70.0);
        let err = recommend_foods(
            &db,
            OWNER,
            &BuiltinRecommendations,
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap_err();
        assert!(matches!(err, NutritionError::DietNotRecognized(ref d) if d == "paleo"));
    }

    #[test]
    fn test_recommend_foods_missing_table() {
        let db = setup("LowCarb", 70.0);
        let err = recommend_foods(&db, OWNER, &EmptySource, &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, NutritionError::DietNotRecognized(_)));
    }

    #[test]
    fn test_recommend_foods_unknown_user() {
        let db = Database::open_in_memory().unwrap();
        let err = recommend_foods(
            &db,
            OWNER,
            &BuiltinRecommendations,
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap_err();
        assert!(matches!(err, NutritionError::UserNotFound(_)));
    }

    #[test]
    fn test_rank_top_foods() {
        let db = setup("LowCarb", 70.0);
        add_food(&db, "rice", 130.0);
        add_food(&db, "eggs", 155.0);
        ledger::record_at(&db, OWNER, "rice", 100.0, noon()).unwrap();
        ledger::record_at(&db, OWNER, "rice", 50.0, noon()).unwrap();
        ledger::record_at(&db, OWNER, "eggs", 300.0, noon()).unwrap();

        let ranking = rank_top_foods(&db, OWNER, DEFAULT_RANKING_LIMIT).unwrap();
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].food_name, "eggs");
        assert!((ranking[0].total_grams - 300.0).abs() < 0.01);
        assert_eq!(ranking[1].food_name, "rice");
        assert!((ranking[1].total_grams - 150.0).abs() < 0.01);

        assert!(rank_top_foods(&db, "bob@example.com", 10).unwrap().is_empty());
    }
}
