use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDate};
use rand::Rng;

use crate::accounting;
use crate::catalog_import::{self, ImportSummary};
use crate::db::Database;
use crate::error::{NutritionError, Result};
use crate::ledger;
use crate::models::{
    DailySummary, DietPlan, Feedback, Food, FoodRanking, MealEvent, MealSchedule, NewFeedback,
    NewFood, NewMealSchedule, NewUserProfile, ProfileUpdate, UserProfile, normalize_food_name,
    parse_meal_time, validate_body_measurements, validate_email, validate_new_food,
    validate_rating,
};
use crate::recommend::RecommendationSource;

/// Front door to the nutrition core. Front ends hold one of these and never
/// touch [`Database`] directly.
pub struct NutritionService {
    db: Database,
}

impl NutritionService {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Database::open(db_path)?;
        Ok(Self { db })
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self { db })
    }

    // --- Meal ledger ---

    pub fn record_meal(
        &self,
        owner_email: &str,
        food_name: &str,
        quantity_grams: f64,
    ) -> Result<MealEvent> {
        ledger::record(&self.db, owner_email, food_name, quantity_grams)
    }

    pub fn record_meal_at(
        &self,
        owner_email: &str,
        food_name: &str,
        quantity_grams: f64,
        logged_at: DateTime<Local>,
    ) -> Result<MealEvent> {
        ledger::record_at(&self.db, owner_email, food_name, quantity_grams, logged_at)
    }

    pub fn list_meals(&self, owner_email: &str) -> Result<Vec<MealEvent>> {
        ledger::list_for_user(&self.db, owner_email)
    }

    pub fn meals_logged_on(&self, owner_email: &str, day: NaiveDate) -> Result<i64> {
        ledger::meals_logged_on(&self.db, owner_email, day)
    }

    // --- Daily accounting ---

    pub fn close_day(&self, owner_email: &str, day: NaiveDate) -> Result<DailySummary> {
        accounting::close_day(&self.db, owner_email, day)
    }

    pub fn recommend_foods<R: Rng + ?Sized>(
        &self,
        owner_email: &str,
        source: &dyn RecommendationSource,
        rng: &mut R,
    ) -> Result<Vec<String>> {
        accounting::recommend_foods(&self.db, owner_email, source, rng)
    }

    pub fn rank_top_foods(&self, owner_email: &str, limit: usize) -> Result<Vec<FoodRanking>> {
        accounting::rank_top_foods(&self.db, owner_email, limit)
    }

    // --- Food catalog ---

    pub fn add_food(&self, name: &str, calories_per_100g: f64) -> Result<Food> {
        let food = NewFood {
            name: name.to_string(),
            calories_per_100g,
        };
        validate_new_food(&food)?;
        let food = self.db.insert_food(&food)?;
        log::info!(
            "Added food '{}' ({} kcal/100g)",
            food.name,
            food.calories_per_100g
        );
        Ok(food)
    }

    pub fn get_food(&self, name: &str) -> Result<Food> {
        self.db
            .get_food(name)?
            .ok_or_else(|| NutritionError::FoodNotFound(normalize_food_name(name)))
    }

    pub fn list_foods(&self) -> Result<Vec<Food>> {
        self.db.list_foods()
    }

    /// Change a food's calorie density. Past meal snapshots are untouched.
    pub fn update_food_calories(&self, name: &str, calories_per_100g: f64) -> Result<Food> {
        validate_new_food(&NewFood {
            name: name.to_string(),
            calories_per_100g,
        })?;
        let food = self.db.update_food_calories(name, calories_per_100g)?;
        log::info!(
            "Updated '{}' to {} kcal/100g",
            food.name,
            food.calories_per_100g
        );
        Ok(food)
    }

    pub fn delete_food(&self, name: &str) -> Result<()> {
        self.db.delete_food(name)?;
        log::info!("Deleted food '{}'", normalize_food_name(name));
        Ok(())
    }

    pub fn import_catalog_csv<R: Read>(&self, reader: R, dry_run: bool) -> Result<ImportSummary> {
        let rows = catalog_import::parse_catalog_csv(reader)?;
        catalog_import::import_catalog(&self.db, &rows, dry_run)
    }

    // --- Profiles ---

    pub fn register_user(&self, profile: &NewUserProfile) -> Result<UserProfile> {
        validate_email(&profile.email)?;
        validate_body_measurements(profile.weight_kg, profile.height_m)?;
        let stored = self.db.insert_profile(profile)?;
        log::info!("Registered {} on {} diet", stored.email, stored.diet);
        Ok(stored)
    }

    pub fn get_profile(&self, email: &str) -> Result<UserProfile> {
        self.db
            .get_profile(email)?
            .ok_or_else(|| NutritionError::UserNotFound(email.to_string()))
    }

    pub fn update_profile(
        &self,
        email: &str,
        weight_kg: f64,
        height_m: f64,
        diet: DietPlan,
    ) -> Result<UserProfile> {
        validate_body_measurements(weight_kg, height_m)?;
        let updated = self.db.update_profile(
            email,
            &ProfileUpdate {
                weight_kg,
                height_m,
                diet,
            },
        )?;
        log::info!("Updated profile for {email}");
        Ok(updated)
    }

    pub fn list_profiles(&self) -> Result<Vec<UserProfile>> {
        self.db.list_profiles()
    }

    // --- Meal schedule ---

    /// Store the user's usual meal times, given as `HH:MM`.
    pub fn set_meal_schedule(
        &self,
        owner_email: &str,
        breakfast: &str,
        lunch: &str,
        dinner: &str,
    ) -> Result<MealSchedule> {
        self.get_profile(owner_email)?;
        let schedule = NewMealSchedule {
            owner_email: owner_email.to_string(),
            breakfast: parse_meal_time(breakfast)?,
            lunch: parse_meal_time(lunch)?,
            dinner: parse_meal_time(dinner)?,
        };
        self.db.upsert_meal_schedule(&schedule)
    }

    pub fn get_meal_schedule(&self, owner_email: &str) -> Result<Option<MealSchedule>> {
        self.db.get_meal_schedule(owner_email)
    }

    // --- Feedback ---

    pub fn submit_feedback(&self, feedback: &NewFeedback) -> Result<Feedback> {
        validate_email(&feedback.owner_email)?;
        validate_rating("satisfaction", feedback.satisfaction)?;
        validate_rating("ease_of_use", feedback.ease_of_use)?;
        let stored = self.db.insert_feedback(feedback)?;
        log::info!("Feedback #{} received from {}", stored.id, stored.owner_email);
        Ok(stored)
    }

    pub fn list_feedback(&self) -> Result<Vec<Feedback>> {
        self.db.list_feedback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CalorieStatus;
    use crate::recommend::BuiltinRecommendations;
    use chrono::{NaiveTime, TimeZone};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const OWNER: &str = "ana@example.com";

    struct MockRecommendations {
        foods: Vec<&'static str>,
    }

    impl RecommendationSource for MockRecommendations {
        fn candidates(&self, diet: DietPlan) -> Option<Vec<String>> {
            (diet == DietPlan::HighProtein)
                .then(|| self.foods.iter().map(|s| (*s).to_string()).collect())
        }
    }

    fn service_with_user(diet: DietPlan) -> NutritionService {
        let svc = NutritionService::new_in_memory().unwrap();
        svc.register_user(&NewUserProfile::new(OWNER, diet, 70.0, 1.75))
            .unwrap();
        svc
    }

    fn noon(d: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_full_day_scenario() {
        let svc = service_with_user(DietPlan::LowCarb);
        svc.add_food("Steak", 250.0).unwrap();
        svc.add_food("Salad", 20.0).unwrap();

        svc.record_meal_at(OWNER, "steak", 600.0, noon(15)).unwrap();
        svc.record_meal_at(OWNER, "SALAD", 250.0, noon(15)).unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let summary = svc.close_day(OWNER, day).unwrap();
        // 1500 + 50
        assert!((summary.total_calories - 1550.0).abs() < 0.01);
        assert_eq!(summary.status, CalorieStatus::Under);
        assert_eq!(summary.meal_count, 2);

        let meals = svc.list_meals(OWNER).unwrap();
        assert_eq!(meals.len(), 2);
        assert_eq!(svc.meals_logged_on(OWNER, day).unwrap(), 2);

        let ranking = svc.rank_top_foods(OWNER, 1).unwrap();
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].food_name, "steak");
    }

    #[test]
    fn test_record_meal_uses_today() {
        let svc = service_with_user(DietPlan::LowCarb);
        svc.add_food("rice", 130.0).unwrap();
        svc.record_meal(OWNER, "rice", 100.0).unwrap();
        let today = Local::now().date_naive();
        assert_eq!(svc.meals_logged_on(OWNER, today).unwrap(), 1);
    }

    #[test]
    fn test_recommend_with_mock_source() {
        let svc = service_with_user(DietPlan::HighProtein);
        let source = MockRecommendations {
            foods: vec!["Tofu", "Tempeh", "Tofu"],
        };
        let mut picks = svc
            .recommend_foods(OWNER, &source, &mut StdRng::seed_from_u64(3))
            .unwrap();
        picks.sort();
        assert_eq!(picks, vec!["Tempeh", "Tofu"]);

        let svc = service_with_user(DietPlan::Bulking);
        let err = svc
            .recommend_foods(OWNER, &source, &mut StdRng::seed_from_u64(3))
            .unwrap_err();
        assert!(matches!(err, NutritionError::DietNotRecognized(_)));
    }

    #[test]
    fn test_recommend_builtin() {
        let svc = service_with_user(DietPlan::LowCarb);
        let picks = svc
            .recommend_foods(OWNER, &BuiltinRecommendations, &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(picks.len(), 4);
    }

    #[test]
    fn test_add_food_validation() {
        let svc = NutritionService::new_in_memory().unwrap();
        assert!(matches!(
            svc.add_food(" ", 100.0),
            Err(NutritionError::Validation(_))
        ));
        assert!(matches!(
            svc.add_food("water", 0.0),
            Err(NutritionError::Validation(_))
        ));
        svc.add_food("Rice", 130.0).unwrap();
        assert!(matches!(
            svc.add_food("RICE", 120.0),
            Err(NutritionError::FoodAlreadyExists(_))
        ));
        assert_eq!(svc.get_food("rice").unwrap().name, "rice");
        assert_eq!(
            svc.get_food("pasta").unwrap_err().kind(),
            crate::error::ErrorKind::FoodNotFound
        );
    }

    #[test]
    fn test_update_food_keeps_snapshots() {
        let svc = service_with_user(DietPlan::LowCarb);
        svc.add_food("steak", 175.0).unwrap();
        svc.record_meal_at(OWNER, "steak", 1000.0, noon(15)).unwrap();
        svc.update_food_calories("steak", 150.0).unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let summary = svc.close_day(OWNER, day).unwrap();
        assert_eq!(summary.status, CalorieStatus::Under);
        assert!((summary.snapshot_calories - 1750.0).abs() < 0.01);
        assert!((svc.list_meals(OWNER).unwrap()[0].calories - 1750.0).abs() < 0.01);

        assert!(svc.update_food_calories("steak", -1.0).is_err());
    }

    #[test]
    fn test_delete_food() {
        let svc = NutritionService::new_in_memory().unwrap();
        svc.add_food("rice", 130.0).unwrap();
        svc.delete_food("Rice").unwrap();
        assert!(svc.list_foods().unwrap().is_empty());
        assert!(matches!(
            svc.delete_food("rice"),
            Err(NutritionError::FoodNotFound(_))
        ));
    }

    #[test]
    fn test_import_catalog_csv() {
        let svc = NutritionService::new_in_memory().unwrap();
        let csv = "name,calories_per_100g\nRice,130\nEggs,155\n";
        let summary = svc.import_catalog_csv(csv.as_bytes(), false).unwrap();
        assert_eq!(summary.foods_created, 2);
        assert_eq!(svc.list_foods().unwrap().len(), 2);
    }

    #[test]
    fn test_register_user_validation() {
        let svc = NutritionService::new_in_memory().unwrap();
        let bad_email = NewUserProfile::new("not-an-email", DietPlan::LowCarb, 70.0, 1.75);
        assert!(matches!(
            svc.register_user(&bad_email),
            Err(NutritionError::Validation(_))
        ));
        let bad_height = NewUserProfile::new("ana@example.com", DietPlan::LowCarb, 70.0, 0.0);
        assert!(svc.register_user(&bad_height).is_err());

        let ok = NewUserProfile::new("ana@example.com", DietPlan::LowCarb, 70.0, 1.75);
        let profile = svc.register_user(&ok).unwrap();
        assert!((profile.bmi - 22.86).abs() < 0.01);
        assert!(matches!(
            svc.register_user(&ok),
            Err(NutritionError::UserAlreadyExists(_))
        ));
    }

    #[test]
    fn test_update_profile() {
        let svc = service_with_user(DietPlan::LowCarb);
        let updated = svc
            .update_profile(OWNER, 90.0, 1.80, DietPlan::Ketogenic)
            .unwrap();
        assert_eq!(updated.diet_plan(), Some(DietPlan::Ketogenic));
        // 90 / 3.24 = 27.78
        assert!((updated.bmi - 27.78).abs() < 0.01);

        assert!(svc.get_profile("ghost@example.com").is_err());
        assert!(matches!(
            svc.update_profile("ghost@example.com", 90.0, 1.8, DietPlan::Bulking),
            Err(NutritionError::UserNotFound(_))
        ));
        assert_eq!(svc.list_profiles().unwrap().len(), 1);
    }

    #[test]
    fn test_meal_schedule() {
        let svc = service_with_user(DietPlan::LowCarb);
        assert!(svc.get_meal_schedule(OWNER).unwrap().is_none());

        let schedule = svc
            .set_meal_schedule(OWNER, "07:30", "12:00", "19:45")
            .unwrap();
        assert_eq!(schedule.dinner, NaiveTime::from_hms_opt(19, 45, 0).unwrap());
        assert!(svc.get_meal_schedule(OWNER).unwrap().is_some());

        assert!(svc.set_meal_schedule(OWNER, "7h", "12:00", "19:00").is_err());
        assert!(matches!(
            svc.set_meal_schedule("ghost@example.com", "07:00", "12:00", "19:00"),
            Err(NutritionError::UserNotFound(_))
        ));
    }

    #[test]
    fn test_feedback() {
        let svc = NutritionService::new_in_memory().unwrap();
        let mut feedback = NewFeedback {
            owner_email: OWNER.to_string(),
            satisfaction: 4,
            ease_of_use: 5,
            would_recommend: true,
            comment: "Handy".to_string(),
        };
        svc.submit_feedback(&feedback).unwrap();

        feedback.satisfaction = 6;
        assert!(matches!(
            svc.submit_feedback(&feedback),
            Err(NutritionError::Validation(_))
        ));
        feedback.satisfaction = 3;
        feedback.ease_of_use = 0;
        assert!(svc.submit_feedback(&feedback).is_err());

        assert_eq!(svc.list_feedback().unwrap().len(), 1);
    }
}
