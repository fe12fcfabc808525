//! Meal ledger: the append-only log of what each user ate.

use chrono::{DateTime, Local, NaiveDate};

use crate::db::Database;
use crate::error::{NutritionError, Result};
use crate::models::{MealEvent, NewMealEvent, normalize_food_name, validate_quantity};

/// Calories for `quantity_grams` of a food with the given density.
#[must_use]
pub fn meal_calories(calories_per_100g: f64, quantity_grams: f64) -> f64 {
    calories_per_100g * quantity_grams / 100.0
}

/// Log a meal stamped with the current local time.
pub fn record(
    db: &Database,
    owner_email: &str,
    food_name: &str,
    quantity_grams: f64,
) -> Result<MealEvent> {
    record_at(db, owner_email, food_name, quantity_grams, Local::now())
}

/// Log a meal at an explicit time. The calorie value is frozen from the
/// catalog as it stands now.
pub fn record_at(
    db: &Database,
    owner_email: &str,
    food_name: &str,
    quantity_grams: f64,
    logged_at: DateTime<Local>,
) -> Result<MealEvent> {
    let quantity_grams = validate_quantity(quantity_grams)?;
    let food = db
        .get_food(food_name)?
        .ok_or_else(|| NutritionError::FoodNotFound(normalize_food_name(food_name)))?;

    let event = db.insert_meal_event(&NewMealEvent {
        owner_email: owner_email.to_string(),
        food_name: food.name,
        quantity_grams,
        calories: meal_calories(food.calories_per_100g, quantity_grams),
        logged_at,
    })?;

    log::info!(
        "Recorded {}g of {} for {} ({:.2} kcal)",
        event.quantity_grams,
        event.food_name,
        event.owner_email,
        event.calories
    );
    Ok(event)
}

pub fn list_for_user(db: &Database, owner_email: &str) -> Result<Vec<MealEvent>> {
    db.list_meal_events(owner_email)
}

/// Number of meals the user logged on `day`.
pub fn meals_logged_on(db: &Database, owner_email: &str, day: NaiveDate) -> Result<i64> {
    db.count_meal_events_on(owner_email, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewFood;
    use chrono::TimeZone;

    const OWNER: &str = "ana@example.com";

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.insert_food(&NewFood {
            name: "Rice".to_string(),
            calories_per_100g: 130.0,
        })
        .unwrap();
        db
    }

    #[test]
    fn test_record_freezes_calories() {
        let db = setup();
        let event = record(&db, OWNER, "rice", 150.0).unwrap();
        assert_eq!(event.food_name, "rice");
        assert!((event.calories - 195.0).abs() < 0.01);
        assert!((event.quantity_grams - 150.0).abs() < 0.01);
        assert_eq!(event.owner_email, OWNER);
    }

    #[test]
    fn test_record_matches_any_case() {
        let db = setup();
        let event = record(&db, OWNER, "  RICE ", 100.0).unwrap();
        assert_eq!(event.food_name, "rice");
    }

    #[test]
    fn test_record_unknown_food_writes_nothing() {
        let db = setup();
        let err = record(&db, OWNER, "unicorn", 100.0).unwrap_err();
        assert!(matches!(err, NutritionError::FoodNotFound(ref n) if n == "unicorn"));
        assert!(list_for_user(&db, OWNER).unwrap().is_empty());
    }

    #[test]
    fn test_record_rejects_bad_quantity() {
        let db = setup();
        for q in [0.0, -5.0, f64::NAN] {
            let err = record(&db, OWNER, "rice", q).unwrap_err();
            assert!(matches!(err, NutritionError::InvalidQuantity(_)));
        }
        // Quantity is checked before the food lookup.
        let err = record(&db, OWNER, "unicorn", 0.0).unwrap_err();
        assert!(matches!(err, NutritionError::InvalidQuantity(_)));
        assert!(list_for_user(&db, OWNER).unwrap().is_empty());
    }

    #[test]
    fn test_record_at_sets_date() {
        let db = setup();
        let when = Local.with_ymd_and_hms(2024, 3, 9, 21, 15, 0).unwrap();
        let event = record_at(&db, OWNER, "rice", 80.0, when).unwrap();
        assert_eq!(event.date, "2024-03-09");
    }

    #[test]
    fn test_list_for_user_newest_first() {
        let db = setup();
        db.insert_food(&NewFood {
            name: "Eggs".to_string(),
            calories_per_100g: 155.0,
        })
        .unwrap();
        let morning = Local.with_ymd_and_hms(2024, 3, 9, 8, 0, 0).unwrap();
        let evening = Local.with_ymd_and_hms(2024, 3, 9, 19, 0, 0).unwrap();
        record_at(&db, OWNER, "rice", 100.0, morning).unwrap();
        record_at(&db, OWNER, "eggs", 100.0, evening).unwrap();
        record_at(&db, "bob@example.com", "rice", 100.0, evening).unwrap();

        let events = list_for_user(&db, OWNER).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].food_name, "eggs");
        assert_eq!(events[1].food_name, "rice");
    }

    #[test]
    fn test_meals_logged_on() {
        let db = setup();
        let when = Local.with_ymd_and_hms(2024, 3, 9, 8, 0, 0).unwrap();
        record_at(&db, OWNER, "rice", 100.0, when).unwrap();
        record_at(&db, OWNER, "rice", 50.0, when).unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(meals_logged_on(&db, OWNER, day).unwrap(), 2);
        assert_eq!(meals_logged_on(&db, "bob@example.com", day).unwrap(), 0);
    }

    #[test]
    fn test_meal_calories() {
        assert!((meal_calories(130.0, 150.0) - 195.0).abs() < 0.01);
        assert!((meal_calories(52.0, 0.5) - 0.26).abs() < 0.01);
    }
}
