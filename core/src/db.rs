use std::cmp::Reverse;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use crate::error::{NutritionError, Result};
use crate::models::{
    DayIntake, Feedback, Food, FoodRanking, MealEvent, MealSchedule, NewFeedback, NewFood,
    NewMealEvent, NewMealSchedule, NewUserProfile, ProfileUpdate, UserProfile, calculate_bmi,
    normalize_food_name,
};

const FOOD_COLUMNS: &str = "id, name, calories_per_100g, created_at, updated_at";
const USER_COLUMNS: &str = "email, diet, weight_kg, height_m, bmi, created_at, updated_at";
const MEAL_EVENT_COLUMNS: &str =
    "id, uuid, owner_email, food_name, quantity_grams, calories, logged_at, date";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        log::debug!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            log::debug!("Migrating schema to version 1");
            // No foreign key on meal_events.food_name: deleting a food leaves
            // its past events in place.
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS foods (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    calories_per_100g REAL NOT NULL CHECK (calories_per_100g > 0),
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS users (
                    email TEXT PRIMARY KEY,
                    diet TEXT NOT NULL,
                    weight_kg REAL NOT NULL,
                    height_m REAL NOT NULL,
                    bmi REAL NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS meal_events (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT NOT NULL UNIQUE,
                    owner_email TEXT NOT NULL,
                    food_name TEXT NOT NULL,
                    quantity_grams REAL NOT NULL,
                    calories REAL NOT NULL,
                    logged_at TEXT NOT NULL,
                    date TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_meal_events_owner_date ON meal_events(owner_email, date);

                PRAGMA user_version = 1;",
            )?;
        }

        if version < 2 {
            log::debug!("Migrating schema to version 2");
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS meal_schedules (
                    owner_email TEXT PRIMARY KEY,
                    breakfast TEXT NOT NULL,
                    lunch TEXT NOT NULL,
                    dinner TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS feedback (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    owner_email TEXT NOT NULL,
                    satisfaction INTEGER NOT NULL CHECK (satisfaction BETWEEN 1 AND 5),
                    ease_of_use INTEGER NOT NULL CHECK (ease_of_use BETWEEN 1 AND 5),
                    would_recommend INTEGER NOT NULL,
                    comment TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                PRAGMA user_version = 2;",
            )?;
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    fn food_from_row(row: &rusqlite::Row) -> rusqlite::Result<Food> {
        Ok(Food {
            id: row.get(0)?,
            name: row.get(1)?,
            calories_per_100g: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn profile_from_row(row: &rusqlite::Row) -> rusqlite::Result<UserProfile> {
        Ok(UserProfile {
            email: row.get(0)?,
            diet: row.get(1)?,
            weight_kg: row.get(2)?,
            height_m: row.get(3)?,
            bmi: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn meal_event_from_row(row: &rusqlite::Row) -> rusqlite::Result<MealEvent> {
        Ok(MealEvent {
            id: row.get(0)?,
            uuid: row.get(1)?,
            owner_email: row.get(2)?,
            food_name: row.get(3)?,
            quantity_grams: row.get(4)?,
            calories: row.get(5)?,
            logged_at: row.get(6)?,
            date: row.get(7)?,
        })
    }

    fn time_from_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveTime> {
        let raw: String = row.get(idx)?;
        NaiveTime::parse_from_str(&raw, "%H:%M").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    }

    fn schedule_from_row(row: &rusqlite::Row) -> rusqlite::Result<MealSchedule> {
        Ok(MealSchedule {
            owner_email: row.get(0)?,
            breakfast: Self::time_from_column(row, 1)?,
            lunch: Self::time_from_column(row, 2)?,
            dinner: Self::time_from_column(row, 3)?,
            updated_at: row.get(4)?,
        })
    }

    fn feedback_from_row(row: &rusqlite::Row) -> rusqlite::Result<Feedback> {
        Ok(Feedback {
            id: row.get(0)?,
            owner_email: row.get(1)?,
            satisfaction: row.get(2)?,
            ease_of_use: row.get(3)?,
            would_recommend: row.get(4)?,
            comment: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    // --- Foods ---

    pub fn insert_food(&self, food: &NewFood) -> Result<Food> {
        let name = normalize_food_name(&food.name);
        if self.get_food(&name)?.is_some() {
            return Err(NutritionError::FoodAlreadyExists(name));
        }
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO foods (name, calories_per_100g, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![name, food.calories_per_100g, now, now],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_food_by_id(id)
    }

    pub fn get_food_by_id(&self, id: i64) -> Result<Food> {
        let food = self.conn.query_row(
            &format!("SELECT {FOOD_COLUMNS} FROM foods WHERE id = ?1"),
            params![id],
            Self::food_from_row,
        )?;
        Ok(food)
    }

    /// Exact lookup on the normalized catalog key.
    pub fn get_food(&self, name: &str) -> Result<Option<Food>> {
        let name = normalize_food_name(name);
        let food = self
            .conn
            .query_row(
                &format!("SELECT {FOOD_COLUMNS} FROM foods WHERE name = ?1"),
                params![name],
                Self::food_from_row,
            )
            .optional()?;
        Ok(food)
    }

    pub fn list_foods(&self) -> Result<Vec<Food>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {FOOD_COLUMNS} FROM foods ORDER BY name"))?;
        let foods = stmt
            .query_map([], Self::food_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(foods)
    }

    pub fn update_food_calories(&self, name: &str, calories_per_100g: f64) -> Result<Food> {
        let name = normalize_food_name(name);
        let now = Local::now().to_rfc3339();
        let rows = self.conn.execute(
            "UPDATE foods SET calories_per_100g = ?1, updated_at = ?2 WHERE name = ?3",
            params![calories_per_100g, now, name],
        )?;
        if rows == 0 {
            return Err(NutritionError::FoodNotFound(name));
        }
        self.get_food(&name)?.ok_or(NutritionError::FoodNotFound(name))
    }

    pub fn delete_food(&self, name: &str) -> Result<()> {
        let name = normalize_food_name(name);
        let rows = self
            .conn
            .execute("DELETE FROM foods WHERE name = ?1", params![name])?;
        if rows == 0 {
            return Err(NutritionError::FoodNotFound(name));
        }
        Ok(())
    }

    // --- Profiles ---

    pub fn insert_profile(&self, profile: &NewUserProfile) -> Result<UserProfile> {
        if self.get_profile(&profile.email)?.is_some() {
            return Err(NutritionError::UserAlreadyExists(profile.email.clone()));
        }
        let now = Local::now().to_rfc3339();
        let bmi = calculate_bmi(profile.weight_kg, profile.height_m);
        self.conn.execute(
            "INSERT INTO users (email, diet, weight_kg, height_m, bmi, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                profile.email,
                profile.diet,
                profile.weight_kg,
                profile.height_m,
                bmi,
                now,
                now,
            ],
        )?;
        self.get_profile(&profile.email)?
            .ok_or_else(|| NutritionError::UserNotFound(profile.email.clone()))
    }

    pub fn get_profile(&self, email: &str) -> Result<Option<UserProfile>> {
        let profile = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                Self::profile_from_row,
            )
            .optional()?;
        Ok(profile)
    }

    pub fn update_profile(&self, email: &str, update: &ProfileUpdate) -> Result<UserProfile> {
        let now = Local::now().to_rfc3339();
        let bmi = calculate_bmi(update.weight_kg, update.height_m);
        let rows = self.conn.execute(
            "UPDATE users SET weight_kg = ?1, height_m = ?2, diet = ?3, bmi = ?4, updated_at = ?5
             WHERE email = ?6",
            params![
                update.weight_kg,
                update.height_m,
                update.diet.as_str(),
                bmi,
                now,
                email,
            ],
        )?;
        if rows == 0 {
            return Err(NutritionError::UserNotFound(email.to_string()));
        }
        self.get_profile(email)?
            .ok_or_else(|| NutritionError::UserNotFound(email.to_string()))
    }

    pub fn list_profiles(&self) -> Result<Vec<UserProfile>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY email"))?;
        let profiles = stmt
            .query_map([], Self::profile_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(profiles)
    }

    // --- Meal events ---

    pub fn insert_meal_event(&self, event: &NewMealEvent) -> Result<MealEvent> {
        let uuid = Uuid::new_v4().to_string();
        let logged_at = event.logged_at.to_rfc3339();
        let date_str = event.logged_at.date_naive().format("%Y-%m-%d").to_string();
        self.conn.execute(
            "INSERT INTO meal_events (uuid, owner_email, food_name, quantity_grams, calories, logged_at, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                uuid,
                event.owner_email,
                event.food_name,
                event.quantity_grams,
                event.calories,
                logged_at,
                date_str,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_meal_event(id)
    }

    pub fn get_meal_event(&self, id: i64) -> Result<MealEvent> {
        let event = self.conn.query_row(
            &format!("SELECT {MEAL_EVENT_COLUMNS} FROM meal_events WHERE id = ?1"),
            params![id],
            Self::meal_event_from_row,
        )?;
        Ok(event)
    }

    /// All events for one user, newest first.
    ///
    /// `logged_at` carries the local offset at write time, so the text does not
    /// sort across a DST change. Order by the parsed instant, then by id.
    pub fn list_meal_events(&self, owner_email: &str) -> Result<Vec<MealEvent>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEAL_EVENT_COLUMNS} FROM meal_events
             WHERE owner_email = ?1
             ORDER BY id DESC"
        ))?;
        let mut events = stmt
            .query_map(params![owner_email], Self::meal_event_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        events.sort_by_key(|e| Reverse(DateTime::parse_from_rfc3339(&e.logged_at).ok()));
        Ok(events)
    }

    pub fn count_meal_events_on(&self, owner_email: &str, date: NaiveDate) -> Result<i64> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM meal_events WHERE owner_email = ?1 AND date = ?2",
            params![owner_email, date_str],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// The day's events joined with the current catalog. Events whose food
    /// has been deleted drop out of the join.
    pub fn day_intake(&self, owner_email: &str, date: NaiveDate) -> Result<Vec<DayIntake>> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(
            "SELECT me.food_name, me.quantity_grams, f.calories_per_100g, me.calories
             FROM meal_events me
             JOIN foods f ON me.food_name = f.name
             WHERE me.owner_email = ?1 AND me.date = ?2
             ORDER BY me.id",
        )?;
        let rows = stmt
            .query_map(params![owner_email, date_str], |row| {
                Ok(DayIntake {
                    food_name: row.get(0)?,
                    quantity_grams: row.get(1)?,
                    current_calories_per_100g: row.get(2)?,
                    snapshot_calories: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        log::debug!(
            "{} joined meal events for {owner_email} on {date_str}",
            rows.len()
        );
        Ok(rows)
    }

    /// Grams eaten per food, largest first. Ties go to the food logged first.
    pub fn food_ranking(&self, owner_email: &str, limit: usize) -> Result<Vec<FoodRanking>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(
            "SELECT food_name, SUM(quantity_grams) AS total_grams, MIN(id) AS first_id
             FROM meal_events
             WHERE owner_email = ?1
             GROUP BY food_name
             ORDER BY total_grams DESC, first_id ASC
             LIMIT ?2",
        )?;
        let ranking = stmt
            .query_map(params![owner_email, limit], |row| {
                Ok(FoodRanking {
                    food_name: row.get(0)?,
                    total_grams: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ranking)
    }

    // --- Meal schedules ---

    pub fn upsert_meal_schedule(&self, schedule: &NewMealSchedule) -> Result<MealSchedule> {
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO meal_schedules (owner_email, breakfast, lunch, dinner, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(owner_email) DO UPDATE SET
                breakfast = excluded.breakfast,
                lunch = excluded.lunch,
                dinner = excluded.dinner,
                updated_at = excluded.updated_at",
            params![
                schedule.owner_email,
                schedule.breakfast.format("%H:%M").to_string(),
                schedule.lunch.format("%H:%M").to_string(),
                schedule.dinner.format("%H:%M").to_string(),
                now,
            ],
        )?;
        self.get_meal_schedule(&schedule.owner_email)?
            .ok_or_else(|| NutritionError::UserNotFound(schedule.owner_email.clone()))
    }

    pub fn get_meal_schedule(&self, owner_email: &str) -> Result<Option<MealSchedule>> {
        let schedule = self
            .conn
            .query_row(
                "SELECT owner_email, breakfast, lunch, dinner, updated_at
                 FROM meal_schedules WHERE owner_email = ?1",
                params![owner_email],
                Self::schedule_from_row,
            )
            .optional()?;
        Ok(schedule)
    }

    // --- Feedback ---

    pub fn insert_feedback(&self, feedback: &NewFeedback) -> Result<Feedback> {
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO feedback (owner_email, satisfaction, ease_of_use, would_recommend, comment, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                feedback.owner_email,
                feedback.satisfaction,
                feedback.ease_of_use,
                feedback.would_recommend,
                feedback.comment,
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        let stored = self.conn.query_row(
            "SELECT id, owner_email, satisfaction, ease_of_use, would_recommend, comment, created_at
             FROM feedback WHERE id = ?1",
            params![id],
            Self::feedback_from_row,
        )?;
        Ok(stored)
    }

    pub fn list_feedback(&self) -> Result<Vec<Feedback>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner_email, satisfaction, ease_of_use, would_recommend, comment, created_at
             FROM feedback ORDER BY id",
        )?;
        let items = stmt
            .query_map([], Self::feedback_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }
}
