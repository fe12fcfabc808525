//! Error types for the nutrition core.
//!
//! Every failure a caller can act on is a tagged variant of [`NutritionError`].
//! None of them are fatal: the presentation layer decides how to report them
//! and whether to prompt for a retry.

use chrono::NaiveDate;
use thiserror::Error;

/// Coarse classification of a [`NutritionError`], so front ends can pick an
/// exit code without matching on payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FoodNotFound,
    InvalidQuantity,
    UserNotFound,
    NoMealsRecorded,
    DietNotRecognized,
    Conflict,
    Validation,
    Storage,
}

#[derive(Error, Debug)]
pub enum NutritionError {
    #[error("Food not found: {0}")]
    FoodNotFound(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Nothing logged yet for that day. Callers may simply try again later.
    #[error("No meals recorded for {email} on {date}")]
    NoMealsRecorded { email: String, date: NaiveDate },

    #[error("Diet not recognized: {0}")]
    DietNotRecognized(String),

    #[error("Food already exists: {0}")]
    FoodAlreadyExists(String),

    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NutritionError>;

impl NutritionError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FoodNotFound(_) => ErrorKind::FoodNotFound,
            Self::InvalidQuantity(_) => ErrorKind::InvalidQuantity,
            Self::UserNotFound(_) => ErrorKind::UserNotFound,
            Self::NoMealsRecorded { .. } => ErrorKind::NoMealsRecorded,
            Self::DietNotRecognized(_) => ErrorKind::DietNotRecognized,
            Self::FoodAlreadyExists(_) | Self::UserAlreadyExists(_) => ErrorKind::Conflict,
            Self::Validation(_) | Self::Csv(_) | Self::Json(_) => ErrorKind::Validation,
            Self::Storage(_) | Self::Io(_) => ErrorKind::Storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            NutritionError::FoodNotFound("rice".into()).kind(),
            ErrorKind::FoodNotFound
        );
        assert_eq!(
            NutritionError::InvalidQuantity("-1".into()).kind(),
            ErrorKind::InvalidQuantity
        );
        assert_eq!(
            NutritionError::DietNotRecognized("paleo".into()).kind(),
            ErrorKind::DietNotRecognized
        );
        assert_eq!(
            NutritionError::UserAlreadyExists("a@b.com".into()).kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn test_no_meals_message() {
        let err = NutritionError::NoMealsRecorded {
            email: "ana@example.com".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "No meals recorded for ana@example.com on 2024-06-15"
        );
        assert_eq!(err.kind(), ErrorKind::NoMealsRecorded);
    }

    #[test]
    fn test_storage_kind() {
        let err = NutritionError::from(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(err.kind(), ErrorKind::Storage);
    }
}
