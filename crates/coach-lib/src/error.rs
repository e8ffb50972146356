//! Error types for the coaching core

use chrono::NaiveDate;
use thiserror::Error;

/// Errors surfaced by the coaching pipeline
#[derive(Debug, Error)]
pub enum CoachError {
    /// The log sequence was empty; the caller must accumulate more history
    #[error("insufficient workout history: at least one log is required")]
    InsufficientHistory,

    /// The risk classifier could not be loaded or invoked
    #[error("risk model unavailable: {0}")]
    ModelUnavailable(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors from a user repository
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user {0} not found")]
    UserNotFound(String),

    #[error("user {user_id} already has a workout logged for {date}")]
    DuplicateDate { user_id: String, date: NaiveDate },

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Field-level validation failures for inbound records
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

impl ValidationError {
    /// Check that `value` lies in `min..=max`
    pub fn check_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<(), Self> {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(Self::OutOfRange {
                field,
                min,
                max,
                value,
            })
        }
    }

    pub fn check_not_empty(field: &'static str, value: &str) -> Result<(), Self> {
        if value.trim().is_empty() {
            Err(Self::Empty(field))
        } else {
            Ok(())
        }
    }
}
