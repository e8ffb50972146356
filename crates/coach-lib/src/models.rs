//! Core data models for the coaching service

use crate::error::ValidationError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest value on the 1-5 difficulty and condition scales
pub const MIN_SCORE: u8 = 1;

/// Highest value on the 1-5 difficulty and condition scales
pub const MAX_SCORE: u8 = 5;

/// Number of input features expected by the risk model
pub const FEATURE_COUNT: usize = 7;

/// One day's workout outcome for a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkoutLog {
    pub user_id: String,
    pub date: NaiveDate,
    pub workout_completed: bool,
    pub difficulty: u8,
    pub duration_minutes: u32,
    pub condition_score: u8,
}

impl WorkoutLog {
    /// ISO weekday of the log date, Monday = 0
    pub fn weekday(&self) -> u32 {
        self.date.weekday().num_days_from_monday()
    }
}

/// User profile captured at onboarding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserProfile {
    pub user_id: String,
    pub age: u32,
    pub name: String,
    pub workout_goal: String,
    /// Selects the tone of coaching messages
    pub personality_type: String,
}

/// A profile together with its date-ordered workout history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserRecord {
    pub profile: UserProfile,
    #[serde(default)]
    pub logs: Vec<WorkoutLog>,
}

impl UserRecord {
    pub fn new(profile: UserProfile) -> Self {
        Self {
            profile,
            logs: Vec::new(),
        }
    }
}

/// Profile creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewProfile {
    pub name: String,
    pub age: u32,
    pub workout_goal: String,
    pub personality_type: String,
}

impl NewProfile {
    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::check_not_empty("name", &self.name)?;
        ValidationError::check_range("age", i64::from(self.age), 1, 120)?;
        ValidationError::check_not_empty("workout_goal", &self.workout_goal)?;
        ValidationError::check_not_empty("personality_type", &self.personality_type)
    }

    /// Validate and attach the user id
    pub fn into_profile(self, user_id: &str) -> Result<UserProfile, ValidationError> {
        ValidationError::check_not_empty("user_id", user_id)?;
        self.validate()?;
        Ok(UserProfile {
            user_id: user_id.to_string(),
            age: self.age,
            name: self.name,
            workout_goal: self.workout_goal,
            personality_type: self.personality_type,
        })
    }
}

/// Workout submission payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewWorkout {
    pub workout_completed: bool,
    pub difficulty: u8,
    pub duration_minutes: u32,
    pub condition_score: u8,
    /// Defaults to the submission day when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl NewWorkout {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_score("difficulty", self.difficulty)?;
        check_score("condition_score", self.condition_score)
    }

    /// Validate and build the immutable log entry
    pub fn into_log(self, user_id: &str, today: NaiveDate) -> Result<WorkoutLog, ValidationError> {
        self.validate()?;
        Ok(WorkoutLog {
            user_id: user_id.to_string(),
            date: self.date.unwrap_or(today),
            workout_completed: self.workout_completed,
            difficulty: self.difficulty,
            duration_minutes: self.duration_minutes,
            condition_score: self.condition_score,
        })
    }
}

/// Coaching request payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoachingRequest {
    pub current_condition: u8,
}

impl CoachingRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_score("current_condition", self.current_condition)
    }
}

fn check_score(field: &'static str, value: u8) -> Result<(), ValidationError> {
    ValidationError::check_range(
        field,
        i64::from(value),
        i64::from(MIN_SCORE),
        i64::from(MAX_SCORE),
    )
}

/// Feature vector for the dropout model.
///
/// Field order is the model's input order and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub recent_success_rate: f32,
    pub streak: f32,
    pub days_since_fail: f32,
    pub difficulty: f32,
    pub duration_minutes: f32,
    pub condition_score: f32,
    pub weekday: f32,
}

impl FeatureVector {
    pub fn to_array(&self) -> [f32; FEATURE_COUNT] {
        [
            self.recent_success_rate,
            self.streak,
            self.days_since_fail,
            self.difficulty,
            self.duration_minutes,
            self.condition_score,
            self.weekday,
        ]
    }
}

/// Dropout risk tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of the recent window shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecentPerformance {
    pub success_rate: f64,
    pub streak: u32,
    pub days_since_fail: u32,
}

/// Where a coaching message came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSource {
    Template,
    Remote,
    /// The remote generator failed and a template was substituted
    TemplateFallback,
}

impl MessageSource {
    pub fn is_degraded(&self) -> bool {
        matches!(self, MessageSource::TemplateFallback)
    }
}

/// A generated user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachingMessage {
    pub text: String,
    pub source: MessageSource,
}

/// Result of one coaching decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingAdvice {
    pub dropout_probability: f64,
    pub dropout_risk: RiskTier,
    pub current_difficulty: u8,
    pub recommended_difficulty: u8,
    pub message: String,
    pub message_source: MessageSource,
    pub recent_performance: RecentPerformance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_is_monday_based() {
        let log = WorkoutLog {
            user_id: "u".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            workout_completed: true,
            difficulty: 2,
            duration_minutes: 12,
            condition_score: 4,
        };
        // 2026-01-05 is a Monday
        assert_eq!(log.weekday(), 0);
    }

    #[test]
    fn test_workout_log_rejects_malformed_date() {
        let raw = r#"{"user_id":"u","date":"2026-13-40","workout_completed":true,
            "difficulty":2,"duration_minutes":10,"condition_score":3}"#;
        assert!(serde_json::from_str::<WorkoutLog>(raw).is_err());
    }

    #[test]
    fn test_new_workout_rejects_unknown_fields() {
        let raw = r#"{"workout_completed":true,"difficulty":2,"duration_minutes":10,
            "condition_score":3,"mood":"great"}"#;
        assert!(serde_json::from_str::<NewWorkout>(raw).is_err());
    }

    #[test]
    fn test_new_workout_range_validation() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let bad = NewWorkout {
            workout_completed: true,
            difficulty: 6,
            duration_minutes: 10,
            condition_score: 3,
            date: None,
        };
        assert!(matches!(
            bad.into_log("u", today),
            Err(ValidationError::OutOfRange { field: "difficulty", .. })
        ));

        let good = NewWorkout {
            workout_completed: false,
            difficulty: 1,
            duration_minutes: 0,
            condition_score: 5,
            date: None,
        };
        let log = good.into_log("u", today).unwrap();
        assert_eq!(log.date, today);
        assert_eq!(log.user_id, "u");
    }

    #[test]
    fn test_new_profile_validation() {
        let profile = NewProfile {
            name: "  ".to_string(),
            age: 15,
            workout_goal: "stamina".to_string(),
            personality_type: "friendly".to_string(),
        };
        assert_eq!(profile.validate(), Err(ValidationError::Empty("name")));
    }

    #[test]
    fn test_risk_tier_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&RiskTier::Medium).unwrap(), "\"medium\"");
        assert_eq!(RiskTier::High.to_string(), "high");
    }

    #[test]
    fn test_feature_vector_order() {
        let f = FeatureVector {
            recent_success_rate: 0.6,
            streak: 2.0,
            days_since_fail: 2.0,
            difficulty: 2.0,
            duration_minutes: 12.0,
            condition_score: 3.0,
            weekday: 0.0,
        };
        assert_eq!(f.to_array(), [0.6, 2.0, 2.0, 2.0, 12.0, 3.0, 0.0]);
    }
}
