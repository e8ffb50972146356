//! Per-user workout statistics

use crate::models::{UserRecord, WorkoutLog};
use crate::predictor::{streak, RECENT_WINDOW};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Summary counters for the stats endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub user_name: String,
    pub total_days: usize,
    /// Percent, one decimal
    pub total_success_rate: f64,
    /// `"k/n"` over the last seven logs
    pub recent_7_days_success: String,
    /// Percent, one decimal
    pub recent_success_rate: f64,
    /// Trailing successes over the whole history
    pub current_streak: u32,
    pub last_workout: Option<NaiveDate>,
}

impl UserStats {
    pub fn from_record(record: &UserRecord) -> Self {
        let logs = &record.logs;
        let user_name = record.profile.name.clone();

        if logs.is_empty() {
            return Self {
                message: Some("No workouts recorded yet".to_string()),
                user_name,
                total_days: 0,
                total_success_rate: 0.0,
                recent_7_days_success: "0/0".to_string(),
                recent_success_rate: 0.0,
                current_streak: 0,
                last_workout: None,
            };
        }

        let recent = &logs[logs.len().saturating_sub(RECENT_WINDOW)..];
        let recent_success = completed(recent);

        Self {
            message: None,
            user_name,
            total_days: logs.len(),
            total_success_rate: percent(completed(logs), logs.len()),
            recent_7_days_success: format!("{}/{}", recent_success, recent.len()),
            recent_success_rate: percent(recent_success, recent.len()),
            current_streak: streak(logs),
            last_workout: logs.last().map(|l| l.date),
        }
    }
}

fn completed(logs: &[WorkoutLog]) -> usize {
    logs.iter().filter(|l| l.workout_completed).count()
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_to(part as f64 / whole as f64 * 100.0, 1)
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserProfile;

    fn record(outcomes: &[bool]) -> UserRecord {
        let mut record = UserRecord::new(UserProfile {
            user_id: "u1".to_string(),
            age: 17,
            name: "Seoyeon".to_string(),
            workout_goal: "health".to_string(),
            personality_type: "analytical".to_string(),
        });
        record.logs = outcomes
            .iter()
            .enumerate()
            .map(|(i, &completed)| WorkoutLog {
                user_id: "u1".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 2, 1 + i as u32).unwrap(),
                workout_completed: completed,
                difficulty: 3,
                duration_minutes: 20,
                condition_score: 3,
            })
            .collect();
        record
    }

    #[test]
    fn test_stats_over_full_history() {
        // 9 logs, 6 successes; last 7 hold 4 successes
        let stats = UserStats::from_record(&record(&[
            true, true, false, true, false, false, true, true, true,
        ]));
        assert_eq!(stats.total_days, 9);
        assert_eq!(stats.total_success_rate, 66.7);
        assert_eq!(stats.recent_7_days_success, "4/7");
        assert_eq!(stats.recent_success_rate, 57.1);
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.last_workout, NaiveDate::from_ymd_opt(2026, 2, 9));
        assert!(stats.message.is_none());
    }

    #[test]
    fn test_short_history_uses_all_logs() {
        let stats = UserStats::from_record(&record(&[false, true]));
        assert_eq!(stats.recent_7_days_success, "1/2");
        assert_eq!(stats.recent_success_rate, 50.0);
        assert_eq!(stats.current_streak, 1);
    }

    #[test]
    fn test_streak_spans_beyond_window() {
        let stats = UserStats::from_record(&record(&[true; 10]));
        assert_eq!(stats.current_streak, 10);
        assert_eq!(stats.recent_7_days_success, "7/7");
    }

    #[test]
    fn test_empty_history_zeroed() {
        let stats = UserStats::from_record(&record(&[]));
        assert!(stats.message.is_some());
        assert_eq!(stats.total_days, 0);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.last_workout, None);
        assert_eq!(stats.user_name, "Seoyeon");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(66.666, 1), 66.7);
    }
}
