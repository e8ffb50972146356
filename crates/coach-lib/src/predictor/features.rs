//! Feature extraction for dropout-risk inference
//!
//! Turns a user's date-ordered workout history into the seven-value vector
//! the dropout model was trained on. The same extractor builds the offline
//! training set, so serving and training share one definition of every
//! feature.

use crate::models::{FeatureVector, RecentPerformance, WorkoutLog, FEATURE_COUNT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of most recent logs that make up the recent window
pub const RECENT_WINDOW: usize = 7;

/// Upper bound for `days_since_fail` when the window holds no failure
pub const DAYS_SINCE_FAIL_CAP: usize = 30;

/// Extracts model features from a user's workout history
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    window_size: usize,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self {
            window_size: RECENT_WINDOW,
        }
    }

    /// The most recent `window_size` logs
    pub fn window<'a>(&self, logs: &'a [WorkoutLog]) -> &'a [WorkoutLog] {
        &logs[logs.len().saturating_sub(self.window_size)..]
    }

    /// Build the feature vector for "today" from the recent window.
    ///
    /// `current_condition` is the caller-supplied condition for today and
    /// replaces the stored score of the latest log. Returns `None` for an
    /// empty history.
    pub fn extract(&self, logs: &[WorkoutLog], current_condition: u8) -> Option<FeatureVector> {
        let window = self.window(logs);
        let latest = window.last()?;

        Some(FeatureVector {
            recent_success_rate: success_rate(window) as f32,
            streak: streak(window) as f32,
            days_since_fail: days_since_fail(window) as f32,
            difficulty: f32::from(latest.difficulty),
            duration_minutes: latest.duration_minutes as f32,
            condition_score: f32::from(current_condition),
            weekday: latest.weekday() as f32,
        })
    }

    /// Success rate, streak and days since fail over the recent window
    pub fn recent_performance(&self, logs: &[WorkoutLog]) -> Option<RecentPerformance> {
        let window = self.window(logs);
        if window.is_empty() {
            return None;
        }
        Some(RecentPerformance {
            success_rate: success_rate(window),
            streak: streak(window),
            days_since_fail: days_since_fail(window),
        })
    }

    /// Build labelled samples for offline training.
    ///
    /// For every day but the last, features are computed on the history up to
    /// and including that day, using the stored condition score, and labelled
    /// 1 when the following day's workout failed.
    pub fn build_training_set(&self, logs: &[WorkoutLog]) -> Vec<TrainingSample> {
        let mut by_user: BTreeMap<&str, Vec<&WorkoutLog>> = BTreeMap::new();
        for log in logs {
            by_user.entry(log.user_id.as_str()).or_default().push(log);
        }

        let mut samples = Vec::new();
        for (user_id, mut rows) in by_user {
            rows.sort_by_key(|r| r.date);
            let ordered: Vec<WorkoutLog> = rows.into_iter().cloned().collect();

            for i in 0..ordered.len().saturating_sub(1) {
                let today = &ordered[i];
                let tomorrow = &ordered[i + 1];
                let Some(features) = self.extract(&ordered[..=i], today.condition_score) else {
                    continue;
                };
                samples.push(TrainingSample {
                    user_id: user_id.to_string(),
                    date: today.date.to_string(),
                    features: features.to_array(),
                    label: u8::from(!tomorrow.workout_completed),
                });
            }
        }
        samples
    }
}

/// One labelled row of the training set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub user_id: String,
    pub date: String,
    pub features: [f32; FEATURE_COUNT],
    /// 1 if the next day's workout failed
    pub label: u8,
}

/// Fraction of completed workouts, clamped to [0, 1]
pub fn success_rate(logs: &[WorkoutLog]) -> f64 {
    if logs.is_empty() {
        return 0.0;
    }
    let completed = logs.iter().filter(|l| l.workout_completed).count();
    (completed as f64 / logs.len() as f64).clamp(0.0, 1.0)
}

/// Consecutive completed workouts ending at the latest log
pub fn streak(logs: &[WorkoutLog]) -> u32 {
    logs.iter()
        .rev()
        .take_while(|l| l.workout_completed)
        .count() as u32
}

/// Reverse distance to the nearest failure; 0 when the latest log failed.
///
/// Without any failure this is `min(len, DAYS_SINCE_FAIL_CAP)`.
pub fn days_since_fail(logs: &[WorkoutLog]) -> u32 {
    logs.iter()
        .rev()
        .position(|l| !l.workout_completed)
        .unwrap_or_else(|| logs.len().min(DAYS_SINCE_FAIL_CAP)) as u32
}
