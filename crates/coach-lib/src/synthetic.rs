//! Synthetic user population
//!
//! Deterministic, seeded generation of profiles and daily workout histories
//! for seeding a store and building a training set. Each user has a base
//! consistency and a typical condition; the daily outcome depends on the
//! condition, weekend, how far difficulty exceeds condition and how recently
//! the user last failed.

use crate::models::{UserProfile, UserRecord, WorkoutLog, MAX_SCORE, MIN_SCORE};
use crate::store::UserTable;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

const NAMES: &[&str] = &[
    "Minsu", "Jiyoung", "Hyunwoo", "Seoyeon", "Junho", "Yerin", "Taemin", "Soyoung", "Donghyun",
    "Haeun", "Sungmin", "Yujin", "Jaehyun", "Nayoung", "Seungwoo", "Daeun", "Gunwoo", "Chaewon",
    "Siwoo", "Subin", "Doyoon", "Arin", "Junseo", "Yoonseo", "Hajun", "Jiwoo", "Minjun",
    "Seohyun", "Yejun", "Jimin",
];

pub const GOALS: &[&str] = &["stamina", "weight_loss", "strength", "stress_relief", "health"];

pub const PERSONALITIES: &[&str] = &["encouraging", "challenging", "analytical", "friendly"];

const MIN_AGE: u32 = 14;
const MAX_AGE: u32 = 19;

/// Population shape
#[derive(Debug, Clone)]
pub struct PopulationConfig {
    pub users: usize,
    pub days: usize,
    /// Last generated day (inclusive)
    pub end_date: NaiveDate,
    pub seed: u64,
}

impl PopulationConfig {
    pub fn new(users: usize, days: usize, end_date: NaiveDate, seed: u64) -> Self {
        Self {
            users,
            days,
            end_date,
            seed,
        }
    }
}

/// Seeded population generator
#[derive(Debug, Clone)]
pub struct SyntheticPopulation {
    rng: ChaCha8Rng,
}

impl SyntheticPopulation {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generate every user as a store table keyed `user_001`, `user_002`, ...
    pub fn generate(config: &PopulationConfig) -> UserTable {
        let mut generator = Self::new(config.seed);
        (0..config.users)
            .map(|i| {
                let user_id = format!("user_{:03}", i + 1);
                let name = NAMES[i % NAMES.len()];
                let record = generator.user(&user_id, name, config.days, config.end_date);
                (user_id, record)
            })
            .collect()
    }

    /// One profile with `days` consecutive logs ending at `end_date`
    pub fn user(
        &mut self,
        user_id: &str,
        name: &str,
        days: usize,
        end_date: NaiveDate,
    ) -> UserRecord {
        let profile = UserProfile {
            user_id: user_id.to_string(),
            age: self.rng.gen_range(MIN_AGE..=MAX_AGE),
            name: name.to_string(),
            workout_goal: pick(&mut self.rng, GOALS).to_string(),
            personality_type: pick(&mut self.rng, PERSONALITIES).to_string(),
        };

        let base_consistency: f64 = self.rng.gen_range(0.3..0.8);
        let condition_tendency: i32 = self.rng.gen_range(2..=4);

        let start = end_date - Duration::days(days.saturating_sub(1) as i64);
        let mut streak: i32 = 0;
        let mut last_fail_days_ago: i32 = self.rng.gen_range(3..=10);

        let mut logs = Vec::with_capacity(days);
        for day in 0..days {
            let date = start + Duration::days(day as i64);
            let weekend_bonus = if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                0.1
            } else {
                0.0
            };

            let condition = clamp_score(condition_tendency + self.rng.gen_range(-1..=1));
            let difficulty = clamp_score(2 + streak / 5 + self.rng.gen_range(-1..=1));

            let recent_fail_bonus = if last_fail_days_ago <= 1 { 0.05 } else { 0.0 };
            let success_prob = (base_consistency
                + f64::from(condition - 3) * 0.1
                + weekend_bonus
                - f64::from((difficulty - condition).max(0)) * 0.15
                + recent_fail_bonus)
                .clamp(0.1, 0.9);

            let completed = self.rng.gen::<f64>() < success_prob;
            let duration = if completed {
                streak += 1;
                last_fail_days_ago = (last_fail_days_ago + 1).min(30);
                (difficulty * 3 + condition * 2 + self.rng.gen_range(-5..=10)).max(5)
            } else {
                streak = 0;
                last_fail_days_ago = 0;
                self.rng.gen_range(0..=5)
            };

            logs.push(WorkoutLog {
                user_id: user_id.to_string(),
                date,
                workout_completed: completed,
                difficulty: difficulty as u8,
                duration_minutes: duration as u32,
                condition_score: condition as u8,
            });
        }

        UserRecord { profile, logs }
    }
}

fn pick<'a>(rng: &mut ChaCha8Rng, items: &[&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

fn clamp_score(value: i32) -> i32 {
    value.clamp(i32::from(MIN_SCORE), i32::from(MAX_SCORE))
}
