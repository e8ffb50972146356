//! User persistence
//!
//! Profiles and workout logs keyed by user id. Two backends:
//! - An in-memory table for tests and ephemeral runs
//! - A single JSON document on disk, rewritten atomically on every change

mod json_file;
mod memory;

pub use json_file::{write_snapshot, JsonFileStore};
pub use memory::InMemoryStore;

use crate::error::StoreError;
use crate::models::{UserProfile, UserRecord, WorkoutLog};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All users, ordered by id. Also the on-disk document layout.
pub type UserTable = BTreeMap<String, UserRecord>;

/// Listing entry for `GET /users`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: String,
    pub name: String,
    pub total_logs: usize,
    pub last_workout: Option<NaiveDate>,
}

impl UserSummary {
    fn from_record(record: &UserRecord) -> Self {
        Self {
            user_id: record.profile.user_id.clone(),
            name: record.profile.name.clone(),
            total_logs: record.logs.len(),
            last_workout: record.logs.last().map(|l| l.date),
        }
    }
}

/// Trait for user repositories
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create or replace a profile. Existing logs are kept.
    async fn upsert_profile(&self, profile: UserProfile) -> Result<UserProfile, StoreError>;

    /// Profile and full date-ordered history
    async fn get(&self, user_id: &str) -> Result<UserRecord, StoreError>;

    /// Append one log and return the user's new history length.
    /// A second log on the same date is rejected.
    async fn append_log(&self, log: WorkoutLog) -> Result<usize, StoreError>;

    async fn list(&self) -> Result<Vec<UserSummary>, StoreError>;

    /// Short backend name for health output
    fn backend(&self) -> &'static str;
}

/// Apply a profile upsert to a table
pub(crate) fn apply_profile(table: &mut UserTable, profile: UserProfile) -> UserProfile {
    match table.get_mut(&profile.user_id) {
        Some(record) => record.profile = profile.clone(),
        None => {
            table.insert(profile.user_id.clone(), UserRecord::new(profile.clone()));
        }
    }
    profile
}

/// Insert a log keeping the history sorted by date; returns the new length
pub(crate) fn apply_log(table: &mut UserTable, log: WorkoutLog) -> Result<usize, StoreError> {
    let record = table
        .get_mut(&log.user_id)
        .ok_or_else(|| StoreError::UserNotFound(log.user_id.clone()))?;

    match record.logs.binary_search_by(|l| l.date.cmp(&log.date)) {
        Ok(_) => Err(StoreError::DuplicateDate {
            user_id: log.user_id,
            date: log.date,
        }),
        Err(pos) => {
            record.logs.insert(pos, log);
            Ok(record.logs.len())
        }
    }
}

pub(crate) fn lookup(table: &UserTable, user_id: &str) -> Result<UserRecord, StoreError> {
    table
        .get(user_id)
        .cloned()
        .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))
}

pub(crate) fn summarize(table: &UserTable) -> Vec<UserSummary> {
    table.values().map(UserSummary::from_record).collect()
}

/// Sort every history by date; older files may hold unordered logs
pub(crate) fn normalize(table: &mut UserTable) {
    for record in table.values_mut() {
        record.logs.sort_by_key(|l| l.date);
        record.logs.dedup_by_key(|l| l.date);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn profile(user_id: &str) -> UserProfile {
        UserProfile {
            user_id: user_id.to_string(),
            age: 16,
            name: "Jiwoo".to_string(),
            workout_goal: "strength".to_string(),
            personality_type: "friendly".to_string(),
        }
    }

    pub(crate) fn log(user_id: &str, day: u32, completed: bool) -> WorkoutLog {
        WorkoutLog {
            user_id: user_id.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            workout_completed: completed,
            difficulty: 2,
            duration_minutes: if completed { 15 } else { 0 },
            condition_score: 3,
        }
    }

    #[test]
    fn test_apply_log_keeps_date_order() {
        let mut table = UserTable::new();
        apply_profile(&mut table, profile("u1"));
        assert_eq!(apply_log(&mut table, log("u1", 5, true)).unwrap(), 1);
        assert_eq!(apply_log(&mut table, log("u1", 2, false)).unwrap(), 2);
        assert_eq!(apply_log(&mut table, log("u1", 9, true)).unwrap(), 3);

        let days: Vec<u32> = table["u1"]
            .logs
            .iter()
            .map(|l| chrono::Datelike::day(&l.date))
            .collect();
        assert_eq!(days, vec![2, 5, 9]);
    }

    #[test]
    fn test_apply_log_rejects_duplicate_date() {
        let mut table = UserTable::new();
        apply_profile(&mut table, profile("u1"));
        apply_log(&mut table, log("u1", 5, true)).unwrap();
        let err = apply_log(&mut table, log("u1", 5, false)).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateDate { .. }));
        assert_eq!(table["u1"].logs.len(), 1);
    }

    #[test]
    fn test_apply_log_unknown_user() {
        let mut table = UserTable::new();
        let err = apply_log(&mut table, log("ghost", 1, true)).unwrap_err();
        assert!(matches!(err, StoreError::UserNotFound(id) if id == "ghost"));
    }

    #[test]
    fn test_profile_replace_keeps_logs() {
        let mut table = UserTable::new();
        apply_profile(&mut table, profile("u1"));
        apply_log(&mut table, log("u1", 1, true)).unwrap();

        let mut renamed = profile("u1");
        renamed.name = "Jiwoo Park".to_string();
        apply_profile(&mut table, renamed);

        assert_eq!(table["u1"].profile.name, "Jiwoo Park");
        assert_eq!(table["u1"].logs.len(), 1);
    }

    #[test]
    fn test_normalize_sorts_and_dedups() {
        let mut table = UserTable::new();
        let mut record = UserRecord::new(profile("u1"));
        record.logs = vec![log("u1", 3, true), log("u1", 1, false), log("u1", 3, false)];
        table.insert("u1".to_string(), record);

        normalize(&mut table);
        assert_eq!(table["u1"].logs.len(), 2);
        assert!(table["u1"].logs[0].date < table["u1"].logs[1].date);
    }
}
