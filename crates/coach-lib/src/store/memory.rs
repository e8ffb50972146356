//! In-memory user repository

use super::{apply_log, apply_profile, lookup, summarize, UserRepository, UserSummary, UserTable};
use crate::error::StoreError;
use crate::models::{UserProfile, UserRecord, WorkoutLog};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Volatile store; contents are lost on drop
#[derive(Debug, Default)]
pub struct InMemoryStore {
    table: RwLock<UserTable>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn upsert_profile(&self, profile: UserProfile) -> Result<UserProfile, StoreError> {
        let mut table = self.table.write().await;
        Ok(apply_profile(&mut table, profile))
    }

    async fn get(&self, user_id: &str) -> Result<UserRecord, StoreError> {
        lookup(&*self.table.read().await, user_id)
    }

    async fn append_log(&self, log: WorkoutLog) -> Result<usize, StoreError> {
        let mut table = self.table.write().await;
        apply_log(&mut table, log)
    }

    async fn list(&self) -> Result<Vec<UserSummary>, StoreError> {
        Ok(summarize(&*self.table.read().await))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{log, profile};

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = InMemoryStore::new();
        store.upsert_profile(profile("u1")).await.unwrap();
        assert_eq!(store.append_log(log("u1", 4, true)).await.unwrap(), 1);
        assert_eq!(store.append_log(log("u1", 3, false)).await.unwrap(), 2);

        let record = store.get("u1").await.unwrap();
        assert_eq!(record.logs.len(), 2);
        assert!(!record.logs[0].workout_completed);

        let users = store.list().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].total_logs, 2);
        assert_eq!(users[0].last_workout, Some(record.logs[1].date));
    }

    #[tokio::test]
    async fn test_memory_store_missing_user() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.get("nobody").await,
            Err(StoreError::UserNotFound(_))
        ));
    }
}
