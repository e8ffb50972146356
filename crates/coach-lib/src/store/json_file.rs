//! JSON document store
//!
//! The whole table lives in memory and is written back to a single JSON
//! file after every mutation. Writes go to a sibling temp file which is then
//! renamed over the original, so a crash never leaves a half-written file.
//! A mutation is only applied in memory once the write has succeeded.

use super::{
    apply_log, apply_profile, lookup, normalize, summarize, UserRepository, UserSummary, UserTable,
};
use crate::error::StoreError;
use crate::models::{UserProfile, UserRecord, WorkoutLog};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// File-backed user repository
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    table: RwLock<UserTable>,
}

impl JsonFileStore {
    /// Open the store, starting empty if the file does not exist yet
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut table = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => UserTable::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => UserTable::new(),
            Err(e) => return Err(e.into()),
        };
        normalize(&mut table);

        info!(
            path = %path.display(),
            users = table.len(),
            "User store opened"
        );

        Ok(Self {
            path,
            table: RwLock::new(table),
        })
    }

    /// Mutate a copy of the table, persist it, then swap it in
    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut UserTable) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut table = self.table.write().await;
        let mut next = table.clone();
        let out = op(&mut next)?;
        write_snapshot(&self.path, &next).await?;
        *table = next;
        Ok(out)
    }
}

/// Atomically replace `path` with the serialized table
pub async fn write_snapshot(path: &Path, table: &UserTable) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(table)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;

    debug!(path = %path.display(), bytes = bytes.len(), "User store persisted");
    Ok(())
}

#[async_trait]
impl UserRepository for JsonFileStore {
    async fn upsert_profile(&self, profile: UserProfile) -> Result<UserProfile, StoreError> {
        self.mutate(|table| Ok(apply_profile(table, profile))).await
    }

    async fn get(&self, user_id: &str) -> Result<UserRecord, StoreError> {
        lookup(&*self.table.read().await, user_id)
    }

    async fn append_log(&self, log: WorkoutLog) -> Result<usize, StoreError> {
        self.mutate(|table| apply_log(table, log)).await
    }

    async fn list(&self) -> Result<Vec<UserSummary>, StoreError> {
        Ok(summarize(&*self.table.read().await))
    }

    fn backend(&self) -> &'static str {
        "json_file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{log, profile};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("users_db.json"))
            .await
            .unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_writes_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users_db.json");

        {
            let store = JsonFileStore::open(&path).await.unwrap();
            store.upsert_profile(profile("u1")).await.unwrap();
            store.append_log(log("u1", 2, true)).await.unwrap();
            store.append_log(log("u1", 1, false)).await.unwrap();
        }

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let record = reopened.get("u1").await.unwrap();
        assert_eq!(record.profile.name, "Jiwoo");
        assert_eq!(record.logs.len(), 2);
        assert!(record.logs[0].date < record.logs[1].date);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_document_layout_is_keyed_by_user() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        let store = JsonFileStore::open(&path).await.unwrap();
        store.upsert_profile(profile("u7")).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["u7"]["profile"]["name"], "Jiwoo");
        assert!(raw["u7"]["logs"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_state_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        let store = JsonFileStore::open(&path).await.unwrap();
        store.upsert_profile(profile("u1")).await.unwrap();
        store.append_log(log("u1", 1, true)).await.unwrap();

        assert!(store.append_log(log("u1", 1, false)).await.is_err());
        assert!(store.append_log(log("ghost", 1, false)).await.is_err());

        let record = store.get("u1").await.unwrap();
        assert_eq!(record.logs.len(), 1);
        assert!(record.logs[0].workout_completed);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, b"{not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path).await,
            Err(StoreError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_write_snapshot_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/db.json");
        write_snapshot(&path, &UserTable::new()).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
