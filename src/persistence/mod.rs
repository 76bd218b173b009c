//! Key-Value Persistence Port
//!
//! ## Responsibilities
//!
//! - Abstract durable key-value capability (get / set / remove)
//! - File-backed implementation for device-local storage
//! - In-memory implementation with an optional quota for ephemeral use
//!
//! Capacity is finite: a `set` can fail (quota exceeded), and callers
//! that treat durability as best-effort must absorb that failure.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::RwLock;

/// Durable key-value capability scoped to the device profile
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`; may fail when capacity is exceeded
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key` entirely, freeing its storage (no-op if absent)
    async fn remove(&self, key: &str) -> Result<()>;
}

/// File-backed store: one `<key>.json` file per key under a base directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir` (created lazily on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(key);
        fs::write(&path, value).await?;
        tracing::trace!(key = %key, bytes = value.len(), "Persisted key");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store with an optional byte quota
///
/// The quota models a finite storage profile: a `set` that would push
/// total stored bytes past the limit fails, leaving the previous value
/// in place.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota_bytes: None,
        }
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        if let Some(quota) = self.quota_bytes {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if used + key.len() + value.len() > quota {
                return Err(Error::Storage(format!(
                    "quota exceeded writing key '{}'",
                    key
                )));
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("patrol-core-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let store = FileStore::new(temp_dir());
        assert_eq!(store.get("history").await.unwrap(), None);

        store.set("history", "[1,2,3]").await.unwrap();
        assert_eq!(
            store.get("history").await.unwrap(),
            Some("[1,2,3]".to_string())
        );

        store.remove("history").await.unwrap();
        assert_eq!(store.get("history").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_remove_missing_is_noop() {
        let store = FileStore::new(temp_dir());
        store.remove("never_written").await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store_quota() {
        let store = MemoryStore::with_quota(16);
        store.set("k", "small").await.unwrap();

        let err = store
            .set("k", &"x".repeat(64))
            .await
            .expect_err("quota should reject oversized write");
        assert!(matches!(err, Error::Storage(_)));

        // Previous value untouched after the failed write
        assert_eq!(store.get("k").await.unwrap(), Some("small".to_string()));
    }
}
