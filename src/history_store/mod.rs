//! HistoryStore - Bounded, Persisted Capture Ledger
//!
//! ## Responsibilities
//!
//! - Keep past results in descending timestamp order, newest first
//! - Bound the list at a fixed capacity, discarding the oldest tail
//! - Flush every mutation to the persistence port, best-effort
//!
//! The in-memory list is the source of truth for the session. A failed
//! durable write is logged and swallowed; it never fails the mutation.
//! Single-writer assumption: concurrent external mutation of the same
//! persisted key is undefined.

use crate::models::{AnalysisResult, HistoryEntry};
use crate::persistence::KeyValueStore;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Maximum number of retained entries
pub const DEFAULT_CAPACITY: usize = 50;

/// HistoryStore configuration
#[derive(Debug, Clone)]
pub struct HistoryStoreConfig {
    /// Maximum entries retained; oldest are discarded beyond this
    pub capacity: usize,
    /// Persistence key the list is stored under
    pub storage_key: String,
}

impl Default for HistoryStoreConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            storage_key: "patrol_history".to_string(),
        }
    }
}

/// A past entry re-selected for display, as if it were a fresh result
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayedResult {
    pub result: AnalysisResult,
    pub image_data: String,
}

/// HistoryStore instance
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    config: HistoryStoreConfig,
    entries: RwLock<Vec<HistoryEntry>>,
}

impl HistoryStore {
    /// Open the store, loading persisted history once at startup.
    ///
    /// An unreadable or corrupt persisted list starts an empty history;
    /// this never errors and never blocks startup on anything but the
    /// single read.
    pub async fn open(store: Arc<dyn KeyValueStore>, config: HistoryStoreConfig) -> Self {
        let entries = match store.get(&config.storage_key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
                Ok(list) => {
                    tracing::debug!(count = list.len(), "Loaded persisted history");
                    list
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to parse persisted history, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted history, starting empty");
                Vec::new()
            }
        };

        Self {
            store,
            config,
            entries: RwLock::new(entries),
        }
    }

    /// Open with the default capacity and storage key
    pub async fn open_with_defaults(store: Arc<dyn KeyValueStore>) -> Self {
        Self::open(store, HistoryStoreConfig::default()).await
    }

    /// Prepend an entry, truncate to capacity, flush, return the new list
    pub async fn append(&self, entry: HistoryEntry) -> Vec<HistoryEntry> {
        let snapshot = {
            let mut entries = self.entries.write().await;
            entries.insert(0, entry);
            entries.truncate(self.config.capacity);
            entries.clone()
        };
        self.flush(&snapshot).await;
        snapshot
    }

    /// Remove the entry with a matching id; no-op if absent, idempotent
    pub async fn remove_by_id(&self, id: &str) -> Vec<HistoryEntry> {
        let snapshot = {
            let mut entries = self.entries.write().await;
            entries.retain(|e| e.id != id);
            entries.clone()
        };
        self.flush(&snapshot).await;
        snapshot
    }

    /// Empty the list and remove the persisted record entirely,
    /// freeing the storage key rather than writing an empty list
    pub async fn clear(&self) -> Vec<HistoryEntry> {
        {
            let mut entries = self.entries.write().await;
            entries.clear();
        }
        if let Err(e) = self.store.remove(&self.config.storage_key).await {
            tracing::warn!(
                error = %e,
                key = %self.config.storage_key,
                "Failed to remove persisted history"
            );
        }
        Vec::new()
    }

    /// Pure read: pair a past entry's analysis with its stored image so
    /// the caller can redisplay it without mutation or network access
    pub fn select_for_replay(entry: &HistoryEntry) -> ReplayedResult {
        ReplayedResult {
            result: entry.analysis.clone(),
            image_data: entry.image_data.clone(),
        }
    }

    /// Read-only copy of the current list
    pub async fn snapshot(&self) -> Vec<HistoryEntry> {
        let entries = self.entries.read().await;
        entries.clone()
    }

    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Best-effort flush; in-memory state stays authoritative on failure
    async fn flush(&self, entries: &[HistoryEntry]) {
        let payload = match serde_json::to_string(entries) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize history, skipping persist");
                return;
            }
        };

        if let Err(e) = self.store.set(&self.config.storage_key, &payload).await {
            tracing::warn!(
                error = %e,
                key = %self.config.storage_key,
                "Failed to persist history, keeping in-memory state"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisResult, Condition, Location};
    use crate::persistence::MemoryStore;

    fn entry(id: &str, timestamp: i64) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            timestamp,
            image_data: format!("data:image/jpeg;base64,{}", id),
            analysis: AnalysisResult {
                condition: Condition::Normal,
                confidence: 75.0,
                description: "desc".to_string(),
                recommendation: "rec".to_string(),
                location: None,
            },
        }
    }

    #[tokio::test]
    async fn test_append_prepends_and_orders_descending() {
        let history = HistoryStore::open_with_defaults(Arc::new(MemoryStore::new())).await;

        for i in 0..5 {
            history.append(entry(&format!("e{}", i), 1000 + i)).await;
        }

        let list = history.snapshot().await;
        assert_eq!(list[0].id, "e4");
        assert!(list.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
    }

    #[tokio::test]
    async fn test_append_never_exceeds_capacity() {
        let history = HistoryStore::open_with_defaults(Arc::new(MemoryStore::new())).await;

        for i in 0..(DEFAULT_CAPACITY as i64 + 1) {
            history.append(entry(&format!("e{}", i), i)).await;
        }

        let list = history.snapshot().await;
        assert_eq!(list.len(), DEFAULT_CAPACITY);
        // The oldest entry fell off the tail
        assert!(list.iter().all(|e| e.id != "e0"));
        assert_eq!(list[0].id, format!("e{}", DEFAULT_CAPACITY));
    }

    #[tokio::test]
    async fn test_remove_by_id_is_idempotent() {
        let history = HistoryStore::open_with_defaults(Arc::new(MemoryStore::new())).await;
        history.append(entry("keep", 1)).await;
        history.append(entry("drop", 2)).await;

        let list = history.remove_by_id("drop").await;
        assert_eq!(list.len(), 1);

        // Second removal of the same id is a no-op, not an error
        let list = history.remove_by_id("drop").await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "keep");
    }

    #[tokio::test]
    async fn test_clear_then_reload_is_empty() {
        let store = Arc::new(MemoryStore::new());
        let history = HistoryStore::open_with_defaults(store.clone()).await;
        history.append(entry("e1", 1)).await;
        history.clear().await;

        // The storage key is gone, not just emptied
        assert_eq!(store.get("patrol_history").await.unwrap(), None);

        // Simulated restart
        let reloaded = HistoryStore::open_with_defaults(store).await;
        assert!(reloaded.is_empty().await);
    }

    #[tokio::test]
    async fn test_append_roundtrips_through_persistence() {
        let store = Arc::new(MemoryStore::new());
        let history = HistoryStore::open_with_defaults(store.clone()).await;

        let mut e = entry("rt", 42);
        e.analysis.condition = Condition::Flashover;
        e.analysis.location = Some(Location {
            latitude: 13.7563,
            longitude: 100.5018,
        });
        history.append(e.clone()).await;

        let reloaded = HistoryStore::open_with_defaults(store).await;
        let list = reloaded.snapshot().await;
        assert_eq!(list[0], e);
    }

    #[tokio::test]
    async fn test_corrupt_persisted_state_starts_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set("patrol_history", "not json at all").await.unwrap();

        let history = HistoryStore::open_with_defaults(store).await;
        assert!(history.is_empty().await);
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_in_memory_state() {
        // Quota of zero: every durable write fails
        let history = HistoryStore::open_with_defaults(Arc::new(MemoryStore::with_quota(0))).await;

        let list = history.append(entry("e1", 1)).await;
        assert_eq!(list.len(), 1);
        assert_eq!(history.len().await, 1);
    }

    #[tokio::test]
    async fn test_select_for_replay_is_pure() {
        let e = entry("replay", 7);
        let replay = HistoryStore::select_for_replay(&e);
        assert_eq!(replay.result, e.analysis);
        assert_eq!(replay.image_data, e.image_data);
    }
}
