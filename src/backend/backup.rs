//! Backup backend — device-local cache with best-effort cloud sync.
//!
//! Writes land in a local libSQL cache, then emit a fire-and-forget
//! `SyncRequest` for whatever remote driver is attached. Remote propagation
//! is never awaited and never confirmed; the cache is the source of truth
//! for reads.

use std::path::Path;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

use async_trait::async_trait;

use crate::backend::{Backend, LocalBackend};
use crate::error::StoreError;

/// A request to push local backup state toward the cloud-linked store.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// Key whose mutation triggered the request.
    pub key: String,
    pub requested_at: DateTime<Utc>,
}

/// Cloud-backed key-value store: local cache + sync trigger.
pub struct BackupBackend {
    cache: LocalBackend,
    sync_tx: mpsc::UnboundedSender<SyncRequest>,
    /// Receiver side of the sync channel — consumed once in `sync_requests()`.
    sync_rx: Mutex<Option<mpsc::UnboundedReceiver<SyncRequest>>>,
}

impl BackupBackend {
    /// Open (or create) the local cache file.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        Ok(Self::with_cache(LocalBackend::new_local(path).await?))
    }

    /// Create an in-memory cache (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        Ok(Self::with_cache(LocalBackend::new_memory().await?))
    }

    fn with_cache(cache: LocalBackend) -> Self {
        let (sync_tx, sync_rx) = mpsc::unbounded_channel();
        Self {
            cache,
            sync_tx,
            sync_rx: Mutex::new(Some(sync_rx)),
        }
    }

    /// Take the stream of sync requests.
    ///
    /// Returns `None` after the first call. A sync driver (or a test)
    /// consumes this; if nobody does, requests are dropped silently, which
    /// is the fire-and-forget contract.
    pub async fn sync_requests(&self) -> Option<mpsc::UnboundedReceiver<SyncRequest>> {
        self.sync_rx.lock().await.take()
    }

    fn request_sync(&self, key: &str) {
        let request = SyncRequest {
            key: key.to_string(),
            requested_at: Utc::now(),
        };
        debug!(key, "Backup sync requested");
        // Ignore send errors — no receiver means no sync driver attached.
        let _ = self.sync_tx.send(request);
    }
}

#[async_trait]
impl Backend for BackupBackend {
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.cache.put(key, value).await?;
        self.request_sync(key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.cache.get(key).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.cache.remove(key).await?;
        self.request_sync(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_round_trip() {
        let store = BackupBackend::new_memory().await.unwrap();
        store.put("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn put_emits_one_sync_request() {
        let store = BackupBackend::new_memory().await.unwrap();
        let mut requests = store.sync_requests().await.unwrap();

        store.put("settings", "{}").await.unwrap();

        let req = requests.try_recv().unwrap();
        assert_eq!(req.key, "settings");
        assert!(requests.try_recv().is_err(), "expected exactly one request");
    }

    #[tokio::test]
    async fn remove_emits_sync_request() {
        let store = BackupBackend::new_memory().await.unwrap();
        let mut requests = store.sync_requests().await.unwrap();

        store.put("k", "v").await.unwrap();
        store.remove("k").await.unwrap();

        assert_eq!(requests.try_recv().unwrap().key, "k");
        assert_eq!(requests.try_recv().unwrap().key, "k");
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn get_does_not_emit_sync_request() {
        let store = BackupBackend::new_memory().await.unwrap();
        let mut requests = store.sync_requests().await.unwrap();

        let _ = store.get("k").await.unwrap();
        assert!(requests.try_recv().is_err());
    }

    #[tokio::test]
    async fn sync_receiver_is_taken_once() {
        let store = BackupBackend::new_memory().await.unwrap();
        assert!(store.sync_requests().await.is_some());
        assert!(store.sync_requests().await.is_none());
    }

    #[tokio::test]
    async fn writes_succeed_without_sync_driver() {
        let store = BackupBackend::new_memory().await.unwrap();
        // Nobody ever takes the receiver; puts must still succeed.
        store.put("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }
}
