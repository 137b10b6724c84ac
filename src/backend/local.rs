//! Local backend — plain, non-encrypted, device-local storage.
//!
//! A single-table libSQL database. Not synced anywhere; the local analogue
//! of platform preference storage.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, params};
use tracing::info;

use crate::backend::Backend;
use crate::error::StoreError;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

/// libSQL-backed plain key-value store.
///
/// Holds a single connection reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use;
/// single-key atomicity comes from the database itself.
pub struct LocalBackend {
    conn: Connection,
}

impl LocalBackend {
    /// Open (or create) a local database file and initialize the schema.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Open(format!("Failed to create store directory: {e}")))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("Failed to create connection: {e}")))?;

        let backend = Self { conn };
        backend.init_schema().await?;
        info!(path = %path.display(), "Local store opened");
        Ok(backend)
    }

    /// Create an in-memory store (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to create in-memory database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("Failed to create connection: {e}")))?;

        let backend = Self { conn };
        backend.init_schema().await?;
        Ok(backend)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        self.conn
            .execute(SCHEMA, ())
            .await
            .map_err(|e| StoreError::Open(format!("Schema init failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("put: {e}")))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut rows = self
            .conn
            .query("SELECT value FROM kv WHERE key = ?1", params![key])
            .await
            .map_err(|e| StoreError::Query(format!("get: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let value: String = row
                    .get(0)
                    .map_err(|e| StoreError::Query(format!("get row parse: {e}")))?;
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::Query(format!("get: {e}"))),
        }
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        // Idempotent — deleting an absent key is a no-op.
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .await
            .map_err(|e| StoreError::Query(format!("remove: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_round_trip() {
        let store = LocalBackend::new_memory().await.unwrap();
        store.put("alpha", "one").await.unwrap();
        assert_eq!(store.get("alpha").await.unwrap(), Some("one".to_string()));
    }

    #[tokio::test]
    async fn get_missing_key_is_none() {
        let store = LocalBackend::new_memory().await.unwrap();
        assert_eq!(store.get("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_overwrites() {
        let store = LocalBackend::new_memory().await.unwrap();
        store.put("k", "v1").await.unwrap();
        store.put("k", "v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v2".to_string()));
    }

    #[tokio::test]
    async fn empty_string_value_is_found() {
        let store = LocalBackend::new_memory().await.unwrap();
        store.put("empty", "").await.unwrap();
        assert_eq!(store.get("empty").await.unwrap(), Some(String::new()));
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = LocalBackend::new_memory().await.unwrap();
        store.put("k", "v").await.unwrap();
        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.db");
        {
            let store = LocalBackend::new_local(&path).await.unwrap();
            store.put("k", "v").await.unwrap();
        }
        let store = LocalBackend::new_local(&path).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }
}
