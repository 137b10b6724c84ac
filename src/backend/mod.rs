//! Storage backend abstraction and the three platform variants.

pub mod backup;
pub mod local;
pub mod memory;
pub mod secure;

pub use backup::{BackupBackend, SyncRequest};
pub use local::LocalBackend;
pub use memory::MemoryBackend;
pub use secure::SecureBackend;

use async_trait::async_trait;

use crate::error::StoreError;

/// A key-value storage backend.
///
/// Each backend owns a disjoint namespace: the same key may exist in
/// several backends with different values. Values are opaque strings;
/// the gateway never transforms them.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Store a value under a key, overwriting any previous value.
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Fetch the value for a key.
    ///
    /// `Ok(None)` is the explicit not-found signal, distinct from a
    /// successfully stored empty string.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Remove a key. Succeeds whether or not the key existed.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
