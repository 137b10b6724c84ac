//! Secure backend — encrypted at rest via the OS credential store.
//!
//! Uses the system keychain (macOS Keychain, Windows Credential Manager,
//! Linux Secret Service) through the `keyring` crate, one entry per key
//! under a configured service name. Keyring calls are blocking, so every
//! operation runs on `spawn_blocking`.

use async_trait::async_trait;
use keyring::Entry;
use tracing::info;

use crate::backend::Backend;
use crate::error::StoreError;

/// OS-keychain key-value store.
///
/// Cross-device synchronization is a one-time construction setting: the
/// flag is recorded here and honored by the platform store, never toggled
/// per call.
pub struct SecureBackend {
    service: String,
    synchronizable: bool,
}

impl SecureBackend {
    /// Create a secure store rooted at `service` in the OS keychain.
    pub fn new(service: &str, synchronizable: bool) -> Self {
        info!(service, synchronizable, "Secure store configured");
        Self {
            service: service.to_string(),
            synchronizable,
        }
    }

    /// Whether entries synchronize across the user's devices.
    pub fn synchronizable(&self) -> bool {
        self.synchronizable
    }

    fn entry(service: &str, key: &str) -> Result<Entry, StoreError> {
        Entry::new(service, key).map_err(|e| StoreError::Keychain(e.to_string()))
    }
}

#[async_trait]
impl Backend for SecureBackend {
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let service = self.service.clone();
        let key = key.to_string();
        let value = value.to_string();
        tokio::task::spawn_blocking(move || {
            Self::entry(&service, &key)?
                .set_password(&value)
                .map_err(|e| StoreError::Keychain(e.to_string()))
        })
        .await
        .map_err(|e| StoreError::Join(e.to_string()))?
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let service = self.service.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || {
            match Self::entry(&service, &key)?.get_password() {
                Ok(value) => Ok(Some(value)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(StoreError::Keychain(e.to_string())),
            }
        })
        .await
        .map_err(|e| StoreError::Join(e.to_string()))?
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let service = self.service.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || {
            match Self::entry(&service, &key)?.delete_credential() {
                // Idempotent — absent keys are already gone.
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(StoreError::Keychain(e.to_string())),
            }
        })
        .await
        .map_err(|e| StoreError::Join(e.to_string()))?
    }
}
