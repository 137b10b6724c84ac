//! Persistence gateway — stateless dispatch over the three backends.

use std::sync::Arc;

use tracing::debug;

use crate::backend::Backend;
use crate::error::PersistError;

/// The backend a request resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Plain, device-local, never synced.
    Local,
    /// Encrypted at rest, optionally synced across the user's devices.
    Secure,
    /// Local cache with best-effort cloud sync.
    Backup,
}

impl BackendKind {
    /// Resolve the selector flags to a backend.
    ///
    /// The mapping is total: secure is checked first, then backup, else
    /// local. Callers are expected to set at most one flag, but both true
    /// resolves to `Secure`.
    pub fn from_flags(is_secure: bool, is_backup: bool) -> Self {
        if is_secure {
            Self::Secure
        } else if is_backup {
            Self::Backup
        } else {
            Self::Local
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Secure => "secure",
            Self::Backup => "backup",
        }
    }
}

/// Routes each operation to exactly one backend.
///
/// Owns nothing but the three backend handles, injected at construction
/// for the life of the process. Every call is independent: no locking, no
/// retries, no ordering beyond last-write-wins within one backend.
pub struct PersistenceGateway {
    local: Arc<dyn Backend>,
    secure: Arc<dyn Backend>,
    backup: Arc<dyn Backend>,
}

impl PersistenceGateway {
    pub fn new(
        local: Arc<dyn Backend>,
        secure: Arc<dyn Backend>,
        backup: Arc<dyn Backend>,
    ) -> Self {
        Self {
            local,
            secure,
            backup,
        }
    }

    fn resolve(&self, kind: BackendKind) -> &dyn Backend {
        match kind {
            BackendKind::Local => self.local.as_ref(),
            BackendKind::Secure => self.secure.as_ref(),
            BackendKind::Backup => self.backup.as_ref(),
        }
    }

    /// Store a value. Overwrites silently; the backup backend additionally
    /// issues its sync request as a side effect of the put.
    pub async fn save(
        &self,
        key: &str,
        value: &str,
        is_secure: bool,
        is_backup: bool,
    ) -> Result<(), PersistError> {
        let kind = BackendKind::from_flags(is_secure, is_backup);
        debug!(key, backend = kind.as_str(), "save");
        self.resolve(kind).put(key, value).await?;
        Ok(())
    }

    /// Fetch a value. An absent key is `PersistError::EmptyResult`, never a
    /// success with a sentinel.
    pub async fn load(
        &self,
        key: &str,
        is_secure: bool,
        is_backup: bool,
    ) -> Result<String, PersistError> {
        let kind = BackendKind::from_flags(is_secure, is_backup);
        debug!(key, backend = kind.as_str(), "load");
        self.resolve(kind)
            .get(key)
            .await?
            .ok_or(PersistError::EmptyResult)
    }

    /// Remove a key. Idempotent: succeeds whether or not the key existed.
    pub async fn delete(
        &self,
        key: &str,
        is_secure: bool,
        is_backup: bool,
    ) -> Result<(), PersistError> {
        let kind = BackendKind::from_flags(is_secure, is_backup);
        debug!(key, backend = kind.as_str(), "delete");
        self.resolve(kind).remove(key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn gateway() -> PersistenceGateway {
        PersistenceGateway::new(
            Arc::new(MemoryBackend::new()),
            Arc::new(MemoryBackend::new()),
            Arc::new(MemoryBackend::new()),
        )
    }

    #[test]
    fn selector_precedence_is_secure_then_backup_then_local() {
        assert_eq!(BackendKind::from_flags(false, false), BackendKind::Local);
        assert_eq!(BackendKind::from_flags(true, false), BackendKind::Secure);
        assert_eq!(BackendKind::from_flags(false, true), BackendKind::Backup);
        // Both flags set: secure wins.
        assert_eq!(BackendKind::from_flags(true, true), BackendKind::Secure);
    }

    #[tokio::test]
    async fn round_trip_per_backend() {
        let gw = gateway();
        for (is_secure, is_backup) in [(false, false), (true, false), (false, true)] {
            gw.save("k", "v", is_secure, is_backup).await.unwrap();
            assert_eq!(gw.load("k", is_secure, is_backup).await.unwrap(), "v");
        }
    }

    #[tokio::test]
    async fn load_missing_key_is_empty_result() {
        let gw = gateway();
        let err = gw.load("missing", false, false).await.unwrap_err();
        assert!(matches!(err, PersistError::EmptyResult));
    }

    #[tokio::test]
    async fn last_write_wins() {
        let gw = gateway();
        gw.save("k", "v1", false, false).await.unwrap();
        gw.save("k", "v2", false, false).await.unwrap();
        assert_eq!(gw.load("k", false, false).await.unwrap(), "v2");
    }

    #[tokio::test]
    async fn delete_never_fails() {
        let gw = gateway();
        gw.delete("never-existed", false, false).await.unwrap();
        gw.save("k", "v", false, false).await.unwrap();
        gw.delete("k", false, false).await.unwrap();
        gw.delete("k", false, false).await.unwrap();
    }

    #[tokio::test]
    async fn backend_namespaces_are_disjoint() {
        let gw = gateway();
        gw.save("k", "local-value", false, false).await.unwrap();

        let secure = gw.load("k", true, false).await.unwrap_err();
        assert!(matches!(secure, PersistError::EmptyResult));
        let backup = gw.load("k", false, true).await.unwrap_err();
        assert!(matches!(backup, PersistError::EmptyResult));
    }

    #[tokio::test]
    async fn both_flags_true_hits_secure_store() {
        let gw = gateway();
        gw.save("k", "v", true, true).await.unwrap();
        assert_eq!(gw.load("k", true, false).await.unwrap(), "v");
        assert!(gw.load("k", false, true).await.is_err());
    }

    #[tokio::test]
    async fn token_lifecycle() {
        let gw = gateway();
        gw.save("token", "abc123", true, false).await.unwrap();
        assert_eq!(gw.load("token", true, false).await.unwrap(), "abc123");
        gw.delete("token", true, false).await.unwrap();
        let err = gw.load("token", true, false).await.unwrap_err();
        assert!(matches!(err, PersistError::EmptyResult));
    }
}
