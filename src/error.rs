//! Error types for the persistence bridge.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Opaque faults raised by a storage backend.
///
/// Propagated to the caller unchanged: no retry, no reinterpretation,
/// one attempt per call.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to open store: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Keychain access failed: {0}")]
    Keychain(String),

    #[error("Blocking task failed: {0}")]
    Join(String),
}

/// Gateway-level operation errors.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Load found no value for the key in the resolved backend.
    ///
    /// The one error condition the gateway synthesizes itself; everything
    /// else is a propagated backend fault.
    #[error("No value stored for key")]
    EmptyResult,

    #[error("Backend fault: {0}")]
    Backend(#[from] StoreError),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
