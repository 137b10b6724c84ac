//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Directory holding the file-backed stores (local + backup cache).
    pub data_dir: PathBuf,
    /// Service name the secure backend registers under in the OS keychain.
    pub keyring_service: String,
    /// Whether secure entries synchronize across the user's devices.
    /// Applied once at backend construction, never per call.
    pub secure_sync: bool,
    /// Port the WebSocket bridge listens on.
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            keyring_service: "persist-bridge".to_string(),
            secure_sync: true,
            port: 8090,
        }
    }
}

impl GatewayConfig {
    /// Build a config from `PERSIST_BRIDGE_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match std::env::var("PERSIST_BRIDGE_PORT") {
            Ok(raw) => parse_port("PERSIST_BRIDGE_PORT", &raw)?,
            Err(_) => defaults.port,
        };

        Ok(Self {
            data_dir: std::env::var("PERSIST_BRIDGE_DATA_DIR")
                .map(Into::into)
                .unwrap_or(defaults.data_dir),
            keyring_service: std::env::var("PERSIST_BRIDGE_KEYRING_SERVICE")
                .unwrap_or(defaults.keyring_service),
            secure_sync: std::env::var("PERSIST_BRIDGE_SECURE_SYNC")
                .map(|v| parse_bool(&v))
                .unwrap_or(defaults.secure_sync),
            port,
        })
    }
}

fn parse_bool(raw: &str) -> bool {
    raw == "1" || raw.eq_ignore_ascii_case("true")
}

fn parse_port(key: &str, raw: &str) -> Result<u16, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("expected a port number, got {raw:?}"),
    })
}
