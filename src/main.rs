use std::sync::Arc;

use persist_bridge::backend::{Backend, BackupBackend, LocalBackend, SecureBackend};
use persist_bridge::bridge::bridge_routes;
use persist_bridge::config::GatewayConfig;
use persist_bridge::gateway::PersistenceGateway;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = GatewayConfig::from_env()?;

    eprintln!("persist-bridge v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Data dir: {}", config.data_dir.display());
    eprintln!("   Keyring service: {}", config.keyring_service);
    eprintln!(
        "   Bridge WS: ws://0.0.0.0:{}/ws/persistence\n",
        config.port
    );

    // ── Backends ─────────────────────────────────────────────────────────
    // Constructed once, shared for the life of the process.
    let local: Arc<dyn Backend> =
        Arc::new(LocalBackend::new_local(&config.data_dir.join("local.db")).await?);

    // Cross-device sync is enabled here, at construction, never per call.
    let secure: Arc<dyn Backend> = Arc::new(SecureBackend::new(
        &config.keyring_service,
        config.secure_sync,
    ));

    let backup = Arc::new(BackupBackend::new_local(&config.data_dir.join("backup.db")).await?);

    // Drain backup sync requests. The cloud-linked remote store is the
    // platform's concern; the trigger is fire-and-forget by contract, so
    // this driver only records that a push was requested.
    if let Some(mut sync_rx) = backup.sync_requests().await {
        tokio::spawn(async move {
            while let Some(request) = sync_rx.recv().await {
                debug!(
                    key = %request.key,
                    requested_at = %request.requested_at,
                    "Backup sync requested"
                );
            }
        });
    }

    let backup: Arc<dyn Backend> = backup;

    // ── Gateway + bridge ─────────────────────────────────────────────────
    let gateway = Arc::new(PersistenceGateway::new(local, secure, backup));
    let app = bridge_routes(gateway);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(port = config.port, "Bridge listening");
    axum::serve(listener, app).await?;

    Ok(())
}
