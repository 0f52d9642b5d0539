//! Sajilo Waste - server entry point
//!
//! Wires the SQLite gateway (or the unconfigured store) into the services and
//! serves them over JSON-RPC until Ctrl+C.

mod config;
mod logging;
mod telemetry;

use anyhow::{anyhow, Result};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::DaemonConfig;
use sajilo_api_rpc::RpcServer;
use sajilo_core::port::id_provider::PrefixedIdProvider;
use sajilo_core::port::time_provider::SystemTimeProvider;
use sajilo_core::port::{IdProvider, Repositories, TimeProvider};
use sajilo_infra_sqlite::{create_pool_with, run_migrations, SqliteStore};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration and logging
    let config = DaemonConfig::load()?;
    let _log_guard = logging::init(&config)?;

    info!(version = VERSION, "Sajilo Waste starting");
    info!(
        auth_publishable_key = if config.has_auth_key() { "present" } else { "absent" },
        "Identity provider configuration"
    );

    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let id_provider: Arc<dyn IdProvider> =
        Arc::new(PrefixedIdProvider::new(time_provider.clone()));

    // 2. Store
    let repos = match config.database_url() {
        Some(url) => {
            let settings = config.pool_settings();
            info!(max_connections = settings.max_connections, "Connecting to database");
            let pool = create_pool_with(url, settings)
                .await
                .map_err(|e| anyhow!("DB pool creation failed: {}", e))?;
            run_migrations(&pool)
                .await
                .map_err(|e| anyhow!("Migration failed: {}", e))?;
            SqliteStore::repositories(pool, time_provider.clone())
        }
        None => {
            warn!("SAJILO_DATABASE_URL is not set; every store call will fail with \"Database not configured\"");
            Repositories::unconfigured()
        }
    };

    // 3. JSON-RPC server
    let server = RpcServer::new(config.rpc_config(), &repos, id_provider, time_provider);
    let (addr, handle) = server
        .start()
        .await
        .map_err(|e| anyhow!("RPC server start failed: {}", e))?;

    info!(%addr, "Ready. Press Ctrl+C to shut down");

    // 4. Shutdown
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    handle
        .stop()
        .map_err(|e| anyhow!("RPC server stop failed: {}", e))?;
    handle.stopped().await;
    telemetry::shutdown();

    info!("Shutdown complete");
    Ok(())
}
