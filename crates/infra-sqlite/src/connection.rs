// SQLite connection pool for the marketplace store

use sajilo_core::error::{AppError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Pool sizing and lock-wait tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    /// How long a writer waits on a locked database before failing
    pub busy_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl PoolSettings {
    pub fn with_max_connections(max_connections: u32) -> Self {
        Self {
            max_connections,
            ..Self::default()
        }
    }
}

/// Open the store with default [`PoolSettings`]
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    create_pool_with(database_url, PoolSettings::default()).await
}

/// Open the store in WAL mode with foreign keys enforced.
///
/// The database file is created when missing. An in-memory URL gets a single
/// connection, since every extra connection would see its own empty database.
pub async fn create_pool_with(database_url: &str, settings: PoolSettings) -> Result<SqlitePool> {
    if settings.max_connections == 0 {
        return Err(AppError::Config(
            "Database pool needs at least one connection".to_string(),
        ));
    }

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AppError::Config(format!("Invalid database URL: {}", e)))?
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(settings.busy_timeout)
        .foreign_keys(true)
        .create_if_missing(true);

    let max_connections = if is_in_memory(database_url) {
        1
    } else {
        settings.max_connections
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    tracing::debug!(max_connections, "Store pool ready");

    Ok(pool)
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}
