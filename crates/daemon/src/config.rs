//! Daemon configuration, read from `SAJILO_*` environment variables

use anyhow::{Context, Result};
use config::{Config, Environment, Map};
use sajilo_api_rpc::server::{RpcServerConfig, DEFAULT_RPC_HOST, DEFAULT_RPC_PORT};
use sajilo_infra_sqlite::{PoolSettings, DEFAULT_MAX_CONNECTIONS};
use serde::Deserialize;
use std::path::PathBuf;

const ENV_PREFIX: &str = "SAJILO";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Store URL; unset means every store call fails as not configured
    #[serde(default)]
    pub database_url: Option<String>,
    /// Identity-provider publishable key. Never logged.
    #[serde(default)]
    pub auth_publishable_key: Option<String>,
    pub db_max_connections: u32,
    pub rpc_host: String,
    pub rpc_port: u16,
    pub rate_limit_burst: u32,
    pub rate_limit_per_second: u32,
    pub log_format: LogFormat,
    /// Daily-rolling log file directory
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl DaemonConfig {
    /// Load from the process environment
    pub fn load() -> Result<Self> {
        Self::from_env(None)
    }

    /// Load from an explicit variable map instead of the process environment
    pub fn from_env(vars: Option<Map<String, String>>) -> Result<Self> {
        Config::builder()
            .set_default("db_max_connections", DEFAULT_MAX_CONNECTIONS as i64)?
            .set_default("rpc_host", DEFAULT_RPC_HOST)?
            .set_default("rpc_port", DEFAULT_RPC_PORT as i64)?
            .set_default("rate_limit_burst", 200_i64)?
            .set_default("rate_limit_per_second", 100_i64)?
            .set_default("log_format", "pretty")?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(vars),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Trimmed store URL, `None` when unset or blank
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn has_auth_key(&self) -> bool {
        self.auth_publishable_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings::with_max_connections(self.db_max_connections)
    }

    pub fn rpc_config(&self) -> RpcServerConfig {
        RpcServerConfig {
            host: self.rpc_host.clone(),
            port: self.rpc_port,
            rate_limit_burst: self.rate_limit_burst,
            rate_limit_per_second: self.rate_limit_per_second,
        }
    }
}
