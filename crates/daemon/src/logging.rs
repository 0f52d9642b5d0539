//! Subscriber setup: env filter, console format, optional file and OTLP layers

use crate::config::{DaemonConfig, LogFormat};
use crate::telemetry;
use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "sajilo=info";
const LOG_FILE_PREFIX: &str = "sajilo-waste.log";

/// Keeps the file writer flushing; drop it last
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

pub fn init(config: &DaemonConfig) -> Result<LogGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("Invalid log filter")?;

    let (json, pretty) = match config.log_format {
        LogFormat::Json => (Some(fmt::layer().json()), None),
        LogFormat::Pretty => (None, Some(fmt::layer().pretty())),
    };

    let (file, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let (otel, otel_note) = telemetry::layer()?;

    // The boxed OTLP layer is typed for a bare Registry, so it goes first
    tracing_subscriber::registry()
        .with(otel)
        .with(env_filter)
        .with(json)
        .with(pretty)
        .with(file)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if let Some(note) = otel_note {
        tracing::info!("{}", note);
    }
    if let Some(dir) = &config.log_dir {
        tracing::info!(log_dir = %dir.display(), "Writing daily log files");
    }

    Ok(LogGuard { _file: guard })
}
