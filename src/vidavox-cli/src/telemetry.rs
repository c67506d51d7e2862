//! Tracing setup for the CLI
//!
//! - Human-readable console output on stderr, so stdout stays parseable
//! - Optional JSON log file with size-based and daily rotation (10MB per file)

use anyhow::Result;
use rolling_file::{RollingConditionBasic, RollingFileAppender};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use vidavox_rs::ClientConfig;

/// Filter used when `RUST_LOG` is not set
fn default_directives(level: &str) -> String {
    format!("warn,vidavox={level},vidavox_rs={level},vidavox_core={level}")
}

/// Initialize tracing.
///
/// Returns a guard that must be kept alive to ensure file logs are flushed;
/// `None` when no log file is configured.
pub fn init_telemetry(config: &ClientConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let (file_layer, guard) = match &config.log_file {
        Some(log_file) => {
            let log_path = Path::new(log_file);
            if let Some(dir) = log_path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }

            // Rotates when the file reaches 10MB or daily, whichever comes first
            let file_appender = RollingFileAppender::new(
                log_path,
                RollingConditionBasic::new()
                    .daily()
                    .max_size(10 * 1024 * 1024),
                9,
            )?;
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    if let Some(log_file) = &config.log_file {
        tracing::debug!("File logging to {} (10MB per file, daily rotation)", log_file);
    }

    Ok(guard)
}
