#![deny(missing_docs)]

//! # Logging
//!
//! Installs the process-wide `tracing` subscriber. Events go to stderr so
//! that documents written to stdout stay machine-readable.

use apigw_core::error::{AppError, AppResult};
use apigw_core::Anomaly;
use tracing::{info, warn, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Maps a level name to a `tracing` level, defaulting to `info`.
pub fn parse_level(name: &str) -> Level {
    match name.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Builds the event filter. `RUST_LOG` wins over the requested level.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(parse_level(level).as_str()))
}

/// Installs the subscriber.
///
/// # Arguments
///
/// * `level` - Level name from `--log-level` / `APIGW_LOG`.
pub fn init(level: &str) -> AppResult<()> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(build_filter(level))
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AppError::General(format!("Failed to initialize logging: {}", e)))
}

/// Emits one event per anomaly: warnings at `warn`, the rest at `info`.
pub fn report_anomalies<'a>(anomalies: impl IntoIterator<Item = &'a Anomaly>) {
    for anomaly in anomalies {
        if anomaly.is_warning() {
            warn!("{}", anomaly);
        } else {
            info!("{}", anomaly);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level(" warning "), Level::WARN);
        assert_eq!(parse_level("bogus"), Level::INFO);
    }
}
