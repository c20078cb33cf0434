//! Logging setup and output formatting

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ImporterConfig;
use crate::domain::errors::DomainError;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Pretty,
    /// JSON format for structured logging
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Filter for `level`, unless `RUST_LOG` is set
pub fn build_filter(level: &str) -> Result<EnvFilter, DomainError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level)
        .map_err(|e| DomainError::ConfigError(format!("Invalid log level {}: {}", level, e)))
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean for
/// reports.
pub fn init_logging(level: &str, format: LogFormat) -> Result<(), DomainError> {
    let filter = build_filter(level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Pretty => builder.with_target(false).try_init(),
        LogFormat::Json => builder.json().with_current_span(false).try_init(),
    };
    installed.map_err(|e| DomainError::ConfigError(format!("Failed to initialize logging: {}", e)))
}

/// Log effective settings once at startup
pub fn log_system_info(config: &ImporterConfig) {
    info!("multitrack-importer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Platform: {} {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    info!(
        "ffmpeg: {}, ffprobe: {}",
        config.tools.ffmpeg.display(),
        config.tools.ffprobe.display()
    );
    info!(
        "Scratch: {}, threads: {}",
        config.scratch.dir.display(),
        config.threads
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names_match_cli_values() {
        assert_eq!(LogFormat::Pretty.to_string(), "pretty");
        assert_eq!(LogFormat::Json.to_string(), "json");
        assert_eq!(LogFormat::from_str("json", true), Ok(LogFormat::Json));
    }

    #[test]
    fn test_level_directives_parse() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(build_filter("info").is_ok());
            assert!(build_filter("multitrack_importer=debug").is_ok());
        }
    }
}
