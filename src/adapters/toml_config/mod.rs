// TOML config adapter - Configuration files and environment overrides

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::ImporterConfig;
use crate::domain::errors::*;

/// Files searched when no `--config` is given, first match wins
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["multitrack_importer.toml", "config/importer.toml"];

/// Environment variable to config key mappings
pub const ENV_MAPPINGS: &[(&str, &str)] = &[
    ("MTIMPORT_FFMPEG", "tools.ffmpeg"),
    ("MTIMPORT_FFPROBE", "tools.ffprobe"),
    ("MTIMPORT_SCRATCH_DIR", "scratch.dir"),
    ("MTIMPORT_LOG_LEVEL", "log_level"),
    ("MTIMPORT_THREADS", "threads"),
];

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn parse(toml_content: &str) -> Result<ImporterConfig, DomainError> {
        toml::from_str(toml_content)
            .map_err(|e| DomainError::ConfigError(format!("Failed to parse TOML config: {}", e)))
    }

    /// Load configuration from file
    pub fn load_file(file_path: &Path) -> Result<ImporterConfig, DomainError> {
        if !file_path.exists() {
            return Err(DomainError::ConfigError(format!(
                "Config file does not exist: {}",
                file_path.display()
            )));
        }
        let content = std::fs::read_to_string(file_path)
            .map_err(|e| DomainError::ConfigError(format!("Failed to read config file: {}", e)))?;
        info!("Loading configuration from: {}", file_path.display());
        Self::parse(&content)
    }

    /// First default config file that exists in `base`
    pub fn find_default(base: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_PATHS
            .iter()
            .map(|p| base.join(p))
            .find(|p| p.exists())
    }

    /// Apply one `key = value` override, using the names from `ENV_MAPPINGS`
    pub fn apply_override(
        config: &mut ImporterConfig,
        key: &str,
        value: &str,
    ) -> Result<(), DomainError> {
        match key {
            "tools.ffmpeg" => config.tools.ffmpeg = PathBuf::from(value),
            "tools.ffprobe" => config.tools.ffprobe = PathBuf::from(value),
            "scratch.dir" => config.scratch.dir = PathBuf::from(value),
            "log_level" => config.log_level = value.to_string(),
            "threads" => {
                config.threads = value.parse().map_err(|e| {
                    DomainError::ConfigError(format!("Invalid thread count {}: {}", value, e))
                })?
            }
            other => {
                return Err(DomainError::ConfigError(format!(
                    "Unknown configuration key: {}",
                    other
                )))
            }
        }
        Ok(())
    }

    /// Apply overrides from any environment variables present, returning how many applied
    pub fn apply_env<F>(config: &mut ImporterConfig, lookup: F) -> Result<usize, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;
        for (env_var, key) in ENV_MAPPINGS {
            if let Some(value) = lookup(env_var) {
                info!("Found environment override: {} = {}", env_var, value);
                Self::apply_override(config, key, &value)?;
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Serialize configuration, e.g. to write a starter file
    pub fn serialize(config: &ImporterConfig) -> Result<String, DomainError> {
        toml::to_string_pretty(config)
            .map_err(|e| DomainError::ConfigError(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = TomlConfigAdapter::parse(
            r#"
            threads = 2

            [tools]
            ffmpeg = "/opt/ffmpeg/bin/ffmpeg"

            [timeouts]
            reencode_secs = 600
            "#,
        )
        .unwrap();

        assert_eq!(config.threads, 2);
        assert_eq!(config.tools.ffmpeg, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(config.tools.ffprobe, PathBuf::from("ffprobe"));
        assert_eq!(config.timeouts.reencode_secs, 600);
        assert_eq!(config.timeouts.probe_secs, 30);
        assert_eq!(config.audio.sample_rate, 48000);
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        assert!(matches!(
            TomlConfigAdapter::parse("threads = ["),
            Err(DomainError::ConfigError(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("MTIMPORT_FFPROBE", "/usr/local/bin/ffprobe"),
            ("MTIMPORT_THREADS", "3"),
        ]
        .into_iter()
        .collect();

        let mut config = ImporterConfig::default();
        let applied =
            TomlConfigAdapter::apply_env(&mut config, |k| env.get(k).map(|v| v.to_string()))
                .unwrap();
        assert_eq!(applied, 2);
        assert_eq!(config.tools.ffprobe, PathBuf::from("/usr/local/bin/ffprobe"));
        assert_eq!(config.threads, 3);
    }

    #[test]
    fn test_bad_env_value_rejected() {
        let mut config = ImporterConfig::default();
        let result = TomlConfigAdapter::apply_env(&mut config, |k| {
            (k == "MTIMPORT_THREADS").then(|| "many".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_round_trip_serialization() {
        let config = ImporterConfig::default();
        let text = TomlConfigAdapter::serialize(&config).unwrap();
        assert_eq!(TomlConfigAdapter::parse(&text).unwrap(), config);
    }

    #[test]
    fn test_find_default_in_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(TomlConfigAdapter::find_default(dir.path()).is_none());
        std::fs::write(dir.path().join("multitrack_importer.toml"), "threads = 1").unwrap();
        assert_eq!(
            TomlConfigAdapter::find_default(dir.path()),
            Some(dir.path().join("multitrack_importer.toml"))
        );
    }
}
