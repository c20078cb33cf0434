//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::TomlConfigAdapter;
use crate::cli::{Cli, Commands};
use crate::config::ImporterConfig;

/// Effective configuration and where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfiguration {
    pub config: ImporterConfig,
    pub file: Option<PathBuf>,
    pub env_overrides: usize,
    pub cli_overrides: usize,
}

impl LoadedConfiguration {
    /// Report the sources once logging is up
    pub fn log_sources(&self) {
        match &self.file {
            Some(path) => info!("Configuration file: {}", path.display()),
            None => info!("No configuration file loaded, using defaults"),
        }
        if self.env_overrides > 0 {
            info!("Applied {} environment variable overrides", self.env_overrides);
        }
        if self.cli_overrides > 0 {
            info!("Applied {} CLI configuration overrides", self.cli_overrides);
        }
    }
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<LoadedConfiguration> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    initialize_from(cli, &cwd, |key| std::env::var(key).ok())
}

/// Same as [`initialize_configuration_hierarchy`] with an explicit base
/// directory and environment
pub fn initialize_from<F>(cli: &Cli, base: &Path, env: F) -> Result<LoadedConfiguration>
where
    F: Fn(&str) -> Option<String>,
{
    // Steps 1 and 2: defaults, then the config file
    let file = match &cli.config {
        Some(path) => Some(path.clone()),
        None => TomlConfigAdapter::find_default(base),
    };
    let mut config = match &file {
        Some(path) => TomlConfigAdapter::load_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ImporterConfig::default(),
    };

    // Step 3: environment variables
    let env_overrides = TomlConfigAdapter::apply_env(&mut config, env)
        .context("Invalid environment override")?;

    // Step 4: CLI arguments
    let cli_overrides = apply_cli_configuration_overrides(&mut config, cli);

    config.validate().context("Invalid configuration")?;

    Ok(LoadedConfiguration {
        config,
        file,
        env_overrides,
        cli_overrides,
    })
}

/// Apply CLI argument overrides to configuration
fn apply_cli_configuration_overrides(config: &mut ImporterConfig, cli: &Cli) -> usize {
    let mut cli_overrides = 0;

    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
        cli_overrides += 1;
    }

    if let Commands::Import(args) = &cli.command {
        if let Some(dir) = &args.scratch_dir {
            config.scratch.dir = dir.clone();
            cli_overrides += 1;
        }
    }

    cli_overrides
}
