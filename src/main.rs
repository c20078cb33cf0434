//! Multi-track video importer
//!
//! Imports a video and every audio track it carries into a timeline project as
//! one synchronized composite, cutting every track to the same frame length.
//!
//! # Usage
//!
//! ```bash
//! mtimport import --input holiday.mkv --project edit.json --fps 25
//! mtimport inspect --input holiday.mkv --fps 25
//! mtimport verify --project edit.json --name Meta_holiday
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use multitrack_importer::app::DefaultAppContainer;
use multitrack_importer::cli::{commands, Cli, Commands};
use multitrack_importer::config_initialization::initialize_configuration_hierarchy;
use multitrack_importer::utils::logging::{init_logging, log_system_info};

/// Main entry point for the importer CLI
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let loaded = initialize_configuration_hierarchy(&cli)?;
    init_logging(&loaded.config.log_level, cli.log_format)?;
    loaded.log_sources();
    log_system_info(&loaded.config);

    let container =
        DefaultAppContainer::new(loaded.config).context("Failed to initialize importer")?;

    // Execute the requested command
    match cli.command {
        Commands::Import(args) => {
            info!("Executing import command");
            commands::import(&container, args).await?;
        }
        Commands::Inspect(args) => {
            info!("Executing inspect command");
            commands::inspect(&container, args).await?;
        }
        Commands::Verify(args) => {
            info!("Executing verify command");
            commands::verify(&container, args).await?;
        }
    }

    Ok(())
}
