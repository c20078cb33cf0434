//! CLI module for the multi-track importer
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::LogFormat;

pub mod args;
pub mod commands;

pub use args::{ImportArgs, InspectArgs, OutputFormat, VerifyArgs};

/// Multi-track video importer
///
/// Imports a video together with every audio track it carries into a
/// timeline project as one synchronized composite.
#[derive(Parser, Debug)]
#[command(name = "mtimport")]
#[command(about = "Import a video and all of its audio tracks as one composite")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: multitrack_importer.toml or config/importer.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a video and all of its audio tracks into a project
    Import(ImportArgs),
    /// Probe a video and show how it would be imported
    Inspect(InspectArgs),
    /// Re-check durations inside a composite of a saved project
    Verify(VerifyArgs),
}
