//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, ValueEnum};

/// How reports are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Project document (created if missing)
    #[arg(short, long)]
    pub project: PathBuf,

    /// Project frame rate, replacing the one stored in the project
    #[arg(long)]
    pub fps: Option<f64>,

    /// Directory for extracted tracks
    #[arg(long)]
    pub scratch_dir: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Project frame rate to reconcile against
    #[arg(long, default_value_t = 30.0)]
    pub fps: f64,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Project document
    #[arg(short, long)]
    pub project: PathBuf,

    /// Composite name, e.g. Meta_holiday
    #[arg(short, long)]
    pub name: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
