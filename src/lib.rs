//! Multi-track video importer library
//!
//! Probes a container, reconciles its duration against the project frame
//! rate, extracts a video-only file and one PCM file per audio stream, and
//! assembles them on a timeline host as one named composite.

pub mod adapters;
pub mod app;
pub mod assembler;
pub mod cli;
pub mod config;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;
pub mod probe;
pub mod utils;

// Re-export commonly used types
pub use config::ImporterConfig;
pub use domain::errors::DomainError;
pub use domain::model::{ImportOutcome, ImportReport, ImportSummary, ReconciledTiming};
pub use error::{ToolError, ToolResult};
