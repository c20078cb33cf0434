//! Error handling for external tool execution

use thiserror::Error;

use crate::domain::errors::{ConversionFailure, ProbeFailure, ProbeFailureKind};

/// Failure running an external media tool
#[derive(Error, Debug)]
pub enum ToolError {
    /// Binary could not be launched
    #[error("{tool} not found or not executable")]
    NotFound { tool: String },

    /// Tool ran and exited non-zero
    #[error("{tool} failed (code {code:?}): {stderr}")]
    NonZeroExit {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Wall-clock limit exceeded; the child was killed
    #[error("{tool} timed out after {seconds} seconds")]
    Timeout { tool: String, seconds: u64 },

    /// I/O error while spawning or reading output
    #[error("I/O error running {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for tool execution
pub type ToolResult<T> = std::result::Result<T, ToolError>;

impl From<ToolError> for ProbeFailure {
    fn from(err: ToolError) -> Self {
        let kind = match &err {
            ToolError::NotFound { .. } => ProbeFailureKind::NotFound,
            ToolError::NonZeroExit { .. } => ProbeFailureKind::ProcessFailed,
            ToolError::Timeout { .. } => ProbeFailureKind::Timeout,
            ToolError::Io { .. } => ProbeFailureKind::Unexpected,
        };
        ProbeFailure::new(kind, err.to_string())
    }
}

impl From<ToolError> for ConversionFailure {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::NotFound { tool } => ConversionFailure::ToolMissing(tool),
            ToolError::NonZeroExit { code, stderr, .. } => {
                ConversionFailure::Exited { code, stderr }
            }
            ToolError::Timeout { seconds, .. } => ConversionFailure::TimedOut { seconds },
            other @ ToolError::Io { .. } => ConversionFailure::Other(other.to_string()),
        }
    }
}
