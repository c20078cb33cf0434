// Domain errors - Error types for the domain layer

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which probe call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeStage {
    /// Audio stream enumeration
    AudioStreams,
    /// Primary video stream duration/framerate/frame count
    VideoProperties,
    /// Container duration lookup for an extracted artifact
    ArtifactDuration,
}

impl fmt::Display for ProbeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStage::AudioStreams => write!(f, "audio stream scan"),
            ProbeStage::VideoProperties => write!(f, "video property analysis"),
            ProbeStage::ArtifactDuration => write!(f, "artifact duration lookup"),
        }
    }
}

/// Failure categories reported by the probing collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeFailureKind {
    NotFound,
    ProcessFailed,
    EmptyOutput,
    ParseError,
    Timeout,
    Unexpected,
}

impl fmt::Display for ProbeFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ProbeFailureKind::NotFound => "probe_not_found",
            ProbeFailureKind::ProcessFailed => "probe_process_failed",
            ProbeFailureKind::EmptyOutput => "probe_empty_output",
            ProbeFailureKind::ParseError => "probe_parse_error",
            ProbeFailureKind::Timeout => "probe_timeout",
            ProbeFailureKind::Unexpected => "probe_unexpected",
        };
        write!(f, "{}", text)
    }
}

/// A tagged failure returned by a `ProbePort`
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeFailure {
    pub kind: ProbeFailureKind,
    pub detail: String,
}

impl ProbeFailure {
    pub fn new(kind: ProbeFailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Attach the stage the failure happened in
    pub fn at_stage(self, stage: ProbeStage) -> DomainError {
        match self.kind {
            ProbeFailureKind::NotFound => DomainError::ToolNotFound(self.detail),
            kind => DomainError::ProbeFailed {
                stage,
                kind,
                detail: self.detail,
            },
        }
    }
}

/// A failure returned by a `ConvertPort`
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionFailure {
    /// Conversion binary could not be launched
    ToolMissing(String),
    /// Conversion ran and exited non-zero
    Exited { code: Option<i32>, stderr: String },
    /// Wall-clock limit hit; the child was killed
    TimedOut { seconds: u64 },
    /// Anything else (spawn I/O errors and the like)
    Other(String),
}

impl fmt::Display for ConversionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionFailure::ToolMissing(tool) => write!(f, "{} not found", tool),
            ConversionFailure::Exited { code, stderr } => match code {
                Some(code) => write!(f, "exited with code {}: {}", code, stderr),
                None => write!(f, "terminated by signal: {}", stderr),
            },
            ConversionFailure::TimedOut { seconds } => {
                write!(f, "timed out after {} seconds", seconds)
            }
            ConversionFailure::Other(msg) => write!(f, "{}", msg),
        }
    }
}

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    BadArgs(String),
    /// Input file not found
    FileNotFound(String),
    /// External media tool is missing
    ToolNotFound(String),
    /// A probe call failed
    ProbeFailed {
        stage: ProbeStage,
        kind: ProbeFailureKind,
        detail: String,
    },
    /// Neither stream nor container duration was available
    DurationUndeterminable,
    /// Every video extraction strategy failed
    VideoExtractionFailed(String),
    /// One audio stream could not be extracted
    AudioExtractionFailed { stream: String, detail: String },
    /// Host rejected clip creation or mutation
    PlacementFailed(String),
    /// Host could not group the placed clips
    GroupingFailed(String),
    /// Filesystem failure
    FsFail(String),
    /// Invalid or unreadable configuration
    ConfigError(String),
}

impl DomainError {
    /// True for errors that abort an import
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            DomainError::AudioExtractionFailed { .. } | DomainError::GroupingFailed(_)
        )
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
            DomainError::FileNotFound(path) => write!(f, "Video file not found: {}", path),
            DomainError::ToolNotFound(msg) => write!(f, "Tool not found: {}", msg),
            DomainError::ProbeFailed {
                stage,
                kind,
                detail,
            } => write!(f, "Probe failed during {} ({}): {}", stage, kind, detail),
            DomainError::DurationUndeterminable => {
                write!(f, "Could not determine video duration from probe output")
            }
            DomainError::VideoExtractionFailed(msg) => {
                write!(f, "Failed to extract video-only stream: {}", msg)
            }
            DomainError::AudioExtractionFailed { stream, detail } => {
                write!(f, "Failed to extract audio track {}: {}", stream, detail)
            }
            DomainError::PlacementFailed(msg) => write!(f, "Clip placement failed: {}", msg),
            DomainError::GroupingFailed(msg) => write!(f, "Grouping failed: {}", msg),
            DomainError::FsFail(msg) => write!(f, "Filesystem error: {}", msg),
            DomainError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
