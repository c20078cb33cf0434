// Import report - ordered messages plus a terminal outcome

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Severity of a report entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportMessage {
    pub severity: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Why an import ended with video only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoOnlyReason {
    NoAudioTracks,
    AllAudioExtractionsFailed,
}

impl fmt::Display for VideoOnlyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoOnlyReason::NoAudioTracks => write!(f, "No audio tracks found."),
            VideoOnlyReason::AllAudioExtractionsFailed => {
                write!(f, "All audio extractions failed.")
            }
        }
    }
}

/// What landed on the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportSummary {
    Composite {
        name: String,
        channel: i64,
        audio_tracks: usize,
    },
    /// Clips were placed but the host refused to group them
    Ungrouped { channel: i64, audio_tracks: usize },
    VideoOnly { channel: i64, reason: VideoOnlyReason },
}

/// Terminal state of an import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImportOutcome {
    Finished(ImportSummary),
    /// Aborted before the timeline was touched
    Cancelled { reason: String },
    /// Aborted after clips were already placed
    Failed { reason: String },
}

impl ImportOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ImportOutcome::Finished(_))
    }
}

/// Everything an import produced, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub messages: Vec<ImportMessage>,
    pub outcome: ImportOutcome,
}

impl ImportReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.messages
            .iter()
            .filter(|m| m.severity == severity)
            .count()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ImportMessage> {
        self.messages
            .iter()
            .filter(|m| m.severity == Severity::Warning)
    }

    /// True if any message contains `needle`
    pub fn mentions(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.message.contains(needle))
    }
}

/// Collects messages while a pipeline runs. Every entry is mirrored to tracing.
#[derive(Debug, Default, Clone)]
pub struct ReportLog {
    messages: Vec<ImportMessage>,
}

impl ReportLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Info => info!(target: "import", "{}", message),
            Severity::Warning => warn!(target: "import", "{}", message),
            Severity::Error => error!(target: "import", "{}", message),
        }
        self.messages.push(ImportMessage {
            severity,
            message,
            timestamp: Utc::now(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Severity::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message);
    }

    pub fn messages(&self) -> &[ImportMessage] {
        &self.messages
    }

    pub fn finish(self, outcome: ImportOutcome) -> ImportReport {
        ImportReport {
            messages: self.messages,
            outcome,
        }
    }
}
