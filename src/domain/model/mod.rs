// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

mod report;

pub use report::*;

/// Facts about the primary video stream, as reported by the prober
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbedVideoInfo {
    /// Stream-level duration
    pub duration_seconds: Option<f64>,
    /// Container-level duration, used when the stream carries none
    pub format_duration_seconds: Option<f64>,
    /// Frame rate derived from `r_frame_rate`
    pub frame_rate: Option<f64>,
    /// `nb_frames`, when the container records it
    pub frame_count: Option<u64>,
}

impl ProbedVideoInfo {
    /// Stream duration, falling back to the container duration. A
    /// non-finite or non-positive value counts as absent.
    pub fn best_duration(&self) -> Option<f64> {
        let usable = |d: &f64| d.is_finite() && *d > 0.0;
        self.duration_seconds
            .filter(usable)
            .or(self.format_duration_seconds.filter(usable))
    }
}

/// One audio stream inside the container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbedAudioStream {
    /// Container-relative index (what `-map 0:<index>` expects)
    pub stream_index: String,
    pub language_tag: Option<String>,
}

impl ProbedAudioStream {
    pub fn new(stream_index: impl Into<String>, language_tag: Option<String>) -> Self {
        Self {
            stream_index: stream_index.into(),
            language_tag,
        }
    }

    /// Language tag, or `Track_<index>` when the stream is untagged
    pub fn label(&self) -> String {
        match &self.language_tag {
            Some(lang) if !lang.trim().is_empty() => lang.clone(),
            _ => format!("Track_{}", self.stream_index),
        }
    }
}

/// Metadata frame count disagreeing with duration x rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameCountMismatch {
    pub metadata: u64,
    pub calculated: u64,
}

/// Authoritative timing for one import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledTiming {
    pub source_duration_seconds: f64,
    /// Length every artifact must hit, in project frames
    pub target_frame_count: i64,
    pub needs_framerate_conversion: bool,
    pub project_fps: f64,
    pub source_frame_rate: Option<f64>,
    pub frame_count_warning: Option<FrameCountMismatch>,
}

impl ReconciledTiming {
    /// Value passed to `-t` on every extraction
    pub fn duration_cap(&self) -> f64 {
        self.source_duration_seconds
    }
}

/// Kind of extracted artifact / placed clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Video,
    Audio,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Video => write!(f, "video"),
            ArtifactKind::Audio => write!(f, "audio"),
        }
    }
}

/// A file written to scratch storage by the extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedArtifact {
    pub kind: ArtifactKind,
    pub file_path: PathBuf,
    pub source_stream_index: Option<String>,
    pub label: Option<String>,
}

impl ExtractedArtifact {
    pub fn video(file_path: impl Into<PathBuf>) -> Self {
        Self {
            kind: ArtifactKind::Video,
            file_path: file_path.into(),
            source_stream_index: None,
            label: None,
        }
    }

    pub fn audio(file_path: impl Into<PathBuf>, stream: &ProbedAudioStream) -> Self {
        Self {
            kind: ArtifactKind::Audio,
            file_path: file_path.into(),
            source_stream_index: Some(stream.stream_index.clone()),
            label: Some(stream.label()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

/// Host-side clip identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClipHandle(pub u64);

/// Host-side composite identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupHandle(pub u64);

/// A clip the assembler placed on the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedClip {
    pub handle: ClipHandle,
    pub kind: ArtifactKind,
    pub artifact: ExtractedArtifact,
    pub channel: i64,
    pub frame_start: i64,
    /// As reported by the host after creation, not as requested
    pub frame_final_duration: i64,
}

/// The grouped result of one import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeUnit {
    pub handle: GroupHandle,
    pub name: String,
    pub channel: i64,
    pub members: Vec<PlacedClip>,
}

impl CompositeUnit {
    pub fn audio_member_count(&self) -> usize {
        self.members
            .iter()
            .filter(|m| m.kind == ArtifactKind::Audio)
            .count()
    }
}

/// File name without its final extension, used to name clips and artifacts
pub fn source_base_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string())
}
