// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// One call to the probing collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeRequest {
    pub path: PathBuf,
    /// Stream selector, e.g. `a` or `v:0`. `None` probes every stream.
    pub selector: Option<String>,
    /// Field list, e.g. `stream=index:stream_tags=language`
    pub entries: String,
    pub timeout: Duration,
}

/// Port for container probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Return the structured (JSON) output for the requested streams/format
    async fn probe(&self, request: &ProbeRequest) -> Result<serde_json::Value, ProbeFailure>;
}

/// Codec portion of a conversion job
#[derive(Debug, Clone, PartialEq)]
pub enum CodecSettings {
    /// Stream copy, no re-encode
    VideoCopy,
    /// Re-encode video with a quality-based rate control
    VideoEncode {
        codec: String,
        preset: String,
        crf: u8,
    },
    /// Decode audio to a fixed uncompressed layout
    AudioPcm {
        codec: String,
        sample_rate: u32,
        channels: u16,
    },
}

/// One call to the conversion collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionJob {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Explicit `-map` selector, e.g. `0:v:0` or `0:2`
    pub stream_map: String,
    pub drop_video: bool,
    pub drop_audio: bool,
    pub codec: CodecSettings,
    /// Optional video filter, e.g. `fps=25.000000`
    pub filter: Option<String>,
    /// Hard output duration in seconds (`-t`)
    pub duration_cap: f64,
    /// Shift timestamps so output starts at zero
    pub zero_timestamps: bool,
    pub timeout: Duration,
}

/// Port for stream extraction and conversion
#[async_trait]
pub trait ConvertPort: Send + Sync {
    /// Produce exactly one output file, or fail with diagnostics
    async fn convert(&self, job: &ConversionJob) -> Result<(), ConversionFailure>;
}

/// Port for the timeline host
#[async_trait]
pub trait TimelinePort: Send + Sync {
    async fn create_video_clip(
        &self,
        path: &Path,
        name: &str,
        channel: i64,
        frame_start: i64,
    ) -> Result<ClipHandle, DomainError>;

    async fn create_audio_clip(
        &self,
        path: &Path,
        name: &str,
        channel: i64,
        frame_start: i64,
    ) -> Result<ClipHandle, DomainError>;

    /// Rendered duration in frames, as the host sees it
    async fn get_duration(&self, clip: ClipHandle) -> Result<i64, DomainError>;

    async fn frame_start(&self, clip: ClipHandle) -> Result<i64, DomainError>;

    /// Set the last frame (inclusive) of a clip
    async fn set_end_frame(&self, clip: ClipHandle, frame: i64) -> Result<(), DomainError>;

    async fn channel(&self, clip: ClipHandle) -> Result<i64, DomainError>;

    async fn set_channel(&self, clip: ClipHandle, channel: i64) -> Result<(), DomainError>;

    /// Group clips into one composite unit
    async fn group(&self, clips: &[ClipHandle]) -> Result<GroupHandle, DomainError>;

    /// Returns the name the host actually assigned, which may carry a
    /// numeric suffix when `name` is already in use
    async fn rename_group(&self, group: GroupHandle, name: &str) -> Result<String, DomainError>;

    async fn group_channel(&self, group: GroupHandle) -> Result<i64, DomainError>;

    async fn set_group_channel(&self, group: GroupHandle, channel: i64)
        -> Result<(), DomainError>;

    /// Kind and rendered duration of every member of a composite
    async fn group_member_durations(
        &self,
        group: GroupHandle,
    ) -> Result<Vec<(ArtifactKind, i64)>, DomainError>;

    async fn project_frame_rate(&self) -> Result<f64, DomainError>;

    /// Highest channel covered by any existing entry, 0 when empty
    async fn max_occupied_channel(&self) -> Result<i64, DomainError>;

    /// Look up a composite by name. Hosts without lookup report none.
    async fn find_group(&self, _name: &str) -> Result<Option<GroupHandle>, DomainError> {
        Ok(None)
    }

    /// Persist host state, if the host keeps any
    async fn commit(&self) -> Result<(), DomainError>;
}

/// Port for file system operations
#[async_trait]
pub trait FsPort: Send + Sync {
    async fn file_exists(&self, file_path: &Path) -> Result<bool, DomainError>;

    /// Create and return the scratch directory for one run
    async fn prepare_scratch(&self, run_id: &str) -> Result<PathBuf, DomainError>;
}
