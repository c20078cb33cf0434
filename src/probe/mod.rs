//! Container probing: stream list and video timing facts

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::domain::errors::{DomainError, ProbeStage};
use crate::domain::model::{ArtifactKind, ProbedAudioStream, ProbedVideoInfo};
use crate::ports::{ProbePort, ProbeRequest};

pub mod parser;

pub use parser::parse_frame_rate;

/// Field list for the audio scan
pub const AUDIO_ENTRIES: &str = "stream=index:stream_tags=language";

/// Field list for the video analysis, with container duration as fallback
pub const VIDEO_ENTRIES: &str = "stream=duration,r_frame_rate,nb_frames:format=duration";

const DURATION_ENTRIES: &str = "stream=duration:format=duration";

/// Drives the probing collaborator and interprets what it returns
pub struct MediaProber {
    port: Arc<dyn ProbePort>,
    timeout: Duration,
}

impl MediaProber {
    pub fn new(port: Arc<dyn ProbePort>, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    fn request(&self, path: &Path, selector: &str, entries: &str) -> ProbeRequest {
        ProbeRequest {
            path: path.to_path_buf(),
            selector: Some(selector.to_string()),
            entries: entries.to_string(),
            timeout: self.timeout,
        }
    }

    /// Scan and analyze a container, audio first
    pub async fn probe(
        &self,
        path: &Path,
    ) -> Result<(ProbedVideoInfo, Vec<ProbedAudioStream>), DomainError> {
        let audio = self.probe_audio_streams(path).await?;
        let video = self.probe_video(path).await?;
        Ok((video, audio))
    }

    pub async fn probe_audio_streams(
        &self,
        path: &Path,
    ) -> Result<Vec<ProbedAudioStream>, DomainError> {
        let json = self
            .port
            .probe(&self.request(path, "a", AUDIO_ENTRIES))
            .await
            .map_err(|f| f.at_stage(ProbeStage::AudioStreams))?;
        let streams = parser::parse_audio_streams(&json)
            .map_err(|f| f.at_stage(ProbeStage::AudioStreams))?;
        debug!("Found {} audio stream(s) in {}", streams.len(), path.display());
        Ok(streams)
    }

    pub async fn probe_video(&self, path: &Path) -> Result<ProbedVideoInfo, DomainError> {
        let json = self
            .port
            .probe(&self.request(path, "v:0", VIDEO_ENTRIES))
            .await
            .map_err(|f| f.at_stage(ProbeStage::VideoProperties))?;
        let info = parser::parse_video_info(&json);
        debug!("Video properties for {}: {:?}", path.display(), info);
        Ok(info)
    }

    /// Duration of a single-stream artifact, stream first then container
    pub async fn probe_artifact_duration(
        &self,
        path: &Path,
        kind: ArtifactKind,
    ) -> Result<Option<f64>, DomainError> {
        let selector = match kind {
            ArtifactKind::Video => "v:0",
            ArtifactKind::Audio => "a:0",
        };
        let json = self
            .port
            .probe(&self.request(path, selector, DURATION_ENTRIES))
            .await
            .map_err(|f| f.at_stage(ProbeStage::ArtifactDuration))?;
        let info = parser::parse_video_info(&json);
        Ok(info.best_duration())
    }
}
