//! Video-only extraction with a copy-then-reencode fallback ladder

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use crate::domain::errors::{ConversionFailure, DomainError};
use crate::domain::model::{ExtractedArtifact, ReconciledTiming, ReportLog};
use crate::engine::{video_artifact_path, ExtractionSettings};
use crate::ports::{CodecSettings, ConversionJob, ConvertPort};

/// One way of producing the video-only artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoStrategy {
    /// Quality re-encode with an fps filter at the project rate
    ReencodeAtProjectRate,
    /// Lossless stream copy
    StreamCopy,
    /// Fast re-encode, used when a stream copy is refused
    FastReencode,
}

impl VideoStrategy {
    pub fn describe(&self) -> &'static str {
        match self {
            VideoStrategy::ReencodeAtProjectRate => "re-encode with framerate conversion",
            VideoStrategy::StreamCopy => "stream copy",
            VideoStrategy::FastReencode => "fast re-encode",
        }
    }

    /// Conversion job for this strategy
    pub fn job(
        &self,
        input: &Path,
        output: &Path,
        timing: &ReconciledTiming,
        settings: &ExtractionSettings,
    ) -> ConversionJob {
        let video = &settings.video;
        let (codec, filter, timeout) = match self {
            VideoStrategy::ReencodeAtProjectRate => (
                CodecSettings::VideoEncode {
                    codec: video.codec.clone(),
                    preset: video.preset.clone(),
                    crf: video.crf,
                },
                Some(format!("fps={:.6}", timing.project_fps)),
                settings.timeouts.reencode(),
            ),
            VideoStrategy::StreamCopy => {
                (CodecSettings::VideoCopy, None, settings.timeouts.copy())
            }
            VideoStrategy::FastReencode => (
                CodecSettings::VideoEncode {
                    codec: video.codec.clone(),
                    preset: video.fallback_preset.clone(),
                    crf: video.crf,
                },
                None,
                settings.timeouts.fallback(),
            ),
        };

        ConversionJob {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            stream_map: "0:v:0".to_string(),
            drop_video: false,
            drop_audio: true,
            codec,
            filter,
            duration_cap: timing.duration_cap(),
            zero_timestamps: true,
            timeout,
        }
    }
}

/// Ordered attempts for a given timing; first success wins
pub fn strategies_for(timing: &ReconciledTiming) -> Vec<VideoStrategy> {
    if timing.needs_framerate_conversion {
        vec![VideoStrategy::ReencodeAtProjectRate]
    } else {
        vec![VideoStrategy::StreamCopy, VideoStrategy::FastReencode]
    }
}

/// Extracts the primary video stream into scratch storage
pub struct VideoExtractor {
    convert: Arc<dyn ConvertPort>,
    settings: ExtractionSettings,
}

impl VideoExtractor {
    pub fn new(convert: Arc<dyn ConvertPort>, settings: ExtractionSettings) -> Self {
        Self { convert, settings }
    }

    /// Walk the strategy ladder. Fails only when every strategy failed.
    pub async fn extract(
        &self,
        input: &Path,
        timing: &ReconciledTiming,
        scratch: &Path,
        base_name: &str,
        log: &mut ReportLog,
    ) -> Result<ExtractedArtifact, DomainError> {
        let output = video_artifact_path(scratch, base_name);

        if timing.needs_framerate_conversion {
            log.info(format!(
                "Converting video framerate from {} to {:.3} fps...",
                timing
                    .source_frame_rate
                    .map(|r| format!("{:.3}", r))
                    .unwrap_or_else(|| "unknown".to_string()),
                timing.project_fps
            ));
        } else {
            log.info("Extracting video without framerate conversion...");
        }

        self.walk(&strategies_for(timing), input, output, timing, log)
            .await
    }

    /// Try each strategy in order, first success wins
    pub(crate) async fn walk(
        &self,
        ladder: &[VideoStrategy],
        input: &Path,
        output: PathBuf,
        timing: &ReconciledTiming,
        log: &mut ReportLog,
    ) -> Result<ExtractedArtifact, DomainError> {
        let mut last_failure: Option<(VideoStrategy, ConversionFailure)> = None;
        for &strategy in ladder {
            if let Some((previous, failure)) = &last_failure {
                log.info(format!(
                    "Video {} failed ({}), trying {}...",
                    previous.describe(),
                    failure,
                    strategy.describe()
                ));
            }

            let job = strategy.job(input, &output, timing, &self.settings);
            let started = Instant::now();
            match self.convert.convert(&job).await {
                Ok(()) => {
                    debug!(
                        "Video {} finished in {:.2}s",
                        strategy.describe(),
                        started.elapsed().as_secs_f64()
                    );
                    return Ok(ExtractedArtifact::video(output));
                }
                Err(ConversionFailure::ToolMissing(tool)) => {
                    return Err(DomainError::ToolNotFound(tool));
                }
                Err(failure) => {
                    debug!("Video {} failed: {}", strategy.describe(), failure);
                    last_failure = Some((strategy, failure));
                }
            }
        }

        Err(DomainError::VideoExtractionFailed(
            last_failure
                .map(|(_, f)| f.to_string())
                .unwrap_or_else(|| "no extraction strategy available".to_string()),
        ))
    }
}
