//! Per-stream audio extraction to fixed-format PCM

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::domain::errors::{ConversionFailure, DomainError};
use crate::domain::model::{ExtractedArtifact, ProbedAudioStream, ReconciledTiming};
use crate::engine::{audio_artifact_path, ExtractionSettings};
use crate::ports::{CodecSettings, ConversionJob, ConvertPort};

/// Decodes one container audio stream at a time
pub struct AudioExtractor {
    convert: Arc<dyn ConvertPort>,
    settings: ExtractionSettings,
}

impl AudioExtractor {
    pub fn new(convert: Arc<dyn ConvertPort>, settings: ExtractionSettings) -> Self {
        Self { convert, settings }
    }

    /// Job for one stream, capped at the same duration as the video
    pub fn job(
        &self,
        input: &Path,
        output: &Path,
        stream: &ProbedAudioStream,
        timing: &ReconciledTiming,
    ) -> ConversionJob {
        let audio = &self.settings.audio;
        ConversionJob {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            stream_map: format!("0:{}", stream.stream_index),
            drop_video: true,
            drop_audio: false,
            codec: CodecSettings::AudioPcm {
                codec: audio.codec.clone(),
                sample_rate: audio.sample_rate,
                channels: audio.channels,
            },
            filter: None,
            duration_cap: timing.duration_cap(),
            zero_timestamps: false,
            timeout: self.settings.timeouts.audio(),
        }
    }

    /// Extract a single stream. Failure here is never fatal to the import.
    pub async fn extract(
        &self,
        input: &Path,
        stream: &ProbedAudioStream,
        timing: &ReconciledTiming,
        scratch: &Path,
        base_name: &str,
    ) -> Result<ExtractedArtifact, DomainError> {
        let output = audio_artifact_path(scratch, base_name, &stream.stream_index);
        let job = self.job(input, &output, stream, timing);

        match self.convert.convert(&job).await {
            Ok(()) => {
                debug!("Extracted audio stream {} to {}", stream.stream_index, output.display());
                Ok(ExtractedArtifact::audio(output, stream))
            }
            Err(failure) => Err(DomainError::AudioExtractionFailed {
                stream: stream.stream_index.clone(),
                detail: describe(&failure),
            }),
        }
    }
}

fn describe(failure: &ConversionFailure) -> String {
    match failure {
        ConversionFailure::Exited { stderr, .. } if !stderr.is_empty() => stderr.clone(),
        other => other.to_string(),
    }
}
