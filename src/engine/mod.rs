//! Stream extraction engine
//!
//! Video is always extracted to a video-only elementary file before the host
//! sees it, so host duration inference cannot be stretched by a longer audio
//! track. Each audio stream is decoded to its own fixed-format PCM file. Every
//! artifact is capped at the reconciled source duration.

use std::path::{Path, PathBuf};

use crate::config::{AudioConfig, ImporterConfig, TimeoutConfig, VideoConfig};

pub mod audio;
pub mod video;

pub use audio::AudioExtractor;
pub use video::{strategies_for, VideoExtractor, VideoStrategy};

/// Encoder and timeout settings shared by both extractors
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionSettings {
    pub video: VideoConfig,
    pub audio: AudioConfig,
    pub timeouts: TimeoutConfig,
}

impl From<&ImporterConfig> for ExtractionSettings {
    fn from(config: &ImporterConfig) -> Self {
        Self {
            video: config.video.clone(),
            audio: config.audio.clone(),
            timeouts: config.timeouts.clone(),
        }
    }
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self::from(&ImporterConfig::default())
    }
}

/// `<scratch>/video_only_<base>.mp4`
pub fn video_artifact_path(scratch: &Path, base_name: &str) -> PathBuf {
    scratch.join(format!("video_only_{}.mp4", base_name))
}

/// `<scratch>/audio_<base>_track_<index>.wav`
pub fn audio_artifact_path(scratch: &Path, base_name: &str, stream_index: &str) -> PathBuf {
    scratch.join(format!("audio_{}_track_{}.wav", base_name, stream_index))
}

#[cfg(test)]
mod tests;
