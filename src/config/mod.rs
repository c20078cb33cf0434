//! Importer configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// External tool locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

/// Wall-clock limits for each external call, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub probe_secs: u64,
    pub reencode_secs: u64,
    pub copy_secs: u64,
    pub fallback_secs: u64,
    pub audio_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            probe_secs: 30,
            reencode_secs: 180,
            copy_secs: 60,
            fallback_secs: 120,
            audio_secs: 60,
        }
    }
}

impl TimeoutConfig {
    pub fn probe(&self) -> Duration {
        Duration::from_secs(self.probe_secs)
    }

    pub fn reencode(&self) -> Duration {
        Duration::from_secs(self.reencode_secs)
    }

    pub fn copy(&self) -> Duration {
        Duration::from_secs(self.copy_secs)
    }

    pub fn fallback(&self) -> Duration {
        Duration::from_secs(self.fallback_secs)
    }

    pub fn audio(&self) -> Duration {
        Duration::from_secs(self.audio_secs)
    }
}

/// Video re-encode settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub codec: String,
    /// Preset for the framerate-converting encode
    pub preset: String,
    pub crf: u8,
    /// Preset for the encode that replaces a failed stream copy
    pub fallback_preset: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            codec: "libx264".to_string(),
            preset: "medium".to_string(),
            crf: 18,
            fallback_preset: "ultrafast".to_string(),
        }
    }
}

/// Fixed output layout for every extracted audio track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub codec: String,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            codec: "pcm_s16le".to_string(),
            sample_rate: 48000,
            channels: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScratchConfig {
    pub dir: PathBuf,
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            dir: std::env::temp_dir().join("multitrack-importer"),
        }
    }
}

/// Complete importer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    pub log_level: String,
    /// Passed to ffmpeg as `-threads`
    pub threads: usize,
    pub tools: ToolsConfig,
    pub timeouts: TimeoutConfig,
    pub video: VideoConfig,
    pub audio: AudioConfig,
    pub scratch: ScratchConfig,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            threads: num_cpus::get(),
            tools: ToolsConfig::default(),
            timeouts: TimeoutConfig::default(),
            video: VideoConfig::default(),
            audio: AudioConfig::default(),
            scratch: ScratchConfig::default(),
        }
    }
}

impl ImporterConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(DomainError::ConfigError(format!(
                    "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                    other
                )))
            }
        }

        let t = &self.timeouts;
        for (name, secs) in [
            ("probe_secs", t.probe_secs),
            ("reencode_secs", t.reencode_secs),
            ("copy_secs", t.copy_secs),
            ("fallback_secs", t.fallback_secs),
            ("audio_secs", t.audio_secs),
        ] {
            if secs == 0 {
                return Err(DomainError::ConfigError(format!(
                    "Timeout {} must be greater than zero",
                    name
                )));
            }
        }

        if self.video.crf > 51 {
            return Err(DomainError::ConfigError(
                "CRF value cannot exceed 51".to_string(),
            ));
        }
        if self.audio.sample_rate == 0 {
            return Err(DomainError::ConfigError(
                "Audio sample rate cannot be zero".to_string(),
            ));
        }
        if self.audio.channels == 0 {
            return Err(DomainError::ConfigError(
                "Audio channel count cannot be zero".to_string(),
            ));
        }
        if self.threads == 0 {
            return Err(DomainError::ConfigError(
                "Thread count cannot be zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pipeline_contract() {
        let config = ImporterConfig::default();
        assert_eq!(config.timeouts.probe(), Duration::from_secs(30));
        assert_eq!(config.timeouts.reencode(), Duration::from_secs(180));
        assert_eq!(config.timeouts.copy(), Duration::from_secs(60));
        assert_eq!(config.timeouts.fallback(), Duration::from_secs(120));
        assert_eq!(config.audio.codec, "pcm_s16le");
        assert_eq!(config.audio.sample_rate, 48000);
        assert_eq!(config.audio.channels, 2);
        assert_eq!(config.video.crf, 18);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ImporterConfig::default();
        config.video.crf = 52;
        assert!(config.validate().is_err());

        let mut config = ImporterConfig::default();
        config.timeouts.copy_secs = 0;
        assert!(config.validate().is_err());

        let mut config = ImporterConfig::default();
        config.audio.channels = 0;
        assert!(config.validate().is_err());

        let mut config = ImporterConfig::default();
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }
}
