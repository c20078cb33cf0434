//! FFmpeg execution adapter
//!
//! Translates a [`ConversionJob`] into an ffmpeg command line and runs it.

use std::ffi::OsString;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::adapters::process::run_tool;
use crate::domain::errors::*;
use crate::ports::*;

/// FFmpeg-based execution adapter
pub struct FfmpegAdapter {
    program: PathBuf,
    threads: usize,
}

impl FfmpegAdapter {
    /// Create new FFmpeg adapter
    pub fn new(program: impl Into<PathBuf>, threads: usize) -> Self {
        Self {
            program: program.into(),
            threads,
        }
    }

    /// Command line for a job, without the program name
    pub fn build_args(&self, job: &ConversionJob) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-hide_banner".into(),
            "-nostdin".into(),
            "-y".into(),
            "-i".into(),
            job.input.clone().into_os_string(),
            "-map".into(),
            job.stream_map.clone().into(),
        ];

        if job.drop_audio {
            args.push("-an".into());
        }
        if job.drop_video {
            args.push("-vn".into());
        }
        if let Some(filter) = &job.filter {
            args.push("-vf".into());
            args.push(filter.into());
        }

        match &job.codec {
            CodecSettings::VideoCopy => {
                args.push("-c:v".into());
                args.push("copy".into());
            }
            CodecSettings::VideoEncode { codec, preset, crf } => {
                args.push("-c:v".into());
                args.push(codec.into());
                args.push("-preset".into());
                args.push(preset.into());
                args.push("-crf".into());
                args.push(crf.to_string().into());
                args.push("-threads".into());
                args.push(self.threads.to_string().into());
            }
            CodecSettings::AudioPcm {
                codec,
                sample_rate,
                channels,
            } => {
                args.push("-acodec".into());
                args.push(codec.into());
                args.push("-ar".into());
                args.push(sample_rate.to_string().into());
                args.push("-ac".into());
                args.push(channels.to_string().into());
            }
        }

        if job.zero_timestamps {
            args.push("-avoid_negative_ts".into());
            args.push("make_zero".into());
        }
        args.push("-t".into());
        args.push(job.duration_cap.to_string().into());
        args.push(job.output.clone().into_os_string());
        args
    }
}

#[async_trait]
impl ConvertPort for FfmpegAdapter {
    async fn convert(&self, job: &ConversionJob) -> Result<(), ConversionFailure> {
        let args = self.build_args(job);
        run_tool(&self.program, &args, job.timeout).await?;
        debug!("Wrote {}", job.output.display());
        Ok(())
    }
}
