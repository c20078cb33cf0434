// Unit tests for the extraction engine

use super::*;
use crate::domain::errors::{ConversionFailure, DomainError};
use crate::domain::model::{ArtifactKind, ProbedAudioStream, ReconciledTiming, ReportLog};
use crate::ports::{CodecSettings, ConversionJob, ConvertPort};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

type Script = Box<dyn Fn(&ConversionJob) -> Option<ConversionFailure> + Send + Sync>;

/// Records every job; fails the ones `script` picks
struct RecordingConvert {
    script: Script,
    jobs: Mutex<Vec<ConversionJob>>,
}

impl RecordingConvert {
    fn succeeding() -> Arc<Self> {
        Self::scripted(|_| None)
    }

    fn scripted(
        script: impl Fn(&ConversionJob) -> Option<ConversionFailure> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            jobs: Mutex::new(Vec::new()),
        })
    }

    fn jobs(&self) -> Vec<ConversionJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConvertPort for RecordingConvert {
    async fn convert(&self, job: &ConversionJob) -> Result<(), ConversionFailure> {
        self.jobs.lock().unwrap().push(job.clone());
        match (self.script)(job) {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}

fn exited(stderr: &str) -> ConversionFailure {
    ConversionFailure::Exited {
        code: Some(1),
        stderr: stderr.to_string(),
    }
}

fn timing(duration: f64, project_fps: f64, source_rate: f64) -> ReconciledTiming {
    ReconciledTiming {
        source_duration_seconds: duration,
        target_frame_count: (duration * project_fps).round() as i64,
        needs_framerate_conversion: (source_rate - project_fps).abs() > 0.01,
        project_fps,
        source_frame_rate: Some(source_rate),
        frame_count_warning: None,
    }
}

fn scratch() -> PathBuf {
    PathBuf::from("/scratch/run")
}

#[test]
fn test_strategy_ladder() {
    assert_eq!(
        strategies_for(&timing(10.0, 30.0, 30.0)),
        vec![VideoStrategy::StreamCopy, VideoStrategy::FastReencode]
    );
    assert_eq!(
        strategies_for(&timing(10.0, 25.0, 30.0)),
        vec![VideoStrategy::ReencodeAtProjectRate]
    );
}

#[test]
fn test_artifact_names() {
    assert_eq!(
        video_artifact_path(&scratch(), "holiday"),
        PathBuf::from("/scratch/run/video_only_holiday.mp4")
    );
    assert_eq!(
        audio_artifact_path(&scratch(), "holiday", "2"),
        PathBuf::from("/scratch/run/audio_holiday_track_2.wav")
    );
}

#[tokio::test]
async fn test_matching_rate_uses_stream_copy() {
    let convert = RecordingConvert::succeeding();
    let extractor = VideoExtractor::new(convert.clone(), ExtractionSettings::default());
    let mut log = ReportLog::new();

    let artifact = extractor
        .extract(
            &PathBuf::from("/media/a.mp4"),
            &timing(10.0, 30.0, 30.0),
            &scratch(),
            "a",
            &mut log,
        )
        .await
        .unwrap();

    assert_eq!(artifact.kind, ArtifactKind::Video);
    assert_eq!(artifact.file_path, PathBuf::from("/scratch/run/video_only_a.mp4"));

    let jobs = convert.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].codec, CodecSettings::VideoCopy);
    assert_eq!(jobs[0].stream_map, "0:v:0");
    assert!(jobs[0].drop_audio);
    assert!(jobs[0].zero_timestamps);
    assert_eq!(jobs[0].filter, None);
    assert_eq!(jobs[0].duration_cap, 10.0);
}

#[tokio::test]
async fn test_rate_mismatch_reencodes_with_fps_filter() {
    let convert = RecordingConvert::succeeding();
    let extractor = VideoExtractor::new(convert.clone(), ExtractionSettings::default());
    let mut log = ReportLog::new();

    extractor
        .extract(
            &PathBuf::from("/media/a.mp4"),
            &timing(10.0, 25.0, 30.0),
            &scratch(),
            "a",
            &mut log,
        )
        .await
        .unwrap();

    let jobs = convert.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].filter.as_deref(), Some("fps=25.000000"));
    assert_eq!(
        jobs[0].codec,
        CodecSettings::VideoEncode {
            codec: "libx264".to_string(),
            preset: "medium".to_string(),
            crf: 18,
        }
    );
    assert_eq!(jobs[0].timeout.as_secs(), 180);
    assert!(log.messages()[0].message.contains("Converting video framerate"));
}

#[tokio::test]
async fn test_copy_failure_falls_back_to_fast_reencode() {
    let convert = RecordingConvert::scripted(|job| match job.codec {
        CodecSettings::VideoCopy => Some(exited("codec not supported in container")),
        _ => None,
    });
    let extractor = VideoExtractor::new(convert.clone(), ExtractionSettings::default());
    let mut log = ReportLog::new();

    let artifact = extractor
        .extract(
            &PathBuf::from("/media/a.mkv"),
            &timing(10.0, 30.0, 30.0),
            &scratch(),
            "a",
            &mut log,
        )
        .await
        .unwrap();

    assert_eq!(artifact.kind, ArtifactKind::Video);
    let jobs = convert.jobs();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].codec, CodecSettings::VideoCopy);
    match &jobs[1].codec {
        CodecSettings::VideoEncode { preset, .. } => assert_eq!(preset, "ultrafast"),
        other => panic!("unexpected codec {:?}", other),
    }
    assert_eq!(jobs[1].filter, None);
    assert_eq!(jobs[1].duration_cap, jobs[0].duration_cap);
    assert!(log.messages().iter().any(|m| m.message.contains("trying fast re-encode")));
}

#[tokio::test]
async fn test_fallback_message_names_the_strategy_that_failed() {
    let convert = RecordingConvert::scripted(|job| match job.filter {
        Some(_) => Some(exited("fps filter rejected")),
        None => None,
    });
    let extractor = VideoExtractor::new(convert.clone(), ExtractionSettings::default());
    let mut log = ReportLog::new();

    extractor
        .walk(
            &[VideoStrategy::ReencodeAtProjectRate, VideoStrategy::FastReencode],
            &PathBuf::from("/media/a.mkv"),
            scratch().join("video_only_a.mp4"),
            &timing(10.0, 25.0, 30.0),
            &mut log,
        )
        .await
        .unwrap();

    let fallback = log
        .messages()
        .iter()
        .find(|m| m.message.contains("trying fast re-encode"))
        .unwrap();
    assert!(fallback
        .message
        .starts_with("Video re-encode with framerate conversion failed"));
    assert!(!fallback.message.contains("stream copy"));
}

#[tokio::test]
async fn test_every_strategy_failing_reports_last_diagnostic() {
    let convert = RecordingConvert::scripted(|job| match job.codec {
        CodecSettings::VideoCopy => Some(exited("copy refused")),
        _ => Some(exited("encoder exploded")),
    });
    let extractor = VideoExtractor::new(convert.clone(), ExtractionSettings::default());
    let mut log = ReportLog::new();

    let err = extractor
        .extract(
            &PathBuf::from("/media/a.mkv"),
            &timing(10.0, 30.0, 30.0),
            &scratch(),
            "a",
            &mut log,
        )
        .await
        .unwrap_err();

    match err {
        DomainError::VideoExtractionFailed(detail) => assert!(detail.contains("encoder exploded")),
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_conversion_failure_is_not_retried() {
    let convert = RecordingConvert::scripted(|_| Some(exited("bad filter")));
    let extractor = VideoExtractor::new(convert.clone(), ExtractionSettings::default());
    let mut log = ReportLog::new();

    let result = extractor
        .extract(
            &PathBuf::from("/media/a.mkv"),
            &timing(10.0, 25.0, 30.0),
            &scratch(),
            "a",
            &mut log,
        )
        .await;

    assert!(matches!(result, Err(DomainError::VideoExtractionFailed(_))));
    assert_eq!(convert.jobs().len(), 1);
}

#[tokio::test]
async fn test_missing_tool_stops_the_ladder() {
    let convert =
        RecordingConvert::scripted(|_| Some(ConversionFailure::ToolMissing("ffmpeg".to_string())));
    let extractor = VideoExtractor::new(convert.clone(), ExtractionSettings::default());
    let mut log = ReportLog::new();

    let result = extractor
        .extract(
            &PathBuf::from("/media/a.mkv"),
            &timing(10.0, 30.0, 30.0),
            &scratch(),
            "a",
            &mut log,
        )
        .await;

    assert_eq!(result, Err(DomainError::ToolNotFound("ffmpeg".to_string())));
    assert_eq!(convert.jobs().len(), 1);
}

#[tokio::test]
async fn test_audio_job_layout() {
    let convert = RecordingConvert::succeeding();
    let extractor = AudioExtractor::new(convert.clone(), ExtractionSettings::default());
    let stream = ProbedAudioStream::new("2", None);

    let artifact = extractor
        .extract(
            &PathBuf::from("/media/a.mkv"),
            &stream,
            &timing(9.5, 30.0, 30.0),
            &scratch(),
            "a",
        )
        .await
        .unwrap();

    assert_eq!(artifact.label.as_deref(), Some("Track_2"));
    assert_eq!(artifact.source_stream_index.as_deref(), Some("2"));
    assert_eq!(artifact.file_path, PathBuf::from("/scratch/run/audio_a_track_2.wav"));

    let job = &convert.jobs()[0];
    assert_eq!(job.stream_map, "0:2");
    assert!(job.drop_video);
    assert!(!job.drop_audio);
    assert_eq!(job.duration_cap, 9.5);
    assert_eq!(
        job.codec,
        CodecSettings::AudioPcm {
            codec: "pcm_s16le".to_string(),
            sample_rate: 48000,
            channels: 2,
        }
    );
}

#[tokio::test]
async fn test_audio_failure_names_the_stream() {
    let convert = RecordingConvert::scripted(|_| Some(exited("Stream map '0:7' matches no streams")));
    let extractor = AudioExtractor::new(convert, ExtractionSettings::default());
    let stream = ProbedAudioStream::new("7", Some("fre".to_string()));

    let err = extractor
        .extract(
            &PathBuf::from("/media/a.mkv"),
            &stream,
            &timing(10.0, 30.0, 30.0),
            &scratch(),
            "a",
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DomainError::AudioExtractionFailed {
            stream: "7".to_string(),
            detail: "Stream map '0:7' matches no streams".to_string(),
        }
    );
    assert!(!err.is_fatal());
}
