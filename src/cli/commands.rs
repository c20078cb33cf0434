//! Command implementations

use std::fmt::Write as _;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use crate::app::{AppContainer, ImportRequest, InspectRequest, InspectResponse, VerifyResponse};
use crate::cli::args::{ImportArgs, InspectArgs, OutputFormat, VerifyArgs};
use crate::domain::model::{ImportOutcome, ImportReport, ImportSummary};
use crate::utils::Utils;

/// Execute the import command
pub async fn import(container: &dyn AppContainer, args: ImportArgs) -> Result<()> {
    info!("Input: {}", args.input.display());
    info!("Project: {}", args.project.display());

    let interactor = container
        .import_interactor(&args.project, args.fps)
        .context("Failed to open project")?;

    let started = Instant::now();
    let report = interactor.execute(ImportRequest::new(&args.input)).await;
    info!(
        "Import finished in {}",
        Utils::format_duration(started.elapsed())
    );

    println!("{}", render_report(&report, args.format)?);

    match &report.outcome {
        ImportOutcome::Finished(_) => Ok(()),
        ImportOutcome::Cancelled { reason } => Err(anyhow::anyhow!("Import cancelled: {}", reason)),
        ImportOutcome::Failed { reason } => Err(anyhow::anyhow!("Import failed: {}", reason)),
    }
}

/// Execute the inspect command
pub async fn inspect(container: &dyn AppContainer, args: InspectArgs) -> Result<()> {
    info!("Input: {}", args.input.display());

    let response = container
        .inspect_interactor()
        .execute(InspectRequest {
            input: args.input.clone(),
            project_fps: args.fps,
        })
        .await
        .context("Failed to inspect input file")?;

    if args.json {
        let json = serde_json::to_string_pretty(&response)
            .context("Failed to serialize inspection to JSON")?;
        println!("{}", json);
    } else {
        print!("{}", display_inspection(&response));
    }
    Ok(())
}

/// Execute the verify command
pub async fn verify(container: &dyn AppContainer, args: VerifyArgs) -> Result<()> {
    let response = container
        .verify_interactor(&args.project)
        .context("Failed to open project")?
        .execute(&args.name)
        .await
        .context("Failed to verify composite")?;

    if args.json {
        let json = serde_json::to_string_pretty(&response)
            .context("Failed to serialize verification to JSON")?;
        println!("{}", json);
    } else {
        println!("{}", display_verification(&response));
    }

    if response.consistent {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "Composite '{}' is out of sync by {} frames",
            response.name,
            response.diff
        ))
    }
}

/// Render an import report
pub fn render_report(report: &ImportReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).context("Failed to serialize report to YAML")
        }
        OutputFormat::Text => Ok(display_report(report)),
    }
}

fn display_report(report: &ImportReport) -> String {
    let mut out = String::new();
    for message in &report.messages {
        let _ = writeln!(out, "[{}] {}", message.severity, message.message);
    }
    let _ = match &report.outcome {
        ImportOutcome::Finished(ImportSummary::Composite {
            name,
            channel,
            audio_tracks,
        }) => write!(
            out,
            "FINISHED: composite '{}' on channel {} with {} audio track(s)",
            name, channel, audio_tracks
        ),
        ImportOutcome::Finished(ImportSummary::Ungrouped {
            channel,
            audio_tracks,
        }) => write!(
            out,
            "FINISHED: ungrouped clips from channel {} with {} audio track(s)",
            channel, audio_tracks
        ),
        ImportOutcome::Finished(ImportSummary::VideoOnly { channel, reason }) => write!(
            out,
            "FINISHED: video only on channel {} ({})",
            channel, reason
        ),
        ImportOutcome::Cancelled { reason } => write!(out, "CANCELLED: {}", reason),
        ImportOutcome::Failed { reason } => write!(out, "FAILED: {}", reason),
    };
    out
}

fn display_inspection(response: &InspectResponse) -> String {
    let mut out = String::new();
    let video = &response.video;
    let timing = &response.timing;
    let _ = writeln!(out, "File: {}", response.input.display());
    let _ = writeln!(out, "Video:");
    let _ = writeln!(
        out,
        "  Duration: {:.3}s",
        timing.source_duration_seconds
    );
    let _ = writeln!(
        out,
        "  Frame rate: {}",
        video
            .frame_rate
            .map(|r| format!("{:.3} fps", r))
            .unwrap_or_else(|| "unknown".to_string())
    );
    if let Some(frames) = video.frame_count {
        let _ = writeln!(out, "  Frames (metadata): {}", frames);
    }
    if let Some(mismatch) = timing.frame_count_warning {
        let _ = writeln!(
            out,
            "  Warning: frame count mismatch, metadata={}, calculated={}",
            mismatch.metadata, mismatch.calculated
        );
    }

    let _ = writeln!(out, "Audio tracks: {}", response.audio_tracks.len());
    for track in &response.audio_tracks {
        let _ = writeln!(out, "  #{}: {}", track.stream_index, track.label);
    }

    let _ = writeln!(out, "Import at {:.3} fps:", timing.project_fps);
    let _ = writeln!(out, "  Target: {} frames", timing.target_frame_count);
    let _ = writeln!(
        out,
        "  Framerate conversion: {}",
        if timing.needs_framerate_conversion { "yes" } else { "no" }
    );
    let strategies: Vec<&str> = response.strategies.iter().map(|s| s.describe()).collect();
    let _ = writeln!(out, "  Video extraction: {}", strategies.join(" -> "));
    out
}

fn display_verification(response: &VerifyResponse) -> String {
    format!(
        "{}: video={} frames, audio={} frames, diff={} ({})",
        response.name,
        response.video_frames,
        response.max_audio_frames,
        response.diff,
        if response.consistent { "ok" } else { "out of sync" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ReportLog, VideoOnlyReason};

    fn report() -> ImportReport {
        let mut log = ReportLog::new();
        log.info("Found 0 audio track(s).");
        log.warn("Frame count mismatch: metadata=290, calculated=300");
        log.finish(ImportOutcome::Finished(ImportSummary::VideoOnly {
            channel: 2,
            reason: VideoOnlyReason::NoAudioTracks,
        }))
    }

    #[test]
    fn test_text_report() {
        let text = render_report(&report(), OutputFormat::Text).unwrap();
        assert!(text.contains("[WARNING] Frame count mismatch"));
        assert!(text.ends_with("FINISHED: video only on channel 2 (No audio tracks found.)"));
    }

    #[test]
    fn test_structured_reports() {
        let json = render_report(&report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["outcome"]["status"], "finished");
        assert_eq!(value["outcome"]["kind"], "video_only");
        assert_eq!(value["outcome"]["reason"], "no_audio_tracks");

        let yaml = render_report(&report(), OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("status: finished"));
        assert!(yaml.contains("severity: warning"));
    }
}
