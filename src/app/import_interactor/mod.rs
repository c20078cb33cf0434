// Import interactor - Orchestrates the multi-track import use case

use std::path::PathBuf;
use std::sync::Arc;

use uuid::Uuid;

use crate::assembler::{AssemblyOutcome, CompositeAssembler};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::{AudioExtractor, ExtractionSettings, VideoExtractor};
use crate::ports::*;
use crate::probe::MediaProber;

/// One import
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRequest {
    pub input: PathBuf,
}

impl ImportRequest {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Interactor for the import use case
pub struct ImportInteractor {
    prober: Arc<MediaProber>,
    fs_port: Arc<dyn FsPort>,
    timeline: Arc<dyn TimelinePort>,
    video: VideoExtractor,
    audio: AudioExtractor,
    assembler: CompositeAssembler,
}

impl ImportInteractor {
    /// Create new import interactor with injected ports
    pub fn new(
        prober: Arc<MediaProber>,
        convert_port: Arc<dyn ConvertPort>,
        fs_port: Arc<dyn FsPort>,
        timeline: Arc<dyn TimelinePort>,
        settings: ExtractionSettings,
    ) -> Self {
        Self {
            prober,
            fs_port,
            video: VideoExtractor::new(Arc::clone(&convert_port), settings.clone()),
            audio: AudioExtractor::new(convert_port, settings),
            assembler: CompositeAssembler::new(Arc::clone(&timeline)),
            timeline,
        }
    }

    /// Run the whole pipeline. Errors never escape: they end up as the
    /// report's outcome.
    pub async fn execute(&self, request: ImportRequest) -> ImportReport {
        let mut log = ReportLog::new();
        let outcome = self.import(&request, &mut log).await;
        log.finish(outcome)
    }

    async fn import(&self, request: &ImportRequest, log: &mut ReportLog) -> ImportOutcome {
        let input = &request.input;
        log.info(format!("Importing {}", input.display()));

        // Nothing below touches the timeline until the assembler runs
        let prepared = match self.prepare(request, log).await {
            Ok(prepared) => prepared,
            Err(e) => {
                log.error(e.to_string());
                return ImportOutcome::Cancelled {
                    reason: e.to_string(),
                };
            }
        };
        let Prepared {
            timing,
            streams,
            video,
            audio,
            base_name,
        } = prepared;

        let assembled = self
            .assembler
            .assemble(&video, &audio, &timing, &base_name, log)
            .await;

        // Whatever was placed stays, so persist either way
        let committed = self.timeline.commit().await;

        let assembled = match assembled {
            Ok(assembled) => assembled,
            Err(e) => {
                log.error(format!("Failed to import video: {}", e));
                if let Err(commit_err) = committed {
                    log.error(commit_err.to_string());
                }
                return ImportOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };
        if let Err(e) = committed {
            log.error(e.to_string());
            return ImportOutcome::Failed {
                reason: e.to_string(),
            };
        }

        ImportOutcome::Finished(self.summarize(assembled, streams.is_empty(), log))
    }

    async fn prepare(
        &self,
        request: &ImportRequest,
        log: &mut ReportLog,
    ) -> Result<Prepared, DomainError> {
        let input = &request.input;
        if !self.fs_port.file_exists(input).await? {
            return Err(DomainError::FileNotFound(input.display().to_string()));
        }

        log.info("Scanning audio tracks...");
        let (info, streams) = self.prober.probe(input).await?;
        if streams.is_empty() {
            log.info("No audio tracks found.");
        } else {
            log.info(format!("Found {} audio track(s).", streams.len()));
        }

        let project_fps = self.timeline.project_frame_rate().await?;
        let timing = Reconciler::reconcile(&info, project_fps)?;
        if let Some(mismatch) = timing.frame_count_warning {
            log.warn(format!(
                "Frame count mismatch: metadata={}, calculated={}",
                mismatch.metadata, mismatch.calculated
            ));
        }
        log.info(format!(
            "Video: {:.3}s at {} fps, Project: {:.3} fps",
            timing.source_duration_seconds,
            timing
                .source_frame_rate
                .map(|r| format!("{:.3}", r))
                .unwrap_or_else(|| "unknown".to_string()),
            timing.project_fps
        ));
        log.info(format!(
            "Target duration: {} frames",
            timing.target_frame_count
        ));

        let run_id = Uuid::new_v4().to_string();
        let scratch = self.fs_port.prepare_scratch(&run_id).await?;
        let base_name = source_base_name(input);

        let video = self
            .video
            .extract(input, &timing, &scratch, &base_name, log)
            .await?;

        let mut audio = Vec::with_capacity(streams.len());
        for stream in &streams {
            log.info(format!(
                "Extracting audio track {} ({}) with exact duration {:.3}s...",
                stream.stream_index,
                stream.label(),
                timing.source_duration_seconds
            ));
            match self
                .audio
                .extract(input, stream, &timing, &scratch, &base_name)
                .await
            {
                Ok(artifact) => audio.push(artifact),
                Err(e) => log.warn(e.to_string()),
            }
        }

        Ok(Prepared {
            timing,
            streams,
            video,
            audio,
            base_name,
        })
    }

    fn summarize(
        &self,
        assembled: AssemblyOutcome,
        no_streams: bool,
        log: &mut ReportLog,
    ) -> ImportSummary {
        let audio_tracks = assembled.audio_track_count();
        match assembled {
            AssemblyOutcome::Composite(unit) => ImportSummary::Composite {
                name: unit.name,
                channel: unit.channel,
                audio_tracks,
            },
            AssemblyOutcome::Ungrouped { channel, .. } => {
                log.info(format!(
                    "Imported video and {} audio track(s) without grouping.",
                    audio_tracks
                ));
                ImportSummary::Ungrouped {
                    channel,
                    audio_tracks,
                }
            }
            AssemblyOutcome::VideoOnly { video } => {
                let reason = if no_streams {
                    VideoOnlyReason::NoAudioTracks
                } else {
                    VideoOnlyReason::AllAudioExtractionsFailed
                };
                log.info(format!("Imported video only. {}", reason));
                ImportSummary::VideoOnly {
                    channel: video.channel,
                    reason,
                }
            }
        }
    }
}

/// Everything extracted before the timeline is touched
struct Prepared {
    timing: ReconciledTiming,
    streams: Vec<ProbedAudioStream>,
    video: ExtractedArtifact,
    audio: Vec<ExtractedArtifact>,
    base_name: String,
}
