// Inspect interactor - Probe and reconcile without touching a timeline

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::{strategies_for, VideoStrategy};
use crate::ports::*;
use crate::probe::MediaProber;

#[derive(Debug, Clone, PartialEq)]
pub struct InspectRequest {
    pub input: PathBuf,
    pub project_fps: f64,
}

/// Audio stream as the importer would name it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectedTrack {
    pub stream_index: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectResponse {
    pub input: PathBuf,
    pub video: ProbedVideoInfo,
    pub audio_tracks: Vec<InspectedTrack>,
    pub timing: ReconciledTiming,
    /// Video extraction attempts, in order
    pub strategies: Vec<VideoStrategy>,
}

/// Interactor for media file inspection use case
pub struct InspectInteractor {
    prober: Arc<MediaProber>,
    fs_port: Arc<dyn FsPort>,
}

impl InspectInteractor {
    /// Create new inspect interactor with injected ports
    pub fn new(prober: Arc<MediaProber>, fs_port: Arc<dyn FsPort>) -> Self {
        Self { prober, fs_port }
    }

    /// Execute media file inspection
    pub async fn execute(&self, request: InspectRequest) -> Result<InspectResponse, DomainError> {
        if !self.fs_port.file_exists(&request.input).await? {
            return Err(DomainError::FileNotFound(
                request.input.display().to_string(),
            ));
        }

        let (video, streams) = self.prober.probe(&request.input).await?;
        let timing = Reconciler::reconcile(&video, request.project_fps)?;

        Ok(InspectResponse {
            audio_tracks: streams
                .iter()
                .map(|s| InspectedTrack {
                    stream_index: s.stream_index.clone(),
                    label: s.label(),
                })
                .collect(),
            strategies: strategies_for(&timing),
            input: request.input,
            video,
            timing,
        })
    }
}
