// Verify interactor - Re-check the durations inside a saved composite

use std::sync::Arc;

use serde::Serialize;

use crate::assembler::CompositeVerifier;
use crate::domain::errors::*;
use crate::ports::*;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifyResponse {
    pub name: String,
    pub video_frames: i64,
    pub max_audio_frames: i64,
    pub diff: i64,
    pub consistent: bool,
}

/// Interactor for composite verification
pub struct VerifyInteractor {
    timeline: Arc<dyn TimelinePort>,
}

impl VerifyInteractor {
    pub fn new(timeline: Arc<dyn TimelinePort>) -> Self {
        Self { timeline }
    }

    pub async fn execute(&self, name: &str) -> Result<VerifyResponse, DomainError> {
        let group = self
            .timeline
            .find_group(name)
            .await?
            .ok_or_else(|| DomainError::BadArgs(format!("No composite named '{}'", name)))?;

        let durations = CompositeVerifier::new(Arc::clone(&self.timeline))
            .verify(group)
            .await?
            .ok_or_else(|| {
                DomainError::BadArgs(format!(
                    "Composite '{}' has no video and audio pair to verify",
                    name
                ))
            })?;

        Ok(VerifyResponse {
            name: name.to_string(),
            video_frames: durations.video,
            max_audio_frames: durations.max_audio,
            diff: durations.diff(),
            consistent: durations.is_consistent(),
        })
    }
}
