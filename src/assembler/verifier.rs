//! Post-grouping duration verification

use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::domain::model::{GroupHandle, ReportLog};
use crate::domain::rules::CompositeDurations;
use crate::ports::TimelinePort;

/// Compares the video member of a composite against its longest audio member
pub struct CompositeVerifier {
    timeline: Arc<dyn TimelinePort>,
}

impl CompositeVerifier {
    pub fn new(timeline: Arc<dyn TimelinePort>) -> Self {
        Self { timeline }
    }

    /// `None` when the composite lacks a video or an audio member
    pub async fn verify(&self, group: GroupHandle) -> Result<Option<CompositeDurations>, DomainError> {
        let members = self.timeline.group_member_durations(group).await?;
        Ok(CompositeDurations::from_members(&members))
    }

    pub fn report(durations: Option<CompositeDurations>, log: &mut ReportLog) {
        match durations {
            Some(d) if d.is_consistent() => log.info(format!(
                "Duration verification passed: Video={}, Audio={} frames",
                d.video, d.max_audio
            )),
            Some(d) => log.warn(format!(
                "Duration mismatch detected: Video={}, Audio={} frames (diff: {})",
                d.video,
                d.max_audio,
                d.diff()
            )),
            None => log.warn("Composite has no video and audio pair to verify"),
        }
    }
}
