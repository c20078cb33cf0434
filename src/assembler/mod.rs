//! Composite assembly on the timeline host
//!
//! Places the video artifact, checks the length the host realized, stacks the
//! audio artifacts above it, then moves everything above existing content and
//! groups it into one named composite.

use std::sync::Arc;

use tracing::debug;

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::{ChannelAllocator, DurationCheck, DurationVerdict};
use crate::ports::TimelinePort;

pub mod verifier;

pub use verifier::CompositeVerifier;

/// Every clip starts here
pub const FRAME_START: i64 = 1;

/// Temporary channel of the video clip; audio stacks above it
const STAGING_CHANNEL: i64 = 1;

/// What the assembler left on the timeline
#[derive(Debug, Clone, PartialEq)]
pub enum AssemblyOutcome {
    /// Video and at least one audio clip, grouped and named
    Composite(CompositeUnit),
    /// Clips placed but the host would not group them
    Ungrouped { channel: i64, clips: Vec<PlacedClip> },
    /// No audio clip made it onto the timeline
    VideoOnly { video: PlacedClip },
}

impl AssemblyOutcome {
    pub fn audio_track_count(&self) -> usize {
        match self {
            AssemblyOutcome::Composite(unit) => unit.audio_member_count(),
            AssemblyOutcome::Ungrouped { clips, .. } => clips
                .iter()
                .filter(|c| c.kind == ArtifactKind::Audio)
                .count(),
            AssemblyOutcome::VideoOnly { .. } => 0,
        }
    }
}

/// Builds one composite per import
pub struct CompositeAssembler {
    timeline: Arc<dyn TimelinePort>,
}

impl CompositeAssembler {
    pub fn new(timeline: Arc<dyn TimelinePort>) -> Self {
        Self { timeline }
    }

    /// Only a rejected video clip is an error; everything after that degrades
    /// to warnings.
    pub async fn assemble(
        &self,
        video: &ExtractedArtifact,
        audio: &[ExtractedArtifact],
        timing: &ReconciledTiming,
        base_name: &str,
        log: &mut ReportLog,
    ) -> Result<AssemblyOutcome, DomainError> {
        let max_occupied = self.timeline.max_occupied_channel().await?;
        let channel_base = ChannelAllocator::next_free_channel(max_occupied);
        debug!(
            "Highest occupied channel is {}, composite goes to {}",
            max_occupied, channel_base
        );

        let video_clip = self.place_video(video, timing, base_name, log).await?;
        let mut placed = vec![video_clip];

        let mut next_channel = STAGING_CHANNEL + 1;
        for artifact in audio {
            let label = artifact.label.clone().unwrap_or_else(|| "Track".to_string());
            let name = format!("Audio_{}_{}", label, base_name);
            match self
                .timeline
                .create_audio_clip(artifact.path(), &name, next_channel, FRAME_START)
                .await
            {
                Ok(handle) => {
                    let duration = match self.timeline.get_duration(handle).await {
                        Ok(duration) => duration,
                        Err(e) => {
                            log.warn(format!("Could not read duration of '{}': {}", name, e));
                            0
                        }
                    };
                    placed.push(PlacedClip {
                        handle,
                        kind: ArtifactKind::Audio,
                        artifact: artifact.clone(),
                        channel: next_channel,
                        frame_start: FRAME_START,
                        frame_final_duration: duration,
                    });
                    next_channel += 1;
                }
                Err(e) => {
                    log.warn(format!(
                        "Failed to import audio track {}: {}",
                        artifact.source_stream_index.as_deref().unwrap_or("?"),
                        e
                    ));
                }
            }
        }

        if placed.len() == 1 {
            let mut video = placed.remove(0);
            if let Err(e) = self.timeline.set_channel(video.handle, channel_base).await {
                log.warn(format!("Could not move video to channel {}: {}", channel_base, e));
            } else {
                video.channel = channel_base;
            }
            return Ok(AssemblyOutcome::VideoOnly { video });
        }

        self.shift_to_base(&mut placed, channel_base, log).await;
        self.group(placed, channel_base, base_name, log).await
    }

    async fn place_video(
        &self,
        video: &ExtractedArtifact,
        timing: &ReconciledTiming,
        base_name: &str,
        log: &mut ReportLog,
    ) -> Result<PlacedClip, DomainError> {
        let handle = self
            .timeline
            .create_video_clip(video.path(), base_name, STAGING_CHANNEL, FRAME_START)
            .await
            .map_err(|e| match e {
                DomainError::PlacementFailed(_) => e,
                other => DomainError::PlacementFailed(other.to_string()),
            })?;

        let target = timing.target_frame_count;
        let mut realized = self.timeline.get_duration(handle).await?;
        log.info(format!(
            "Host imported video with {} frames, expected {} frames",
            realized, target
        ));

        match DurationCheck::evaluate(realized, target) {
            DurationVerdict::WithinTolerance => {
                log.info(format!("Video duration is correct: {} frames", realized));
            }
            DurationVerdict::Mismatch { .. } => {
                log.warn(format!(
                    "Duration mismatch persists: imported={}, expected={}",
                    realized, target
                ));
            }
            DurationVerdict::AdjustRequired { .. } => {
                log.warn(format!(
                    "Duration mismatch persists: imported={}, expected={}",
                    realized, target
                ));
                log.info("Attempting manual duration adjustment...");
                match self.adjust_end(handle, target).await {
                    Ok(adjusted) => {
                        realized = adjusted;
                        log.info(format!(
                            "Adjusted video clip duration to {} frames",
                            adjusted
                        ));
                    }
                    Err(e) => log.warn(format!("Could not adjust video clip duration: {}", e)),
                }
            }
        }

        Ok(PlacedClip {
            handle,
            kind: ArtifactKind::Video,
            artifact: video.clone(),
            channel: STAGING_CHANNEL,
            frame_start: FRAME_START,
            frame_final_duration: realized,
        })
    }

    async fn adjust_end(&self, handle: ClipHandle, target: i64) -> Result<i64, DomainError> {
        let start = self.timeline.frame_start(handle).await?;
        self.timeline
            .set_end_frame(handle, DurationCheck::corrected_end_frame(start, target))
            .await?;
        self.timeline.get_duration(handle).await
    }

    async fn shift_to_base(&self, placed: &mut [PlacedClip], channel_base: i64, log: &mut ReportLog) {
        let channels: Vec<i64> = placed.iter().map(|c| c.channel).collect();
        let offset = ChannelAllocator::shift_offset(channel_base, &channels);
        if offset == 0 {
            return;
        }
        // Highest clip first when moving up
        let mut order: Vec<usize> = (0..placed.len()).collect();
        if offset > 0 {
            order.reverse();
        }
        for i in order {
            let clip = &mut placed[i];
            let target = clip.channel + offset;
            match self.timeline.set_channel(clip.handle, target).await {
                Ok(()) => clip.channel = target,
                Err(e) => log.warn(format!(
                    "Could not move {} clip to channel {}: {}",
                    clip.kind, target, e
                )),
            }
        }
    }

    async fn group(
        &self,
        placed: Vec<PlacedClip>,
        channel_base: i64,
        base_name: &str,
        log: &mut ReportLog,
    ) -> Result<AssemblyOutcome, DomainError> {
        log.info("Creating composite...");
        let handles: Vec<ClipHandle> = placed.iter().map(|c| c.handle).collect();
        let group = match self.timeline.group(&handles).await {
            Ok(group) => group,
            Err(e) => {
                log.warn(format!("Composite creation failed: {}", e));
                return Ok(AssemblyOutcome::Ungrouped {
                    channel: channel_base,
                    clips: placed,
                });
            }
        };

        let requested = format!("Meta_{}", base_name);
        let name = match self.timeline.rename_group(group, &requested).await {
            Ok(assigned) => {
                if assigned != requested {
                    log.info(format!(
                        "Composite name '{}' is taken, using '{}'",
                        requested, assigned
                    ));
                }
                assigned
            }
            Err(e) => {
                log.warn(format!("Could not rename composite: {}", e));
                requested
            }
        };

        let mut channel = match self.timeline.group_channel(group).await {
            Ok(channel) => channel,
            Err(e) => {
                log.warn(format!(
                    "Could not read composite channel, assuming {}: {}",
                    channel_base, e
                ));
                channel_base
            }
        };
        if channel != channel_base {
            match self.timeline.set_group_channel(group, channel_base).await {
                Ok(()) => channel = channel_base,
                Err(e) => log.warn(format!(
                    "Could not move composite to channel {}: {}",
                    channel_base, e
                )),
            }
        }

        let verifier = CompositeVerifier::new(self.timeline.clone());
        match verifier.verify(group).await {
            Ok(durations) => CompositeVerifier::report(durations, log),
            Err(e) => log.warn(format!("Could not verify composite durations: {}", e)),
        }

        let unit = CompositeUnit {
            handle: group,
            name,
            channel,
            members: placed,
        };
        log.info(format!(
            "Created composite '{}' with video and {} audio track(s).",
            unit.name,
            unit.audio_member_count()
        ));
        Ok(AssemblyOutcome::Composite(unit))
    }
}
