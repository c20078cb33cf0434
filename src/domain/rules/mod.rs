// Domain rules - Timing reconciliation and tolerance policies

use crate::domain::errors::*;
use crate::domain::model::*;

/// Rates closer than this are treated as equal
pub const FRAMERATE_EPSILON: f64 = 0.01;

/// Allowed drift between `nb_frames` and duration x rate before warning
pub const FRAME_COUNT_TOLERANCE: u64 = 2;

/// Host-realized video duration may drift this far without a warning
pub const PLACEMENT_WARN_TOLERANCE: i64 = 2;

/// Beyond this drift the assembler rewrites the clip's end frame
pub const PLACEMENT_ADJUST_THRESHOLD: i64 = 5;

/// Video vs. longest audio inside a composite
pub const COMPOSITE_TOLERANCE: i64 = 1;

/// Decides the authoritative timing of an import
pub struct Reconciler;

impl Reconciler {
    /// Reconcile probed facts against the project framerate.
    ///
    /// `target_frame_count` is always `round(duration * project_fps)`, whatever
    /// the source rate. Video and every audio track are cut to that one length.
    pub fn reconcile(
        info: &ProbedVideoInfo,
        project_fps: f64,
    ) -> Result<ReconciledTiming, DomainError> {
        if !project_fps.is_finite() || project_fps <= 0.0 {
            return Err(DomainError::BadArgs(format!(
                "Project frame rate must be positive, got {}",
                project_fps
            )));
        }

        let duration = info
            .best_duration()
            .ok_or(DomainError::DurationUndeterminable)?;

        let frame_count_warning = Self::check_frame_count(info, duration);
        let target_frame_count = Self::frames_for(duration, project_fps);

        Ok(ReconciledTiming {
            source_duration_seconds: duration,
            target_frame_count,
            needs_framerate_conversion: Self::needs_conversion(info.frame_rate, project_fps),
            project_fps,
            source_frame_rate: info.frame_rate,
            frame_count_warning,
        })
    }

    /// `round(seconds * fps)`
    pub fn frames_for(seconds: f64, fps: f64) -> i64 {
        (seconds * fps).round() as i64
    }

    /// Unknown source rate never forces a conversion
    pub fn needs_conversion(source_rate: Option<f64>, project_fps: f64) -> bool {
        match source_rate {
            Some(rate) => (rate - project_fps).abs() > FRAMERATE_EPSILON,
            None => false,
        }
    }

    fn check_frame_count(info: &ProbedVideoInfo, duration: f64) -> Option<FrameCountMismatch> {
        let metadata = info.frame_count?;
        let rate = info.frame_rate?;
        let calculated = (duration * rate).round().max(0.0) as u64;
        if metadata.abs_diff(calculated) > FRAME_COUNT_TOLERANCE {
            Some(FrameCountMismatch {
                metadata,
                calculated,
            })
        } else {
            None
        }
    }
}

/// Verdict on a host-realized clip duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationVerdict {
    /// Within 2 frames
    WithinTolerance,
    /// 3 to 5 frames off: warn, keep the clip as is
    Mismatch { deviation: i64 },
    /// More than 5 frames off: warn and rewrite the end frame
    AdjustRequired { deviation: i64 },
}

pub struct DurationCheck;

impl DurationCheck {
    pub fn evaluate(realized: i64, target: i64) -> DurationVerdict {
        let deviation = (realized - target).abs();
        if deviation <= PLACEMENT_WARN_TOLERANCE {
            DurationVerdict::WithinTolerance
        } else if deviation <= PLACEMENT_ADJUST_THRESHOLD {
            DurationVerdict::Mismatch { deviation }
        } else {
            DurationVerdict::AdjustRequired { deviation }
        }
    }

    /// End frame that makes a clip starting at `frame_start` exactly `target` long
    pub fn corrected_end_frame(frame_start: i64, target: i64) -> i64 {
        frame_start + target - 1
    }
}

/// Result of comparing the members of a composite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeDurations {
    pub video: i64,
    pub max_audio: i64,
}

impl CompositeDurations {
    /// None when the composite has no video or no audio member
    pub fn from_members(members: &[(ArtifactKind, i64)]) -> Option<Self> {
        let video = members
            .iter()
            .find(|(kind, _)| *kind == ArtifactKind::Video)
            .map(|(_, d)| *d)?;
        let max_audio = members
            .iter()
            .filter(|(kind, _)| *kind == ArtifactKind::Audio)
            .map(|(_, d)| *d)
            .max()?;
        Some(Self { video, max_audio })
    }

    pub fn diff(&self) -> i64 {
        (self.video - self.max_audio).abs()
    }

    pub fn is_consistent(&self) -> bool {
        self.diff() <= COMPOSITE_TOLERANCE
    }
}

/// Channel bookkeeping for composite placement
pub struct ChannelAllocator;

impl ChannelAllocator {
    /// First free channel above everything already on the timeline
    pub fn next_free_channel(max_occupied: i64) -> i64 {
        max_occupied.max(0) + 1
    }

    /// Highest channel a strip covers. Composites span `span` channels.
    pub fn strip_end_channel(channel: i64, span: i64) -> i64 {
        channel + span.max(1) - 1
    }

    /// Offset that moves the lowest placed channel onto `base`
    pub fn shift_offset(base: i64, placed_channels: &[i64]) -> i64 {
        match placed_channels.iter().min() {
            Some(min) => base - min,
            None => 0,
        }
    }
}
