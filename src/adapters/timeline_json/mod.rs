//! JSON project timeline adapter
//!
//! A minimal timeline host over a JSON document of channel-stacked strips.
//! Movie and sound strips reference media files; meta strips group other
//! strips and span every channel their members cover.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::{ChannelAllocator, Reconciler};
use crate::ports::*;
use crate::probe::MediaProber;

/// Frame rate of a project created without an explicit rate
pub const DEFAULT_PROJECT_FPS: f64 = 30.0;

/// What a strip holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StripBody {
    Movie { filepath: PathBuf },
    Sound { filepath: PathBuf },
    Meta { members: Vec<u64>, span: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strip {
    pub id: u64,
    pub name: String,
    pub channel: i64,
    pub frame_start: i64,
    pub frame_final_duration: i64,
    /// Owning meta strip, if grouped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
    #[serde(flatten)]
    pub body: StripBody,
}

impl Strip {
    fn kind(&self) -> Option<ArtifactKind> {
        match self.body {
            StripBody::Movie { .. } => Some(ArtifactKind::Video),
            StripBody::Sound { .. } => Some(ArtifactKind::Audio),
            StripBody::Meta { .. } => None,
        }
    }

    fn span(&self) -> i64 {
        match self.body {
            StripBody::Meta { span, .. } => span,
            _ => 1,
        }
    }

    fn end_frame(&self) -> i64 {
        self.frame_start + self.frame_final_duration - 1
    }
}

/// The persisted project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    pub project_fps: f64,
    #[serde(default)]
    pub strips: Vec<Strip>,
}

impl ProjectDocument {
    pub fn new(project_fps: f64) -> Self {
        Self {
            project_fps,
            strips: Vec::new(),
        }
    }

    fn next_id(&self) -> u64 {
        self.strips.iter().map(|s| s.id).max().unwrap_or(0) + 1
    }

    fn strip(&self, id: u64) -> Result<&Strip, DomainError> {
        self.strips
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| DomainError::PlacementFailed(format!("No strip with id {}", id)))
    }

    fn strip_mut(&mut self, id: u64) -> Result<&mut Strip, DomainError> {
        self.strips
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| DomainError::PlacementFailed(format!("No strip with id {}", id)))
    }

    fn meta_members(&self, id: u64) -> Result<Vec<u64>, DomainError> {
        match &self.strip(id)?.body {
            StripBody::Meta { members, .. } => Ok(members.clone()),
            _ => Err(DomainError::GroupingFailed(format!(
                "Strip {} is not a meta strip",
                id
            ))),
        }
    }

    /// Highest channel covered by a top-level strip
    pub fn max_occupied_channel(&self) -> i64 {
        self.strips
            .iter()
            .filter(|s| s.parent.is_none())
            .map(|s| ChannelAllocator::strip_end_channel(s.channel, s.span()))
            .max()
            .unwrap_or(0)
    }

    /// `name` if no other strip uses it, otherwise the first free
    /// `name.001`, `name.002`, ...
    pub fn unique_name(&self, name: &str, except: u64) -> String {
        let taken = |candidate: &str| {
            self.strips
                .iter()
                .any(|s| s.id != except && s.name == candidate)
        };
        if !taken(name) {
            return name.to_string();
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}.{:03}", name, n);
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Meta strip carrying `name`
    pub fn find_meta(&self, name: &str) -> Option<&Strip> {
        self.strips
            .iter()
            .find(|s| s.name == name && matches!(s.body, StripBody::Meta { .. }))
    }
}

/// Timeline host backed by a JSON project file
pub struct JsonTimelineAdapter {
    path: PathBuf,
    document: Mutex<ProjectDocument>,
    prober: MediaProber,
}

impl JsonTimelineAdapter {
    /// Load `path`, or start an empty project when it does not exist yet.
    /// `fps_override` replaces the stored project rate.
    pub fn open(
        path: impl Into<PathBuf>,
        fps_override: Option<f64>,
        prober: MediaProber,
    ) -> Result<Self, DomainError> {
        let path = path.into();
        let mut document = if path.exists() {
            Self::load(&path)?
        } else {
            debug!("Creating new project document at {}", path.display());
            ProjectDocument::new(DEFAULT_PROJECT_FPS)
        };

        if let Some(fps) = fps_override {
            document.project_fps = fps;
        }
        if !document.project_fps.is_finite() || document.project_fps <= 0.0 {
            return Err(DomainError::BadArgs(format!(
                "Project frame rate must be positive, got {}",
                document.project_fps
            )));
        }

        Ok(Self {
            path,
            document: Mutex::new(document),
            prober,
        })
    }

    /// Read a project document without building an adapter
    pub fn load(path: &Path) -> Result<ProjectDocument, DomainError> {
        let text = fs::read_to_string(path).map_err(|e| {
            DomainError::FsFail(format!("Failed to read project {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            DomainError::FsFail(format!("Invalid project document {}: {}", path.display(), e))
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the current document
    pub fn snapshot(&self) -> Result<ProjectDocument, DomainError> {
        Ok(self.doc()?.clone())
    }

    fn doc(&self) -> Result<MutexGuard<'_, ProjectDocument>, DomainError> {
        self.document
            .lock()
            .map_err(|_| DomainError::PlacementFailed("Project document lock poisoned".to_string()))
    }

    async fn add_media_strip(
        &self,
        path: &Path,
        name: &str,
        channel: i64,
        frame_start: i64,
        kind: ArtifactKind,
    ) -> Result<ClipHandle, DomainError> {
        let seconds = self
            .prober
            .probe_artifact_duration(path, kind)
            .await
            .map_err(|e| DomainError::PlacementFailed(format!("{}: {}", path.display(), e)))?
            .ok_or_else(|| {
                DomainError::PlacementFailed(format!(
                    "Could not determine duration of {}",
                    path.display()
                ))
            })?;

        let mut doc = self.doc()?;
        let duration = Reconciler::frames_for(seconds, doc.project_fps);
        if duration <= 0 {
            return Err(DomainError::PlacementFailed(format!(
                "{} has no frames",
                path.display()
            )));
        }

        let id = doc.next_id();
        let body = match kind {
            ArtifactKind::Video => StripBody::Movie {
                filepath: path.to_path_buf(),
            },
            ArtifactKind::Audio => StripBody::Sound {
                filepath: path.to_path_buf(),
            },
        };
        doc.strips.push(Strip {
            id,
            name: name.to_string(),
            channel,
            frame_start,
            frame_final_duration: duration,
            parent: None,
            body,
        });
        debug!(
            "Added {} strip '{}' on channel {} ({} frames)",
            kind, name, channel, duration
        );
        Ok(ClipHandle(id))
    }
}

#[async_trait]
impl TimelinePort for JsonTimelineAdapter {
    async fn create_video_clip(
        &self,
        path: &Path,
        name: &str,
        channel: i64,
        frame_start: i64,
    ) -> Result<ClipHandle, DomainError> {
        self.add_media_strip(path, name, channel, frame_start, ArtifactKind::Video)
            .await
    }

    async fn create_audio_clip(
        &self,
        path: &Path,
        name: &str,
        channel: i64,
        frame_start: i64,
    ) -> Result<ClipHandle, DomainError> {
        self.add_media_strip(path, name, channel, frame_start, ArtifactKind::Audio)
            .await
    }

    async fn get_duration(&self, clip: ClipHandle) -> Result<i64, DomainError> {
        Ok(self.doc()?.strip(clip.0)?.frame_final_duration)
    }

    async fn frame_start(&self, clip: ClipHandle) -> Result<i64, DomainError> {
        Ok(self.doc()?.strip(clip.0)?.frame_start)
    }

    async fn set_end_frame(&self, clip: ClipHandle, frame: i64) -> Result<(), DomainError> {
        let mut doc = self.doc()?;
        let strip = doc.strip_mut(clip.0)?;
        let duration = frame - strip.frame_start + 1;
        if duration <= 0 {
            return Err(DomainError::PlacementFailed(format!(
                "End frame {} precedes start frame {}",
                frame, strip.frame_start
            )));
        }
        strip.frame_final_duration = duration;
        Ok(())
    }

    async fn channel(&self, clip: ClipHandle) -> Result<i64, DomainError> {
        Ok(self.doc()?.strip(clip.0)?.channel)
    }

    async fn set_channel(&self, clip: ClipHandle, channel: i64) -> Result<(), DomainError> {
        if channel < 1 {
            return Err(DomainError::PlacementFailed(format!(
                "Invalid channel {}",
                channel
            )));
        }
        self.doc()?.strip_mut(clip.0)?.channel = channel;
        Ok(())
    }

    async fn group(&self, clips: &[ClipHandle]) -> Result<GroupHandle, DomainError> {
        if clips.is_empty() {
            return Err(DomainError::GroupingFailed(
                "Nothing to group".to_string(),
            ));
        }

        let mut doc = self.doc()?;
        let mut members = Vec::with_capacity(clips.len());
        for clip in clips {
            let strip = doc
                .strip(clip.0)
                .map_err(|e| DomainError::GroupingFailed(e.to_string()))?;
            if strip.parent.is_some() {
                return Err(DomainError::GroupingFailed(format!(
                    "Strip '{}' is already grouped",
                    strip.name
                )));
            }
            members.push(strip.clone());
        }

        let low = members.iter().map(|s| s.channel).min().unwrap_or(1);
        let high = members.iter().map(|s| s.channel).max().unwrap_or(low);
        let start = members.iter().map(|s| s.frame_start).min().unwrap_or(0);
        let end = members.iter().map(|s| s.end_frame()).max().unwrap_or(start);

        let id = doc.next_id();
        for strip in doc.strips.iter_mut() {
            if clips.iter().any(|c| c.0 == strip.id) {
                strip.parent = Some(id);
            }
        }
        doc.strips.push(Strip {
            id,
            name: format!("MetaStrip_{}", id),
            channel: low,
            frame_start: start,
            frame_final_duration: end - start + 1,
            parent: None,
            body: StripBody::Meta {
                members: clips.iter().map(|c| c.0).collect(),
                span: high - low + 1,
            },
        });
        Ok(GroupHandle(id))
    }

    async fn rename_group(&self, group: GroupHandle, name: &str) -> Result<String, DomainError> {
        let mut doc = self.doc()?;
        doc.meta_members(group.0)?;
        let assigned = doc.unique_name(name, group.0);
        doc.strip_mut(group.0)?.name = assigned.clone();
        Ok(assigned)
    }

    async fn group_channel(&self, group: GroupHandle) -> Result<i64, DomainError> {
        let doc = self.doc()?;
        doc.meta_members(group.0)?;
        Ok(doc.strip(group.0)?.channel)
    }

    async fn set_group_channel(
        &self,
        group: GroupHandle,
        channel: i64,
    ) -> Result<(), DomainError> {
        if channel < 1 {
            return Err(DomainError::GroupingFailed(format!(
                "Invalid channel {}",
                channel
            )));
        }
        let mut doc = self.doc()?;
        let members = doc.meta_members(group.0)?;
        let meta = doc.strip_mut(group.0)?;
        let offset = channel - meta.channel;
        meta.channel = channel;
        for member in members {
            doc.strip_mut(member)?.channel += offset;
        }
        Ok(())
    }

    async fn group_member_durations(
        &self,
        group: GroupHandle,
    ) -> Result<Vec<(ArtifactKind, i64)>, DomainError> {
        let doc = self.doc()?;
        let mut durations = Vec::new();
        for member in doc.meta_members(group.0)? {
            let strip = doc.strip(member)?;
            if let Some(kind) = strip.kind() {
                durations.push((kind, strip.frame_final_duration));
            }
        }
        Ok(durations)
    }

    async fn project_frame_rate(&self) -> Result<f64, DomainError> {
        Ok(self.doc()?.project_fps)
    }

    async fn max_occupied_channel(&self) -> Result<i64, DomainError> {
        Ok(self.doc()?.max_occupied_channel())
    }

    async fn find_group(&self, name: &str) -> Result<Option<GroupHandle>, DomainError> {
        Ok(self.doc()?.find_meta(name).map(|s| GroupHandle(s.id)))
    }

    async fn commit(&self) -> Result<(), DomainError> {
        let json = {
            let doc = self.doc()?;
            serde_json::to_string_pretty(&*doc).map_err(|e| {
                DomainError::FsFail(format!("Failed to serialize project: {}", e))
            })?
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let fail = |e: std::io::Error| {
            DomainError::FsFail(format!(
                "Failed to write project {}: {}",
                self.path.display(),
                e
            ))
        };

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(fail)?;
        tmp.write_all(json.as_bytes()).map_err(fail)?;
        tmp.persist(&self.path).map_err(|e| fail(e.error))?;
        info!("Saved project {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests;
