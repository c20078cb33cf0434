use super::*;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Reports a fixed duration per file, nothing for unknown files
struct DurationTable(HashMap<PathBuf, f64>);

#[async_trait]
impl ProbePort for DurationTable {
    async fn probe(&self, request: &ProbeRequest) -> Result<serde_json::Value, ProbeFailure> {
        match self.0.get(&request.path) {
            Some(d) => Ok(json!({ "streams": [{ "duration": d.to_string() }] })),
            None => Ok(json!({ "streams": [], "format": {} })),
        }
    }
}

fn adapter(dir: &TempDir, durations: &[(&str, f64)], fps: Option<f64>) -> JsonTimelineAdapter {
    let table = durations
        .iter()
        .map(|(name, d)| (PathBuf::from(name), *d))
        .collect();
    let prober = MediaProber::new(Arc::new(DurationTable(table)), Duration::from_secs(5));
    JsonTimelineAdapter::open(dir.path().join("project.json"), fps, prober).unwrap()
}

#[tokio::test]
async fn test_realized_duration_from_probe() {
    let dir = TempDir::new().unwrap();
    let timeline = adapter(&dir, &[("v.mp4", 10.0), ("a.wav", 9.98)], Some(30.0));

    let video = timeline
        .create_video_clip(Path::new("v.mp4"), "V", 1, 1)
        .await
        .unwrap();
    let audio = timeline
        .create_audio_clip(Path::new("a.wav"), "A", 2, 1)
        .await
        .unwrap();

    assert_eq!(timeline.get_duration(video).await.unwrap(), 300);
    assert_eq!(timeline.get_duration(audio).await.unwrap(), 299);
}

#[tokio::test]
async fn test_unknown_duration_rejects_clip() {
    let dir = TempDir::new().unwrap();
    let timeline = adapter(&dir, &[], None);

    let err = timeline
        .create_video_clip(Path::new("missing.mp4"), "V", 1, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::PlacementFailed(_)));
    assert_eq!(timeline.max_occupied_channel().await.unwrap(), 0);
}

#[tokio::test]
async fn test_set_end_frame_is_inclusive() {
    let dir = TempDir::new().unwrap();
    let timeline = adapter(&dir, &[("v.mp4", 10.0)], Some(25.0));
    let clip = timeline
        .create_video_clip(Path::new("v.mp4"), "V", 1, 1)
        .await
        .unwrap();

    timeline.set_end_frame(clip, 1 + 240 - 1).await.unwrap();
    assert_eq!(timeline.get_duration(clip).await.unwrap(), 240);
    assert!(timeline.set_end_frame(clip, 0).await.is_err());
}

#[tokio::test]
async fn test_meta_strip_spans_member_channels() {
    let dir = TempDir::new().unwrap();
    let timeline = adapter(&dir, &[("v.mp4", 4.0), ("a.wav", 4.0)], Some(30.0));

    let video = timeline
        .create_video_clip(Path::new("v.mp4"), "V", 1, 1)
        .await
        .unwrap();
    let a1 = timeline
        .create_audio_clip(Path::new("a.wav"), "A1", 2, 1)
        .await
        .unwrap();
    let a2 = timeline
        .create_audio_clip(Path::new("a.wav"), "A2", 3, 1)
        .await
        .unwrap();

    let group = timeline.group(&[video, a1, a2]).await.unwrap();
    timeline.rename_group(group, "Meta_v").await.unwrap();
    timeline.set_group_channel(group, 5).await.unwrap();

    assert_eq!(timeline.group_channel(group).await.unwrap(), 5);
    assert_eq!(timeline.channel(a2).await.unwrap(), 7);
    assert_eq!(timeline.max_occupied_channel().await.unwrap(), 7);
    assert_eq!(timeline.find_group("Meta_v").await.unwrap(), Some(group));

    let durations = timeline.group_member_durations(group).await.unwrap();
    assert_eq!(
        durations,
        vec![
            (ArtifactKind::Video, 120),
            (ArtifactKind::Audio, 120),
            (ArtifactKind::Audio, 120)
        ]
    );
}

#[tokio::test]
async fn test_grouping_twice_is_rejected() {
    let dir = TempDir::new().unwrap();
    let timeline = adapter(&dir, &[("v.mp4", 1.0)], None);
    let clip = timeline
        .create_video_clip(Path::new("v.mp4"), "V", 1, 1)
        .await
        .unwrap();

    timeline.group(&[clip]).await.unwrap();
    let err = timeline.group(&[clip]).await.unwrap_err();
    assert!(matches!(err, DomainError::GroupingFailed(_)));
    assert!(matches!(
        timeline.group(&[]).await,
        Err(DomainError::GroupingFailed(_))
    ));
}

#[tokio::test]
async fn test_commit_and_reload() {
    let dir = TempDir::new().unwrap();
    let timeline = adapter(&dir, &[("v.mp4", 2.0)], Some(24.0));
    timeline
        .create_video_clip(Path::new("v.mp4"), "V", 3, 1)
        .await
        .unwrap();
    timeline.commit().await.unwrap();

    let reloaded = JsonTimelineAdapter::load(timeline.path()).unwrap();
    assert_eq!(reloaded.project_fps, 24.0);
    assert_eq!(reloaded.strips.len(), 1);
    assert_eq!(reloaded.strips[0].frame_final_duration, 48);
    assert_eq!(reloaded.max_occupied_channel(), 3);

    let raw = fs::read_to_string(timeline.path()).unwrap();
    assert!(raw.contains("\"type\": \"movie\""));
}

#[test]
fn test_existing_project_keeps_its_rate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("project.json");
    fs::write(&path, r#"{ "project_fps": 25.0, "strips": [] }"#).unwrap();

    let prober = MediaProber::new(
        Arc::new(DurationTable(HashMap::new())),
        Duration::from_secs(5),
    );
    let timeline = JsonTimelineAdapter::open(&path, None, prober).unwrap();
    assert_eq!(timeline.snapshot().unwrap().project_fps, 25.0);
}

#[test]
fn test_fps_flag_replaces_stored_rate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("project.json");
    fs::write(&path, r#"{ "project_fps": 25.0, "strips": [] }"#).unwrap();

    let prober = MediaProber::new(
        Arc::new(DurationTable(HashMap::new())),
        Duration::from_secs(5),
    );
    let timeline = JsonTimelineAdapter::open(&path, Some(50.0), prober).unwrap();
    assert_eq!(timeline.snapshot().unwrap().project_fps, 50.0);
}

#[tokio::test]
async fn test_duplicate_composite_names_get_suffix() {
    let dir = TempDir::new().unwrap();
    let timeline = adapter(&dir, &[("v.mp4", 1.0)], None);

    let mut names = Vec::new();
    for channel in [1, 2, 3] {
        let clip = timeline
            .create_video_clip(Path::new("v.mp4"), "V", channel, 1)
            .await
            .unwrap();
        let group = timeline.group(&[clip]).await.unwrap();
        names.push(timeline.rename_group(group, "Meta_v").await.unwrap());
    }
    assert_eq!(names, vec!["Meta_v", "Meta_v.001", "Meta_v.002"]);

    // Renaming a composite to its own name keeps it
    let first = timeline.find_group("Meta_v").await.unwrap().unwrap();
    assert_eq!(timeline.rename_group(first, "Meta_v").await.unwrap(), "Meta_v");
    assert!(timeline.find_group("Meta_v.001").await.unwrap().is_some());
}

#[test]
fn test_invalid_project_rate_is_rejected() {
    let dir = TempDir::new().unwrap();
    let prober = MediaProber::new(
        Arc::new(DurationTable(HashMap::new())),
        Duration::from_secs(5),
    );
    let result = JsonTimelineAdapter::open(dir.path().join("p.json"), Some(0.0), prober);
    assert!(matches!(result, Err(DomainError::BadArgs(_))));
}
