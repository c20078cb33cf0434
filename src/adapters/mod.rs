// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod fs_local;
pub mod probe_ffprobe;
pub mod process;
pub mod timeline_json;
pub mod toml_config;

// Re-export adapters
pub use exec_ffmpeg::FfmpegAdapter;
pub use fs_local::FsLocalAdapter;
pub use probe_ffprobe::FfprobeAdapter;
pub use timeline_json::JsonTimelineAdapter;
pub use toml_config::TomlConfigAdapter;
