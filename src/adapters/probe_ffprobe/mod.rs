//! FFprobe adapter for media file probing
//!
//! Runs `ffprobe -v error [-select_streams <sel>] -show_entries <entries> -of json <file>`
//! and hands back the parsed JSON document.

use std::ffi::OsString;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::adapters::process::run_tool;
use crate::domain::errors::*;
use crate::ports::*;

/// FFprobe-based probe adapter
pub struct FfprobeAdapter {
    program: PathBuf,
}

impl FfprobeAdapter {
    /// Create new FFprobe adapter
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Command line for a request, without the program name
    pub fn build_args(request: &ProbeRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-v".into(), "error".into()];
        if let Some(selector) = &request.selector {
            args.push("-select_streams".into());
            args.push(selector.into());
        }
        args.push("-show_entries".into());
        args.push(request.entries.clone().into());
        args.push("-of".into());
        args.push("json".into());
        args.push(request.path.clone().into_os_string());
        args
    }

    /// Classify raw stdout into JSON or a tagged failure
    pub fn parse_output(stdout: &[u8]) -> Result<serde_json::Value, ProbeFailure> {
        let text = String::from_utf8_lossy(stdout);
        if text.trim().is_empty() {
            return Err(ProbeFailure::new(
                ProbeFailureKind::EmptyOutput,
                "ffprobe returned no output",
            ));
        }
        serde_json::from_str(&text).map_err(|e| {
            ProbeFailure::new(
                ProbeFailureKind::ParseError,
                format!("Error parsing ffprobe output: {}", e),
            )
        })
    }
}

#[async_trait]
impl ProbePort for FfprobeAdapter {
    async fn probe(&self, request: &ProbeRequest) -> Result<serde_json::Value, ProbeFailure> {
        let output = run_tool(&self.program, &Self::build_args(request), request.timeout).await?;
        Self::parse_output(&output.stdout)
    }
}
