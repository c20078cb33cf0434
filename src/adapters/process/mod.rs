//! Bounded execution of external tools
//!
//! Every probe and conversion goes through [`run_tool`]: one attempt, a hard
//! wall-clock limit, stdout/stderr captured. A child that outlives its limit
//! is killed when its future is dropped.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::error::{ToolError, ToolResult};

/// Display name of a tool for messages (file name, not the full path)
pub fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| program.display().to_string())
}

/// Run `program args...` once, failing on spawn error, timeout or non-zero exit
pub async fn run_tool(program: &Path, args: &[OsString], timeout: Duration) -> ToolResult<Output> {
    let tool = tool_name(program);
    debug!("Running {} {:?} (timeout {}s)", tool, args, timeout.as_secs());

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                ToolError::NotFound { tool: tool.clone() }
            }
            _ => ToolError::Io {
                tool: tool.clone(),
                source: e,
            },
        })?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|e| ToolError::Io {
            tool: tool.clone(),
            source: e,
        })?,
        Err(_) => {
            return Err(ToolError::Timeout {
                tool,
                seconds: timeout.as_secs(),
            })
        }
    };

    if !output.status.success() {
        return Err(ToolError::NonZeroExit {
            tool,
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[tokio::test]
    async fn test_missing_binary_is_not_found() {
        let err = run_tool(
            Path::new("/definitely/not/a/real/tool"),
            &[],
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ToolError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_non_zero_exit_captures_stderr() {
        let err = run_tool(
            Path::new("sh"),
            &args(&["-c", "echo broken >&2; exit 3"]),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        match err {
            ToolError::NonZeroExit { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let err = run_tool(
            Path::new("sh"),
            &args(&["-c", "sleep 5"]),
            Duration::from_millis(200),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ToolError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_success_returns_stdout() {
        let output = run_tool(
            Path::new("sh"),
            &args(&["-c", "printf ok"]),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
        assert_eq!(output.stdout, b"ok");
    }

    #[test]
    fn test_tool_name_uses_file_name() {
        assert_eq!(tool_name(Path::new("/opt/bin/ffprobe")), "ffprobe");
        assert_eq!(tool_name(Path::new("ffmpeg")), "ffmpeg");
    }
}
