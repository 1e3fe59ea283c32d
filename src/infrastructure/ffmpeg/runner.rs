//! ffmpeg subprocess execution.

use crate::common::error::AppError;
use super::probe::FFMPEG_BIN;
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::process::{Child, Command};

/// Launch ffmpeg with stderr piped so progress lines can be read while the
/// process runs. stdin is closed to keep a confused tool from blocking on a
/// prompt.
pub fn spawn_ffmpeg(args: &[String]) -> Result<Child, AppError> {
    Command::new(FFMPEG_BIN)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                AppError::ExternalToolMissing(FFMPEG_BIN.to_string())
            } else {
                AppError::Internal(anyhow::Error::new(e))
            }
        })
}

/// Run ffmpeg to completion without progress reporting. Used for jobs with
/// no usable duration and for thumbnail/preview generation.
pub async fn run_to_completion(args: &[String]) -> Result<(), AppError> {
    let output = Command::new(FFMPEG_BIN)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                AppError::ExternalToolMissing(FFMPEG_BIN.to_string())
            } else {
                AppError::Internal(anyhow::Error::new(e))
            }
        })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(AppError::Subprocess(exit_message(
            output.status.code(),
            &String::from_utf8_lossy(&output.stderr),
        )))
    }
}

/// Best-effort diagnostic from an exit code and captured stderr, trimmed to
/// the tail where ffmpeg prints the actual cause.
pub fn exit_message(code: Option<i32>, stderr: &str) -> String {
    let tail: Vec<&str> = stderr
        .lines()
        .rev()
        .filter(|l| !l.trim().is_empty())
        .take(3)
        .collect();
    let tail: Vec<&str> = tail.into_iter().rev().collect();
    match code {
        Some(code) => format!("exit code {}: {}", code, tail.join(" | ")),
        None => format!("terminated by signal: {}", tail.join(" | ")),
    }
}
