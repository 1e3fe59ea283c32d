//! ffprobe-based media inspection.

use crate::common::error::AppError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;

pub const FFMPEG_BIN: &str = "ffmpeg";
pub const FFPROBE_BIN: &str = "ffprobe";

fn find_in_path(bin: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(bin);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Verify both external tools are resolvable on PATH. Called on every upload
/// so a missing installation surfaces synchronously, not inside a background
/// job hours later.
pub fn ensure_tools() -> Result<(), AppError> {
    let missing: Vec<&str> = [FFMPEG_BIN, FFPROBE_BIN]
        .into_iter()
        .filter(|bin| find_in_path(bin).is_none())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::ExternalToolMissing(missing.join(", ")))
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    streams: Option<Vec<FfprobeStream>>,
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Clone, Default)]
pub struct MediaInfo {
    pub resolution: Option<String>,
    pub duration_seconds: Option<f64>,
}

fn parse_probe_json(json: &str) -> MediaInfo {
    let Ok(output) = serde_json::from_str::<FfprobeOutput>(json) else {
        return MediaInfo::default();
    };

    let stream = output.streams.as_ref().and_then(|s| s.first());
    let resolution = stream.and_then(|s| match (s.width, s.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Some(format!("{}x{}", w, h)),
        _ => None,
    });

    // Stream duration first, format duration as fallback (matroska often
    // reports it only at container level).
    let duration_seconds = stream
        .and_then(|s| s.duration.as_deref())
        .or(output.format.as_ref().and_then(|f| f.duration.as_deref()))
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| *d > 0.0);

    MediaInfo {
        resolution,
        duration_seconds,
    }
}

/// Inspect a media file. A probe that exits non-zero or emits malformed JSON
/// yields an empty `MediaInfo` rather than an error: an unknown duration just
/// means no intermediate progress can be computed for jobs on this asset.
pub async fn inspect(path: &Path) -> Result<MediaInfo, AppError> {
    ensure_tools()?;

    let output = Command::new(FFPROBE_BIN)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,duration:format=duration",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .await?;

    if !output.status.success() {
        return Ok(MediaInfo::default());
    }

    Ok(parse_probe_json(&String::from_utf8_lossy(&output.stdout)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_probe_output_parsed() {
        let json = r#"{
            "streams": [{"width": 1920, "height": 1080, "duration": "120.000000"}],
            "format": {"duration": "120.033000"}
        }"#;
        let info = parse_probe_json(json);
        assert_eq!(info.resolution.as_deref(), Some("1920x1080"));
        assert_eq!(info.duration_seconds, Some(120.0));
    }

    #[test]
    fn format_duration_fallback() {
        let json = r#"{
            "streams": [{"width": 1280, "height": 720}],
            "format": {"duration": "33.5"}
        }"#;
        let info = parse_probe_json(json);
        assert_eq!(info.resolution.as_deref(), Some("1280x720"));
        assert_eq!(info.duration_seconds, Some(33.5));
    }

    #[test]
    fn malformed_json_yields_empty_info() {
        let info = parse_probe_json("not json at all");
        assert!(info.resolution.is_none());
        assert!(info.duration_seconds.is_none());
    }

    #[test]
    fn missing_streams_yield_no_resolution() {
        let info = parse_probe_json(r#"{"streams": [], "format": {}}"#);
        assert!(info.resolution.is_none());
        assert!(info.duration_seconds.is_none());
    }
}
