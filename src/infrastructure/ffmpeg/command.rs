//! Declarative construction of ffmpeg invocations.

use std::path::Path;

pub const VIDEO_FORMATS: &[&str] = &["mp4", "mkv", "webm", "avi", "mov"];
pub const IMAGE_FORMATS: &[&str] = &["jpg", "jpeg", "png", "webp"];

pub fn is_video_format(format: &str) -> bool {
    VIDEO_FORMATS.contains(&format)
}

pub fn is_image_format(format: &str) -> bool {
    IMAGE_FORMATS.contains(&format)
}

/// Per-container codec defaults, applied only where the job carries no
/// explicit override.
struct FormatDefaults {
    video_codec: Option<&'static str>,
    audio_codec: Option<&'static str>,
    pix_fmt: Option<&'static str>,
    /// Containers that support a streaming-friendly layout always get it.
    faststart: bool,
}

fn defaults_for(format: &str) -> FormatDefaults {
    match format {
        "mp4" | "mov" => FormatDefaults {
            video_codec: Some("libx264"),
            audio_codec: Some("aac"),
            pix_fmt: Some("yuv420p"),
            faststart: true,
        },
        "mkv" | "avi" => FormatDefaults {
            video_codec: Some("libx264"),
            audio_codec: Some("aac"),
            pix_fmt: Some("yuv420p"),
            faststart: false,
        },
        "webm" => FormatDefaults {
            video_codec: Some("libvpx-vp9"),
            audio_codec: Some("libopus"),
            pix_fmt: None,
            faststart: false,
        },
        _ => FormatDefaults {
            video_codec: None,
            audio_codec: None,
            pix_fmt: None,
            faststart: false,
        },
    }
}

/// Per-job knobs overlaid on the format defaults. Explicit values always win.
#[derive(Debug, Clone, Default)]
pub struct ConversionOptions {
    pub resolution: Option<String>,
    pub bitrate: Option<String>,
    pub fps: Option<String>,
    pub codec: Option<String>,
    pub keep_audio: bool,
    pub strip_metadata: bool,
}

/// "WxH" as validated at the API boundary, rewritten into the `w:h` form the
/// scale filter expects.
fn scale_filter(resolution: &str) -> String {
    format!("scale={}", resolution.replace('x', ":"))
}

pub fn build_conversion_args(
    input: &Path,
    output: &Path,
    target_format: &str,
    options: &ConversionOptions,
) -> Vec<String> {
    let defaults = defaults_for(target_format);
    let mut args: Vec<String> = vec!["-y".into(), "-i".into(), input.display().to_string()];

    if let Some(resolution) = &options.resolution {
        args.push("-vf".into());
        args.push(scale_filter(resolution));
    }
    if let Some(fps) = &options.fps {
        args.push("-r".into());
        args.push(fps.clone());
    }
    if let Some(bitrate) = &options.bitrate {
        args.push("-b:v".into());
        args.push(bitrate.clone());
    }
    match (&options.codec, defaults.video_codec) {
        (Some(codec), _) => {
            args.push("-c:v".into());
            args.push(codec.clone());
        }
        (None, Some(codec)) => {
            args.push("-c:v".into());
            args.push(codec.into());
        }
        (None, None) => {}
    }
    if let Some(pix_fmt) = defaults.pix_fmt {
        args.push("-pix_fmt".into());
        args.push(pix_fmt.into());
    }
    if !options.keep_audio {
        args.push("-an".into());
    } else if let Some(audio) = defaults.audio_codec {
        args.push("-c:a".into());
        args.push(audio.into());
    }
    if options.strip_metadata {
        args.push("-map_metadata".into());
        args.push("-1".into());
    }
    if defaults.faststart {
        args.push("-movflags".into());
        args.push("+faststart".into());
    }

    args.push(output.display().to_string());
    args
}

/// quality 10..=95 → jpeg qscale 31 (worst) .. 2 (best).
fn jpeg_qscale(quality: u8) -> u8 {
    let quality = quality.clamp(10, 95) as u32;
    (31 - (quality - 10) * 29 / 85) as u8
}

pub fn build_image_args(
    input: &Path,
    output: &Path,
    target_format: &str,
    resolution: Option<&str>,
    quality: Option<u8>,
) -> Vec<String> {
    let mut args: Vec<String> = vec!["-y".into(), "-i".into(), input.display().to_string()];

    if let Some(resolution) = resolution {
        args.push("-vf".into());
        args.push(scale_filter(resolution));
    }
    if let Some(quality) = quality {
        match target_format {
            "jpg" | "jpeg" => {
                args.push("-q:v".into());
                args.push(jpeg_qscale(quality).to_string());
            }
            "webp" => {
                args.push("-quality".into());
                args.push(quality.clamp(10, 95).to_string());
            }
            // png is lossless; the knob has nothing to act on.
            _ => {}
        }
    }

    args.push(output.display().to_string());
    args
}

/// Single frame at the one-second mark.
pub fn build_thumbnail_args(input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".into(),
        "-i".into(),
        input.display().to_string(),
        "-ss".into(),
        "00:00:01.000".into(),
        "-vframes".into(),
        "1".into(),
        output.display().to_string(),
    ]
}

/// First five seconds, re-encoded for in-browser playback.
pub fn build_preview_args(input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".into(),
        "-i".into(),
        input.display().to_string(),
        "-t".into(),
        "5".into(),
        "-c:v".into(),
        "libx264".into(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-c:a".into(),
        "aac".into(),
        "-movflags".into(),
        "+faststart".into(),
        output.display().to_string(),
    ]
}
