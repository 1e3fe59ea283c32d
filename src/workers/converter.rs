use crate::common::error::AppError;
use crate::infrastructure::ffmpeg::command::{ConversionOptions, build_conversion_args, build_image_args};
use crate::infrastructure::ffmpeg::{probe, progress, runner};
use crate::infrastructure::queue::jobs::ConvertMessage;
use crate::modules::asset::model::{Asset, MediaKind};
use crate::modules::job::model::Job;
use crate::state::AppState;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tracing::{error, info};

/// How many trailing stderr lines to keep for the failure diagnostic.
const STDERR_TAIL: usize = 24;

/// Start the conversion worker pool. Workers share one queue receiver and
/// run until the process exits.
pub fn spawn_workers(state: AppState) {
    for worker_id in 0..state.config.convert_workers.max(1) {
        let state = state.clone();
        tokio::spawn(run_worker(state, worker_id));
    }
}

async fn run_worker(state: AppState, worker_id: usize) {
    info!("conversion worker {} started", worker_id);
    let rx = state.queue.receiver();
    while let Ok(msg) = rx.recv().await {
        process(&state, msg).await;
    }
    info!("conversion worker {} stopped, queue closed", worker_id);
}

/// Run one job end to end. Every failure is caught here and recorded on the
/// job record; nothing escapes to kill the worker, so one job's failure
/// never affects another's.
pub async fn process(state: &AppState, msg: ConvertMessage) {
    // Job or asset deleted between enqueue and claim: nothing to mutate.
    let Some(job) = state.jobs.get(msg.job_id) else {
        return;
    };
    let Some(asset) = state.assets.get(job.asset_id) else {
        return;
    };

    if !state.jobs.set_processing(job.id) {
        return;
    }

    match run_job(state, &job, &asset).await {
        Ok(output) => {
            state.jobs.complete(job.id, output);
            info!("job {} completed", job.id);
        }
        Err(e) => {
            error!("job {} failed: {}", job.id, e);
            state.jobs.fail(job.id, e.to_string());
        }
    }
}

async fn run_job(state: &AppState, job: &Job, asset: &Asset) -> Result<PathBuf, AppError> {
    probe::ensure_tools()?;

    let output = state.storage.converted_path(job.id, &job.target_format);
    match asset.kind {
        MediaKind::Image => {
            let args = build_image_args(
                &asset.path,
                &output,
                &job.target_format,
                job.target_resolution.as_deref(),
                job.quality,
            );
            // No duration to correlate against: progress jumps straight to
            // the terminal value when the tool exits.
            runner::run_to_completion(&args).await?;
        }
        MediaKind::Video => {
            let options = ConversionOptions {
                resolution: job.target_resolution.clone(),
                bitrate: job.target_bitrate.clone(),
                fps: job.target_fps.clone(),
                codec: job.target_codec.clone(),
                keep_audio: job.keep_audio,
                strip_metadata: job.strip_metadata,
            };
            let args = build_conversion_args(&asset.path, &output, &job.target_format, &options);
            transcode_with_progress(state, job, asset.duration_seconds, &args).await?;
        }
    }

    Ok(output)
}

/// Spawn the transcoder and follow its stderr line by line, turning embedded
/// timestamps into progress writes. Reading the pipe is the only suspension
/// point; the job record is updated after each parsed line and once more at
/// exit.
async fn transcode_with_progress(
    state: &AppState,
    job: &Job,
    duration_seconds: Option<f64>,
    args: &[String],
) -> Result<(), AppError> {
    let mut child = runner::spawn_ffmpeg(args)?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("ffmpeg stderr not captured")))?;

    let deadline = match state.config.convert_timeout_secs {
        0 => None,
        secs => Some(Instant::now() + std::time::Duration::from_secs(secs)),
    };

    let mut lines = BufReader::new(stderr).lines();
    let mut tail: Vec<String> = Vec::new();

    loop {
        let next = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, lines.next_line()).await {
                Ok(result) => result,
                Err(_) => {
                    let _ = child.kill().await;
                    return Err(AppError::Subprocess(format!(
                        "timed out after {}s",
                        state.config.convert_timeout_secs
                    )));
                }
            },
            None => lines.next_line().await,
        };

        let Some(line) = next? else {
            break;
        };

        if !line.trim().is_empty() {
            if tail.len() == STDERR_TAIL {
                tail.remove(0);
            }
            tail.push(line.clone());
        }

        if let Some(elapsed) = progress::parse_timestamp(&line) {
            if let Some(pct) = progress::percent(elapsed, duration_seconds) {
                state.jobs.set_progress(job.id, pct);
            }
        }
    }

    let status = child.wait().await?;
    if status.success() {
        Ok(())
    } else {
        Err(AppError::Subprocess(runner::exit_message(
            status.code(),
            &tail.join("\n"),
        )))
    }
}
