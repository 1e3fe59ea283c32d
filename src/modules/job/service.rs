use super::dto::{ConvertRequest, HistoryItem, JobResponse};
use super::model::{Job, JobStatus};
use crate::common::error::AppError;
use crate::infrastructure::ffmpeg::command::{is_image_format, is_video_format};
use crate::infrastructure::queue::jobs::ConvertMessage;
use crate::modules::asset::model::MediaKind;
use crate::state::AppState;
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing::info;

pub struct JobService;

impl JobService {
    fn validate_resolution(resolution: &str) -> Result<(), AppError> {
        let valid = resolution
            .split_once('x')
            .is_some_and(|(w, h)| w.parse::<u32>().is_ok_and(|w| w > 0) && h.parse::<u32>().is_ok_and(|h| h > 0));
        if valid {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "malformed resolution {:?}, expected WxH",
                resolution
            )))
        }
    }

    /// Validate the request against the source asset, create the record in
    /// `queued` state and hand it to the worker pool. Returns immediately;
    /// progress and terminal state are observed by polling the job.
    pub async fn create(
        state: &AppState,
        owner: &str,
        req: ConvertRequest,
    ) -> Result<JobResponse, AppError> {
        let asset = state
            .assets
            .get_owned(req.asset_id, owner)
            .ok_or(AppError::NotFound("asset"))?;

        let format = req.target_format.to_ascii_lowercase();
        let supported = match asset.kind {
            MediaKind::Video => is_video_format(&format),
            MediaKind::Image => is_image_format(&format),
        };
        if !supported {
            return Err(AppError::Validation(format!(
                "unsupported target format: {}",
                req.target_format
            )));
        }
        if let Some(resolution) = &req.target_resolution {
            Self::validate_resolution(resolution)?;
        }

        let now = OffsetDateTime::now_utc();
        let job = state.jobs.create(Job {
            id: 0,
            asset_id: asset.id,
            owner: owner.to_string(),
            target_format: format,
            target_resolution: req.target_resolution,
            target_bitrate: req.target_bitrate,
            target_fps: req.target_fps,
            target_codec: req.target_codec,
            quality: req.quality,
            keep_audio: req.keep_audio,
            strip_metadata: req.strip_metadata,
            status: JobStatus::Queued,
            progress: 0,
            output_path: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        });

        state.queue.publish(ConvertMessage { job_id: job.id }).await?;
        info!("job {} queued ({} -> {})", job.id, job.asset_id, job.target_format);

        Ok(job.into())
    }

    pub fn status(state: &AppState, owner: &str, id: i64) -> Result<JobResponse, AppError> {
        state
            .jobs
            .get_owned(id, owner)
            .map(JobResponse::from)
            .ok_or(AppError::NotFound("job"))
    }

    /// Jobs joined with their source assets, newest first. Jobs whose asset
    /// vanished are skipped rather than failing the whole listing.
    pub fn history(state: &AppState, owner: &str) -> Vec<HistoryItem> {
        state
            .jobs
            .list_by_owner(owner)
            .into_iter()
            .filter_map(|job| {
                let asset = state.assets.get(job.asset_id)?;
                Some(HistoryItem {
                    asset: asset.into(),
                    job: job.into(),
                })
            })
            .collect()
    }

    /// Resolve a completed job's output: the file path plus the suggested
    /// filename (final path segment; storage paths are never exposed).
    pub fn download(state: &AppState, owner: &str, id: i64) -> Result<(PathBuf, String), AppError> {
        let job = state
            .jobs
            .get_owned(id, owner)
            .ok_or(AppError::NotFound("job"))?;
        let path = match (job.status, job.output_path) {
            (JobStatus::Completed, Some(path)) => path,
            _ => return Err(AppError::NotFound("conversion output")),
        };
        let filename = crate::infrastructure::storage::local::safe_filename(&path);
        Ok((path, filename))
    }
}
