use super::model::{Job, JobStatus};
use crate::modules::asset::dto::AssetResponse;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ConvertRequest {
    pub asset_id: i64,
    pub target_format: String,
    /// "WxH", e.g. "1280x720".
    pub target_resolution: Option<String>,
    pub target_bitrate: Option<String>,
    pub target_fps: Option<String>,
    pub target_codec: Option<String>,
    /// Image jobs only.
    #[validate(range(min = 10, max = 95))]
    pub quality: Option<u8>,
    #[serde(default)]
    pub keep_audio: bool,
    #[serde(default)]
    pub strip_metadata: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JobResponse {
    pub id: i64,
    pub asset_id: i64,
    pub target_format: String,
    pub target_resolution: Option<String>,
    pub target_bitrate: Option<String>,
    pub target_fps: Option<String>,
    pub target_codec: Option<String>,
    pub quality: Option<u8>,
    pub status: JobStatus,
    pub progress: u8,
    pub download_url: Option<String>,
    pub error_message: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[schema(value_type = String, format = DateTime)]
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        let download_url = match job.status {
            JobStatus::Completed => Some(format!("/api/v1/jobs/{}/download", job.id)),
            _ => None,
        };
        Self {
            id: job.id,
            asset_id: job.asset_id,
            target_format: job.target_format,
            target_resolution: job.target_resolution,
            target_bitrate: job.target_bitrate,
            target_fps: job.target_fps,
            target_codec: job.target_codec,
            quality: job.quality,
            status: job.status,
            progress: job.progress,
            download_url,
            error_message: job.error_message,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryItem {
    pub asset: AssetResponse,
    pub job: JobResponse,
}
