use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use time::OffsetDateTime;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One conversion request. Created `Queued` synchronously with the request
/// that submits it; afterwards mutated only by the worker that claims it,
/// through the repository's transition methods.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: i64,
    pub asset_id: i64,
    pub owner: String,
    pub target_format: String,
    pub target_resolution: Option<String>,
    pub target_bitrate: Option<String>,
    pub target_fps: Option<String>,
    pub target_codec: Option<String>,
    pub quality: Option<u8>,
    pub keep_audio: bool,
    pub strip_metadata: bool,
    pub status: JobStatus,
    pub progress: u8,
    pub output_path: Option<PathBuf>,
    pub error_message: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
