use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use time::OffsetDateTime;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
}

/// A stored source file. Immutable after creation except for the derived
/// artifact paths, which a background task fills in after upload.
#[derive(Debug, Clone)]
pub struct Asset {
    pub id: i64,
    pub owner: String,
    pub kind: MediaKind,
    pub original_filename: String,
    pub original_format: String,
    pub resolution: Option<String>,
    pub duration_seconds: Option<f64>,
    pub file_size: u64,
    pub path: PathBuf,
    pub thumbnail_path: Option<PathBuf>,
    pub preview_path: Option<PathBuf>,
    pub created_at: OffsetDateTime,
}
