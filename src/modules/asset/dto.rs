use super::model::{Asset, MediaKind};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct AssetResponse {
    pub id: i64,
    pub kind: MediaKind,
    pub original_filename: String,
    pub original_format: String,
    pub resolution: Option<String>,
    pub duration_seconds: Option<f64>,
    pub file_size: u64,
    pub has_thumbnail: bool,
    pub has_preview: bool,
    #[schema(value_type = String, format = DateTime)]
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Asset> for AssetResponse {
    fn from(asset: Asset) -> Self {
        Self {
            id: asset.id,
            kind: asset.kind,
            original_filename: asset.original_filename,
            original_format: asset.original_format,
            resolution: asset.resolution,
            duration_seconds: asset.duration_seconds,
            file_size: asset.file_size,
            has_thumbnail: asset.thumbnail_path.is_some(),
            has_preview: asset.preview_path.is_some(),
            created_at: asset.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChunkUploadResponse {
    pub upload_id: String,
    pub chunk_index: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CompleteUploadRequest {
    pub upload_id: String,
    pub original_filename: String,
}
