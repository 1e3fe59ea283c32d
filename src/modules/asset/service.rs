use super::dto::{AssetResponse, CompleteUploadRequest};
use super::model::{Asset, MediaKind};
use crate::common::error::AppError;
use crate::infrastructure::ffmpeg::command::{
    build_preview_args, build_thumbnail_args, is_image_format, is_video_format,
};
use crate::infrastructure::ffmpeg::{probe, runner};
use crate::state::AppState;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::{info, warn};

pub struct AssetService;

impl AssetService {
    fn extension_of(filename: &str) -> Result<String, AppError> {
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .ok_or_else(|| AppError::Validation("filename has no extension".into()))
    }

    /// Classify an upload by extension, rejecting unsupported formats before
    /// any bytes land on disk.
    pub fn classify(filename: &str) -> Result<(MediaKind, String), AppError> {
        let ext = Self::extension_of(filename)?;
        if is_video_format(&ext) {
            Ok((MediaKind::Video, ext))
        } else if is_image_format(&ext) {
            Ok((MediaKind::Image, ext))
        } else {
            Err(AppError::Validation(format!("unsupported file format: {}", ext)))
        }
    }

    pub fn validate_upload(
        state: &AppState,
        filename: &str,
        content_type: Option<&str>,
    ) -> Result<(MediaKind, String), AppError> {
        if let Some(mime) = content_type {
            if !state.config.allowed_mime(mime) {
                return Err(AppError::Validation(format!("unsupported MIME type: {}", mime)));
            }
        }
        Self::classify(filename)
    }

    /// Enforce the configured size cap, removing the stored file on breach.
    pub async fn enforce_size(state: &AppState, size: u64, path: &Path) -> Result<(), AppError> {
        if size > state.config.max_upload_bytes() {
            let _ = tokio::fs::remove_file(path).await;
            return Err(AppError::PayloadTooLarge);
        }
        Ok(())
    }

    /// Create the asset record for a file already on disk, probing it for
    /// resolution and duration. Derived artifacts are generated off the
    /// request path.
    pub async fn register(
        state: &AppState,
        owner: &str,
        original_filename: &str,
        kind: MediaKind,
        format: String,
        path: PathBuf,
        file_size: u64,
    ) -> Result<AssetResponse, AppError> {
        let info = probe::inspect(&path).await?;

        let asset = state.assets.create(Asset {
            id: 0,
            owner: owner.to_string(),
            kind,
            original_filename: original_filename.to_string(),
            original_format: format,
            resolution: info.resolution,
            duration_seconds: info.duration_seconds,
            file_size,
            path,
            thumbnail_path: None,
            preview_path: None,
            created_at: OffsetDateTime::now_utc(),
        });
        info!("asset {} registered ({} bytes) for {}", asset.id, file_size, owner);

        if asset.kind == MediaKind::Video {
            let state = state.clone();
            let asset_id = asset.id;
            tokio::spawn(async move {
                Self::generate_artifacts(&state, asset_id).await;
            });
        }

        Ok(asset.into())
    }

    pub async fn complete_chunked(
        state: &AppState,
        owner: &str,
        req: CompleteUploadRequest,
    ) -> Result<AssetResponse, AppError> {
        let (kind, format) = Self::classify(&req.original_filename)?;
        probe::ensure_tools()?;

        let (path, size) = state
            .storage
            .assemble_chunks(&req.upload_id, &req.original_filename)
            .await?;
        Self::enforce_size(state, size, &path).await?;

        Self::register(state, owner, &req.original_filename, kind, format, path, size).await
    }

    /// Thumbnail and preview clip for a freshly uploaded video. Failures are
    /// logged and leave the fields null; the asset itself is already usable.
    pub async fn generate_artifacts(state: &AppState, asset_id: i64) {
        let Some(mut asset) = state.assets.get(asset_id) else {
            return;
        };

        let thumbnail = state.storage.thumbnail_path(asset_id);
        match runner::run_to_completion(&build_thumbnail_args(&asset.path, &thumbnail)).await {
            Ok(()) => asset.thumbnail_path = Some(thumbnail),
            Err(e) => warn!("thumbnail generation failed for asset {}: {}", asset_id, e),
        }

        let preview = state.storage.preview_path(asset_id);
        match runner::run_to_completion(&build_preview_args(&asset.path, &preview)).await {
            Ok(()) => asset.preview_path = Some(preview),
            Err(e) => warn!("preview generation failed for asset {}: {}", asset_id, e),
        }

        state.assets.update(asset);
    }

    pub fn list(state: &AppState, owner: &str) -> Vec<AssetResponse> {
        state
            .assets
            .list_by_owner(owner)
            .into_iter()
            .map(AssetResponse::from)
            .collect()
    }
}
