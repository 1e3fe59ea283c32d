use super::dto::{AssetResponse, ChunkUploadResponse, CompleteUploadRequest};
use super::service::AssetService;
use crate::common::download::file_response;
use crate::common::error::AppError;
use crate::common::response::{ApiResponse, ApiSuccess};
use crate::common::upload::stream_to_file;
use crate::infrastructure::ffmpeg::probe;
use crate::infrastructure::storage::local::safe_filename;
use crate::middleware::identity::ClientIdentity;
use crate::state::AppState;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::info;

#[utoipa::path(
    post,
    path = "/api/v1/assets/upload",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Asset stored", body = ApiResponse<AssetResponse>),
        (status = 400, description = "Unsupported format or MIME type"),
        (status = 413, description = "File too large"),
        (status = 429, description = "Rate limit exceeded"),
        (status = 503, description = "Conversion tools unavailable")
    ),
    tag = "Assets"
)]
pub async fn upload(
    State(state): State<AppState>,
    ClientIdentity(owner): ClientIdentity,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("missing filename".into()))?;
        let content_type = field.content_type().map(str::to_string);

        let (kind, format) =
            AssetService::validate_upload(&state, &filename, content_type.as_deref())?;
        // Missing tools must surface here, not inside a background job.
        probe::ensure_tools()?;

        let dest = state.storage.original_path(&filename);
        let size = stream_to_file(field, &dest).await?;
        AssetService::enforce_size(&state, size, &dest).await?;

        let asset =
            AssetService::register(&state, &owner, &filename, kind, format, dest, size).await?;
        return Ok(ApiSuccess(
            ApiResponse::success(asset, "Asset uploaded"),
            StatusCode::CREATED,
        ));
    }

    Err(AppError::Validation("no file field in multipart request".into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/assets/upload/chunk",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Chunk stored", body = ApiResponse<ChunkUploadResponse>),
        (status = 400, description = "Missing upload_id, chunk_index or chunk"),
        (status = 429, description = "Rate limit exceeded")
    ),
    tag = "Assets"
)]
pub async fn upload_chunk(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut upload_id: Option<String> = None;
    let mut chunk_index: Option<u32> = None;
    let mut payload: Option<bytes::Bytes> = None;

    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        match field.name() {
            Some("upload_id") => {
                upload_id = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("invalid upload_id field: {}", e))
                })?);
            }
            Some("chunk_index") => {
                let raw = field.text().await.map_err(|e| {
                    AppError::Validation(format!("invalid chunk_index field: {}", e))
                })?;
                chunk_index = Some(
                    raw.parse()
                        .map_err(|_| AppError::Validation("chunk_index must be a non-negative integer".into()))?,
                );
            }
            Some("chunk") => {
                payload = Some(field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("invalid chunk field: {}", e))
                })?);
            }
            _ => {}
        }
    }

    let upload_id = upload_id.ok_or_else(|| AppError::Validation("missing upload_id".into()))?;
    let chunk_index =
        chunk_index.ok_or_else(|| AppError::Validation("missing chunk_index".into()))?;
    let payload = payload.ok_or_else(|| AppError::Validation("missing chunk".into()))?;

    state
        .storage
        .write_chunk(&upload_id, chunk_index, &payload)
        .await?;

    Ok(ApiSuccess(
        ApiResponse::success(
            ChunkUploadResponse {
                upload_id,
                chunk_index,
            },
            "Chunk stored",
        ),
        StatusCode::OK,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/assets/upload/complete",
    request_body = CompleteUploadRequest,
    responses(
        (status = 201, description = "Chunks assembled into an asset", body = ApiResponse<AssetResponse>),
        (status = 400, description = "Unsupported format"),
        (status = 404, description = "Upload session not found"),
        (status = 413, description = "File too large"),
        (status = 429, description = "Rate limit exceeded"),
        (status = 503, description = "Conversion tools unavailable")
    ),
    tag = "Assets"
)]
pub async fn upload_complete(
    State(state): State<AppState>,
    ClientIdentity(owner): ClientIdentity,
    Json(req): Json<CompleteUploadRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("assembling upload session {} for {}", req.upload_id, owner);
    let asset = AssetService::complete_chunked(&state, &owner, req).await?;
    Ok(ApiSuccess(
        ApiResponse::success(asset, "Asset uploaded"),
        StatusCode::CREATED,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets",
    responses(
        (status = 200, description = "Caller's assets, newest first", body = ApiResponse<Vec<AssetResponse>>)
    ),
    tag = "Assets"
)]
pub async fn list(
    State(state): State<AppState>,
    ClientIdentity(owner): ClientIdentity,
) -> impl IntoResponse {
    let assets = AssetService::list(&state, &owner);
    ApiSuccess(
        ApiResponse::success(assets, "Assets retrieved"),
        StatusCode::OK,
    )
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/{id}/download",
    params(("id" = i64, Path, description = "Asset id")),
    responses(
        (status = 200, description = "Original file bytes"),
        (status = 404, description = "Asset not found")
    ),
    tag = "Assets"
)]
pub async fn download(
    State(state): State<AppState>,
    ClientIdentity(owner): ClientIdentity,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let asset = state
        .assets
        .get_owned(id, &owner)
        .ok_or(AppError::NotFound("asset"))?;
    file_response(&asset.path, &asset.original_filename, true).await
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/{id}/thumbnail",
    params(("id" = i64, Path, description = "Asset id")),
    responses(
        (status = 200, description = "Thumbnail image"),
        (status = 404, description = "Asset or thumbnail not found")
    ),
    tag = "Assets"
)]
pub async fn thumbnail(
    State(state): State<AppState>,
    ClientIdentity(owner): ClientIdentity,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let asset = state
        .assets
        .get_owned(id, &owner)
        .ok_or(AppError::NotFound("asset"))?;
    let path = asset.thumbnail_path.ok_or(AppError::NotFound("thumbnail"))?;
    let filename = safe_filename(&path);
    file_response(&path, &filename, false).await
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/{id}/preview",
    params(("id" = i64, Path, description = "Asset id")),
    responses(
        (status = 200, description = "Short preview clip"),
        (status = 404, description = "Asset or preview not found")
    ),
    tag = "Assets"
)]
pub async fn preview(
    State(state): State<AppState>,
    ClientIdentity(owner): ClientIdentity,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let asset = state
        .assets
        .get_owned(id, &owner)
        .ok_or(AppError::NotFound("asset"))?;
    let path = asset.preview_path.ok_or(AppError::NotFound("preview"))?;
    let filename = safe_filename(&path);
    file_response(&path, &filename, false).await
}
