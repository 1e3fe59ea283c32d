use super::dto::{ConvertRequest, HistoryItem, JobResponse};
use super::service::JobService;
use crate::common::download::file_response;
use crate::common::error::AppError;
use crate::common::response::{ApiResponse, ApiSuccess};
use crate::middleware::identity::ClientIdentity;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use validator::Validate;

#[utoipa::path(
    post,
    path = "/api/v1/jobs",
    request_body = ConvertRequest,
    responses(
        (status = 201, description = "Job queued", body = ApiResponse<JobResponse>),
        (status = 400, description = "Unsupported format or malformed parameters"),
        (status = 404, description = "Asset not found"),
        (status = 429, description = "Rate limit exceeded")
    ),
    tag = "Jobs"
)]
pub async fn create(
    State(state): State<AppState>,
    ClientIdentity(owner): ClientIdentity,
    Json(req): Json<ConvertRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let job = JobService::create(&state, &owner, req).await?;
    Ok(ApiSuccess(
        ApiResponse::success(job, "Conversion job queued"),
        StatusCode::CREATED,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}",
    params(("id" = i64, Path, description = "Job id")),
    responses(
        (status = 200, description = "Current job snapshot", body = ApiResponse<JobResponse>),
        (status = 404, description = "Job not found")
    ),
    tag = "Jobs"
)]
pub async fn status(
    State(state): State<AppState>,
    ClientIdentity(owner): ClientIdentity,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let job = JobService::status(&state, &owner, id)?;
    Ok(ApiSuccess(
        ApiResponse::success(job, "Job retrieved"),
        StatusCode::OK,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs",
    responses(
        (status = 200, description = "Caller's conversion history, newest first", body = ApiResponse<Vec<HistoryItem>>)
    ),
    tag = "Jobs"
)]
pub async fn history(
    State(state): State<AppState>,
    ClientIdentity(owner): ClientIdentity,
) -> impl IntoResponse {
    let items = JobService::history(&state, &owner);
    ApiSuccess(
        ApiResponse::success(items, "History retrieved"),
        StatusCode::OK,
    )
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}/download",
    params(("id" = i64, Path, description = "Job id")),
    responses(
        (status = 200, description = "Converted output bytes"),
        (status = 404, description = "Job not found or not completed")
    ),
    tag = "Jobs"
)]
pub async fn download(
    State(state): State<AppState>,
    ClientIdentity(owner): ClientIdentity,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let (path, filename) = JobService::download(&state, &owner, id)?;
    file_response(&path, &filename, true).await
}
