use utoipa::OpenApi;

use crate::modules::asset::dto::{AssetResponse, ChunkUploadResponse, CompleteUploadRequest};
use crate::modules::asset::model::MediaKind;
use crate::modules::job::dto::{ConvertRequest, HistoryItem, JobResponse};
use crate::modules::job::model::JobStatus;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::asset::handler::upload,
        crate::modules::asset::handler::upload_chunk,
        crate::modules::asset::handler::upload_complete,
        crate::modules::asset::handler::list,
        crate::modules::asset::handler::download,
        crate::modules::asset::handler::thumbnail,
        crate::modules::asset::handler::preview,
        crate::modules::job::handler::create,
        crate::modules::job::handler::status,
        crate::modules::job::handler::history,
        crate::modules::job::handler::download,
    ),
    components(
        schemas(
            AssetResponse, ChunkUploadResponse, CompleteUploadRequest, MediaKind,
            ConvertRequest, JobResponse, HistoryItem, JobStatus,
        )
    ),
    tags(
        (name = "Assets", description = "Media upload and retrieval"),
        (name = "Jobs", description = "Conversion job pipeline")
    )
)]
pub struct ApiDoc;
