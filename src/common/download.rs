use crate::common::error::AppError;
use axum::body::Body;
use axum::http::header;
use axum::response::Response;
use std::path::Path;
use tokio_util::io::ReaderStream;

/// Stream a stored file back to the client. Only the suggested filename is
/// exposed; storage paths never leave the service.
pub async fn file_response(
    path: &Path,
    filename: &str,
    attachment: bool,
) -> Result<Response, AppError> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|_| AppError::NotFound("file"))?;

    let content_type = mime_guess::from_path(path).first_or_octet_stream();
    let disposition = if attachment {
        format!("attachment; filename=\"{}\"", filename)
    } else {
        format!("inline; filename=\"{}\"", filename)
    };

    let body = Body::from_stream(ReaderStream::new(file));
    Response::builder()
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(body)
        .map_err(|e| AppError::Internal(anyhow::Error::new(e)))
}
