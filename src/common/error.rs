use crate::common::response::ApiError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Error taxonomy for the conversion service. Synchronous request errors map
/// to HTTP responses; the worker records the background variants as job
/// failure causes instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("external tool missing: {0}")]
    ExternalToolMissing(String),

    #[error("upload session not found: {0}")]
    SessionNotFound(String),

    #[error("rate limit exceeded")]
    RateLimitExceeded,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("file too large")]
    PayloadTooLarge,

    #[error("conversion tool failed: {0}")]
    Subprocess(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ExternalToolMissing(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Subprocess(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Internal(anyhow::Error::new(e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(ref cause) = self {
            tracing::error!("internal error: {:#}", cause);
        }
        ApiError(self.to_string(), self.status()).into_response()
    }
}
