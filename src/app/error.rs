use crate::utils::error::{ScanError, UploadError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

pub const PROCESSING_FAILED: &str = "File processing failed";
pub const FILE_TOO_LARGE: &str = "File too large";

/// JSON error body: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

/// HTTP-facing errors. Internal details are logged, never sent to the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    BadRequest(#[from] UploadError),

    #[error("File too large")]
    PayloadTooLarge,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::BadRequest(e) => e.to_string(),
            ApiError::PayloadTooLarge => FILE_TOO_LARGE.to_string(),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "Upload processing error");
                PROCESSING_FAILED.to_string()
            }
        };

        (self.status(), Json(ErrorBody { error: message })).into_response()
    }
}

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::UploadError(e) => ApiError::BadRequest(e),
            ScanError::PayloadTooLarge { .. } => ApiError::PayloadTooLarge,
            other => ApiError::Internal(format!(
                "{} (category: {:?}, severity: {:?})",
                other,
                other.category(),
                other.severity()
            )),
        }
    }
}
