use crate::api::ErrorResponse;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use foodgram_core::CoreError;

/// Handler failure. Wraps core errors so handlers can use `?` and still
/// answer with the shared JSON error body.
#[derive(Debug)]
pub enum ApiError {
    Core(CoreError),
    /// Malformed query parameters or request bodies the core never sees.
    BadRequest(String),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Core(err)
    }
}

/// Bodies that are not JSON, or carry a field of the wrong type, get the same
/// 400 and error body as a failed validation.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        let core = match self {
            ApiError::Core(core) => core,
            ApiError::BadRequest(_) => return StatusCode::BAD_REQUEST,
        };
        match core {
            CoreError::Validation(_) | CoreError::AlreadyExists(_) | CoreError::MarkMissing(_) => {
                StatusCode::BAD_REQUEST
            }
            CoreError::Unauthorized => StatusCode::UNAUTHORIZED,
            CoreError::Forbidden => StatusCode::FORBIDDEN,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Conflict(_) => StatusCode::CONFLICT,
            CoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(message) => message,
            ApiError::Core(CoreError::Storage(detail)) => {
                tracing::error!(error = %detail, "storage failure");
                "Internal server error".to_string()
            }
            ApiError::Core(other) => {
                if let CoreError::Unavailable(detail) = &other {
                    tracing::warn!(error = %detail, "service unavailable");
                }
                other.to_string()
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
