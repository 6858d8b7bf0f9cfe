//! HTTP mapping of [`AppError`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use shared_utils::{AppError, ErrorKind};
use tracing::{error, warn};

/// Error returned by handlers; renders as `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn status_for(error: &AppError) -> StatusCode {
    match error {
        AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        other => match other.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Conversion | ErrorKind::Filesystem => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        let status = status_for(&e);
        if status.is_server_error() {
            error!(error = %e, kind = %e.kind(), "Request failed");
        } else {
            warn!(error = %e, status = status.as_u16(), "Request rejected");
        }
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&AppError::MissingFile), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&AppError::PayloadTooLarge { limit_bytes: 10 }),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            status_for(&AppError::NotFound("x.jpg".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&AppError::Encode("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&AppError::io(
                "outputs",
                std::io::Error::from(std::io::ErrorKind::PermissionDenied)
            )),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_message_is_display_text() {
        let api: ApiError = AppError::MissingFile.into();
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
        assert_eq!(api.message(), "No files provided");
    }
}
