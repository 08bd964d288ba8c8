//! HTTP error type for the front-end.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nutshell_core::Error;

/// Error wrapper for converting core and rendering errors to HTTP responses.
///
/// Client errors answer with their plain-text message. Server errors are
/// logged and answer with a generic body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] Error),
    #[error("template error: {0}")]
    Render(#[from] minijinja::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(Error::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Core(Error::Validation(v)) => {
                StatusCode::from_u16(v.status).unwrap_or(StatusCode::BAD_REQUEST)
            }
            ApiError::Core(Error::KeyExists { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Core(Error::Store(_) | Error::Config(_)) | ApiError::Render(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            return (status, "Internal Server Error".to_string()).into_response();
        }
        (status, self.to_string()).into_response()
    }
}
