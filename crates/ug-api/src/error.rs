//! API error handling
//!
//! Errors raised before the upload pipeline runs. They render in the same
//! envelope shape as pipeline outcomes, with a non-200 status.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ug_core::result::Outcome;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// The multipart stream could not be read
    Multipart { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Multipart { status, .. } => *status,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Multipart { message, .. } => message,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message(), self.status_code())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Multipart {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body: Outcome<()> = Outcome {
            success: false,
            message: self.message().to_string(),
            data: None,
            error: None,
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
