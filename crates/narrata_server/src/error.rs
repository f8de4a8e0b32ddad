//! Mapping workspace errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use narrata_error::{NarrataError, NarrataErrorKind, PipelineErrorKind, StorageErrorKind};
use serde_json::json;

/// An error response: a status code and a message, rendered as
/// `{"error": message}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// An error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 404 with the given message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 409 with the given message.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Status code for a workspace error.
pub fn status_for(err: &NarrataError) -> StatusCode {
    match err.kind() {
        NarrataErrorKind::Pipeline(e) => match &e.kind {
            PipelineErrorKind::ProjectNotFound(_) => StatusCode::NOT_FOUND,
            PipelineErrorKind::AlreadyRunning(_) => StatusCode::CONFLICT,
            PipelineErrorKind::NoSourceText(_) | PipelineErrorKind::InvalidConcurrency(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
        NarrataErrorKind::Storage(e) if matches!(e.kind, StorageErrorKind::NotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        NarrataErrorKind::Json(_) | NarrataErrorKind::Builder(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<NarrataError> for ApiError {
    fn from(err: NarrataError) -> Self {
        let status = status_for(&err);
        // Pipeline kinds carry a readable message; the rest keep their location.
        let message = match err.pipeline_kind() {
            Some(kind) => kind.to_string(),
            None => err.to_string(),
        };
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "Request failed");
        } else {
            tracing::debug!(status = %self.status, error = %self.message, "Request rejected");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
