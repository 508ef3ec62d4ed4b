//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps orchestration errors to HTTP status codes and JSON error bodies.
//! Internal error details are never returned to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use simq_artifacts::StoreError;
use simq_core::CoreError;
use simq_jobs::JobError;
use simq_queue::QueueError;
use thiserror::Error;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status code and machine-readable code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<JobError> for AppError {
    fn from(err: JobError) -> Self {
        match &err {
            JobError::NotFound(_)
            | JobError::UnknownOperation(_)
            | JobError::Queue(QueueError::NotFound(_))
            | JobError::Store(StoreError::NotFound(_))
            | JobError::Store(StoreError::ModelConfigNotFound(_))
            | JobError::Store(StoreError::PolicyNotFound(_)) => Self::NotFound(err.to_string()),
            JobError::Resolution(_) => Self::Validation(err.to_string()),
            JobError::Core(_) | JobError::Payload(_) => Self::BadRequest(err.to_string()),
            JobError::Store(_)
            | JobError::Queue(_)
            | JobError::Engine(_)
            | JobError::OperationMismatch { .. }
            | JobError::MissingModelConfig(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        Self::BadRequest(err.to_string())
    }
}
