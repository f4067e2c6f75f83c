use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::{NameError, StorageError};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `NOT_FOUND`,
    /// `CONFLICT`, `PAYLOAD_TOO_LARGE`, `STORAGE_ERROR`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub error: &'static str,
    /// Human-readable error description.
    #[schema(example = "Title is required")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    /// Duplicate title. Reported as 400 like other input problems.
    Conflict(String),
    /// Upload larger than the configured limit (bytes).
    PayloadTooLarge {
        limit: u64,
    },
    /// Disk I/O failure while writing an upload.
    Storage(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::PayloadTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody {
                    error: "PAYLOAD_TOO_LARGE",
                    message: format!("File must be at most {} bytes", limit),
                },
            ),
            AppError::Storage(detail) => {
                tracing::error!("Storage error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "STORAGE_ERROR",
                        message: "Failed to store the uploaded file".into(),
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("A gallery entry with this title already exists".into())
            }
            _ => AppError::Internal(err.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::SizeLimitExceeded { limit, .. } => AppError::PayloadTooLarge { limit },
            StorageError::NotFound(name) => AppError::NotFound(format!("File '{name}' not found")),
            other => AppError::Storage(other.to_string()),
        }
    }
}

impl From<NameError> for AppError {
    fn from(err: NameError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl AppError {
    /// Convert a multipart parsing error, given the upload limit in force.
    pub fn from_multipart(err: MultipartError, limit: u64) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge { limit };
        }
        AppError::Validation(format!("Multipart error: {}", err.body_text()))
    }
}
