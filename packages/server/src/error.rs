use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

use crate::content::ContentError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`,
    /// `INTEGRITY_VIOLATION`, `TOKEN_MISSING`, `TOKEN_INVALID`,
    /// `PERMISSION_DENIED`, `NOT_FOUND`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Either content or image must be provided")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    /// The request references a record that belongs to something else.
    IntegrityViolation(String),
    TokenMissing,
    TokenInvalid,
    PermissionDenied,
    NotFound(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::IntegrityViolation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "INTEGRITY_VIOLATION",
                    message: msg,
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Invalid or expired token".into(),
                },
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "PERMISSION_DENIED",
                    message: "Insufficient permissions".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
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
        AppError::Internal(err.to_string())
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::NotFound(msg) => AppError::NotFound(msg),
            ContentError::IntegrityViolation(msg) => {
                tracing::warn!("Rejected restore: {msg}");
                AppError::IntegrityViolation(msg)
            }
            ContentError::Storage(e) => e.into(),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) => AppError::NotFound(format!("Media '{name}' not found")),
            StorageError::InvalidReference(msg) => {
                AppError::Validation(format!("Invalid media reference: {msg}"))
            }
            StorageError::UnsupportedFormat(ext) => AppError::Validation(format!(
                "Unsupported image type '{ext}'. Allowed: {}",
                common::storage::IMAGE_EXTENSIONS.join(", ")
            )),
            StorageError::SizeLimitExceeded { limit, .. } => AppError::Validation(format!(
                "File exceeds maximum size of {limit} bytes"
            )),
            other => AppError::Internal(other.to_string()),
        }
    }
}
