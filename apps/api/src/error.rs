//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Storekeep                              │
//! │                                                                         │
//! │  Client                      Rust Backend                               │
//! │  ──────                      ────────────                               │
//! │                                                                         │
//! │  POST /stores/{id}/sales                                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler                                                         │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  DbError::InsufficientStock ──► kind() ──► ApiError ────────────►│  │
//! │  │  DbError::QueryFailed ────────► error! ──► ApiError (generic) ──►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄── 409 {"code":"INSUFFICIENT_STOCK","message":"Insufficient stock …"}│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal failures never leak their detail to clients. The detail is
//! logged and the body carries a fixed message.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use storekeep_db::{DbError, ErrorKind};

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error body returned by every failing request.
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Store not found: 6f1c…"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input failed a field rule (422)
    ValidationError,

    /// Duplicate value or restricted delete (409)
    Conflict,

    /// Resource absent or owned by another store (404)
    NotFound,

    /// Product sale exceeds stock on hand (409)
    InsufficientStock,

    /// Database contention, retry later (503)
    Busy,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::Conflict | ErrorCode::InsufficientStock => StatusCode::CONFLICT,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Busy => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal() -> Self {
        ApiError::new(ErrorCode::Internal, "Internal server error")
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        if err.is_retryable() {
            tracing::warn!(error = %err, "Request hit database contention");
            return ApiError::new(ErrorCode::Busy, "Database is busy, please retry");
        }

        match err.kind() {
            ErrorKind::Validation => ApiError::validation(err.to_string()),
            ErrorKind::Conflict => ApiError::new(ErrorCode::Conflict, err.to_string()),
            ErrorKind::NotFound => ApiError::new(ErrorCode::NotFound, err.to_string()),
            ErrorKind::InsufficientStock => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            ErrorKind::Internal => {
                // Log the actual error but return a generic message
                tracing::error!(error = %err, "Internal error while handling request");
                ApiError::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use storekeep_core::ValidationError;

    #[test]
    fn test_db_error_mapping() {
        let cases = [
            (DbError::not_found("Store", "s1"), ErrorCode::NotFound),
            (DbError::duplicate("code", "NYC"), ErrorCode::Conflict),
            (
                DbError::InsufficientStock {
                    item: "Widget".to_string(),
                    available: 1,
                    requested: 2,
                },
                ErrorCode::InsufficientStock,
            ),
            (DbError::Busy, ErrorCode::Busy),
            (
                DbError::Validation(ValidationError::Required {
                    field: "name".to_string(),
                }),
                ErrorCode::ValidationError,
            ),
        ];

        for (err, code) in cases {
            assert_eq!(ApiError::from(err).code, code);
        }
    }

    #[test]
    fn test_internal_detail_hidden() {
        let api = ApiError::from(DbError::QueryFailed("no such table: secrets".to_string()));
        assert_eq!(api.code, ErrorCode::Internal);
        assert_eq!(api.message, "Internal server error");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorCode::ValidationError.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ErrorCode::InsufficientStock.status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::Busy.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_serialized_shape() {
        let body = serde_json::to_value(ApiError::validation("name is required")).unwrap();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "name is required");
    }
}
