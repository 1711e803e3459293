//! Unified error handling
//!
//! - [`AppError`] - application error enum, rendered as JSON by axum
//! - [`AppResponse`] - response envelope shared by success and error bodies
//!
//! # Error codes
//!
//! | Code | Status | Meaning |
//! |------|--------|---------|
//! | E0000 | 200 | success |
//! | E0002 | 400 | validation failed |
//! | E0003 | 404 | resource not found |
//! | E0004 | 409 | conflicting state |
//! | E0007 | 409 | table transfer aborted at a step |
//! | E3001 | 401 | operator token missing |
//! | E3002 | 401 | operator token invalid |
//! | E9001 | 500 | internal error |
//! | E9002 | 500 | database error |
//! | E9003 | 500 | printer failure |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// API response envelope
///
/// ```json
/// {
///   "code": "E0000",
///   "message": "Success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// Error code (E0000 on success)
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Application error enum
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication (401) ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid token")]
    InvalidToken,

    // ========== Business logic (4xx) ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A table transfer rolled back; `step` names the failed sub-step
    #[error("Transfer failed at {step}: {message}")]
    TransferFailed { step: String, message: String },

    // ========== System (5xx) ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Printer error: {0}")]
    Printer(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct TransferDetail<'a> {
    step: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "E3001", self.to_string()),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "E3002", self.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "E0004", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),
            AppError::TransferFailed { step, message } => {
                let body = Json(AppResponse {
                    code: "E0007".to_string(),
                    message: message.clone(),
                    data: Some(TransferDetail { step }),
                });
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9002",
                    "Database error".to_string(),
                )
            }
            // Printer failures are operator-actionable, so the message goes out as-is
            AppError::Printer(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "E9003", msg.clone()),
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message,
            data: None,
        });

        (status, body).into_response()
    }
}

/// Application-level Result type used by HTTP handlers
pub type AppResult<T> = Result<T, AppError>;
