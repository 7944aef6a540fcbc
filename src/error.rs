//! Error types and HTTP error response handling.
//!
//! One taxonomy covers the whole request path: parameter checks, key
//! resolution, quota, validation, moderation state transitions, and store
//! failures. Every failure surfaces to the caller as the matching HTTP
//! status with a `{"message": "..."}` body; nothing is swallowed.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::store::StoreError;

/// Application-wide error type.
///
/// # Status Code Mapping
///
/// - `MissingParameter` → 400 Bad Request
/// - `Unauthorized` → 401 Unauthorized
/// - `QuotaExceeded` → 403 Forbidden
/// - `NotFound` → 404 Not Found
/// - `Conflict` → 409 Conflict (a racing state transition lost)
/// - `InvalidValue` → 422 Unprocessable Entity (aggregated field failures)
/// - `Store` → 500 Internal Server Error (detail logged, never leaked)
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A required input was absent.
    #[error("{0}")]
    MissingParameter(String),

    /// A supplied value failed vocabulary/format validation. The message
    /// enumerates every offending field.
    #[error("{0}")]
    InvalidValue(String),

    /// Target id, dependent brand, or queue record absent.
    #[error("{0}")]
    NotFound(String),

    /// Missing/unknown key or insufficient tier.
    #[error("{0}")]
    Unauthorized(String),

    /// Daily request limit reached for this key's window.
    #[error("You have exceeded your daily request limit. Upgrade to a premium plan for unmetered access.")]
    QuotaExceeded,

    /// A state transition raced and lost, or was already applied.
    #[error("{0}")]
    Conflict(String),

    /// Store operation failed. Wraps any `StoreError` via `#[from]`.
    #[error("Store error")]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::MissingParameter(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidValue(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::QuotaExceeded => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Store(ref err) => {
                // Surface a generic 500; the detail goes to the log only.
                tracing::error!(error = %err, "store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "message": message }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_expected_status_codes() {
        let cases = [
            (
                AppError::MissingParameter("missing".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Unauthorized("unknown key".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (AppError::QuotaExceeded, StatusCode::FORBIDDEN),
            (AppError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("raced".into()), StatusCode::CONFLICT),
            (
                AppError::InvalidValue("bad".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
