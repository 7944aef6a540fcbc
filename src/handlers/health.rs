//! Health check endpoint for service monitoring.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::AppState;
use crate::error::AppError;
use crate::store::CatalogStore;

/// Health check response.
///
/// Returns service status and the active storage backend.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: String,

    /// Active store backend ("postgres" or "memory")
    pub store: &'static str,

    /// Current server timestamp
    pub timestamp: DateTime<Utc>,
}

/// Health check handler. Public: no API key required.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "status": "healthy",
///   "store": "postgres",
///   "timestamp": "2026-01-15T19:00:00Z"
/// }
/// ```
///
/// If the store is unreachable, returns the standard 500 error response.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    state.store.health_check().await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        store: state.store.backend_name(),
        timestamp: Utc::now(),
    }))
}
