//! HTTP request handlers (route handlers).
//!
//! Each handler extracts request data, delegates to the services, and maps
//! the outcome onto the response envelopes. Shared parameter helpers for
//! paging and sorting live here.

use std::collections::HashMap;

use axum::{Json, http::StatusCode};

use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::access_key::AccessTier;
use crate::models::response::{IdPayload, MutationResponse};
use crate::services::moderation::WriteOutcome;
use crate::store::Sort;

/// Brand catalog endpoints
pub mod brands;
/// Cigar catalog endpoints
pub mod cigars;
/// Controlled vocabulary endpoint
pub mod domain_values;
/// Service health endpoint
pub mod health;
/// Moderation queues and approve/deny endpoints
pub mod moderation;

/// 1-based `page` parameter; absent means page 1.
pub(crate) fn parse_page(params: &HashMap<String, String>) -> Result<u64, AppError> {
    match params.get("page") {
        None => Ok(1),
        Some(raw) => match raw.parse::<u64>() {
            Ok(page) if page >= 1 => Ok(page),
            _ => Err(AppError::InvalidValue(
                "The page parameter must be a positive integer.".to_string(),
            )),
        },
    }
}

/// `sort_field` / `sort_direction` parameters, checked against the
/// listing's allow-list so arbitrary fields never reach a backend.
pub(crate) fn parse_sort(
    params: &HashMap<String, String>,
    allowed: &[&str],
    default_field: &str,
) -> Result<Sort, AppError> {
    let field = match params.get("sort_field") {
        None => default_field.to_string(),
        Some(field) if allowed.contains(&field.as_str()) => field.clone(),
        Some(field) => {
            return Err(AppError::InvalidValue(format!(
                "The field {field} cannot be used for sorting."
            )));
        }
    };
    let descending = params.get("sort_direction").map(String::as_str) == Some("desc");
    Ok(Sort { field, descending })
}

/// Moderator gate for the `/moderate` surface.
pub(crate) fn require_moderator(auth: &AuthContext) -> Result<(), AppError> {
    if auth.tier >= AccessTier::Moderator {
        Ok(())
    } else {
        Err(AppError::Unauthorized("You are not authorized!".to_string()))
    }
}

/// Map a write outcome onto its status code and envelope. Queued changes
/// answer 202; applied ones answer `status_when_applied` (202 for creates,
/// which always accept, 200 for direct updates/deletes).
pub(crate) fn mutation_response(
    outcome: WriteOutcome,
    status_when_applied: StatusCode,
) -> (StatusCode, Json<MutationResponse>) {
    let status = if outcome.queued {
        StatusCode::ACCEPTED
    } else {
        status_when_applied
    };
    (
        status,
        Json(MutationResponse {
            data: outcome.id.map(|id| IdPayload { id }),
            message: outcome.message,
        }),
    )
}
