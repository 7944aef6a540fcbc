//! API key authentication middleware.
//!
//! Runs once per protected request, before any entity logic:
//! 1. Extract the `api_key` query parameter
//! 2. Hash it with SHA-256 and resolve the digest to an access key
//! 3. Advance the key's sliding usage window and persist the counter —
//!    unconditionally, so rejected requests keep counting
//! 4. Reject over-quota Developer keys with HTTP 403
//! 5. Inject [`AuthContext`] into the request for handlers downstream

use std::collections::HashMap;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::AppError;
use crate::models::access_key::{AccessTier, QuotaCheck};
use crate::store::CatalogStore;

/// Authentication context attached to authenticated requests.
///
/// Handlers extract this with `Extension<AuthContext>` to learn the
/// caller's tier; the moderation policy branches on it.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Id of the resolved access key
    pub key_id: Uuid,

    /// Caller's access tier
    pub tier: AccessTier,

    /// Requests left in the current window; `None` for unmetered tiers
    pub remaining_quota: Option<i64>,
}

/// SHA-256 hex digest of an API key, as stored in the access key table.
pub fn hash_api_key(api_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hex::encode(hasher.finalize())
}

fn query_params(request: &Request) -> HashMap<String, String> {
    request
        .uri()
        .query()
        .map(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}

/// API key authentication middleware function.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let params = query_params(&request);
    let api_key = params
        .get("api_key")
        .filter(|key| !key.is_empty())
        .ok_or_else(|| AppError::MissingParameter("API key missing.".to_string()))?;

    let key_hash = hash_api_key(api_key);
    let mut key = state
        .store
        .find_access_key(&key_hash)
        .await?
        .ok_or_else(|| AppError::Unauthorized("API key not found!".to_string()))?;

    let check = key.register_request(Utc::now(), &state.quota);

    // Persist the advanced counter before deciding: going over the limit
    // must not stop the meter.
    state
        .store
        .record_key_usage(key.id, key.request_count_in_window, key.window_started_at)
        .await?;

    match check {
        QuotaCheck::Exceeded => {
            tracing::warn!(key_id = %key.id, "daily request limit exceeded");
            Err(AppError::QuotaExceeded)
        }
        QuotaCheck::Allowed { remaining } => {
            request.extensions_mut().insert(AuthContext {
                key_id: key.id,
                tier: key.tier,
                remaining_quota: remaining,
            });
            Ok(next.run(request).await)
        }
    }
}
