//! Shared test harness: a full router over the in-memory store, seeded
//! with one key per tier and the built-in vocabularies.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use chrono::Utc;
use uuid::Uuid;

use cigardb::app::{AppState, build_router};
use cigardb::middleware::auth::hash_api_key;
use cigardb::models::access_key::{AccessKey, AccessTier, QuotaSettings};
use cigardb::models::domain::DomainValues;
use cigardb::services::domain_cache::DomainCache;
use cigardb::store::CatalogStore;
use cigardb::store::memory::InMemoryStore;

pub const MODERATOR_KEY: &str = "test-moderator-key";
pub const PREMIUM_KEY: &str = "test-premium-key";
pub const DEVELOPER_KEY: &str = "test-developer-key";

pub async fn test_app() -> Router {
    test_app_with_limit(500).await
}

pub async fn test_app_with_limit(daily_request_limit: i64) -> Router {
    let store = InMemoryStore::new();
    store
        .put_domain_values(DomainValues::builtin())
        .await
        .expect("domains");

    for (api_key, tier) in [
        (MODERATOR_KEY, AccessTier::Moderator),
        (PREMIUM_KEY, AccessTier::Premium),
        (DEVELOPER_KEY, AccessTier::Developer),
    ] {
        store
            .insert_access_key(AccessKey {
                id: Uuid::new_v4(),
                key_hash: hash_api_key(api_key),
                tier,
                request_count_in_window: 0,
                window_started_at: Utc::now(),
                created_at: Utc::now(),
            })
            .await
            .expect("key");
    }

    let state = AppState {
        store: Arc::new(store),
        domains: Arc::new(DomainCache::new(Duration::from_secs(300))),
        quota: QuotaSettings {
            daily_request_limit,
            window: chrono::Duration::hours(24),
        },
        default_page_size: 50,
    };
    build_router(state)
}

pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
