//! HTTP application wiring.
//!
//! Builds the Axum router and defines the shared application state
//! injected into handlers. Route composition lives here, out of `main`,
//! so the integration tests can drive the full router in-process.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, put},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::models::access_key::QuotaSettings;
use crate::services::domain_cache::DomainCache;
use crate::store::CatalogStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Catalog storage backend
    pub store: Arc<dyn CatalogStore>,

    /// TTL cache over the controlled vocabularies
    pub domains: Arc<DomainCache>,

    /// Quota limits applied by the auth middleware
    pub quota: QuotaSettings,

    /// Page size for Developer-tier listings
    pub default_page_size: u64,
}

/// Build the full router: public health endpoint plus the authenticated
/// catalog and moderation surface.
pub fn build_router(state: AppState) -> Router {
    let authenticated = Router::new()
        // Brand routes
        .route(
            "/brands",
            get(handlers::brands::get_brands).post(handlers::brands::create_brand),
        )
        .route(
            "/brands/{id}",
            get(handlers::brands::get_brand)
                .put(handlers::brands::update_brand)
                .delete(handlers::brands::remove_brand),
        )
        // Cigar routes
        .route(
            "/cigars",
            get(handlers::cigars::get_cigars).post(handlers::cigars::create_cigar),
        )
        .route(
            "/cigars/{id}",
            get(handlers::cigars::get_cigar)
                .put(handlers::cigars::update_cigar)
                .delete(handlers::cigars::remove_cigar),
        )
        // Moderator routes, addressed by queue name
        // (brandsCreateRequests, cigarsUpdateRequests, ...)
        .route("/moderate/{queue}", get(handlers::moderation::list_queue))
        .route(
            "/moderate/{queue}/{id}",
            put(handlers::moderation::approve).delete(handlers::moderation::deny),
        )
        // Reference data
        .route(
            "/cigarDomainValues",
            get(handlers::domain_values::get_domain_values),
        )
        // Apply API key authentication to everything in this group
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::authenticate,
        ));

    Router::new()
        // Public routes (no authentication required)
        .route("/health", get(handlers::health::health_check))
        .merge(authenticated)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
