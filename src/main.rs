//! CigarDB API - Main Application Entry Point
//!
//! A moderated content API for a crowd-sourced catalog of cigar brands and
//! cigars. Every call authenticates with an API key resolved to an access
//! tier; writes from trusted (moderator) keys apply directly, everything
//! else lands in a pending queue for moderator approval or denial.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Storage**: Postgres via sqlx, or a volatile in-memory store when no
//!   `DATABASE_URL` is configured
//! - **Authentication**: `api_key` query parameter, SHA-256 hashed lookup,
//!   tiered access with a sliding daily quota
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Select the storage backend (Postgres + migrations, or in-memory)
//! 3. Install built-in vocabularies and the bootstrap key if missing
//! 4. Build the HTTP router and serve

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use cigardb::app::{AppState, build_router};
use cigardb::config::Config;
use cigardb::db;
use cigardb::middleware::auth::hash_api_key;
use cigardb::models::access_key::{AccessKey, AccessTier};
use cigardb::models::domain::DomainValues;
use cigardb::services::domain_cache::DomainCache;
use cigardb::store::memory::InMemoryStore;
use cigardb::store::postgres::PostgresStore;
use cigardb::store::CatalogStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG (defaults
    // to "info" level).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Select the storage backend
    let store: Arc<dyn CatalogStore> = match &config.database_url {
        Some(database_url) => {
            let pool = db::create_pool(database_url).await?;
            tracing::info!("Database pool created");
            db::run_migrations(&pool).await?;
            tracing::info!("Database migrations complete");
            Arc::new(PostgresStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, falling back to the in-memory store");
            Arc::new(InMemoryStore::new())
        }
    };

    // A store without vocabularies rejects every controlled value, so
    // install the built-in sets on first start.
    if store.domain_values().await?.is_none() {
        store.put_domain_values(DomainValues::builtin()).await?;
        tracing::info!("Installed built-in domain vocabularies");
    }

    // Provision the bootstrap moderator key when configured and absent.
    if let Some(bootstrap_api_key) = &config.bootstrap_api_key {
        let key_hash = hash_api_key(bootstrap_api_key);
        if store.find_access_key(&key_hash).await?.is_none() {
            store
                .insert_access_key(AccessKey {
                    id: Uuid::new_v4(),
                    key_hash,
                    tier: AccessTier::Moderator,
                    request_count_in_window: 0,
                    window_started_at: Utc::now(),
                    created_at: Utc::now(),
                })
                .await?;
            tracing::info!("Installed bootstrap moderator key");
        }
    }

    let state = AppState {
        store,
        domains: Arc::new(DomainCache::new(Duration::from_secs(
            config.domain_cache_ttl_secs,
        ))),
        quota: config.quota_settings(),
        default_page_size: config.default_page_size,
    };
    let app = build_router(state);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Serve HTTP requests concurrently with tokio until shutdown
    axum::serve(listener, app).await?;

    Ok(())
}
