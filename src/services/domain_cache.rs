//! TTL cache for the controlled vocabularies.
//!
//! Domain values are read-mostly reference data consulted on every write.
//! The cache refreshes lazily once the TTL lapses; staleness only makes
//! validation briefly stricter or more lenient, never corrupts data, so
//! there is no invalidation protocol.

use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::models::domain::DomainValues;
use crate::store::{CatalogStore, StoreResult};

pub struct DomainCache {
    ttl: Duration,
    cached: RwLock<Option<(Instant, DomainValues)>>,
}

impl DomainCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            cached: RwLock::new(None),
        }
    }

    /// Current vocabularies, served from cache while fresh.
    ///
    /// A store without domain values yields empty vocabularies, which
    /// rejects every controlled value until someone installs the sets.
    pub async fn get(&self, store: &dyn CatalogStore) -> StoreResult<DomainValues> {
        if let Some((fetched_at, values)) = &*self.cached.read().await {
            if fetched_at.elapsed() < self.ttl {
                return Ok(values.clone());
            }
        }

        let fresh = store.domain_values().await?.unwrap_or_default();
        *self.cached.write().await = Some((Instant::now(), fresh.clone()));
        Ok(fresh)
    }
}
