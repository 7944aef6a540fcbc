//! Catalog storage abstraction.
//!
//! The service core talks to storage exclusively through [`CatalogStore`]:
//! find/insert/conditional-update/count, nothing smarter. All transition
//! validity lives in the moderation service; the store's one correctness
//! job is that the conditional updates (`transition_entity_status`,
//! `resolve_pending_request`) are atomic per record, so racing moderators
//! cannot both win.
//!
//! Two backends exist: `postgres` (durable, sqlx) and `memory`
//! (`HashMap`s under an async lock — dev fallback and test backend).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::models::access_key::{AccessKey, AccessTier};
use crate::models::brand::Brand;
use crate::models::cigar::Cigar;
use crate::models::domain::DomainValues;
use crate::models::lifecycle::{EntityKind, EntityStatus, RequestKind, RequestStatus};
use crate::models::pending_request::PendingRequest;

pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unexpected(err.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Skip/limit window for a listing, computed from tier and page number.
#[derive(Debug, Clone, Copy)]
pub struct PageWindow {
    pub skip: u64,
    /// `None` means the tier is not paginated.
    pub limit: Option<u64>,
}

impl PageWindow {
    /// Window for a 1-based `page`. Premium and above see everything;
    /// limited tiers get `page_size` records starting at
    /// `(page - 1) * page_size`.
    pub fn for_tier(tier: AccessTier, page: u64, page_size: u64) -> Self {
        if tier >= AccessTier::Premium {
            PageWindow { skip: 0, limit: None }
        } else {
            PageWindow {
                skip: page.saturating_sub(1) * page_size,
                limit: Some(page_size),
            }
        }
    }

    /// Total page count for a result set of `total` records.
    pub fn number_of_pages(&self, total: u64) -> u64 {
        match self.limit {
            Some(size) if size > 0 => total.div_ceil(size).max(1),
            _ => 1,
        }
    }
}

/// Sort order for a listing. `field` is always allow-listed by the caller
/// before it reaches a backend.
#[derive(Debug, Clone)]
pub struct Sort {
    pub field: String,
    pub descending: bool,
}

impl Sort {
    pub fn ascending(field: &str) -> Self {
        Sort {
            field: field.to_string(),
            descending: false,
        }
    }
}

/// A page of records plus the total count of the matching set.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Brand listing filter.
#[derive(Debug, Clone)]
pub struct BrandFilter {
    pub status: EntityStatus,
    /// Case-insensitive substring match on `name`.
    pub name_contains: Option<String>,
}

/// Cigar listing filter. List-valued fields match on overlap, mirroring the
/// original `$in` queries.
#[derive(Debug, Clone, Default)]
pub struct CigarFilter {
    pub brand: Option<String>,
    /// Case-insensitive substring match on `name`.
    pub name_contains: Option<String>,
    pub vitola: Option<String>,
    pub color: Option<String>,
    pub country: Option<String>,
    pub strength: Option<String>,
    pub wrappers: Vec<String>,
    pub binders: Vec<String>,
    pub fillers: Vec<String>,
}

impl CigarFilter {
    /// True when the caller supplied no catalog filter at all. Limited
    /// tiers are rejected in that case to keep full-table scans premium.
    pub fn is_unfiltered(&self) -> bool {
        self.brand.is_none()
            && self.name_contains.is_none()
            && self.vitola.is_none()
            && self.color.is_none()
            && self.country.is_none()
            && self.strength.is_none()
            && self.wrappers.is_empty()
            && self.binders.is_empty()
            && self.fillers.is_empty()
    }
}

/// Storage operations used by the authentication middleware and the
/// moderation service.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    // Access keys
    async fn find_access_key(&self, key_hash: &str) -> StoreResult<Option<AccessKey>>;
    /// Out-of-band key provisioning surface (bootstrap, tests).
    async fn insert_access_key(&self, key: AccessKey) -> StoreResult<()>;
    /// Persist the advanced usage counter. Runs on every authenticated
    /// request, including ones ultimately rejected for quota.
    async fn record_key_usage(
        &self,
        id: Uuid,
        request_count_in_window: i64,
        window_started_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    // Controlled vocabularies
    async fn domain_values(&self) -> StoreResult<Option<DomainValues>>;
    async fn put_domain_values(&self, domains: DomainValues) -> StoreResult<()>;

    // Brands
    async fn insert_brand(&self, brand: Brand) -> StoreResult<()>;
    async fn find_brand(&self, id: Uuid) -> StoreResult<Option<Brand>>;
    async fn list_brands(
        &self,
        filter: &BrandFilter,
        window: PageWindow,
        sort: &Sort,
    ) -> StoreResult<Listing<Brand>>;
    /// True when a brand with this exact name exists in status `approved`
    /// or `create_pending`.
    async fn live_brand_exists(&self, name: &str) -> StoreResult<bool>;

    // Cigars
    async fn insert_cigar(&self, cigar: Cigar) -> StoreResult<()>;
    async fn find_cigar(&self, id: Uuid) -> StoreResult<Option<Cigar>>;
    async fn list_cigars(
        &self,
        status: EntityStatus,
        filter: &CigarFilter,
        window: PageWindow,
        sort: &Sort,
    ) -> StoreResult<Listing<Cigar>>;

    // Entity lifecycle
    async fn entity_exists(&self, kind: EntityKind, id: Uuid) -> StoreResult<bool>;
    /// Atomic conditional status transition. Returns false when the record
    /// is missing or no longer in `from` — the caller decides which.
    async fn transition_entity_status(
        &self,
        kind: EntityKind,
        id: Uuid,
        from: EntityStatus,
        to: EntityStatus,
        moderator_notes: Option<&str>,
    ) -> StoreResult<bool>;
    /// Merge an allow-listed field map into an entity and refresh
    /// `updated_at`. Returns false when no record was touched.
    async fn apply_entity_update(
        &self,
        kind: EntityKind,
        id: Uuid,
        fields: &Map<String, Value>,
    ) -> StoreResult<bool>;
    /// Deny every create-pending cigar whose brand name matches. Returns
    /// the number of cigars denied.
    async fn deny_create_pending_cigars(
        &self,
        brand_name: &str,
        moderator_notes: Option<&str>,
    ) -> StoreResult<u64>;

    // Pending requests
    async fn insert_pending_request(&self, request: PendingRequest) -> StoreResult<()>;
    async fn find_pending_request(&self, id: Uuid) -> StoreResult<Option<PendingRequest>>;
    async fn list_pending_requests(
        &self,
        kind: RequestKind,
        target: EntityKind,
        status: RequestStatus,
        sort: &Sort,
    ) -> StoreResult<Listing<PendingRequest>>;
    /// Atomic `pending -> approved|denied` transition. Returns false when
    /// the record was already resolved (or never existed).
    async fn resolve_pending_request(
        &self,
        id: Uuid,
        to: RequestStatus,
        moderator_notes: Option<&str>,
    ) -> StoreResult<bool>;

    async fn health_check(&self) -> StoreResult<()>;
    fn backend_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn developer_window_uses_corrected_skip_formula() {
        let window = PageWindow::for_tier(AccessTier::Developer, 2, 50);
        assert_eq!(window.skip, 50);
        assert_eq!(window.limit, Some(50));

        let window = PageWindow::for_tier(AccessTier::Developer, 1, 50);
        assert_eq!(window.skip, 0);

        // Page 0 is treated as page 1 rather than underflowing.
        let window = PageWindow::for_tier(AccessTier::Developer, 0, 50);
        assert_eq!(window.skip, 0);
    }

    #[test]
    fn premium_window_is_unlimited() {
        let window = PageWindow::for_tier(AccessTier::Premium, 7, 50);
        assert_eq!(window.skip, 0);
        assert_eq!(window.limit, None);
        assert_eq!(window.number_of_pages(12_345), 1);
    }

    #[test]
    fn page_count_is_ceiling_division() {
        let window = PageWindow::for_tier(AccessTier::Developer, 1, 50);
        assert_eq!(window.number_of_pages(0), 1);
        assert_eq!(window.number_of_pages(50), 1);
        assert_eq!(window.number_of_pages(51), 2);
        assert_eq!(window.number_of_pages(100), 2);
        assert_eq!(window.number_of_pages(101), 3);
    }
}
