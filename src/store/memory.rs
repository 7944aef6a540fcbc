//! In-memory implementation of the catalog store.
//!
//! Backs two situations: local development without a `DATABASE_URL`, and
//! the integration tests, which drive the real router against this store.
//! All state lives in `HashMap`s guarded by `tokio::sync::RwLock`; nothing
//! survives a restart.
//!
//! The conditional transitions take the write lock for the whole
//! read-check-write, which gives the same "only one racer wins" guarantee
//! the Postgres backend gets from single-row conditional updates.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    BrandFilter, CatalogStore, CigarFilter, Listing, PageWindow, Sort, StoreResult,
};
use crate::models::access_key::AccessKey;
use crate::models::brand::Brand;
use crate::models::cigar::Cigar;
use crate::models::domain::DomainValues;
use crate::models::lifecycle::{EntityKind, EntityStatus, RequestKind, RequestStatus};
use crate::models::pending_request::PendingRequest;

/// Volatile catalog store.
#[derive(Default)]
pub struct InMemoryStore {
    access_keys: RwLock<HashMap<String, AccessKey>>,
    brands: RwLock<HashMap<Uuid, Brand>>,
    cigars: RwLock<HashMap<Uuid, Cigar>>,
    requests: RwLock<HashMap<Uuid, PendingRequest>>,
    domains: RwLock<Option<DomainValues>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn overlaps(have: &[String], wanted: &[String]) -> bool {
    wanted.is_empty() || have.iter().any(|v| wanted.contains(v))
}

fn paginate<T>(mut items: Vec<T>, window: PageWindow) -> Listing<T> {
    let total = items.len() as u64;
    let items = match window.limit {
        Some(limit) => items
            .drain(..)
            .skip(window.skip as usize)
            .take(limit as usize)
            .collect(),
        None => items,
    };
    Listing { items, total }
}

fn apply_brand_fields(brand: &mut Brand, fields: &Map<String, Value>) {
    for (key, value) in fields {
        match (key.as_str(), value) {
            ("name", Value::String(v)) => brand.name = v.clone(),
            ("country", Value::String(v)) => brand.country = Some(v.clone()),
            ("founding_date", Value::String(v)) => brand.founding_date = Some(v.clone()),
            ("logo", Value::String(v)) => brand.logo = Some(v.clone()),
            ("address", Value::String(v)) => brand.address = Some(v.clone()),
            ("website", Value::String(v)) => brand.website = Some(v.clone()),
            _ => {}
        }
    }
    brand.updated_at = Utc::now();
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn apply_cigar_fields(cigar: &mut Cigar, fields: &Map<String, Value>) {
    for (key, value) in fields {
        match (key.as_str(), value) {
            ("brand", Value::String(v)) => cigar.brand = v.clone(),
            ("name", Value::String(v)) => cigar.name = v.clone(),
            ("length", v) if v.is_number() => cigar.length = v.as_f64(),
            ("ring_gauge", v) if v.is_number() => cigar.ring_gauge = v.as_f64(),
            ("vitola", Value::String(v)) => cigar.vitola = Some(v.clone()),
            ("color", Value::String(v)) => cigar.color = Some(v.clone()),
            ("country", Value::String(v)) => cigar.country = Some(v.clone()),
            ("strength", Value::String(v)) => cigar.strength = Some(v.clone()),
            ("year_introduced", Value::String(v)) => cigar.year_introduced = Some(v.clone()),
            ("wrappers", v) if v.is_array() => cigar.wrappers = string_list(v),
            ("binders", v) if v.is_array() => cigar.binders = string_list(v),
            ("fillers", v) if v.is_array() => cigar.fillers = string_list(v),
            _ => {}
        }
    }
    cigar.updated_at = Utc::now();
}

fn ordered<T, F: Fn(&T, &T) -> std::cmp::Ordering>(mut items: Vec<T>, sort: &Sort, cmp: F) -> Vec<T> {
    items.sort_by(|a, b| {
        let ord = cmp(a, b);
        if sort.descending { ord.reverse() } else { ord }
    });
    items
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn find_access_key(&self, key_hash: &str) -> StoreResult<Option<AccessKey>> {
        Ok(self.access_keys.read().await.get(key_hash).cloned())
    }

    async fn insert_access_key(&self, key: AccessKey) -> StoreResult<()> {
        self.access_keys
            .write()
            .await
            .insert(key.key_hash.clone(), key);
        Ok(())
    }

    async fn record_key_usage(
        &self,
        id: Uuid,
        request_count_in_window: i64,
        window_started_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut keys = self.access_keys.write().await;
        if let Some(key) = keys.values_mut().find(|k| k.id == id) {
            key.request_count_in_window = request_count_in_window;
            key.window_started_at = window_started_at;
        }
        Ok(())
    }

    async fn domain_values(&self) -> StoreResult<Option<DomainValues>> {
        Ok(self.domains.read().await.clone())
    }

    async fn put_domain_values(&self, domains: DomainValues) -> StoreResult<()> {
        *self.domains.write().await = Some(domains);
        Ok(())
    }

    async fn insert_brand(&self, brand: Brand) -> StoreResult<()> {
        self.brands.write().await.insert(brand.id, brand);
        Ok(())
    }

    async fn find_brand(&self, id: Uuid) -> StoreResult<Option<Brand>> {
        Ok(self.brands.read().await.get(&id).cloned())
    }

    async fn list_brands(
        &self,
        filter: &BrandFilter,
        window: PageWindow,
        sort: &Sort,
    ) -> StoreResult<Listing<Brand>> {
        let brands = self.brands.read().await;
        let matching: Vec<Brand> = brands
            .values()
            .filter(|b| b.status == filter.status)
            .filter(|b| {
                filter
                    .name_contains
                    .as_deref()
                    .is_none_or(|needle| contains_ci(&b.name, needle))
            })
            .cloned()
            .collect();
        let field = sort.field.clone();
        let sorted = ordered(matching, sort, move |a, b| match field.as_str() {
            "country" => a.country.cmp(&b.country),
            "updated" => a.updated_at.cmp(&b.updated_at),
            _ => a.name.cmp(&b.name),
        });
        Ok(paginate(sorted, window))
    }

    async fn live_brand_exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.brands.read().await.values().any(|b| {
            b.name == name
                && matches!(
                    b.status,
                    EntityStatus::Approved | EntityStatus::CreatePending
                )
        }))
    }

    async fn insert_cigar(&self, cigar: Cigar) -> StoreResult<()> {
        self.cigars.write().await.insert(cigar.id, cigar);
        Ok(())
    }

    async fn find_cigar(&self, id: Uuid) -> StoreResult<Option<Cigar>> {
        Ok(self.cigars.read().await.get(&id).cloned())
    }

    async fn list_cigars(
        &self,
        status: EntityStatus,
        filter: &CigarFilter,
        window: PageWindow,
        sort: &Sort,
    ) -> StoreResult<Listing<Cigar>> {
        let cigars = self.cigars.read().await;
        let matching: Vec<Cigar> = cigars
            .values()
            .filter(|c| c.status == status)
            .filter(|c| filter.brand.as_deref().is_none_or(|v| c.brand == v))
            .filter(|c| {
                filter
                    .name_contains
                    .as_deref()
                    .is_none_or(|needle| contains_ci(&c.name, needle))
            })
            .filter(|c| filter.vitola.as_deref().is_none_or(|v| c.vitola.as_deref() == Some(v)))
            .filter(|c| filter.color.as_deref().is_none_or(|v| c.color.as_deref() == Some(v)))
            .filter(|c| filter.country.as_deref().is_none_or(|v| c.country.as_deref() == Some(v)))
            .filter(|c| {
                filter
                    .strength
                    .as_deref()
                    .is_none_or(|v| c.strength.as_deref() == Some(v))
            })
            .filter(|c| overlaps(&c.wrappers, &filter.wrappers))
            .filter(|c| overlaps(&c.binders, &filter.binders))
            .filter(|c| overlaps(&c.fillers, &filter.fillers))
            .cloned()
            .collect();
        let field = sort.field.clone();
        let sorted = ordered(matching, sort, move |a, b| match field.as_str() {
            "brand" => (&a.brand, &a.name).cmp(&(&b.brand, &b.name)),
            "updated" => a.updated_at.cmp(&b.updated_at),
            _ => a.name.cmp(&b.name),
        });
        Ok(paginate(sorted, window))
    }

    async fn entity_exists(&self, kind: EntityKind, id: Uuid) -> StoreResult<bool> {
        Ok(match kind {
            EntityKind::Brand => self.brands.read().await.contains_key(&id),
            EntityKind::Cigar => self.cigars.read().await.contains_key(&id),
        })
    }

    async fn transition_entity_status(
        &self,
        kind: EntityKind,
        id: Uuid,
        from: EntityStatus,
        to: EntityStatus,
        moderator_notes: Option<&str>,
    ) -> StoreResult<bool> {
        // Check-and-set under the write lock; losers of a race see the new
        // status and report false.
        match kind {
            EntityKind::Brand => {
                let mut brands = self.brands.write().await;
                match brands.get_mut(&id) {
                    Some(brand) if brand.status == from => {
                        brand.status = to;
                        if let Some(notes) = moderator_notes {
                            brand.moderator_notes = Some(notes.to_string());
                        }
                        brand.updated_at = Utc::now();
                        Ok(true)
                    }
                    _ => Ok(false),
                }
            }
            EntityKind::Cigar => {
                let mut cigars = self.cigars.write().await;
                match cigars.get_mut(&id) {
                    Some(cigar) if cigar.status == from => {
                        cigar.status = to;
                        if let Some(notes) = moderator_notes {
                            cigar.moderator_notes = Some(notes.to_string());
                        }
                        cigar.updated_at = Utc::now();
                        Ok(true)
                    }
                    _ => Ok(false),
                }
            }
        }
    }

    async fn apply_entity_update(
        &self,
        kind: EntityKind,
        id: Uuid,
        fields: &Map<String, Value>,
    ) -> StoreResult<bool> {
        match kind {
            EntityKind::Brand => {
                let mut brands = self.brands.write().await;
                match brands.get_mut(&id) {
                    Some(brand) => {
                        apply_brand_fields(brand, fields);
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
            EntityKind::Cigar => {
                let mut cigars = self.cigars.write().await;
                match cigars.get_mut(&id) {
                    Some(cigar) => {
                        apply_cigar_fields(cigar, fields);
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
        }
    }

    async fn deny_create_pending_cigars(
        &self,
        brand_name: &str,
        moderator_notes: Option<&str>,
    ) -> StoreResult<u64> {
        let mut cigars = self.cigars.write().await;
        let mut denied = 0;
        for cigar in cigars.values_mut() {
            if cigar.brand == brand_name && cigar.status == EntityStatus::CreatePending {
                cigar.status = EntityStatus::Denied;
                if let Some(notes) = moderator_notes {
                    cigar.moderator_notes = Some(notes.to_string());
                }
                cigar.updated_at = Utc::now();
                denied += 1;
            }
        }
        Ok(denied)
    }

    async fn insert_pending_request(&self, request: PendingRequest) -> StoreResult<()> {
        self.requests.write().await.insert(request.id, request);
        Ok(())
    }

    async fn find_pending_request(&self, id: Uuid) -> StoreResult<Option<PendingRequest>> {
        Ok(self.requests.read().await.get(&id).cloned())
    }

    async fn list_pending_requests(
        &self,
        kind: RequestKind,
        target: EntityKind,
        status: RequestStatus,
        sort: &Sort,
    ) -> StoreResult<Listing<PendingRequest>> {
        let requests = self.requests.read().await;
        let matching: Vec<PendingRequest> = requests
            .values()
            .filter(|r| r.kind == kind && r.target_entity_type == target && r.status == status)
            .cloned()
            .collect();
        let sorted = ordered(matching, sort, |a, b| a.submitted_at.cmp(&b.submitted_at));
        let total = sorted.len() as u64;
        Ok(Listing {
            items: sorted,
            total,
        })
    }

    async fn resolve_pending_request(
        &self,
        id: Uuid,
        to: RequestStatus,
        moderator_notes: Option<&str>,
    ) -> StoreResult<bool> {
        let mut requests = self.requests.write().await;
        match requests.get_mut(&id) {
            Some(request) if request.status == RequestStatus::Pending => {
                request.status = to;
                if let Some(notes) = moderator_notes {
                    request.moderator_notes = Some(notes.to_string());
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brand(name: &str, status: EntityStatus) -> Brand {
        Brand {
            id: Uuid::new_v4(),
            name: name.to_string(),
            country: None,
            founding_date: None,
            logo: None,
            address: None,
            website: None,
            status,
            moderator_notes: None,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn transition_is_single_shot() {
        let store = InMemoryStore::new();
        let b = brand("Padron", EntityStatus::CreatePending);
        let id = b.id;
        store.insert_brand(b).await.unwrap();

        let first = store
            .transition_entity_status(
                EntityKind::Brand,
                id,
                EntityStatus::CreatePending,
                EntityStatus::Approved,
                None,
            )
            .await
            .unwrap();
        let second = store
            .transition_entity_status(
                EntityKind::Brand,
                id,
                EntityStatus::CreatePending,
                EntityStatus::Approved,
                None,
            )
            .await
            .unwrap();
        assert!(first);
        assert!(!second);
    }

    #[tokio::test]
    async fn live_brand_check_ignores_denied_and_deleted() {
        let store = InMemoryStore::new();
        store
            .insert_brand(brand("Cohiba", EntityStatus::Denied))
            .await
            .unwrap();
        assert!(!store.live_brand_exists("Cohiba").await.unwrap());

        store
            .insert_brand(brand("Cohiba", EntityStatus::CreatePending))
            .await
            .unwrap();
        assert!(store.live_brand_exists("Cohiba").await.unwrap());
    }

    #[tokio::test]
    async fn brand_listing_pages_sorted_by_name() {
        let store = InMemoryStore::new();
        for i in 0..60 {
            store
                .insert_brand(brand(&format!("Brand {i:02}"), EntityStatus::Approved))
                .await
                .unwrap();
        }
        let filter = BrandFilter {
            status: EntityStatus::Approved,
            name_contains: None,
        };
        let window = PageWindow { skip: 50, limit: Some(50) };
        let listing = store
            .list_brands(&filter, window, &Sort::ascending("name"))
            .await
            .unwrap();
        assert_eq!(listing.total, 60);
        assert_eq!(listing.items.len(), 10);
        assert_eq!(listing.items[0].name, "Brand 50");
    }
}
