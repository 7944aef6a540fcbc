//! Postgres implementation of the catalog store.
//!
//! Conditional updates carry their precondition in the WHERE clause and
//! report success through `rows_affected`, so a racing approve/deny pair
//! resolves to exactly one winner without any in-process locking.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::Uuid;

use super::{
    BrandFilter, CatalogStore, CigarFilter, Listing, PageWindow, Sort, StoreError, StoreResult,
};
use crate::db::DbPool;
use crate::models::access_key::{AccessKey, AccessTier};
use crate::models::brand::Brand;
use crate::models::cigar::Cigar;
use crate::models::domain::DomainValues;
use crate::models::lifecycle::{EntityKind, EntityStatus, RequestKind, RequestStatus};
use crate::models::pending_request::PendingRequest;

/// Durable catalog store backed by the sqlx connection pool.
pub struct PostgresStore {
    pool: DbPool,
}

impl PostgresStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn entity_table(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Brand => "brands",
        EntityKind::Cigar => "cigars",
    }
}

/// Map an allow-listed sort field onto its column. Unknown fields fall back
/// to `name`; the handlers reject them before they get here.
fn sort_clause(sort: &Sort, default_column: &'static str) -> String {
    let column = match sort.field.as_str() {
        "name" => "name",
        "brand" => "brand",
        "country" => "country",
        "updated" => "updated_at",
        "submitted" => "submitted_at",
        _ => default_column,
    };
    let direction = if sort.descending { "DESC" } else { "ASC" };
    format!(" ORDER BY {column} {direction}")
}

fn push_window(builder: &mut QueryBuilder<Postgres>, window: PageWindow) {
    if let Some(limit) = window.limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit as i64);
    }
    builder.push(" OFFSET ");
    builder.push_bind(window.skip as i64);
}

fn bad_status(value: &str) -> StoreError {
    StoreError::Unexpected(anyhow::anyhow!("unrecognized stored status: {value}"))
}

#[derive(sqlx::FromRow)]
struct AccessKeyRow {
    id: Uuid,
    key_hash: String,
    tier: i32,
    request_count_in_window: i64,
    window_started_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<AccessKeyRow> for AccessKey {
    fn from(row: AccessKeyRow) -> Self {
        AccessKey {
            id: row.id,
            key_hash: row.key_hash,
            tier: AccessTier::from_level(row.tier),
            request_count_in_window: row.request_count_in_window,
            window_started_at: row.window_started_at,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BrandRow {
    id: Uuid,
    name: String,
    country: Option<String>,
    founding_date: Option<String>,
    logo: Option<String>,
    address: Option<String>,
    website: Option<String>,
    status: String,
    moderator_notes: Option<String>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BrandRow> for Brand {
    type Error = StoreError;

    fn try_from(row: BrandRow) -> Result<Self, StoreError> {
        let status = EntityStatus::parse(&row.status).ok_or_else(|| bad_status(&row.status))?;
        Ok(Brand {
            id: row.id,
            name: row.name,
            country: row.country,
            founding_date: row.founding_date,
            logo: row.logo,
            address: row.address,
            website: row.website,
            status,
            moderator_notes: row.moderator_notes,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CigarRow {
    id: Uuid,
    brand: String,
    name: String,
    length: Option<f64>,
    ring_gauge: Option<f64>,
    vitola: Option<String>,
    color: Option<String>,
    country: Option<String>,
    wrappers: Vec<String>,
    binders: Vec<String>,
    fillers: Vec<String>,
    strength: Option<String>,
    year_introduced: Option<String>,
    status: String,
    moderator_notes: Option<String>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CigarRow> for Cigar {
    type Error = StoreError;

    fn try_from(row: CigarRow) -> Result<Self, StoreError> {
        let status = EntityStatus::parse(&row.status).ok_or_else(|| bad_status(&row.status))?;
        Ok(Cigar {
            id: row.id,
            brand: row.brand,
            name: row.name,
            length: row.length,
            ring_gauge: row.ring_gauge,
            vitola: row.vitola,
            color: row.color,
            country: row.country,
            wrappers: row.wrappers,
            binders: row.binders,
            fillers: row.fillers,
            strength: row.strength,
            year_introduced: row.year_introduced,
            status,
            moderator_notes: row.moderator_notes,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PendingRequestRow {
    id: Uuid,
    kind: String,
    target_entity_type: String,
    target_id: Uuid,
    submitted_by_key: Uuid,
    submitted_at: DateTime<Utc>,
    status: String,
    payload: Value,
    reason: Option<String>,
    moderator_notes: Option<String>,
}

impl TryFrom<PendingRequestRow> for PendingRequest {
    type Error = StoreError;

    fn try_from(row: PendingRequestRow) -> Result<Self, StoreError> {
        let kind = RequestKind::parse(&row.kind).ok_or_else(|| bad_status(&row.kind))?;
        let target_entity_type = EntityKind::parse(&row.target_entity_type)
            .ok_or_else(|| bad_status(&row.target_entity_type))?;
        let status = RequestStatus::parse(&row.status).ok_or_else(|| bad_status(&row.status))?;
        let payload = match row.payload {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Ok(PendingRequest {
            id: row.id,
            kind,
            target_entity_type,
            target_id: row.target_id,
            submitted_by_key: row.submitted_by_key,
            submitted_at: row.submitted_at,
            status,
            payload,
            reason: row.reason,
            moderator_notes: row.moderator_notes,
        })
    }
}

/// Append `SET column = value` fragments for a validated field map. The
/// keys have already passed the per-entity allow-list, so they are known
/// column names, never caller-controlled SQL.
fn push_field_assignments(builder: &mut QueryBuilder<Postgres>, fields: &Map<String, Value>) {
    for (key, value) in fields {
        builder.push(format!("{key} = "));
        match value {
            Value::String(v) => builder.push_bind(v.clone()),
            Value::Number(n) => builder.push_bind(n.as_f64()),
            Value::Array(_) => {
                let items: Vec<String> = value
                    .as_array()
                    .map(|a| {
                        a.iter()
                            .filter_map(|v| v.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                builder.push_bind(items)
            }
            _ => builder.push_bind(Option::<String>::None),
        };
        builder.push(", ");
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn find_access_key(&self, key_hash: &str) -> StoreResult<Option<AccessKey>> {
        let row = sqlx::query_as::<_, AccessKeyRow>(
            "SELECT id, key_hash, tier, request_count_in_window, window_started_at, created_at
             FROM access_keys
             WHERE key_hash = $1",
        )
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn insert_access_key(&self, key: AccessKey) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO access_keys
                 (id, key_hash, tier, request_count_in_window, window_started_at, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (key_hash) DO NOTHING",
        )
        .bind(key.id)
        .bind(&key.key_hash)
        .bind(key.tier.level())
        .bind(key.request_count_in_window)
        .bind(key.window_started_at)
        .bind(key.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn record_key_usage(
        &self,
        id: Uuid,
        request_count_in_window: i64,
        window_started_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        sqlx::query(
            "UPDATE access_keys
             SET request_count_in_window = $2, window_started_at = $3
             WHERE id = $1",
        )
        .bind(id)
        .bind(request_count_in_window)
        .bind(window_started_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn domain_values(&self) -> StoreResult<Option<DomainValues>> {
        let row = sqlx::query(
            "SELECT vitolas, colors, countries, strengths, wrappers, binders, fillers
             FROM domain_values
             LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| DomainValues {
            vitolas: row.get("vitolas"),
            colors: row.get("colors"),
            countries: row.get("countries"),
            strengths: row.get("strengths"),
            wrappers: row.get("wrappers"),
            binders: row.get("binders"),
            fillers: row.get("fillers"),
        }))
    }

    async fn put_domain_values(&self, domains: DomainValues) -> StoreResult<()> {
        // Single authoritative row: replace wholesale inside a transaction.
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM domain_values")
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT INTO domain_values
                 (vitolas, colors, countries, strengths, wrappers, binders, fillers, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())",
        )
        .bind(&domains.vitolas)
        .bind(&domains.colors)
        .bind(&domains.countries)
        .bind(&domains.strengths)
        .bind(&domains.wrappers)
        .bind(&domains.binders)
        .bind(&domains.fillers)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(())
    }

    async fn insert_brand(&self, brand: Brand) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO brands
                 (id, name, country, founding_date, logo, address, website, status,
                  moderator_notes, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(brand.id)
        .bind(&brand.name)
        .bind(&brand.country)
        .bind(&brand.founding_date)
        .bind(&brand.logo)
        .bind(&brand.address)
        .bind(&brand.website)
        .bind(brand.status.as_str())
        .bind(&brand.moderator_notes)
        .bind(brand.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_brand(&self, id: Uuid) -> StoreResult<Option<Brand>> {
        let row = sqlx::query_as::<_, BrandRow>("SELECT * FROM brands WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Brand::try_from).transpose()
    }

    async fn list_brands(
        &self,
        filter: &BrandFilter,
        window: PageWindow,
        sort: &Sort,
    ) -> StoreResult<Listing<Brand>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM brands WHERE status = ");
        count.push_bind(filter.status.as_str());
        if let Some(name) = &filter.name_contains {
            count.push(" AND name ILIKE ");
            count.push_bind(format!("%{name}%"));
        }
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM brands WHERE status = ");
        select.push_bind(filter.status.as_str());
        if let Some(name) = &filter.name_contains {
            select.push(" AND name ILIKE ");
            select.push_bind(format!("%{name}%"));
        }
        select.push(sort_clause(sort, "name"));
        push_window(&mut select, window);

        let rows: Vec<BrandRow> = select.build_query_as().fetch_all(&self.pool).await?;
        let items = rows
            .into_iter()
            .map(Brand::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Listing {
            items,
            total: total as u64,
        })
    }

    async fn live_brand_exists(&self, name: &str) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                 SELECT 1 FROM brands
                 WHERE name = $1 AND status IN ('approved', 'create_pending')
             )",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_cigar(&self, cigar: Cigar) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO cigars
                 (id, brand, name, length, ring_gauge, vitola, color, country, wrappers,
                  binders, fillers, strength, year_introduced, status, moderator_notes, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        )
        .bind(cigar.id)
        .bind(&cigar.brand)
        .bind(&cigar.name)
        .bind(cigar.length)
        .bind(cigar.ring_gauge)
        .bind(&cigar.vitola)
        .bind(&cigar.color)
        .bind(&cigar.country)
        .bind(&cigar.wrappers)
        .bind(&cigar.binders)
        .bind(&cigar.fillers)
        .bind(&cigar.strength)
        .bind(&cigar.year_introduced)
        .bind(cigar.status.as_str())
        .bind(&cigar.moderator_notes)
        .bind(cigar.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_cigar(&self, id: Uuid) -> StoreResult<Option<Cigar>> {
        let row = sqlx::query_as::<_, CigarRow>("SELECT * FROM cigars WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Cigar::try_from).transpose()
    }

    async fn list_cigars(
        &self,
        status: EntityStatus,
        filter: &CigarFilter,
        window: PageWindow,
        sort: &Sort,
    ) -> StoreResult<Listing<Cigar>> {
        fn push_filters(builder: &mut QueryBuilder<Postgres>, status: EntityStatus, filter: &CigarFilter) {
            builder.push(" WHERE status = ");
            builder.push_bind(status.as_str());
            if let Some(brand) = &filter.brand {
                builder.push(" AND brand = ");
                builder.push_bind(brand.clone());
            }
            if let Some(name) = &filter.name_contains {
                builder.push(" AND name ILIKE ");
                builder.push_bind(format!("%{name}%"));
            }
            for (column, value) in [
                ("vitola", &filter.vitola),
                ("color", &filter.color),
                ("country", &filter.country),
                ("strength", &filter.strength),
            ] {
                if let Some(value) = value {
                    builder.push(format!(" AND {column} = "));
                    builder.push_bind(value.clone());
                }
            }
            for (column, values) in [
                ("wrappers", &filter.wrappers),
                ("binders", &filter.binders),
                ("fillers", &filter.fillers),
            ] {
                if !values.is_empty() {
                    builder.push(format!(" AND {column} && "));
                    builder.push_bind(values.clone());
                }
            }
        }

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM cigars");
        push_filters(&mut count, status, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM cigars");
        push_filters(&mut select, status, filter);
        select.push(sort_clause(sort, "name"));
        push_window(&mut select, window);

        let rows: Vec<CigarRow> = select.build_query_as().fetch_all(&self.pool).await?;
        let items = rows
            .into_iter()
            .map(Cigar::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Listing {
            items,
            total: total as u64,
        })
    }

    async fn entity_exists(&self, kind: EntityKind, id: Uuid) -> StoreResult<bool> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
            entity_table(kind)
        );
        let exists: bool = sqlx::query_scalar(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn transition_entity_status(
        &self,
        kind: EntityKind,
        id: Uuid,
        from: EntityStatus,
        to: EntityStatus,
        moderator_notes: Option<&str>,
    ) -> StoreResult<bool> {
        // The precondition rides in the WHERE clause; only one of two
        // racing callers can see rows_affected == 1.
        let query = format!(
            "UPDATE {}
             SET status = $1, moderator_notes = COALESCE($2, moderator_notes), updated_at = NOW()
             WHERE id = $3 AND status = $4",
            entity_table(kind)
        );
        let affected = sqlx::query(&query)
            .bind(to.as_str())
            .bind(moderator_notes)
            .bind(id)
            .bind(from.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected == 1)
    }

    async fn apply_entity_update(
        &self,
        kind: EntityKind,
        id: Uuid,
        fields: &Map<String, Value>,
    ) -> StoreResult<bool> {
        if fields.is_empty() {
            return self.entity_exists(kind, id).await;
        }

        let mut builder =
            QueryBuilder::<Postgres>::new(format!("UPDATE {} SET ", entity_table(kind)));
        push_field_assignments(&mut builder, fields);
        builder.push("updated_at = NOW() WHERE id = ");
        builder.push_bind(id);

        let affected = builder.build().execute(&self.pool).await?.rows_affected();
        Ok(affected == 1)
    }

    async fn deny_create_pending_cigars(
        &self,
        brand_name: &str,
        moderator_notes: Option<&str>,
    ) -> StoreResult<u64> {
        let affected = sqlx::query(
            "UPDATE cigars
             SET status = 'denied', moderator_notes = COALESCE($2, moderator_notes),
                 updated_at = NOW()
             WHERE brand = $1 AND status = 'create_pending'",
        )
        .bind(brand_name)
        .bind(moderator_notes)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected)
    }

    async fn insert_pending_request(&self, request: PendingRequest) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO pending_requests
                 (id, kind, target_entity_type, target_id, submitted_by_key, submitted_at,
                  status, payload, reason, moderator_notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(request.id)
        .bind(request.kind.as_str())
        .bind(request.target_entity_type.as_str())
        .bind(request.target_id)
        .bind(request.submitted_by_key)
        .bind(request.submitted_at)
        .bind(request.status.as_str())
        .bind(Value::Object(request.payload.clone()))
        .bind(&request.reason)
        .bind(&request.moderator_notes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_pending_request(&self, id: Uuid) -> StoreResult<Option<PendingRequest>> {
        let row =
            sqlx::query_as::<_, PendingRequestRow>("SELECT * FROM pending_requests WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(PendingRequest::try_from).transpose()
    }

    async fn list_pending_requests(
        &self,
        kind: RequestKind,
        target: EntityKind,
        status: RequestStatus,
        sort: &Sort,
    ) -> StoreResult<Listing<PendingRequest>> {
        let direction = if sort.descending { "DESC" } else { "ASC" };
        let query = format!(
            "SELECT * FROM pending_requests
             WHERE kind = $1 AND target_entity_type = $2 AND status = $3
             ORDER BY submitted_at {direction}"
        );
        let rows: Vec<PendingRequestRow> = sqlx::query_as(&query)
            .bind(kind.as_str())
            .bind(target.as_str())
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(PendingRequest::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let total = items.len() as u64;

        Ok(Listing { items, total })
    }

    async fn resolve_pending_request(
        &self,
        id: Uuid,
        to: RequestStatus,
        moderator_notes: Option<&str>,
    ) -> StoreResult<bool> {
        let affected = sqlx::query(
            "UPDATE pending_requests
             SET status = $1, moderator_notes = COALESCE($2, moderator_notes)
             WHERE id = $3 AND status = 'pending'",
        )
        .bind(to.as_str())
        .bind(moderator_notes)
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected == 1)
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
