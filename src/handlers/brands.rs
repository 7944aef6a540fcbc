//! Brand catalog HTTP handlers.
//!
//! - `GET /brands` — paginated listing, name search
//! - `GET /brands/{id}` — single approved brand
//! - `POST /brands` — create (direct-apply or pending per tier)
//! - `PUT /brands/{id}` — update (queued unless moderator)
//! - `DELETE /brands/{id}` — delete (queued with reason unless moderator)

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::{mutation_response, parse_page, parse_sort};
use crate::app::AppState;
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::brand::BrandResponse;
use crate::models::lifecycle::{EntityKind, EntityStatus};
use crate::models::response::{ItemResponse, MutationResponse, PagedResponse};
use crate::services::{moderation, validation};
use crate::store::{BrandFilter, CatalogStore, PageWindow};

const SORTABLE_FIELDS: &[&str] = &["name", "country", "updated"];

/// List approved brands, paginated for Developer keys and optionally
/// filtered by a case-insensitive name search.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "numberOfPages": 3,
///   "currentPage": 1,
///   "data": [{ "id": "...", "name": "Arturo Fuente", "status": "approved" }]
/// }
/// ```
///
/// An empty result set answers 404.
pub async fn get_brands(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<PagedResponse<BrandResponse>>, AppError> {
    let page = parse_page(&params)?;
    let sort = parse_sort(&params, SORTABLE_FIELDS, "name")?;
    let filter = BrandFilter {
        status: EntityStatus::Approved,
        name_contains: params.get("name").cloned().filter(|name| !name.is_empty()),
    };
    let window = PageWindow::for_tier(auth.tier, page, state.default_page_size);

    let listing = state.store.list_brands(&filter, window, &sort).await?;
    if listing.items.is_empty() {
        return Err(AppError::NotFound("No records found!".to_string()));
    }

    Ok(Json(PagedResponse {
        number_of_pages: window.number_of_pages(listing.total),
        current_page: page,
        data: listing.items.into_iter().map(Into::into).collect(),
    }))
}

/// Fetch a single approved brand by id.
pub async fn get_brand(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemResponse<BrandResponse>>, AppError> {
    let brand = state
        .store
        .find_brand(id)
        .await?
        .filter(|brand| brand.status == EntityStatus::Approved)
        .ok_or_else(|| AppError::NotFound("Brand not found!".to_string()))?;

    Ok(Json(ItemResponse { data: brand.into() }))
}

/// Create a brand. Always answers 202; the message says whether the brand
/// is awaiting approval or was approved directly.
pub async fn create_brand(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<(StatusCode, Json<MutationResponse>), AppError> {
    let fields = validation::collect_entity_fields(EntityKind::Brand, &params)?;
    let domains = state.domains.get(state.store.as_ref()).await?;
    validation::validate_against_domains(&fields, &domains)?;

    let outcome = moderation::create_brand(state.store.as_ref(), auth.tier, &fields).await?;
    Ok(mutation_response(outcome, StatusCode::ACCEPTED))
}

/// Update a brand: applied in place for moderators (200), queued for
/// everyone else (202).
pub async fn update_brand(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<(StatusCode, Json<MutationResponse>), AppError> {
    let fields = validation::collect_entity_fields(EntityKind::Brand, &params)?;
    let domains = state.domains.get(state.store.as_ref()).await?;
    validation::validate_against_domains(&fields, &domains)?;

    let outcome = moderation::update_entity(
        state.store.as_ref(),
        EntityKind::Brand,
        auth.tier,
        auth.key_id,
        id,
        fields,
    )
    .await?;
    Ok(mutation_response(outcome, StatusCode::OK))
}

/// Delete a brand: status flip for moderators (200), queued with a
/// mandatory reason for everyone else (202).
pub async fn remove_brand(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<(StatusCode, Json<MutationResponse>), AppError> {
    let reason = params.get("reason").cloned().filter(|r| !r.is_empty());
    let outcome = moderation::delete_entity(
        state.store.as_ref(),
        EntityKind::Brand,
        auth.tier,
        auth.key_id,
        id,
        reason,
    )
    .await?;
    Ok(mutation_response(outcome, StatusCode::OK))
}
