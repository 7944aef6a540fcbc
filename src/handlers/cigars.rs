//! Cigar catalog HTTP handlers.
//!
//! Same verbs as the brand surface, with one extra rule on the listing:
//! Developer keys must supply at least one catalog filter; only Premium
//! and above may walk the whole table.

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
use crate::models::access_key::AccessTier;
use crate::models::cigar::CigarResponse;
use crate::models::lifecycle::{EntityKind, EntityStatus};
use crate::models::response::{ItemResponse, MutationResponse, PagedResponse};
use crate::services::{moderation, validation};
use crate::store::{CatalogStore, CigarFilter, PageWindow};

const SORTABLE_FIELDS: &[&str] = &["name", "brand", "updated"];

fn split_filter_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn filter_from_params(params: &HashMap<String, String>) -> CigarFilter {
    let scalar = |key: &str| params.get(key).cloned().filter(|v| !v.is_empty());
    let list = |key: &str| {
        params
            .get(key)
            .map(|raw| split_filter_list(raw))
            .unwrap_or_default()
    };
    CigarFilter {
        brand: scalar("brand"),
        name_contains: scalar("name"),
        vitola: scalar("vitola"),
        color: scalar("color"),
        country: scalar("country"),
        strength: scalar("strength"),
        wrappers: list("wrappers"),
        binders: list("binders"),
        fillers: list("fillers"),
    }
}

/// List approved cigars matching the supplied filters.
///
/// Developer keys must filter by at least one catalog field; list-valued
/// filters (wrappers, binders, fillers) take comma-separated values and
/// match on overlap. An empty result set answers 404.
pub async fn get_cigars(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<PagedResponse<CigarResponse>>, AppError> {
    let filter = filter_from_params(&params);
    if filter.is_unfiltered() && auth.tier < AccessTier::Premium {
        return Err(AppError::MissingParameter(
            "You must supply at least one field.".to_string(),
        ));
    }

    let page = parse_page(&params)?;
    let sort = parse_sort(&params, SORTABLE_FIELDS, "name")?;
    let window = PageWindow::for_tier(auth.tier, page, state.default_page_size);

    let listing = state
        .store
        .list_cigars(EntityStatus::Approved, &filter, window, &sort)
        .await?;
    if listing.items.is_empty() {
        return Err(AppError::NotFound("No records found!".to_string()));
    }

    Ok(Json(PagedResponse {
        number_of_pages: window.number_of_pages(listing.total),
        current_page: page,
        data: listing.items.into_iter().map(Into::into).collect(),
    }))
}

/// Fetch a single approved cigar by id.
pub async fn get_cigar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemResponse<CigarResponse>>, AppError> {
    let cigar = state
        .store
        .find_cigar(id)
        .await?
        .filter(|cigar| cigar.status == EntityStatus::Approved)
        .ok_or_else(|| AppError::NotFound("Cigar not found.".to_string()))?;

    Ok(Json(ItemResponse { data: cigar.into() }))
}

/// Create a cigar. The referenced brand must already exist (approved or
/// still pending); otherwise 404 tells the caller to create it first.
pub async fn create_cigar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<(StatusCode, Json<MutationResponse>), AppError> {
    let fields = validation::collect_entity_fields(EntityKind::Cigar, &params)?;
    let domains = state.domains.get(state.store.as_ref()).await?;
    validation::validate_against_domains(&fields, &domains)?;

    let outcome = moderation::create_cigar(state.store.as_ref(), auth.tier, &fields).await?;
    Ok(mutation_response(outcome, StatusCode::ACCEPTED))
}

/// Update a cigar: applied in place for moderators, queued otherwise.
pub async fn update_cigar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<(StatusCode, Json<MutationResponse>), AppError> {
    let fields = validation::collect_entity_fields(EntityKind::Cigar, &params)?;
    let domains = state.domains.get(state.store.as_ref()).await?;
    validation::validate_against_domains(&fields, &domains)?;

    let outcome = moderation::update_entity(
        state.store.as_ref(),
        EntityKind::Cigar,
        auth.tier,
        auth.key_id,
        id,
        fields,
    )
    .await?;
    Ok(mutation_response(outcome, StatusCode::OK))
}

/// Delete a cigar: status flip for moderators, queued with a reason
/// otherwise.
pub async fn remove_cigar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<(StatusCode, Json<MutationResponse>), AppError> {
    let reason = params.get("reason").cloned().filter(|r| !r.is_empty());
    let outcome = moderation::delete_entity(
        state.store.as_ref(),
        EntityKind::Cigar,
        auth.tier,
        auth.key_id,
        id,
        reason,
    )
    .await?;
    Ok(mutation_response(outcome, StatusCode::OK))
}
