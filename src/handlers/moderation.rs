//! Moderation HTTP handlers (Moderator tier only).
//!
//! The queue surface mirrors both entity types across all three request
//! kinds, addressed by queue name:
//!
//! - `GET /moderate/{queue}` — list pending work
//! - `PUT /moderate/{queue}/{id}` — approve
//! - `DELETE /moderate/{queue}/{id}?notes=` — deny
//!
//! Create queues list the `create_pending` entities themselves and their
//! decisions address entity ids; update/delete queues list durable
//! [`crate::models::pending_request::PendingRequest`] records and their
//! decisions address request ids.

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use super::{parse_sort, require_moderator};
use crate::app::AppState;
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::brand::BrandResponse;
use crate::models::cigar::CigarResponse;
use crate::models::lifecycle::{EntityKind, EntityStatus, RequestKind, RequestStatus};
use crate::models::pending_request::PendingRequestResponse;
use crate::models::response::{IdPayload, MutationResponse, QueueResponse};
use crate::services::moderation;
use crate::store::{BrandFilter, CatalogStore, CigarFilter, PageWindow};

/// Resolve a queue name from the legacy route scheme
/// (`brandsCreateRequests`, `cigarsDeleteRequests`, ...).
fn parse_queue(name: &str) -> Result<(RequestKind, EntityKind), AppError> {
    let queue = match name {
        "brandsCreateRequests" => (RequestKind::Create, EntityKind::Brand),
        "brandsUpdateRequests" => (RequestKind::Update, EntityKind::Brand),
        "brandsDeleteRequests" => (RequestKind::Delete, EntityKind::Brand),
        "cigarsCreateRequests" => (RequestKind::Create, EntityKind::Cigar),
        "cigarsUpdateRequests" => (RequestKind::Update, EntityKind::Cigar),
        "cigarsDeleteRequests" => (RequestKind::Delete, EntityKind::Cigar),
        _ => {
            return Err(AppError::NotFound(
                "Unknown moderation queue.".to_string(),
            ));
        }
    };
    Ok(queue)
}

/// List a moderation queue. Always 200; an idle queue is an empty list.
pub async fn list_queue(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(queue): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    require_moderator(&auth)?;
    let (kind, target) = parse_queue(&queue)?;
    // Moderators review everything at once.
    let window = PageWindow::for_tier(auth.tier, 1, state.default_page_size);

    let response = match (kind, target) {
        (RequestKind::Create, EntityKind::Brand) => {
            let sort = parse_sort(&params, &["name", "updated"], "updated")?;
            let filter = BrandFilter {
                status: EntityStatus::CreatePending,
                name_contains: None,
            };
            let listing = state.store.list_brands(&filter, window, &sort).await?;
            Json(QueueResponse::<BrandResponse> {
                number_of_documents: listing.total,
                data: listing.items.into_iter().map(Into::into).collect(),
            })
            .into_response()
        }
        (RequestKind::Create, EntityKind::Cigar) => {
            let sort = parse_sort(&params, &["name", "brand", "updated"], "updated")?;
            let listing = state
                .store
                .list_cigars(
                    EntityStatus::CreatePending,
                    &CigarFilter::default(),
                    window,
                    &sort,
                )
                .await?;
            Json(QueueResponse::<CigarResponse> {
                number_of_documents: listing.total,
                data: listing.items.into_iter().map(Into::into).collect(),
            })
            .into_response()
        }
        _ => {
            let sort = parse_sort(&params, &["submitted"], "submitted")?;
            let listing = state
                .store
                .list_pending_requests(kind, target, RequestStatus::Pending, &sort)
                .await?;
            Json(QueueResponse::<PendingRequestResponse> {
                number_of_documents: listing.total,
                data: listing.items.into_iter().map(Into::into).collect(),
            })
            .into_response()
        }
    };

    Ok(response)
}

/// Approve one queued item. Decisions are single-shot: a second approval
/// of the same id answers 409.
pub async fn approve(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((queue, id)): Path<(String, Uuid)>,
) -> Result<Json<MutationResponse>, AppError> {
    require_moderator(&auth)?;
    let (kind, target) = parse_queue(&queue)?;

    let message = match kind {
        RequestKind::Create => {
            moderation::approve_creation(state.store.as_ref(), target, id).await?
        }
        _ => moderation::approve_request(state.store.as_ref(), id, kind, target).await?,
    };

    Ok(Json(MutationResponse {
        data: Some(IdPayload { id }),
        message,
    }))
}

/// Deny one queued item, recording optional `notes`. Denying a brand
/// creation also denies its still-pending cigars.
pub async fn deny(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((queue, id)): Path<(String, Uuid)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<MutationResponse>, AppError> {
    require_moderator(&auth)?;
    let (kind, target) = parse_queue(&queue)?;
    let notes = params.get("notes").cloned().filter(|n| !n.is_empty());

    let message = match kind {
        RequestKind::Create => {
            moderation::deny_creation(state.store.as_ref(), target, id, notes).await?
        }
        _ => moderation::deny_request(state.store.as_ref(), id, kind, target, notes).await?,
    };

    Ok(Json(MutationResponse {
        data: Some(IdPayload { id }),
        message,
    }))
}
