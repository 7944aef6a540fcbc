//! Moderation policy engine.
//!
//! Every write funnels through here after authentication and validation.
//! The policy has two axes: the operation (create / update / delete) and
//! the caller's tier. Moderators mutate canonical records directly;
//! everyone else produces either a `create_pending` entity or a durable
//! [`PendingRequest`] that waits in the queue.
//!
//! Approve/deny are the only paths that resolve queued work, and each
//! outcome transition is a store-level conditional update: of two racing
//! moderators, exactly one wins and the other gets `Conflict`. An approval
//! whose entity mutation touches zero records reports `NotFound` instead
//! of pretending it applied.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::access_key::AccessTier;
use crate::models::brand::Brand;
use crate::models::cigar::Cigar;
use crate::models::lifecycle::{EntityKind, EntityStatus, RequestKind, RequestStatus};
use crate::models::pending_request::PendingRequest;
use crate::store::CatalogStore;

/// Result of a write submission: applied directly or parked in the queue.
#[derive(Debug)]
pub struct WriteOutcome {
    /// Id of the created entity (creates only).
    pub id: Option<Uuid>,
    /// True when the change waits for moderator review.
    pub queued: bool,
    /// Human-readable description of the resulting lifecycle state.
    pub message: String,
}

fn take_string(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}

fn take_f64(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    fields.get(key).and_then(Value::as_f64)
}

fn take_list(fields: &Map<String, Value>, key: &str) -> Vec<String> {
    fields
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn create_status(tier: AccessTier) -> EntityStatus {
    // Moderators skip the queue.
    if tier >= AccessTier::Moderator {
        EntityStatus::Approved
    } else {
        EntityStatus::CreatePending
    }
}

fn not_found(kind: EntityKind) -> AppError {
    match kind {
        EntityKind::Brand => AppError::NotFound("Brand not found!".to_string()),
        EntityKind::Cigar => AppError::NotFound("Cigar not found.".to_string()),
    }
}

/// Create a brand. Requires `name`; status depends on the caller's tier.
pub async fn create_brand(
    store: &dyn CatalogStore,
    tier: AccessTier,
    fields: &Map<String, Value>,
) -> Result<WriteOutcome, AppError> {
    let name = take_string(fields, "name").filter(|n| !n.is_empty()).ok_or_else(|| {
        AppError::MissingParameter("You must supply at least a name.".to_string())
    })?;

    let status = create_status(tier);
    let brand = Brand {
        id: Uuid::new_v4(),
        name,
        country: take_string(fields, "country"),
        founding_date: take_string(fields, "founding_date"),
        logo: take_string(fields, "logo"),
        address: take_string(fields, "address"),
        website: take_string(fields, "website"),
        status,
        moderator_notes: None,
        updated_at: chrono::Utc::now(),
    };
    let id = brand.id;
    store.insert_brand(brand).await?;

    let (queued, message) = match status {
        EntityStatus::Approved => (
            false,
            "The brand has been created and approved.".to_string(),
        ),
        _ => (
            true,
            "The brand has been created and is awaiting approval.".to_string(),
        ),
    };
    tracing::info!(brand_id = %id, queued, "brand created");

    Ok(WriteOutcome {
        id: Some(id),
        queued,
        message,
    })
}

/// Create a cigar. Requires `brand` and `name`, and the referenced brand
/// must currently exist in status approved or create_pending — users may
/// submit a brand and its cigars together without waiting for the brand to
/// clear the queue. The existence check and the save are not transactional;
/// that narrow race is accepted.
pub async fn create_cigar(
    store: &dyn CatalogStore,
    tier: AccessTier,
    fields: &Map<String, Value>,
) -> Result<WriteOutcome, AppError> {
    let brand_name = take_string(fields, "brand").filter(|b| !b.is_empty());
    let name = take_string(fields, "name").filter(|n| !n.is_empty());
    let (brand_name, name) = match (brand_name, name) {
        (Some(brand), Some(name)) => (brand, name),
        _ => {
            return Err(AppError::MissingParameter(
                "You must supply at least a brand and a name.".to_string(),
            ));
        }
    };

    if !store.live_brand_exists(&brand_name).await? {
        return Err(AppError::NotFound(
            "The brand you specified was not found in the database. If you want to add \
             a new brand and associated cigars, please create the brand first."
                .to_string(),
        ));
    }

    let status = create_status(tier);
    let cigar = Cigar {
        id: Uuid::new_v4(),
        brand: brand_name,
        name,
        length: take_f64(fields, "length"),
        ring_gauge: take_f64(fields, "ring_gauge"),
        vitola: take_string(fields, "vitola"),
        color: take_string(fields, "color"),
        country: take_string(fields, "country"),
        wrappers: take_list(fields, "wrappers"),
        binders: take_list(fields, "binders"),
        fillers: take_list(fields, "fillers"),
        strength: take_string(fields, "strength"),
        year_introduced: take_string(fields, "year_introduced"),
        status,
        moderator_notes: None,
        updated_at: chrono::Utc::now(),
    };
    let id = cigar.id;
    store.insert_cigar(cigar).await?;

    let (queued, message) = match status {
        EntityStatus::Approved => (
            false,
            "The cigar has been created and approved.".to_string(),
        ),
        _ => (
            true,
            "The cigar has been created and is awaiting approval.".to_string(),
        ),
    };
    tracing::info!(cigar_id = %id, queued, "cigar created");

    Ok(WriteOutcome {
        id: Some(id),
        queued,
        message,
    })
}

/// Update an entity: applied in place for moderators, queued otherwise.
pub async fn update_entity(
    store: &dyn CatalogStore,
    kind: EntityKind,
    tier: AccessTier,
    submitted_by_key: Uuid,
    target_id: Uuid,
    fields: Map<String, Value>,
) -> Result<WriteOutcome, AppError> {
    if fields.is_empty() {
        return Err(AppError::MissingParameter(
            "You must supply at least one field to update.".to_string(),
        ));
    }
    if !store.entity_exists(kind, target_id).await? {
        return Err(not_found(kind));
    }

    if tier >= AccessTier::Moderator {
        if !store.apply_entity_update(kind, target_id, &fields).await? {
            return Err(not_found(kind));
        }
        tracing::info!(target_id = %target_id, kind = kind.as_str(), "update applied directly");
        return Ok(WriteOutcome {
            id: None,
            queued: false,
            message: "The update has been processed.".to_string(),
        });
    }

    let request = PendingRequest::update(kind, target_id, submitted_by_key, fields);
    let request_id = request.id;
    store.insert_pending_request(request).await?;
    tracing::info!(request_id = %request_id, target_id = %target_id, "update queued");

    Ok(WriteOutcome {
        id: None,
        queued: true,
        message: "The update has been submitted and is awaiting approval.".to_string(),
    })
}

/// Delete an entity: direct status flip for moderators (reason optional),
/// queued with a mandatory reason for everyone else.
pub async fn delete_entity(
    store: &dyn CatalogStore,
    kind: EntityKind,
    tier: AccessTier,
    submitted_by_key: Uuid,
    target_id: Uuid,
    reason: Option<String>,
) -> Result<WriteOutcome, AppError> {
    if !store.entity_exists(kind, target_id).await? {
        return Err(not_found(kind));
    }

    if tier >= AccessTier::Moderator {
        // Only approved entities can be deleted; anything else means the
        // record is mid-moderation or already terminal.
        let flipped = store
            .transition_entity_status(
                kind,
                target_id,
                EntityStatus::Approved,
                EntityStatus::Deleted,
                reason.as_deref(),
            )
            .await?;
        if !flipped {
            return Err(AppError::Conflict(
                "The record cannot be deleted in its current state.".to_string(),
            ));
        }
        tracing::info!(target_id = %target_id, kind = kind.as_str(), "delete applied directly");
        return Ok(WriteOutcome {
            id: None,
            queued: false,
            message: "The delete has been processed.".to_string(),
        });
    }

    let reason = reason.filter(|r| !r.is_empty()).ok_or_else(|| {
        AppError::MissingParameter("You must provide a reason.".to_string())
    })?;
    let request = PendingRequest::delete(kind, target_id, submitted_by_key, reason);
    let request_id = request.id;
    store.insert_pending_request(request).await?;
    tracing::info!(request_id = %request_id, target_id = %target_id, "delete queued");

    Ok(WriteOutcome {
        id: None,
        queued: true,
        message: "The delete request has been submitted and is awaiting approval.".to_string(),
    })
}

async fn creation_decision_failure(
    store: &dyn CatalogStore,
    kind: EntityKind,
    entity_id: Uuid,
) -> AppError {
    match store.entity_exists(kind, entity_id).await {
        Ok(false) => not_found(kind),
        Ok(true) => AppError::Conflict("This request has already been resolved.".to_string()),
        Err(err) => err.into(),
    }
}

/// Approve a queued creation: flips the entity `create_pending -> approved`.
pub async fn approve_creation(
    store: &dyn CatalogStore,
    kind: EntityKind,
    entity_id: Uuid,
) -> Result<String, AppError> {
    let flipped = store
        .transition_entity_status(
            kind,
            entity_id,
            EntityStatus::CreatePending,
            EntityStatus::Approved,
            None,
        )
        .await?;
    if !flipped {
        return Err(creation_decision_failure(store, kind, entity_id).await);
    }
    tracing::info!(entity_id = %entity_id, kind = kind.as_str(), "creation approved");

    Ok(format!("The {} has been approved.", kind.as_str()))
}

/// Deny a queued creation: flips the entity `create_pending -> denied`.
///
/// Denying a brand cascades: every create-pending cigar carrying the
/// denied brand's name is denied with it, since a cigar cannot outlive the
/// denial of its parent brand.
pub async fn deny_creation(
    store: &dyn CatalogStore,
    kind: EntityKind,
    entity_id: Uuid,
    moderator_notes: Option<String>,
) -> Result<String, AppError> {
    // The brand name is needed for the cascade, so fetch before flipping.
    let brand_name = match kind {
        EntityKind::Brand => store.find_brand(entity_id).await?.map(|b| b.name),
        EntityKind::Cigar => None,
    };

    let flipped = store
        .transition_entity_status(
            kind,
            entity_id,
            EntityStatus::CreatePending,
            EntityStatus::Denied,
            moderator_notes.as_deref(),
        )
        .await?;
    if !flipped {
        return Err(creation_decision_failure(store, kind, entity_id).await);
    }

    if let Some(brand_name) = brand_name {
        let cascaded = store
            .deny_create_pending_cigars(&brand_name, moderator_notes.as_deref())
            .await?;
        if cascaded > 0 {
            tracing::info!(brand = %brand_name, cascaded, "denied pending cigars of denied brand");
        }
    }
    tracing::info!(entity_id = %entity_id, kind = kind.as_str(), "creation denied");

    Ok(format!("The {} has been denied.", kind.as_str()))
}

async fn load_queue_request(
    store: &dyn CatalogStore,
    request_id: Uuid,
    expected_kind: RequestKind,
    expected_target: EntityKind,
) -> Result<PendingRequest, AppError> {
    let request = store
        .find_pending_request(request_id)
        .await?
        .filter(|r| r.kind == expected_kind && r.target_entity_type == expected_target)
        .ok_or_else(|| AppError::NotFound("Request not found!".to_string()))?;
    Ok(request)
}

/// Approve a queued update or delete.
///
/// The request record flips `pending -> approved` first (a conditional
/// update, so a second approval of the same id loses with `Conflict`), and
/// the queued change is applied to the target afterwards. If the target
/// mutation touches zero records the approval reports `NotFound` rather
/// than silently succeeding.
pub async fn approve_request(
    store: &dyn CatalogStore,
    request_id: Uuid,
    expected_kind: RequestKind,
    expected_target: EntityKind,
) -> Result<String, AppError> {
    let request = load_queue_request(store, request_id, expected_kind, expected_target).await?;

    let won = store
        .resolve_pending_request(request_id, RequestStatus::Approved, None)
        .await?;
    if !won {
        return Err(AppError::Conflict(
            "This request has already been resolved.".to_string(),
        ));
    }

    let kind = request.target_entity_type;
    match request.kind {
        RequestKind::Update => {
            if !store
                .apply_entity_update(kind, request.target_id, &request.payload)
                .await?
            {
                return Err(AppError::NotFound(
                    "The target of this request no longer exists.".to_string(),
                ));
            }
            // An approved update also clears a still-pending creation.
            store
                .transition_entity_status(
                    kind,
                    request.target_id,
                    EntityStatus::CreatePending,
                    EntityStatus::Approved,
                    None,
                )
                .await?;
        }
        RequestKind::Delete => {
            let flipped = store
                .transition_entity_status(
                    kind,
                    request.target_id,
                    EntityStatus::Approved,
                    EntityStatus::Deleted,
                    None,
                )
                .await?;
            if !flipped {
                return Err(AppError::NotFound(
                    "The target of this request could not be deleted.".to_string(),
                ));
            }
        }
        // Creations never produce queue records; they resolve on the entity.
        RequestKind::Create => {
            return Err(AppError::Conflict(
                "Create requests are resolved on the entity itself.".to_string(),
            ));
        }
    }
    tracing::info!(request_id = %request_id, kind = request.kind.as_str(), "request approved");

    Ok("The request has been approved and the change has been applied.".to_string())
}

/// Deny a queued update or delete, recording the moderator's notes. The
/// target entity is never touched.
pub async fn deny_request(
    store: &dyn CatalogStore,
    request_id: Uuid,
    expected_kind: RequestKind,
    expected_target: EntityKind,
    moderator_notes: Option<String>,
) -> Result<String, AppError> {
    load_queue_request(store, request_id, expected_kind, expected_target).await?;

    let won = store
        .resolve_pending_request(request_id, RequestStatus::Denied, moderator_notes.as_deref())
        .await?;
    if !won {
        return Err(AppError::Conflict(
            "This request has already been resolved.".to_string(),
        ));
    }
    tracing::info!(request_id = %request_id, "request denied");

    Ok("The request has been denied.".to_string())
}
