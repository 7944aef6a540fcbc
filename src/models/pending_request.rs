//! Durable moderation queue record for update and delete submissions.
//!
//! Create submissions never land here — they are carried on the entity
//! itself with status `create_pending`. Update and Delete submissions from
//! non-moderators become one of these records and wait for a moderator
//! decision. Records are never deleted; the table doubles as the audit
//! trail, and only `status` (plus `moderator_notes`) ever changes — exactly
//! once, via a conditional update.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::lifecycle::{EntityKind, RequestKind, RequestStatus};

/// Represents a queued update or delete awaiting moderation.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    /// Unique identifier for this request
    pub id: Uuid,

    /// Update or Delete (Create is carried on the entity)
    pub kind: RequestKind,

    /// Entity type the request targets
    pub target_entity_type: EntityKind,

    /// Id of the targeted entity
    pub target_id: Uuid,

    /// Access key that submitted the request
    pub submitted_by_key: Uuid,

    /// Submission timestamp
    pub submitted_at: DateTime<Utc>,

    /// Resolution state; flips from Pending exactly once
    pub status: RequestStatus,

    /// Validated field map for Update requests; empty for Delete
    pub payload: Map<String, Value>,

    /// Submitter's justification, required for Delete requests
    pub reason: Option<String>,

    /// Notes recorded by the deciding moderator
    pub moderator_notes: Option<String>,
}

impl PendingRequest {
    /// Build a fresh update request carrying a validated field map.
    pub fn update(
        target_entity_type: EntityKind,
        target_id: Uuid,
        submitted_by_key: Uuid,
        payload: Map<String, Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: RequestKind::Update,
            target_entity_type,
            target_id,
            submitted_by_key,
            submitted_at: Utc::now(),
            status: RequestStatus::Pending,
            payload,
            reason: None,
            moderator_notes: None,
        }
    }

    /// Build a fresh delete request carrying the submitter's reason.
    pub fn delete(
        target_entity_type: EntityKind,
        target_id: Uuid,
        submitted_by_key: Uuid,
        reason: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: RequestKind::Delete,
            target_entity_type,
            target_id,
            submitted_by_key,
            submitted_at: Utc::now(),
            status: RequestStatus::Pending,
            payload: Map::new(),
            reason: Some(reason),
            moderator_notes: None,
        }
    }
}

/// Response body for moderation queue listings.
#[derive(Debug, Serialize)]
pub struct PendingRequestResponse {
    pub id: Uuid,
    pub kind: RequestKind,
    pub target_entity_type: EntityKind,
    pub target_id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub payload: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderator_notes: Option<String>,
}

/// Convert a stored request into its API shape, dropping the submitter key.
impl From<PendingRequest> for PendingRequestResponse {
    fn from(request: PendingRequest) -> Self {
        Self {
            id: request.id,
            kind: request.kind,
            target_entity_type: request.target_entity_type,
            target_id: request.target_id,
            submitted_at: request.submitted_at,
            status: request.status,
            payload: request.payload,
            reason: request.reason,
            moderator_notes: request.moderator_notes,
        }
    }
}
