//! Lifecycle enums for catalog entities and moderation queue records.
//!
//! Entities move through `create_pending -> approved -> deleted` (or
//! `create_pending -> denied`); queue records resolve from `pending` to
//! exactly one of `approved` / `denied`. The strings here are the wire and
//! storage representation, so they never change casually.

use serde::{Deserialize, Serialize};

/// The two catalog entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Brand,
    Cigar,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Brand => "brand",
            EntityKind::Cigar => "cigar",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "brand" => Some(EntityKind::Brand),
            "cigar" => Some(EntityKind::Cigar),
            _ => None,
        }
    }
}

/// Lifecycle state of a catalog entity.
///
/// Permitted transitions:
/// - `CreatePending -> Approved` (creation approved)
/// - `CreatePending -> Denied` (creation denied)
/// - `Approved -> Deleted` (delete applied)
///
/// Entities are never removed from storage; `Deleted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    CreatePending,
    Approved,
    Denied,
    Deleted,
}

impl EntityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityStatus::CreatePending => "create_pending",
            EntityStatus::Approved => "approved",
            EntityStatus::Denied => "denied",
            EntityStatus::Deleted => "deleted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "create_pending" => Some(EntityStatus::CreatePending),
            "approved" => Some(EntityStatus::Approved),
            "denied" => Some(EntityStatus::Denied),
            "deleted" => Some(EntityStatus::Deleted),
            _ => None,
        }
    }
}

/// Kind of write a caller submitted.
///
/// Create requests are carried on the entity itself (`EntityStatus::CreatePending`);
/// only Update and Delete produce durable [`super::pending_request::PendingRequest`]
/// records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Create,
    Update,
    Delete,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Create => "create",
            RequestKind::Update => "update",
            RequestKind::Delete => "delete",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "create" => Some(RequestKind::Create),
            "update" => Some(RequestKind::Update),
            "delete" => Some(RequestKind::Delete),
            _ => None,
        }
    }
}

/// Resolution state of a queued moderation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Denied => "denied",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(RequestStatus::Pending),
            "approved" => Some(RequestStatus::Approved),
            "denied" => Some(RequestStatus::Denied),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_round_trip() {
        for status in [
            EntityStatus::CreatePending,
            EntityStatus::Approved,
            EntityStatus::Denied,
            EntityStatus::Deleted,
        ] {
            assert_eq!(EntityStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(EntityStatus::parse("rejected"), None);
    }

    #[test]
    fn request_status_strings_round_trip() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Denied,
        ] {
            assert_eq!(RequestStatus::parse(status.as_str()), Some(status));
        }
    }
}
