//! Data models representing stored entities and API payload shapes.
//!
//! This module contains the catalog entities, the moderation queue record,
//! the access-key model, and the response envelopes shared by handlers.

/// API access key and tier model
pub mod access_key;
/// Brand catalog entity
pub mod brand;
/// Cigar catalog entity
pub mod cigar;
/// Controlled vocabulary sets
pub mod domain;
/// Lifecycle enums shared across entities and queue records
pub mod lifecycle;
/// Durable moderation queue record
pub mod pending_request;
/// Shared response envelopes
pub mod response;
