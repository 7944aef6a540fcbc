//! Response envelopes shared across endpoints.
//!
//! Listing envelopes keep the legacy camelCase keys (`numberOfPages`,
//! `currentPage`, `numberOfDocuments`) that API consumers already parse.

use serde::Serialize;
use uuid::Uuid;

/// `data` payload for mutations that produce or address an entity.
#[derive(Debug, Serialize)]
pub struct IdPayload {
    pub id: Uuid,
}

/// Envelope for every mutating endpoint.
///
/// The message distinguishes queued outcomes ("…awaiting approval") from
/// applied ones ("…has been processed") so callers do not have to inspect
/// status codes alone.
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<IdPayload>,
    pub message: String,
}

/// Envelope for paginated catalog listings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    pub number_of_pages: u64,
    pub current_page: u64,
    pub data: Vec<T>,
}

/// Envelope for moderation queue listings (unpaginated, count only).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueResponse<T> {
    pub number_of_documents: u64,
    pub data: Vec<T>,
}

/// Envelope for single-record reads.
#[derive(Debug, Serialize)]
pub struct ItemResponse<T> {
    pub data: T,
}
