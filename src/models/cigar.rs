//! Cigar entity and API response shape.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::lifecycle::EntityStatus;

/// Represents a cigar record from the store.
///
/// `brand` holds the brand *name*, not an id. A cigar may only be created
/// while a brand with that name exists in status `approved` or
/// `create_pending`, so users can submit a brand and its cigars together
/// without waiting for the brand to clear the queue.
#[derive(Debug, Clone)]
pub struct Cigar {
    /// Unique identifier for this cigar
    pub id: Uuid,

    /// Denormalized brand name
    pub brand: String,

    /// Cigar line name
    pub name: String,

    /// Length in inches
    pub length: Option<f64>,

    /// Ring gauge (diameter in 64ths of an inch)
    pub ring_gauge: Option<f64>,

    /// Shape (vocabulary-controlled)
    pub vitola: Option<String>,

    /// Wrapper shade (vocabulary-controlled)
    pub color: Option<String>,

    /// Country of manufacture (vocabulary-controlled)
    pub country: Option<String>,

    /// Wrapper leaves (vocabulary-controlled, element-wise)
    pub wrappers: Vec<String>,

    /// Binder leaves (vocabulary-controlled, element-wise)
    pub binders: Vec<String>,

    /// Filler leaves (vocabulary-controlled, element-wise)
    pub fillers: Vec<String>,

    /// Body/strength rating (vocabulary-controlled)
    pub strength: Option<String>,

    /// Free-form year the line was introduced
    pub year_introduced: Option<String>,

    /// Lifecycle status
    pub status: EntityStatus,

    /// Notes left by a moderator on deny
    pub moderator_notes: Option<String>,

    /// Timestamp of the last applied mutation
    pub updated_at: DateTime<Utc>,
}

/// Response body for cigar endpoints.
#[derive(Debug, Serialize)]
pub struct CigarResponse {
    pub id: Uuid,
    pub brand: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ring_gauge: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vitola: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub wrappers: Vec<String>,
    pub binders: Vec<String>,
    pub fillers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_introduced: Option<String>,
    pub status: EntityStatus,
    pub updated_at: DateTime<Utc>,
}

/// Convert a stored Cigar into its API shape, dropping internal fields.
impl From<Cigar> for CigarResponse {
    fn from(cigar: Cigar) -> Self {
        Self {
            id: cigar.id,
            brand: cigar.brand,
            name: cigar.name,
            length: cigar.length,
            ring_gauge: cigar.ring_gauge,
            vitola: cigar.vitola,
            color: cigar.color,
            country: cigar.country,
            wrappers: cigar.wrappers,
            binders: cigar.binders,
            fillers: cigar.fillers,
            strength: cigar.strength,
            year_introduced: cigar.year_introduced,
            status: cigar.status,
            updated_at: cigar.updated_at,
        }
    }
}
