//! Brand entity and API response shape.
//!
//! A brand is the parent of its cigars through the denormalized `brand`
//! name string on [`super::cigar::Cigar`] — there is no foreign key, which
//! is why brand denial has to cascade by name.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::lifecycle::EntityStatus;

/// Represents a brand record from the store.
///
/// Lifecycle is carried entirely by `status`; records are never removed.
/// `moderator_notes` is internal and does not appear in API responses.
#[derive(Debug, Clone)]
pub struct Brand {
    /// Unique identifier for this brand
    pub id: Uuid,

    /// Brand name; referenced by cigars as a plain string
    pub name: String,

    /// Country of origin (vocabulary-controlled)
    pub country: Option<String>,

    /// Free-form founding date supplied by submitters
    pub founding_date: Option<String>,

    /// Logo URL
    pub logo: Option<String>,

    /// Postal address
    pub address: Option<String>,

    /// Official website (URL-validated on submission)
    pub website: Option<String>,

    /// Lifecycle status
    pub status: EntityStatus,

    /// Notes left by a moderator on deny
    pub moderator_notes: Option<String>,

    /// Timestamp of the last applied mutation
    pub updated_at: DateTime<Utc>,
}

/// Response body for brand endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "name": "Arturo Fuente",
///   "country": "Dominican Republic",
///   "status": "approved",
///   "updated_at": "2026-01-15T10:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct BrandResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founding_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub status: EntityStatus,
    pub updated_at: DateTime<Utc>,
}

/// Convert a stored Brand into its API shape, dropping internal fields.
impl From<Brand> for BrandResponse {
    fn from(brand: Brand) -> Self {
        Self {
            id: brand.id,
            name: brand.name,
            country: brand.country,
            founding_date: brand.founding_date,
            logo: brand.logo,
            address: brand.address,
            website: brand.website,
            status: brand.status,
            updated_at: brand.updated_at,
        }
    }
}
