//! Controlled vocabulary endpoint.

use axum::{Json, extract::State};

use crate::app::AppState;
use crate::error::AppError;
use crate::models::domain::DomainValues;
use crate::models::response::ItemResponse;

/// Return the current controlled vocabularies so clients can validate
/// submissions up front. Served from the TTL cache.
pub async fn get_domain_values(
    State(state): State<AppState>,
) -> Result<Json<ItemResponse<DomainValues>>, AppError> {
    let domains = state.domains.get(state.store.as_ref()).await?;
    Ok(Json(ItemResponse { data: domains }))
}
