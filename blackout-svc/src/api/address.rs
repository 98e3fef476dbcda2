//! Address search and district listing

use axum::{
    extract::{Query, State},
    Json,
};
use blackout_common::models::{AddressCandidate, District};
use serde::Deserialize;

use super::error::ApiResult;
use crate::AppState;

/// Query parameters for address search
#[derive(Debug, Deserialize)]
pub struct AddressSearchQuery {
    /// Free text; absent or blank returns every building
    pub input: Option<String>,
}

/// GET /api/address/?input=
pub async fn search_addresses(
    State(state): State<AppState>,
    Query(query): Query<AddressSearchQuery>,
) -> ApiResult<Json<Vec<AddressCandidate>>> {
    let candidates = state.address.search(query.input.as_deref()).await?;
    Ok(Json(candidates))
}

/// GET /api/address/districts
pub async fn list_districts(State(state): State<AppState>) -> ApiResult<Json<Vec<District>>> {
    Ok(Json(state.address.districts().await?))
}
