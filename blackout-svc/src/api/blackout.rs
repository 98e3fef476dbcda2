//! Interruption listing and per-building resolution

use axum::{
    extract::{Query, State},
    Json,
};
use blackout_common::models::{BlackoutFilter, BlackoutInfo, InterruptionType};
use blackout_common::time::parse_timestamp;
use chrono::NaiveDateTime;
use serde::Deserialize;

use super::error::{ApiError, ApiResult};
use crate::services::ResolutionResult;
use crate::AppState;

/// Query parameters for the interruption listing
///
/// Empty values are treated as absent, the way HTML forms submit them.
#[derive(Debug, Default, Deserialize)]
pub struct BlackoutListQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub start_date: Option<String>,
    pub date: Option<String>,
    pub district: Option<String>,
}

impl BlackoutListQuery {
    fn into_filter(self) -> ApiResult<BlackoutFilter> {
        Ok(BlackoutFilter {
            kind: non_empty(self.kind)
                .map(|kind| kind.parse::<InterruptionType>())
                .transpose()?,
            start_date: optional_timestamp("start_date", self.start_date)?,
            date: optional_timestamp("date", self.date)?,
            district: non_empty(self.district),
        })
    }
}

/// Query parameters for per-building resolution
///
/// Every field is taken as raw text so that missing or malformed values are
/// reported in the API error shape rather than by the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct ByBuildingQuery {
    pub building_id: Option<String>,
    pub date: Option<String>,
    pub limit_neighbors: Option<String>,
}

/// Validated per-building request
#[derive(Debug, PartialEq)]
struct BuildingRequest {
    building_id: String,
    as_of: NaiveDateTime,
    limit_neighbors: Option<u32>,
}

impl ByBuildingQuery {
    fn into_request(self) -> ApiResult<BuildingRequest> {
        let building_id = non_empty(self.building_id)
            .ok_or_else(|| ApiError::BadRequest("building_id is required".to_string()))?;
        let date = non_empty(self.date)
            .ok_or_else(|| ApiError::BadRequest("date is required".to_string()))?;
        let limit_neighbors = non_empty(self.limit_neighbors)
            .map(|raw| {
                raw.parse::<u32>().map_err(|_| {
                    ApiError::BadRequest(format!(
                        "limit_neighbors: expected a non-negative integer, got '{}'",
                        raw
                    ))
                })
            })
            .transpose()?;

        Ok(BuildingRequest {
            building_id,
            as_of: required_timestamp("date", &date)?,
            limit_neighbors,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn optional_timestamp(name: &str, value: Option<String>) -> ApiResult<Option<NaiveDateTime>> {
    non_empty(value)
        .map(|raw| required_timestamp(name, &raw))
        .transpose()
}

fn required_timestamp(name: &str, raw: &str) -> ApiResult<NaiveDateTime> {
    parse_timestamp(raw).map_err(|e| ApiError::BadRequest(format!("{}: {}", name, e)))
}

/// GET /api/blackout/?type=&start_date=&date=&district=
pub async fn list_blackouts(
    State(state): State<AppState>,
    Query(query): Query<BlackoutListQuery>,
) -> ApiResult<Json<Vec<BlackoutInfo>>> {
    let filter = query.into_filter()?;
    Ok(Json(state.matcher.find_by_filter(&filter).await?))
}

/// GET /api/blackout/by-building?building_id=&date=&limit_neighbors=
pub async fn blackouts_by_building(
    State(state): State<AppState>,
    Query(query): Query<ByBuildingQuery>,
) -> ApiResult<Json<ResolutionResult>> {
    let request = query.into_request()?;

    let result = state
        .orchestrator
        .resolve_by_address(&request.building_id, request.as_of, request.limit_neighbors)
        .await?;
    Ok(Json(result))
}
