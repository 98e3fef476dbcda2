//! Building resolution pipeline
//!
//! locate → (match ∥ neighbors) → per-interruption enrich/predict → assemble.
//!
//! Only the building lookup and the structural queries can fail a request.
//! Weather and estimator failures fall back to the recorded end time. All
//! sub-lookups are futures owned by the request future, so dropping it (client
//! disconnect) cancels them.

use std::sync::Arc;
use std::time::Duration;

use blackout_common::config::ResolutionConfig;
use blackout_common::models::{BlackoutInfo, Building, Interruption, NeighborRecord};
use blackout_common::time::add_hours;
use chrono::NaiveDateTime;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::blackout_matcher::BlackoutMatcher;
use super::building_locator::BuildingLocator;
use super::estimator::{DurationEstimator, Prediction, PredictionInput};
use super::neighbor_discovery::NeighborDiscovery;
use super::weather::WeatherEnricher;

/// Request-fatal resolution failures
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Building not found: {0}")]
    BuildingNotFound(String),

    #[error("Data source error: {0}")]
    DataSource(#[from] blackout_common::Error),
}

/// Active interruption with its predicted end
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedBlackout {
    #[serde(flatten)]
    pub info: BlackoutInfo,
    pub predicted_end_date: NaiveDateTime,
}

/// Outcome of resolving one building at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionResult {
    pub blackouts: Vec<ResolvedBlackout>,
    pub neighbor_blackouts: Vec<NeighborRecord>,
}

/// Composes lookup, matching, neighbor discovery and duration estimation
pub struct ResolutionOrchestrator {
    locator: BuildingLocator,
    matcher: BlackoutMatcher,
    neighbors: NeighborDiscovery,
    weather: Option<Arc<dyn WeatherEnricher>>,
    estimator: Arc<dyn DurationEstimator>,
    estimator_timeout: Duration,
    concurrency: usize,
}

impl ResolutionOrchestrator {
    pub fn new(
        db: SqlitePool,
        estimator: Arc<dyn DurationEstimator>,
        config: &ResolutionConfig,
        estimator_timeout: Duration,
    ) -> Self {
        Self {
            locator: BuildingLocator::new(db.clone()),
            matcher: BlackoutMatcher::new(db.clone()),
            neighbors: NeighborDiscovery::new(db, config.coord_delta),
            weather: None,
            estimator,
            estimator_timeout,
            concurrency: config.enrichment_concurrency.max(1),
        }
    }

    /// Attach a weather source; without one, predictions run without weather
    pub fn with_weather(mut self, weather: Arc<dyn WeatherEnricher>) -> Self {
        self.weather = Some(weather);
        self
    }

    /// Resolve active interruptions and affected neighbors for a building
    pub async fn resolve_by_address(
        &self,
        building_id: &str,
        as_of: NaiveDateTime,
        limit_neighbors: Option<u32>,
    ) -> Result<ResolutionResult, ResolveError> {
        let building = self
            .locator
            .locate(building_id)
            .await?
            .ok_or_else(|| ResolveError::BuildingNotFound(building_id.to_string()))?;

        let neighbors = async {
            match building.coordinates {
                Some(center) => {
                    self.neighbors
                        .find_neighbors(center, &building.id, as_of, limit_neighbors)
                        .await
                }
                None => {
                    debug!(building_id, "Building has no coordinates; no neighbors");
                    Ok(Vec::new())
                }
            }
        };

        let (interruptions, neighbor_blackouts) =
            futures::try_join!(self.matcher.find_active(&building.id, as_of), neighbors)?;

        // `buffered` yields in input order regardless of completion order
        let blackouts: Vec<ResolvedBlackout> = stream::iter(interruptions)
            .map(|interruption| self.enrich(interruption, &building))
            .buffered(self.concurrency)
            .collect()
            .await;

        info!(
            building_id,
            %as_of,
            blackouts = blackouts.len(),
            neighbors = neighbor_blackouts.len(),
            "Resolved building"
        );

        Ok(ResolutionResult {
            blackouts,
            neighbor_blackouts,
        })
    }

    async fn enrich(&self, interruption: Interruption, building: &Building) -> ResolvedBlackout {
        let weather = match &self.weather {
            Some(source) => match source.get_weather(interruption.start.date()).await {
                Ok(weather) => weather,
                Err(e) => {
                    warn!(interruption = %interruption.id, "Weather lookup failed: {}", e);
                    None
                }
            },
            None => None,
        };

        let input = PredictionInput::new(&interruption, building, weather.as_ref());
        let prediction =
            match tokio::time::timeout(self.estimator_timeout, self.estimator.predict(&input))
                .await
            {
                Ok(Ok(prediction)) => prediction,
                Ok(Err(e)) => {
                    warn!(interruption = %interruption.id, "Duration estimate failed: {}", e);
                    Prediction::Abstain
                }
                Err(_) => {
                    warn!(
                        interruption = %interruption.id,
                        timeout_ms = self.estimator_timeout.as_millis() as u64,
                        "Duration estimate timed out"
                    );
                    Prediction::Abstain
                }
            };

        let predicted_end_date = prediction
            .usable_hours()
            .and_then(|hours| add_hours(interruption.start, hours))
            .unwrap_or(interruption.end);

        ResolvedBlackout {
            info: BlackoutInfo::new(interruption, building),
            predicted_end_date,
        }
    }
}
