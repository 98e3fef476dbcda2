//! Duration estimator boundary
//!
//! The duration model is an external, best-effort collaborator. It may
//! abstain, fail or hang; callers bound every call with a timeout and fall
//! back to the recorded end time. Nothing it returns is persisted.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use blackout_common::config::EstimatorConfig;
use blackout_common::models::{Building, Interruption, InterruptionType, WeatherRecord};
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Estimator errors; every variant is treated as an abstention by the resolver
#[derive(Debug, Error)]
pub enum EstimatorError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Estimator answered with a non-success status
    #[error("Estimator returned HTTP {0}")]
    Status(u16),

    /// Failed to parse the estimator response
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Features sent to the estimator for one interruption
///
/// Weather fields are omitted entirely when no weather was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionInput {
    pub start_date: NaiveDateTime,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: InterruptionType,
    pub city: Option<String>,
    pub street: Option<String>,
    pub house_number: String,
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_description: Option<String>,
}

impl PredictionInput {
    pub fn new(
        interruption: &Interruption,
        building: &Building,
        weather: Option<&WeatherRecord>,
    ) -> Self {
        Self {
            start_date: interruption.start,
            description: interruption.description.clone(),
            kind: interruption.kind,
            city: building.city.clone(),
            street: building.street.clone(),
            house_number: building.number.clone(),
            district: building.district.clone(),
            temp_max: weather.map(|w| w.temp_max),
            temp_min: weather.map(|w| w.temp_min),
            weather_description: weather.map(|w| w.description.clone()),
        }
    }
}

/// Estimator outcome
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prediction {
    /// Predicted total duration from the interruption start
    Hours(f64),
    Abstain,
}

impl Prediction {
    /// Hours only when finite and strictly positive
    pub fn usable_hours(&self) -> Option<f64> {
        match *self {
            Prediction::Hours(hours) if hours.is_finite() && hours > 0.0 => Some(hours),
            _ => None,
        }
    }
}

/// Best-effort outage duration predictor
#[async_trait]
pub trait DurationEstimator: Send + Sync {
    async fn predict(&self, input: &PredictionInput) -> Result<Prediction, EstimatorError>;
}

/// Estimator used when no model endpoint is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct AbstainingEstimator;

#[async_trait]
impl DurationEstimator for AbstainingEstimator {
    async fn predict(&self, _input: &PredictionInput) -> Result<Prediction, EstimatorError> {
        Ok(Prediction::Abstain)
    }
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    hours: Option<f64>,
}

/// Client for an HTTP prediction sidecar
///
/// POSTs the [`PredictionInput`] as JSON and expects `{"hours": number | null}`.
/// Types outside `supported_types` abstain without a request.
pub struct HttpEstimator {
    client: Client,
    url: String,
    supported_types: Vec<InterruptionType>,
}

impl HttpEstimator {
    pub fn new(
        url: String,
        supported_types: Vec<InterruptionType>,
        timeout: Duration,
    ) -> Result<Self, EstimatorError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| EstimatorError::Network(e.to_string()))?;

        Ok(Self {
            client,
            url,
            supported_types,
        })
    }
}

#[async_trait]
impl DurationEstimator for HttpEstimator {
    async fn predict(&self, input: &PredictionInput) -> Result<Prediction, EstimatorError> {
        if !self.supported_types.contains(&input.kind) {
            debug!(kind = %input.kind, "No model for interruption type");
            return Ok(Prediction::Abstain);
        }

        let response = self
            .client
            .post(&self.url)
            .json(input)
            .send()
            .await
            .map_err(|e| EstimatorError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EstimatorError::Status(status.as_u16()));
        }

        let body: PredictionResponse = response
            .json()
            .await
            .map_err(|e| EstimatorError::Decode(e.to_string()))?;

        Ok(body.hours.map_or(Prediction::Abstain, Prediction::Hours))
    }
}

/// Build the configured estimator
pub fn from_config(config: &EstimatorConfig) -> Result<Arc<dyn DurationEstimator>, EstimatorError> {
    match &config.url {
        Some(url) => {
            info!("Duration estimator: {}", url);
            let estimator = HttpEstimator::new(
                url.clone(),
                config.supported_types.clone(),
                Duration::from_millis(config.timeout_ms),
            )?;
            Ok(Arc::new(estimator))
        }
        None => {
            info!("No duration estimator configured; recorded end times are used");
            Ok(Arc::new(AbstainingEstimator))
        }
    }
}
