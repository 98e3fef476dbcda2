//! Test Helper Utilities
//!
//! Shared registry fixture and stub estimators for blackout-svc tests.
//!
//! Fixture layout (all on 2018-01-01 unless noted):
//!
//! | building   | street          | number | coords            | active at 03:00      |
//! |------------|-----------------|--------|-------------------|----------------------|
//! | b-main     | Светланская ул. | 118А   | 43.100, 131.900   | o1, o2               |
//! | b-near     | Алеутская ул.   | 25     | 43.105, 131.905   | o1                   |
//! | b-near2    | Океанский пр-т  | 101    | 43.095, 131.895   | o2, o3               |
//! | b-far      | Светланская ул. | 7      | 43.200, 131.900   | o5                   |
//! | b-quiet    | Алеутская ул.   | 3      | 43.101, 131.901   | (o4 ended 2017-12-02)|
//! | b-twin     | Океанский пр-т  | 5      | same as b-main    | o5                   |
//! | b-nocoords | Светланская ул. | 12     | none              | o5                   |

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use blackout_common::config::ResolutionConfig;
use blackout_common::db::fixtures::{
    seed_weather, BlackoutSeed, BuildingSeed, DistrictLevel, FixtureDb,
};
use blackout_common::db::{init_database, init_weather_database};
use blackout_common::models::WeatherRecord;
use blackout_common::time::parse_timestamp;
use blackout_svc::db::connect_readonly;
use blackout_svc::services::{
    DurationEstimator, EstimatorError, Prediction, PredictionInput, ResolutionOrchestrator,
    SqliteWeatherStore, WeatherEnricher,
};
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::SqlitePool;
use tempfile::TempDir;

pub const MAIN: &str = "b-main";

/// Read-only registry and weather pools over a seeded temp directory
pub struct TestRegistry {
    _dir: TempDir,
    pub db: SqlitePool,
    pub weather: SqlitePool,
}

impl TestRegistry {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let db_path = dir.path().join("dataset.db");
        let weather_path = dir.path().join("weather.db");

        seed_registry(&db_path).await;
        seed_weather_db(&weather_path).await;

        let db = connect_readonly(&db_path).await.expect("read-only registry");
        let weather = connect_readonly(&weather_path)
            .await
            .expect("read-only weather");

        Self {
            _dir: dir,
            db,
            weather,
        }
    }

    /// Orchestrator with weather attached
    pub fn orchestrator(
        &self,
        estimator: Arc<dyn DurationEstimator>,
        timeout: Duration,
    ) -> ResolutionOrchestrator {
        ResolutionOrchestrator::new(
            self.db.clone(),
            estimator,
            &ResolutionConfig::default(),
            timeout,
        )
        .with_weather(Arc::new(SqliteWeatherStore::new(self.weather.clone())))
    }
}

pub fn ts(raw: &str) -> NaiveDateTime {
    parse_timestamp(raw).expect("valid timestamp")
}

async fn seed_registry(path: &Path) {
    let pool = init_database(path).await.expect("init registry");
    let fx = FixtureDb::new(pool);

    fx.city("c1", "Владивосток").await.unwrap();
    fx.district(DistrictLevel::Official, "d1", "Ленинский")
        .await
        .unwrap();
    fx.district(DistrictLevel::Official, "d2", "Первореченский")
        .await
        .unwrap();
    fx.district(DistrictLevel::Folk, "f1", "Центр").await.unwrap();
    fx.district(DistrictLevel::BigFolk, "bf1", "Центральный")
        .await
        .unwrap();

    fx.street("s1", "Светланская ул.", Some("c1")).await.unwrap();
    fx.street("s2", "Алеутская ул.", Some("c1")).await.unwrap();
    fx.street("s3", "Океанский пр-т", Some("c1")).await.unwrap();

    let buildings = [
        BuildingSeed {
            id: "b-main",
            number: "118А",
            street_id: Some("s1"),
            coordinates: Some((43.100, 131.900)),
            district_id: Some("d1"),
            folk_district_id: Some("f1"),
            big_folk_district_id: Some("bf1"),
            city_id: Some("c1"),
        },
        BuildingSeed {
            id: "b-near",
            number: "25",
            street_id: Some("s2"),
            coordinates: Some((43.105, 131.905)),
            district_id: Some("d1"),
            city_id: Some("c1"),
            ..Default::default()
        },
        BuildingSeed {
            id: "b-near2",
            number: "101",
            street_id: Some("s3"),
            coordinates: Some((43.095, 131.895)),
            district_id: Some("d2"),
            city_id: Some("c1"),
            ..Default::default()
        },
        BuildingSeed {
            id: "b-far",
            number: "7",
            street_id: Some("s1"),
            coordinates: Some((43.200, 131.900)),
            ..Default::default()
        },
        BuildingSeed {
            id: "b-quiet",
            number: "3",
            street_id: Some("s2"),
            coordinates: Some((43.101, 131.901)),
            ..Default::default()
        },
        BuildingSeed {
            id: "b-twin",
            number: "5",
            street_id: Some("s3"),
            coordinates: Some((43.100, 131.900)),
            ..Default::default()
        },
        BuildingSeed {
            id: "b-nocoords",
            number: "12",
            street_id: Some("s1"),
            ..Default::default()
        },
    ];
    for seed in &buildings {
        fx.building(seed).await.unwrap();
    }

    let blackouts = [
        BlackoutSeed {
            id: "o1",
            start_date: "2018-01-01 00:08:00",
            end_date: "2018-01-01 09:00:00",
            description: "аварийное отключение",
            kind: "electricity",
            building_ids: &["b-main", "b-near"],
        },
        BlackoutSeed {
            id: "o2",
            start_date: "2018-01-01T01:00:00",
            end_date: "2018-01-02T01:00:00",
            description: "ремонт водовода",
            kind: "cold_water",
            building_ids: &["b-main", "b-near2"],
        },
        BlackoutSeed {
            id: "o3",
            start_date: "2017-12-31 20:00:00",
            end_date: "2018-01-01 12:00:00",
            description: "порыв теплотрассы",
            kind: "heat",
            building_ids: &["b-near2"],
        },
        BlackoutSeed {
            id: "o4",
            start_date: "2017-12-01 00:00:00",
            end_date: "2017-12-02 00:00:00",
            description: "плановые работы",
            kind: "electricity",
            building_ids: &["b-quiet", "b-main"],
        },
        BlackoutSeed {
            id: "o5",
            start_date: "2018-01-01 02:00:00",
            end_date: "2018-01-01 04:00:00",
            description: "промывка системы",
            kind: "hot_water",
            building_ids: &["b-twin", "b-far", "b-nocoords"],
        },
        // Feed rows the reader must skip
        BlackoutSeed {
            id: "o6",
            start_date: "2018-01-01 05:00:00",
            end_date: "2018-01-01 04:00:00",
            description: "перепутаны даты",
            kind: "electricity",
            building_ids: &["b-quiet"],
        },
        BlackoutSeed {
            id: "o7",
            start_date: "2018-01-01 00:00:00",
            end_date: "2018-01-01 23:00:00",
            description: "газ",
            kind: "gas",
            building_ids: &["b-far"],
        },
    ];
    for seed in &blackouts {
        fx.blackout(seed).await.unwrap();
    }

    fx.pool().close().await;
}

async fn seed_weather_db(path: &Path) {
    let pool = init_weather_database(path).await.expect("init weather");
    seed_weather(&pool, "2018-01-01 00:00:00", -5, -12, "ясно без осадков")
        .await
        .unwrap();
    pool.close().await;
}

/// Always answers with the same number of hours
pub struct FixedEstimator(pub f64);

#[async_trait]
impl DurationEstimator for FixedEstimator {
    async fn predict(&self, _input: &PredictionInput) -> Result<Prediction, EstimatorError> {
        Ok(Prediction::Hours(self.0))
    }
}

/// Always fails
pub struct FailingEstimator;

#[async_trait]
impl DurationEstimator for FailingEstimator {
    async fn predict(&self, _input: &PredictionInput) -> Result<Prediction, EstimatorError> {
        Err(EstimatorError::Status(503))
    }
}

/// Sleeps before answering
pub struct SlowEstimator(pub Duration);

#[async_trait]
impl DurationEstimator for SlowEstimator {
    async fn predict(&self, _input: &PredictionInput) -> Result<Prediction, EstimatorError> {
        tokio::time::sleep(self.0).await;
        Ok(Prediction::Hours(1.0))
    }
}

/// Records every input; answers 2h, with earlier starts answering later
#[derive(Default)]
pub struct RecordingEstimator {
    pub inputs: Mutex<Vec<PredictionInput>>,
}

#[async_trait]
impl DurationEstimator for RecordingEstimator {
    async fn predict(&self, input: &PredictionInput) -> Result<Prediction, EstimatorError> {
        self.inputs.lock().unwrap().push(input.clone());
        // Reverse completion order relative to start order
        let delay = if input.start_date < ts("2018-01-01 01:00:00") {
            60
        } else {
            5
        };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(Prediction::Hours(2.0))
    }
}

/// Weather source whose store is always unreachable
pub struct FailingWeather;

#[async_trait]
impl WeatherEnricher for FailingWeather {
    async fn get_weather(
        &self,
        _date: NaiveDate,
    ) -> blackout_common::Result<Option<WeatherRecord>> {
        Err(blackout_common::Error::Internal("weather store unavailable".to_string()))
    }
}
