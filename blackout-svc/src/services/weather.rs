//! Weather enrichment boundary
//!
//! Weather is keyed by calendar date only. A missing day is a normal outcome
//! (`Ok(None)`); the resolver also absorbs lookup errors.

use async_trait::async_trait;
use blackout_common::models::WeatherRecord;
use blackout_common::time::to_db_date;
use blackout_common::{Error, Result};
use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};
use tracing::debug;

/// Supplies weather context for a date
#[async_trait]
pub trait WeatherEnricher: Send + Sync {
    async fn get_weather(&self, date: NaiveDate) -> Result<Option<WeatherRecord>>;
}

/// Weather history kept in its own SQLite database (`weather` table)
#[derive(Clone)]
pub struct SqliteWeatherStore {
    db: SqlitePool,
}

impl SqliteWeatherStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WeatherEnricher for SqliteWeatherStore {
    async fn get_weather(&self, date: NaiveDate) -> Result<Option<WeatherRecord>> {
        let row = sqlx::query(
            r#"
            SELECT CAST(temp_max AS REAL) AS temp_max,
                   CAST(temp_min AS REAL) AS temp_min,
                   weather_type
            FROM weather
            WHERE date(date) = ?
            ORDER BY date
            LIMIT 1
            "#,
        )
        .bind(to_db_date(&date))
        .fetch_optional(&self.db)
        .await
        .map_err(Error::Database)?;

        let Some(row) = row else {
            debug!(%date, "No weather recorded");
            return Ok(None);
        };

        let temp_max: Option<f64> = row.try_get("temp_max")?;
        let temp_min: Option<f64> = row.try_get("temp_min")?;
        let description: Option<String> = row.try_get("weather_type")?;

        match (temp_max, temp_min, description) {
            (Some(temp_max), Some(temp_min), Some(description)) => Ok(Some(WeatherRecord {
                date,
                temp_max,
                temp_min,
                description,
            })),
            _ => {
                debug!(%date, "Incomplete weather row ignored");
                Ok(None)
            }
        }
    }
}
