//! Seeding helpers for test and development databases
//!
//! Values are written exactly as the ingestion feed writes them (raw TEXT
//! timestamps, JSON coordinate arrays), so readers are exercised against the
//! real storage layout.

use sqlx::SqlitePool;

use crate::Result;

/// District classification level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistrictLevel {
    Official,
    Folk,
    BigFolk,
}

impl DistrictLevel {
    fn table(&self) -> &'static str {
        match self {
            DistrictLevel::Official => "districts",
            DistrictLevel::Folk => "folk_districts",
            DistrictLevel::BigFolk => "big_folk_districts",
        }
    }
}

/// Building row to insert
#[derive(Debug, Clone, Default)]
pub struct BuildingSeed<'a> {
    pub id: &'a str,
    pub number: &'a str,
    pub street_id: Option<&'a str>,
    /// `(lat, lon)`; stored as `[{"lat": .., "lon": ..}]`
    pub coordinates: Option<(f64, f64)>,
    pub district_id: Option<&'a str>,
    pub folk_district_id: Option<&'a str>,
    pub big_folk_district_id: Option<&'a str>,
    pub city_id: Option<&'a str>,
}

/// Interruption row to insert together with its building links
#[derive(Debug, Clone, Default)]
pub struct BlackoutSeed<'a> {
    pub id: &'a str,
    pub start_date: &'a str,
    pub end_date: &'a str,
    pub description: &'a str,
    pub kind: &'a str,
    pub building_ids: &'a [&'a str],
}

/// Writer over a structural database created by [`super::init_database`]
pub struct FixtureDb {
    pool: SqlitePool,
}

impl FixtureDb {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn city(&self, id: &str, name: &str) -> Result<()> {
        sqlx::query("INSERT INTO cities (id, name) VALUES (?, ?)")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn district(&self, level: DistrictLevel, id: &str, name: &str) -> Result<()> {
        let sql = format!("INSERT INTO {} (id, name) VALUES (?, ?)", level.table());
        sqlx::query(&sql)
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn street(&self, id: &str, name: &str, city_id: Option<&str>) -> Result<()> {
        sqlx::query("INSERT INTO streets (id, name, city_id) VALUES (?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(city_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn building(&self, seed: &BuildingSeed<'_>) -> Result<()> {
        let coordinates = seed
            .coordinates
            .map(|(lat, lon)| serde_json::json!([{ "lat": lat, "lon": lon }]).to_string());

        sqlx::query(
            r#"
            INSERT INTO buildings (
                id, number, is_fake, type, coordinates, street_id,
                district_id, folk_district_id, big_folk_district_id, city_id
            )
            VALUES (?, ?, 0, 'residential', ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(seed.id)
        .bind(seed.number)
        .bind(coordinates)
        .bind(seed.street_id)
        .bind(seed.district_id)
        .bind(seed.folk_district_id)
        .bind(seed.big_folk_district_id)
        .bind(seed.city_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn blackout(&self, seed: &BlackoutSeed<'_>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO blackouts (id, start_date, end_date, description, type, initiator_name, source)
            VALUES (?, ?, ?, ?, ?, NULL, 'fixture')
            "#,
        )
        .bind(seed.id)
        .bind(seed.start_date)
        .bind(seed.end_date)
        .bind(seed.description)
        .bind(seed.kind)
        .execute(&self.pool)
        .await?;

        for building_id in seed.building_ids {
            sqlx::query("INSERT INTO blackouts_buildings (blackout_id, building_id) VALUES (?, ?)")
                .bind(seed.id)
                .bind(*building_id)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }
}

/// Insert one day of weather into a database created by [`super::init_weather_database`]
pub async fn seed_weather(
    pool: &SqlitePool,
    date: &str,
    temp_max: i64,
    temp_min: i64,
    weather_type: &str,
) -> Result<()> {
    sqlx::query("INSERT INTO weather (date, temp_max, temp_min, weather_type) VALUES (?, ?, ?, ?)")
        .bind(date)
        .bind(temp_max)
        .bind(temp_min)
        .bind(weather_type)
        .execute(pool)
        .await?;
    Ok(())
}
