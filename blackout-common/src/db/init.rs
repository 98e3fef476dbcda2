//! Database initialization
//!
//! Creates writable databases with the structural and weather layouts.
//! Used for fixtures and local development only; the service itself opens
//! both stores read-only.

use std::path::Path;

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

use crate::Result;

/// Create (or open) a structural database and ensure its tables exist
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    // sqlx enables foreign key enforcement on every pooled connection
    let pool = open_writable(db_path).await?;

    create_reference_tables(&pool).await?;
    create_streets_table(&pool).await?;
    create_buildings_table(&pool).await?;
    create_blackouts_table(&pool).await?;
    create_blackouts_buildings_table(&pool).await?;

    Ok(pool)
}

/// Create (or open) a weather database and ensure its table exists
pub async fn init_weather_database(db_path: &Path) -> Result<SqlitePool> {
    let pool = open_writable(db_path).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS weather (
            date DATETIME PRIMARY KEY,
            temp_max INTEGER,
            temp_min INTEGER,
            weather_type TEXT
        )
        "#,
    )
    .execute(&pool)
    .await?;

    Ok(pool)
}

async fn open_writable(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    Ok(pool)
}

async fn create_reference_tables(pool: &SqlitePool) -> Result<()> {
    for table in ["cities", "districts", "folk_districts", "big_folk_districts"] {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (id TEXT PRIMARY KEY, name TEXT)",
            table
        );
        sqlx::query(&ddl).execute(pool).await?;
    }

    Ok(())
}

async fn create_streets_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS streets (
            id TEXT PRIMARY KEY,
            name TEXT,
            city_id TEXT REFERENCES cities(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_buildings_table(pool: &SqlitePool) -> Result<()> {
    // coordinates: JSON text, e.g. [{"lat": 43.1, "lon": 131.9}]
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS buildings (
            id TEXT PRIMARY KEY,
            number TEXT,
            is_fake INTEGER,
            type TEXT,
            coordinates TEXT,
            street_id TEXT REFERENCES streets(id),
            district_id TEXT REFERENCES districts(id),
            folk_district_id TEXT REFERENCES folk_districts(id),
            big_folk_district_id TEXT REFERENCES big_folk_districts(id),
            city_id TEXT REFERENCES cities(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_blackouts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blackouts (
            id TEXT PRIMARY KEY,
            start_date TEXT,
            end_date TEXT,
            description TEXT,
            type TEXT,
            initiator_name TEXT,
            source TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_blackouts_buildings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blackouts_buildings (
            blackout_id TEXT REFERENCES blackouts(id),
            building_id TEXT REFERENCES buildings(id),
            PRIMARY KEY (blackout_id, building_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
