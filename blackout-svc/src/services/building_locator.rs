//! Building lookup by identifier
//!
//! Also owns the SQL fragments and row decoding for a building with its
//! resolved reference names, shared with the interruption listing.

use blackout_common::models::{Building, Coordinates};
use blackout_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

/// Building columns; expects `b` joined per [`BUILDING_JOINS`]
///
/// Coordinates are stored as JSON text (`[{"lat": .., "lon": ..}]`). The
/// CASE guards keep malformed JSON from aborting the whole query.
pub(crate) const BUILDING_COLUMNS: &str = r#"
    b.id AS building_id,
    COALESCE(b.number, '') AS building_number,
    CASE WHEN json_valid(b.coordinates)
        THEN CAST(json_extract(b.coordinates, '$[0].lat') AS REAL) END AS lat,
    CASE WHEN json_valid(b.coordinates)
        THEN CAST(json_extract(b.coordinates, '$[0].lon') AS REAL) END AS lon,
    s.name AS street,
    d.name AS district,
    fd.name AS folk_district,
    bfd.name AS big_folk_district,
    c.name AS city
"#;

/// Reference joins for `buildings b`; every level is optional
pub(crate) const BUILDING_JOINS: &str = r#"
    LEFT JOIN streets s ON s.id = b.street_id
    LEFT JOIN districts d ON d.id = b.district_id
    LEFT JOIN folk_districts fd ON fd.id = b.folk_district_id
    LEFT JOIN big_folk_districts bfd ON bfd.id = b.big_folk_district_id
    LEFT JOIN cities c ON c.id = b.city_id
"#;

pub(crate) fn building_from_row(row: &SqliteRow) -> Result<Building> {
    Ok(Building {
        id: row.try_get("building_id")?,
        number: row.try_get("building_number")?,
        coordinates: Coordinates::from_parts(row.try_get("lat")?, row.try_get("lon")?),
        street: row.try_get("street")?,
        district: row.try_get("district")?,
        folk_district: row.try_get("folk_district")?,
        big_folk_district: row.try_get("big_folk_district")?,
        city: row.try_get("city")?,
    })
}

/// Resolves a building identifier to the building record
#[derive(Clone)]
pub struct BuildingLocator {
    db: SqlitePool,
}

impl BuildingLocator {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Identity lookup; `Ok(None)` when no building has this id
    pub async fn locate(&self, building_id: &str) -> Result<Option<Building>> {
        let sql = format!(
            "SELECT {} FROM buildings b {} WHERE b.id = ?",
            BUILDING_COLUMNS, BUILDING_JOINS
        );

        let row = sqlx::query(&sql)
            .bind(building_id)
            .fetch_optional(&self.db)
            .await?;

        let building = row.as_ref().map(building_from_row).transpose()?;
        debug!(building_id, found = building.is_some(), "Building lookup");
        Ok(building)
    }
}
