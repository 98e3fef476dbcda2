//! Bounding-box neighbor discovery
//!
//! Proximity is an axis-aligned box of half-width `delta` degrees around the
//! target, not a geodesic radius: corners up to `delta * sqrt(2)` away are
//! included. The box is evaluated in SQL and `delta` is configurable.
//!
//! Only interruptions of a known [`InterruptionType`] count towards
//! neighborhood, matching what the listing and per-building reads return.

use blackout_common::models::{Coordinates, InterruptionType, NeighborRecord};
use blackout_common::time::{to_db_timestamp, to_db_timestamp_ceil};
use blackout_common::Result;
use chrono::NaiveDateTime;
use sqlx::{Row, SqlitePool};
use tracing::{debug, warn};

/// Axis-aligned latitude/longitude box, bound into the `BETWEEN` predicates
#[derive(Debug, Clone, Copy, PartialEq)]
struct BoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl BoundingBox {
    fn around(center: Coordinates, delta: f64) -> Self {
        Self {
            min_lat: center.latitude - delta,
            max_lat: center.latitude + delta,
            min_lon: center.longitude - delta,
            max_lon: center.longitude + delta,
        }
    }
}

/// Finds nearby buildings that currently have an active interruption
#[derive(Clone)]
pub struct NeighborDiscovery {
    db: SqlitePool,
    delta: f64,
}

impl NeighborDiscovery {
    pub fn new(db: SqlitePool, delta: f64) -> Self {
        Self { db, delta }
    }

    /// Buildings inside the box around `center` with a known-type interruption
    /// active at `as_of`
    ///
    /// `exclude_building_id` is removed by identity; another building sharing
    /// the same coordinates is still returned. One record per building, with
    /// its distinct active types. Ordered by street name, number, then id,
    /// and truncated to `limit` when given.
    pub async fn find_neighbors(
        &self,
        center: Coordinates,
        exclude_building_id: &str,
        as_of: NaiveDateTime,
        limit: Option<u32>,
    ) -> Result<Vec<NeighborRecord>> {
        let bbox = BoundingBox::around(center, self.delta);
        let not_before = to_db_timestamp(&as_of);
        let not_after = to_db_timestamp_ceil(&as_of);
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map(i64::from).unwrap_or(-1);
        let type_slots = vec!["?"; InterruptionType::ALL.len()].join(", ");

        let sql = format!(
            r#"
            WITH located AS (
                SELECT b.id, b.number, b.street_id,
                       CASE WHEN json_valid(b.coordinates)
                           THEN CAST(json_extract(b.coordinates, '$[0].lat') AS REAL) END AS lat,
                       CASE WHEN json_valid(b.coordinates)
                           THEN CAST(json_extract(b.coordinates, '$[0].lon') AS REAL) END AS lon
                FROM buildings b
            )
            SELECT l.id AS building_id,
                   COALESCE(l.number, '') AS building,
                   s.name AS street,
                   group_concat(DISTINCT o.type) AS types
            FROM located l
            JOIN blackouts_buildings bb ON bb.building_id = l.id
            JOIN blackouts o ON o.id = bb.blackout_id
            LEFT JOIN streets s ON s.id = l.street_id
            WHERE l.id <> ?
              AND l.lat BETWEEN ? AND ?
              AND l.lon BETWEEN ? AND ?
              AND strftime('%Y-%m-%d %H:%M:%f', o.start_date) <= ?
              AND ? <= strftime('%Y-%m-%d %H:%M:%f', o.end_date)
              AND o.type IN ({})
            GROUP BY l.id
            ORDER BY s.name, l.number, l.id
            LIMIT ?
            "#,
            type_slots
        );

        let mut query = sqlx::query(&sql)
            .bind(exclude_building_id)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(bbox.min_lon)
            .bind(bbox.max_lon)
            .bind(&not_before)
            .bind(&not_after);
        for kind in InterruptionType::ALL {
            query = query.bind(kind.as_str());
        }
        let rows = query.bind(limit).fetch_all(&self.db).await?;

        let mut neighbors = Vec::with_capacity(rows.len());
        for row in &rows {
            let building_id: String = row.try_get("building_id")?;
            let types: Option<String> = row.try_get("types")?;
            neighbors.push(NeighborRecord {
                types: parse_types(&building_id, types.as_deref().unwrap_or_default()),
                building_id,
                street: row.try_get("street")?,
                building: row.try_get("building")?,
            });
        }

        debug!(
            exclude_building_id,
            delta = self.delta,
            %as_of,
            count = neighbors.len(),
            "Neighbor discovery"
        );
        Ok(neighbors)
    }
}

/// Decode a `group_concat` type list into sorted distinct types
fn parse_types(building_id: &str, raw: &str) -> Vec<InterruptionType> {
    let mut types: Vec<InterruptionType> = raw
        .split(',')
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<InterruptionType>() {
            Ok(kind) => Some(kind),
            Err(e) => {
                warn!("Neighbor {}: {}", building_id, e);
                None
            }
        })
        .collect();
    types.sort();
    types.dedup();
    types
}
