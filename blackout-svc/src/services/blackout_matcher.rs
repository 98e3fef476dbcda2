//! Interruption matching
//!
//! Temporal containment is closed on both ends: an interruption is active at
//! `t` when `start <= t <= end`. Stored timestamps are normalised with SQLite
//! `strftime('%Y-%m-%d %H:%M:%f', ...)` before every comparison, so feed rows
//! written with a `T` or a space separator compare the same way and fractional
//! seconds are kept. Bound instants are truncated where the column must not
//! exceed them and rounded up where the column must not precede them.

use blackout_common::models::{BlackoutFilter, BlackoutInfo, Interruption, InterruptionType};
use blackout_common::time::{parse_db_timestamp, to_db_timestamp, to_db_timestamp_ceil};
use blackout_common::{Error, Result};
use chrono::NaiveDateTime;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::{debug, warn};

use super::building_locator::{building_from_row, BUILDING_COLUMNS, BUILDING_JOINS};

const INTERRUPTION_COLUMNS: &str = r#"
    o.id AS blackout_id,
    strftime('%Y-%m-%d %H:%M:%f', o.start_date) AS start_date,
    strftime('%Y-%m-%d %H:%M:%f', o.end_date) AS end_date,
    COALESCE(o.description, '') AS description,
    o.type AS type
"#;

fn interruption_from_row(row: &SqliteRow) -> Result<Interruption> {
    let id: String = row.try_get("blackout_id")?;

    let start: Option<String> = row.try_get("start_date")?;
    let end: Option<String> = row.try_get("end_date")?;
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (parse_db_timestamp(&start)?, parse_db_timestamp(&end)?),
        _ => {
            return Err(Error::InvalidData(format!(
                "Interruption {} has a missing or unparseable interval",
                id
            )))
        }
    };

    let kind: Option<String> = row.try_get("type")?;
    let kind = kind
        .as_deref()
        .unwrap_or_default()
        .parse::<InterruptionType>()
        .map_err(|e| Error::InvalidData(format!("Interruption {}: {}", id, e)))?;

    Interruption::new(id, start, end, row.try_get("description")?, kind)
}

/// Decode rows, dropping (and logging) the ones that break data invariants
///
/// Query failures still propagate; only per-row validation failures are skipped.
fn decode_rows<T>(rows: &[SqliteRow], decode: impl Fn(&SqliteRow) -> Result<T>) -> Result<Vec<T>> {
    let mut decoded = Vec::with_capacity(rows.len());
    for row in rows {
        match decode(row) {
            Ok(value) => decoded.push(value),
            Err(Error::InvalidData(msg)) => warn!("Skipping interruption row: {}", msg),
            Err(e) => return Err(e),
        }
    }
    Ok(decoded)
}

/// Finds interruptions by building and instant, or by listing filters
#[derive(Clone)]
pub struct BlackoutMatcher {
    db: SqlitePool,
}

impl BlackoutMatcher {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Interruptions linked to `building_id` that are active at `as_of`
    ///
    /// Ordered by start, then id; the resolver relies on this order being
    /// stable for identical data.
    pub async fn find_active(
        &self,
        building_id: &str,
        as_of: NaiveDateTime,
    ) -> Result<Vec<Interruption>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM blackouts o
            JOIN blackouts_buildings bb ON bb.blackout_id = o.id
            WHERE bb.building_id = ?
              AND strftime('%Y-%m-%d %H:%M:%f', o.start_date) <= ?
              AND ? <= strftime('%Y-%m-%d %H:%M:%f', o.end_date)
            ORDER BY strftime('%Y-%m-%d %H:%M:%f', o.start_date), o.id
            "#,
            INTERRUPTION_COLUMNS
        );
        let not_before = to_db_timestamp(&as_of);
        let not_after = to_db_timestamp_ceil(&as_of);

        let rows = sqlx::query(&sql)
            .bind(building_id)
            .bind(&not_before)
            .bind(&not_after)
            .fetch_all(&self.db)
            .await?;

        let interruptions = decode_rows(&rows, interruption_from_row)?;
        debug!(building_id, %as_of, count = interruptions.len(), "Active interruptions");
        Ok(interruptions)
    }

    /// Interruption/building pairs narrowed by every filter field present
    pub async fn find_by_filter(&self, filter: &BlackoutFilter) -> Result<Vec<BlackoutInfo>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            r#"
            SELECT {}, {}
            FROM blackouts o
            JOIN blackouts_buildings bb ON bb.blackout_id = o.id
            JOIN buildings b ON b.id = bb.building_id
            {}
            WHERE 1 = 1
            "#,
            INTERRUPTION_COLUMNS, BUILDING_COLUMNS, BUILDING_JOINS
        ));

        if let Some(kind) = filter.kind {
            query.push(" AND o.type = ").push_bind(kind.as_str());
        }

        if let Some(start_date) = &filter.start_date {
            query
                .push(" AND strftime('%Y-%m-%d %H:%M:%f', o.start_date) >= ")
                .push_bind(to_db_timestamp_ceil(start_date));
        }

        if let Some(date) = &filter.date {
            query
                .push(" AND strftime('%Y-%m-%d %H:%M:%f', o.start_date) <= ")
                .push_bind(to_db_timestamp(date))
                .push(" AND ")
                .push_bind(to_db_timestamp_ceil(date))
                .push(" <= strftime('%Y-%m-%d %H:%M:%f', o.end_date)");
        }

        if let Some(district) = &filter.district {
            query
                .push(" AND (d.name = ")
                .push_bind(district.clone())
                .push(" OR fd.name = ")
                .push_bind(district.clone())
                .push(" OR bfd.name = ")
                .push_bind(district.clone())
                .push(")");
        }

        query.push(" ORDER BY strftime('%Y-%m-%d %H:%M:%f', o.start_date), o.id, b.id");

        let rows = query.build().fetch_all(&self.db).await?;

        let blackouts = decode_rows(&rows, |row| {
            let interruption = interruption_from_row(row)?;
            let building = building_from_row(row)?;
            Ok(BlackoutInfo::new(interruption, &building))
        })?;
        debug!(?filter, count = blackouts.len(), "Filtered interruptions");
        Ok(blackouts)
    }
}
