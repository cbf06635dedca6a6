//! Record-level scans that no summary table can answer: arbitrary
//! bounding boxes and free-text description search.

use accident_risk_analytics_models::{DescriptionMatch, NearbyAccident};
use accident_risk_database_models::{BoundingBox, SegmentStats};
use duckdb::types::Value;
use duckdb::{Connection, params_from_iter};

use crate::AnalyticsError;
use crate::filters::Filters;
use crate::source::{count, mean, small};

const START_TIME_SQL: &str = "strftime(start_time, '%Y-%m-%d %H:%M:%S')";

/// Accidents inside `bbox`, most severe first, then by id.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the query fails.
pub fn accidents_in_box(
    conn: &Connection,
    bbox: &BoundingBox,
    limit: u32,
) -> Result<Vec<NearbyAccident>, AnalyticsError> {
    let filters = Filters::new()
        .within(bbox, "start_lat", "start_lng")
        .with_param(Value::BigInt(i64::from(limit)));

    let sql = format!(
        "SELECT id, severity, {START_TIME_SQL}, start_lat, start_lng, street, city,
                weather_condition
         FROM accidents{}
         ORDER BY severity DESC, id
         LIMIT ?",
        filters.where_clause()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(filters.params()), |row| {
        Ok(NearbyAccident {
            id: row.get(0)?,
            severity: small(row.get(1)?),
            start_time: row.get(2)?,
            start_lat: row.get(3)?,
            start_lng: row.get(4)?,
            street: row.get(5)?,
            city: row.get(6)?,
            weather_condition: row.get(7)?,
        })
    })?;

    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Count, mean severity, and maximum severity of accidents inside `bbox`.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the query fails.
pub fn segment_stats(conn: &Connection, bbox: &BoundingBox) -> Result<SegmentStats, AnalyticsError> {
    let filters = Filters::new().within(bbox, "start_lat", "start_lng");
    let sql = format!(
        "SELECT CAST(COUNT(*) AS BIGINT), AVG(severity), MAX(severity)
         FROM accidents{}",
        filters.where_clause()
    );

    Ok(conn
        .prepare(&sql)?
        .query_row(params_from_iter(filters.params()), |row| {
            Ok(SegmentStats {
                accident_count: count(row.get(0)?),
                avg_severity: mean(row.get(1)?),
                max_severity: small(row.get(2)?),
            })
        })?)
}

/// Accidents whose description contains `keywords` (case-insensitive).
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the query fails.
pub fn search_descriptions(
    conn: &Connection,
    keywords: &str,
    state: Option<&str>,
    min_severity: u8,
    limit: u32,
) -> Result<Vec<DescriptionMatch>, AnalyticsError> {
    let filters = Filters::new()
        .contains("description", Some(keywords))
        .at_least("severity", i64::from(min_severity))
        .state("state", state)
        .with_param(Value::BigInt(i64::from(limit)));

    let sql = format!(
        "SELECT id, severity, {START_TIME_SQL}, city, state, street, weather_condition,
                description
         FROM accidents{}
         ORDER BY severity DESC, id
         LIMIT ?",
        filters.where_clause()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(filters.params()), |row| {
        Ok(DescriptionMatch {
            id: row.get(0)?,
            severity: small(row.get(1)?),
            start_time: row.get(2)?,
            city: row.get(3)?,
            state: row.get(4)?,
            street: row.get(5)?,
            weather_condition: row.get(6)?,
            description: row.get(7)?,
        })
    })?;

    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
