//! Writes to and whole-table reads of the `accidents` table.

use std::collections::BTreeMap;

use accident_risk_accident_models::RoadFeature;
use accident_risk_database_models::AccidentRecord;
use duckdb::Connection;

use crate::DbError;

/// Number of rows per INSERT chunk.
const CHUNK_SIZE: usize = 1_000;

/// Timestamp format used for binding and displaying `start_time`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Scalar columns, in bind order. Road-feature columns follow, then the
/// derived columns.
const SCALAR_COLUMNS: [&str; 23] = [
    "id",
    "source",
    "severity",
    "start_time",
    "end_time",
    "start_lat",
    "start_lng",
    "distance_mi",
    "description",
    "street",
    "city",
    "county",
    "state",
    "zipcode",
    "timezone",
    "temperature_f",
    "humidity_pct",
    "pressure_in",
    "visibility_mi",
    "wind_direction",
    "wind_speed_mph",
    "precipitation_in",
    "weather_condition",
];

const DERIVED_COLUMNS: [&str; 4] = ["sunrise_sunset", "hour_of_day", "day_of_week", "duration_minutes"];

fn column_list() -> Vec<String> {
    SCALAR_COLUMNS
        .iter()
        .map(ToString::to_string)
        .chain(RoadFeature::all().iter().map(ToString::to_string))
        .chain(DERIVED_COLUMNS.iter().map(ToString::to_string))
        .collect()
}

/// Inserts a batch of accident records, replacing any existing row with
/// the same id.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns [`DbError`] if any database operation fails.
pub fn insert_records(conn: &Connection, records: &[AccidentRecord]) -> Result<u64, DbError> {
    if records.is_empty() {
        return Ok(0);
    }

    // Deduplicate within the batch: keep last occurrence of each id
    let mut last_seen: BTreeMap<&str, usize> = BTreeMap::new();
    for (i, record) in records.iter().enumerate() {
        last_seen.insert(&record.id, i);
    }
    let deduped: Vec<&AccidentRecord> = records
        .iter()
        .enumerate()
        .filter(|(i, r)| last_seen.get(r.id.as_str()) == Some(i))
        .map(|(_, r)| r)
        .collect();

    if deduped.len() < records.len() {
        log::info!(
            "Deduplicated INSERT batch: {} -> {} rows ({} duplicates removed)",
            records.len(),
            deduped.len(),
            records.len() - deduped.len(),
        );
    }

    let columns = column_list();
    let row_placeholder = format!(
        "({})",
        columns
            .iter()
            .map(|c| match c.as_str() {
                "start_time" | "end_time" => "CAST(? AS TIMESTAMP)",
                _ => "?",
            })
            .collect::<Vec<_>>()
            .join(", ")
    );

    let mut total_inserted = 0u64;

    for chunk in deduped.chunks(CHUNK_SIZE) {
        let mut sql = format!(
            "INSERT OR REPLACE INTO accidents ({}) VALUES ",
            columns.join(", ")
        );
        for i in 0..chunk.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&row_placeholder);
        }

        let mut stmt = conn.prepare(&sql)?;
        let mut idx = 1usize;

        for record in chunk {
            let weather = &record.weather;

            stmt.raw_bind_parameter(idx, &record.id)?;
            stmt.raw_bind_parameter(idx + 1, record.source.as_deref())?;
            stmt.raw_bind_parameter(idx + 2, i16::from(record.severity.value()))?;
            stmt.raw_bind_parameter(
                idx + 3,
                record.start_time.format(TIMESTAMP_FORMAT).to_string(),
            )?;
            stmt.raw_bind_parameter(
                idx + 4,
                record
                    .end_time
                    .map(|t| t.format(TIMESTAMP_FORMAT).to_string()),
            )?;
            stmt.raw_bind_parameter(idx + 5, record.start_lat)?;
            stmt.raw_bind_parameter(idx + 6, record.start_lng)?;
            stmt.raw_bind_parameter(idx + 7, record.distance_mi)?;
            stmt.raw_bind_parameter(idx + 8, record.description.as_deref())?;
            stmt.raw_bind_parameter(idx + 9, record.street.as_deref())?;
            stmt.raw_bind_parameter(idx + 10, record.city.as_deref())?;
            stmt.raw_bind_parameter(idx + 11, record.county.as_deref())?;
            stmt.raw_bind_parameter(idx + 12, record.state.as_deref())?;
            stmt.raw_bind_parameter(idx + 13, record.zipcode.as_deref())?;
            stmt.raw_bind_parameter(idx + 14, record.timezone.as_deref())?;
            stmt.raw_bind_parameter(idx + 15, weather.temperature_f)?;
            stmt.raw_bind_parameter(idx + 16, weather.humidity_pct)?;
            stmt.raw_bind_parameter(idx + 17, weather.pressure_in)?;
            stmt.raw_bind_parameter(idx + 18, weather.visibility_mi)?;
            stmt.raw_bind_parameter(idx + 19, weather.wind_direction.as_deref())?;
            stmt.raw_bind_parameter(idx + 20, weather.wind_speed_mph)?;
            stmt.raw_bind_parameter(idx + 21, weather.precipitation_in)?;
            stmt.raw_bind_parameter(idx + 22, weather.condition.as_deref())?;
            idx += SCALAR_COLUMNS.len();

            for feature in RoadFeature::all() {
                stmt.raw_bind_parameter(idx, record.has_feature(*feature))?;
                idx += 1;
            }

            stmt.raw_bind_parameter(idx, record.sunrise_sunset.as_deref())?;
            stmt.raw_bind_parameter(idx + 1, i16::from(record.hour_of_day()))?;
            stmt.raw_bind_parameter(idx + 2, i16::from(record.day_of_week()))?;
            stmt.raw_bind_parameter(idx + 3, record.duration_minutes())?;
            idx += DERIVED_COLUMNS.len();
        }

        let rows = stmt.raw_execute()?;
        total_inserted += u64::try_from(rows).unwrap_or(0);
    }

    Ok(total_inserted)
}

/// Returns the number of accidents stored.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn get_record_count(conn: &Connection) -> Result<u64, DbError> {
    let mut stmt = conn.prepare("SELECT COUNT(*) FROM accidents")?;
    let count: i64 = stmt.query_row([], |row| row.get(0))?;
    Ok(u64::try_from(count).unwrap_or(0))
}

/// Returns the `limit` states with the most accidents, most first.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn get_top_states(conn: &Connection, limit: u32) -> Result<Vec<(String, u64)>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT state, COUNT(*) AS cnt FROM accidents
         WHERE state IS NOT NULL
         GROUP BY state ORDER BY cnt DESC, state LIMIT ?",
    )?;
    let rows = stmt.query_map([limit], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut states = Vec::new();
    for row in rows {
        let (state, count) = row?;
        states.push((state, u64::try_from(count).unwrap_or(0)));
    }
    Ok(states)
}

/// Returns the number of accidents at each severity level, ascending.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn get_severity_distribution(conn: &Connection) -> Result<Vec<(u8, u64)>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT severity, COUNT(*) FROM accidents GROUP BY severity ORDER BY severity",
    )?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, i16>(0)?, row.get::<_, i64>(1)?)))?;

    let mut distribution = Vec::new();
    for row in rows {
        let (severity, count) = row?;
        distribution.push((
            u8::try_from(severity).unwrap_or(0),
            u64::try_from(count).unwrap_or(0),
        ));
    }
    Ok(distribution)
}

/// Returns the earliest and latest `start_time`, or `None` for an empty
/// table.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn get_date_range(conn: &Connection) -> Result<Option<(String, String)>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT strftime(MIN(start_time), '%Y-%m-%d %H:%M:%S'),
                strftime(MAX(start_time), '%Y-%m-%d %H:%M:%S')
         FROM accidents",
    )?;
    let (min, max): (Option<String>, Option<String>) =
        stmt.query_row([], |row| Ok((row.get(0)?, row.get(1)?)))?;

    Ok(min.zip(max))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use accident_risk_accident_models::Severity;
    use accident_risk_database_models::WeatherSnapshot;
    use chrono::NaiveDate;

    use super::*;

    fn record(id: &str, severity: Severity, state: &str, day: u32) -> AccidentRecord {
        let start = NaiveDate::from_ymd_opt(2021, 6, day)
            .unwrap()
            .and_hms_opt(7, 15, 0)
            .unwrap();
        AccidentRecord {
            id: id.to_string(),
            source: Some("Source1".to_string()),
            severity,
            start_time: start,
            end_time: Some(start + chrono::Duration::minutes(40)),
            start_lat: 29.76,
            start_lng: -95.37,
            distance_mi: Some(0.5),
            description: Some("Lane blocked".to_string()),
            street: Some("Main St".to_string()),
            city: Some("Houston".to_string()),
            county: Some("Harris".to_string()),
            state: Some(state.to_string()),
            zipcode: None,
            timezone: Some("US/Central".to_string()),
            weather: WeatherSnapshot {
                condition: Some("Cloudy".to_string()),
                visibility_mi: Some(10.0),
                ..WeatherSnapshot::default()
            },
            road_features: BTreeSet::from([RoadFeature::TrafficSignal, RoadFeature::Stop]),
            sunrise_sunset: Some("Day".to_string()),
        }
    }

    #[test]
    fn insert_then_count() {
        let conn = crate::open_in_memory().unwrap();
        let inserted = insert_records(
            &conn,
            &[
                record("A-1", Severity::Moderate, "TX", 1),
                record("A-2", Severity::Severe, "TX", 2),
                record("A-3", Severity::Minor, "OK", 3),
            ],
        )
        .unwrap();
        assert_eq!(inserted, 3);
        assert_eq!(get_record_count(&conn).unwrap(), 3);
    }

    #[test]
    fn duplicate_ids_keep_last() {
        let conn = crate::open_in_memory().unwrap();
        insert_records(
            &conn,
            &[
                record("A-1", Severity::Moderate, "TX", 1),
                record("A-1", Severity::Severe, "TX", 1),
            ],
        )
        .unwrap();
        assert_eq!(get_record_count(&conn).unwrap(), 1);

        let severity: i16 = conn
            .query_row("SELECT severity FROM accidents WHERE id = 'A-1'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(severity, 4);
    }

    #[test]
    fn stores_derived_columns() {
        let conn = crate::open_in_memory().unwrap();
        insert_records(&conn, &[record("A-1", Severity::Moderate, "TX", 1)]).unwrap();

        let (hour, dow, duration, signal, crossing): (i16, i16, f64, bool, bool) = conn
            .query_row(
                "SELECT hour_of_day, day_of_week, duration_minutes, traffic_signal, crossing
                 FROM accidents",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )
            .unwrap();
        assert_eq!(hour, 7);
        // 2021-06-01 was a Tuesday
        assert_eq!(dow, 1);
        assert!((duration - 40.0).abs() < f64::EPSILON);
        assert!(signal);
        assert!(!crossing);
    }

    #[test]
    fn overview_queries() {
        let conn = crate::open_in_memory().unwrap();
        assert_eq!(get_date_range(&conn).unwrap(), None);

        insert_records(
            &conn,
            &[
                record("A-1", Severity::Moderate, "TX", 1),
                record("A-2", Severity::Moderate, "TX", 2),
                record("A-3", Severity::Minor, "OK", 3),
            ],
        )
        .unwrap();

        assert_eq!(
            get_top_states(&conn, 5).unwrap(),
            vec![("TX".to_string(), 2), ("OK".to_string(), 1)]
        );
        assert_eq!(get_severity_distribution(&conn).unwrap(), vec![(1, 1), (2, 2)]);
        assert_eq!(
            get_date_range(&conn).unwrap(),
            Some((
                "2021-06-01 07:15:00".to_string(),
                "2021-06-03 07:15:00".to_string()
            ))
        );
    }
}
