//! Table definitions for the accidents database.

use std::fmt::Write as _;

use accident_risk_accident_models::RoadFeature;
use duckdb::Connection;

use crate::DbError;

/// Summary tables produced by [`crate::summaries::refresh_summaries`].
pub const SUMMARY_TABLES: [&str; 7] = [
    "city_stats",
    "hourly_dow_stats",
    "weather_stats",
    "road_feature_stats",
    "yearly_state_stats",
    "state_summary",
    "global_stats",
];

/// Creates the `accidents` table and its indexes if they do not exist.
///
/// # Errors
///
/// Returns [`DbError`] if any statement fails.
pub fn create_schema(conn: &Connection) -> Result<(), DbError> {
    let mut feature_columns = String::new();
    for feature in RoadFeature::all() {
        let _ = writeln!(feature_columns, "            {feature} BOOLEAN NOT NULL DEFAULT FALSE,");
    }

    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS accidents (
            id TEXT NOT NULL PRIMARY KEY,
            source TEXT,
            severity SMALLINT NOT NULL,
            start_time TIMESTAMP NOT NULL,
            end_time TIMESTAMP,
            start_lat DOUBLE NOT NULL,
            start_lng DOUBLE NOT NULL,
            distance_mi DOUBLE,
            description TEXT,
            street TEXT,
            city TEXT,
            county TEXT,
            state TEXT,
            zipcode TEXT,
            timezone TEXT,
            temperature_f DOUBLE,
            humidity_pct DOUBLE,
            pressure_in DOUBLE,
            visibility_mi DOUBLE,
            wind_direction TEXT,
            wind_speed_mph DOUBLE,
            precipitation_in DOUBLE,
            weather_condition TEXT,
{feature_columns}            sunrise_sunset TEXT,
            hour_of_day SMALLINT NOT NULL,
            day_of_week SMALLINT NOT NULL,
            duration_minutes DOUBLE
        );

        CREATE INDEX IF NOT EXISTS idx_accidents_state ON accidents (state);
        CREATE INDEX IF NOT EXISTS idx_accidents_location ON accidents (start_lat, start_lng);
        CREATE INDEX IF NOT EXISTS idx_accidents_hour_day ON accidents (hour_of_day, day_of_week);"
    ))?;

    Ok(())
}

/// Returns whether every summary table exists.
///
/// # Errors
///
/// Returns [`DbError`] if the catalog query fails.
pub fn has_summary_tables(conn: &Connection) -> Result<bool, DbError> {
    let placeholders = vec!["?"; SUMMARY_TABLES.len()].join(", ");
    let mut stmt = conn.prepare(&format!(
        "SELECT COUNT(DISTINCT table_name) FROM information_schema.tables
         WHERE table_name IN ({placeholders})"
    ))?;
    let count: i64 = stmt.query_row(duckdb::params_from_iter(SUMMARY_TABLES), |row| row.get(0))?;

    Ok(usize::try_from(count).unwrap_or(0) == SUMMARY_TABLES.len())
}
