//! Precomputed summary tables.
//!
//! Every table is a deterministic `GROUP BY` over `accidents` and is rebuilt
//! wholesale with `CREATE OR REPLACE`. Averages over nullable columns carry
//! their non-null counts so that recombining groups with
//! `SUM(n * avg) / SUM(n)` reproduces the raw `AVG`.

use accident_risk_accident_models::RoadFeature;
use duckdb::Connection;

use crate::DbError;

/// Hours in a week; `avg_hourly` is the mean count per hour-of-week slot.
pub const HOURS_PER_WEEK: f64 = 168.0;

/// Weather labels whose accidents define the clear-weather baseline.
pub const CLEAR_WEATHER_PATTERNS: [&str; 2] = ["%Clear%", "%Fair%"];

/// Rebuilds every summary table from the current `accidents` contents.
///
/// # Errors
///
/// Returns [`DbError`] if any statement fails.
pub fn refresh_summaries(conn: &Connection) -> Result<(), DbError> {
    log::info!("Rebuilding city_stats...");
    conn.execute_batch(
        "CREATE OR REPLACE TABLE city_stats AS
         SELECT
             city,
             state,
             COALESCE(county, '') AS county,
             CAST(COUNT(*) AS BIGINT) AS accident_count,
             AVG(severity) AS avg_severity,
             AVG(start_lat) AS center_lat,
             AVG(start_lng) AS center_lng
         FROM accidents
         WHERE city IS NOT NULL AND state IS NOT NULL
         GROUP BY city, state, COALESCE(county, '');",
    )?;

    log::info!("Rebuilding hourly_dow_stats...");
    conn.execute_batch(
        "CREATE OR REPLACE TABLE hourly_dow_stats AS
         SELECT
             hour_of_day,
             day_of_week,
             COALESCE(state, '') AS state,
             CAST(COUNT(*) AS BIGINT) AS accident_count,
             AVG(severity) AS avg_severity,
             CAST(SUM(CASE WHEN severity >= 3 THEN 1 ELSE 0 END) AS BIGINT) AS severe_count
         FROM accidents
         GROUP BY hour_of_day, day_of_week, COALESCE(state, '');",
    )?;

    log::info!("Rebuilding weather_stats...");
    conn.execute_batch(
        "CREATE OR REPLACE TABLE weather_stats AS
         SELECT
             weather_condition,
             COALESCE(state, '') AS state,
             CAST(COUNT(*) AS BIGINT) AS accident_count,
             AVG(severity) AS avg_severity,
             AVG(visibility_mi) AS avg_visibility,
             CAST(COUNT(visibility_mi) AS BIGINT) AS visibility_count,
             CAST(SUM(CASE WHEN severity >= 3 THEN 1 ELSE 0 END) AS BIGINT) AS severe_count
         FROM accidents
         WHERE weather_condition IS NOT NULL
         GROUP BY weather_condition, COALESCE(state, '');",
    )?;

    log::info!("Rebuilding road_feature_stats...");
    conn.execute_batch(&road_feature_stats_sql())?;

    log::info!("Rebuilding yearly_state_stats...");
    conn.execute_batch(
        "CREATE OR REPLACE TABLE yearly_state_stats AS
         SELECT
             CAST(year(start_time) AS INTEGER) AS year,
             COALESCE(state, '') AS state,
             CAST(COUNT(*) AS BIGINT) AS accident_count,
             AVG(severity) AS avg_severity,
             AVG(duration_minutes) AS avg_duration,
             CAST(COUNT(duration_minutes) AS BIGINT) AS duration_count
         FROM accidents
         GROUP BY CAST(year(start_time) AS INTEGER), COALESCE(state, '');",
    )?;

    log::info!("Rebuilding state_summary...");
    conn.execute_batch(
        "CREATE OR REPLACE TABLE state_summary AS
         SELECT
             state,
             CAST(COUNT(*) AS BIGINT) AS total_accidents,
             AVG(severity) AS avg_severity,
             AVG(duration_minutes) AS avg_duration,
             strftime(MIN(start_time), '%Y-%m-%d %H:%M:%S') AS earliest_record,
             strftime(MAX(start_time), '%Y-%m-%d %H:%M:%S') AS latest_record
         FROM accidents
         WHERE state IS NOT NULL
         GROUP BY state;",
    )?;

    log::info!("Rebuilding global_stats...");
    conn.execute_batch(&format!(
        "CREATE OR REPLACE TABLE global_stats AS
         SELECT
             CAST(COUNT(*) AS DOUBLE) / {HOURS_PER_WEEK:.1} AS avg_hourly,
             AVG(severity) FILTER (
                 WHERE weather_condition ILIKE '{}' OR weather_condition ILIKE '{}'
             ) AS clear_weather_severity
         FROM accidents;",
        CLEAR_WEATHER_PATTERNS[0], CLEAR_WEATHER_PATTERNS[1],
    ))?;

    log::info!("Summary tables rebuilt");
    Ok(())
}

/// One `UNION ALL` branch per road feature, grouping on the flag and state.
fn road_feature_stats_sql() -> String {
    let branches = RoadFeature::all()
        .iter()
        .map(|feature| {
            format!(
                "SELECT
                     '{feature}' AS feature,
                     CAST({feature} AS INTEGER) AS has_feature,
                     COALESCE(state, '') AS state,
                     CAST(COUNT(*) AS BIGINT) AS cnt,
                     AVG(severity) AS sev,
                     AVG(duration_minutes) AS dur,
                     CAST(COUNT(duration_minutes) AS BIGINT) AS duration_count
                 FROM accidents
                 GROUP BY CAST({feature} AS INTEGER), COALESCE(state, '')"
            )
        })
        .collect::<Vec<_>>()
        .join("\n UNION ALL \n");

    format!("CREATE OR REPLACE TABLE road_feature_stats AS {branches};")
}
