//! [`StatsSource`] that scans the `accidents` table directly.
//!
//! Used when the summary tables have not been built. Slower on large
//! stores but always current.

use std::collections::BTreeMap;

use accident_risk_accident_models::RoadFeature;
use accident_risk_database::summaries::{CLEAR_WEATHER_PATTERNS, HOURS_PER_WEEK};
use accident_risk_database_models::{
    BoundingBox, CityAggregate, FeatureSplit, FeatureStats, GlobalBaseline, PeriodStats,
    SeverityStats, StateSummary, WeatherStats,
};
use duckdb::types::Value;
use duckdb::{Connection, params_from_iter};

use crate::AnalyticsError;
use crate::aggregate::{query_cities, query_location_density};
use crate::filters::Filters;
use crate::source::{CityFilter, StatsSource, TemporalFilter, count, mean, small};

/// Scans raw accident records.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawSource;

/// Inline equivalent of the `city_stats` table.
const CITY_GROUPS: &str = "(
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
    GROUP BY city, state, COALESCE(county, '')
) AS city_groups";

const SEVERE_COUNT_SQL: &str =
    "CAST(SUM(CASE WHEN severity >= 3 THEN 1 ELSE 0 END) AS BIGINT)";

const YEAR_SQL: &str = "CAST(year(start_time) AS INTEGER)";

impl StatsSource for RawSource {
    fn baseline(&self, conn: &Connection) -> Result<GlobalBaseline, AnalyticsError> {
        let sql = format!(
            "SELECT
                 CAST(COUNT(*) AS DOUBLE) / {HOURS_PER_WEEK:.1},
                 AVG(severity) FILTER (
                     WHERE weather_condition ILIKE '{}' OR weather_condition ILIKE '{}'
                 )
             FROM accidents",
            CLEAR_WEATHER_PATTERNS[0], CLEAR_WEATHER_PATTERNS[1],
        );

        Ok(conn.prepare(&sql)?.query_row([], |row| {
            Ok(GlobalBaseline {
                avg_hourly: mean(row.get(0)?),
                clear_weather_severity: row.get(1)?,
            })
        })?)
    }

    fn cities(
        &self,
        conn: &Connection,
        filter: &CityFilter<'_>,
    ) -> Result<Vec<CityAggregate>, AnalyticsError> {
        query_cities(conn, CITY_GROUPS, filter)
    }

    fn location_density(
        &self,
        conn: &Connection,
        bbox: &BoundingBox,
    ) -> Result<u64, AnalyticsError> {
        query_location_density(conn, CITY_GROUPS, bbox)
    }

    fn temporal(
        &self,
        conn: &Connection,
        filter: &TemporalFilter<'_>,
    ) -> Result<SeverityStats, AnalyticsError> {
        let filters = Filters::new()
            .int_eq("hour_of_day", Some(i64::from(filter.hour)))
            .int_eq("day_of_week", filter.day_of_week.map(i64::from))
            .state("state", filter.state);

        let sql = format!(
            "SELECT CAST(COUNT(*) AS BIGINT), AVG(severity), {SEVERE_COUNT_SQL}
             FROM accidents{}",
            filters.where_clause()
        );

        Ok(conn
            .prepare(&sql)?
            .query_row(params_from_iter(filters.params()), |row| {
                Ok(SeverityStats {
                    accident_count: count(row.get(0)?),
                    avg_severity: mean(row.get(1)?),
                    severe_count: count(row.get(2)?),
                })
            })?)
    }

    fn peak_hours(
        &self,
        conn: &Connection,
        state: &str,
        limit: u32,
    ) -> Result<Vec<(u8, u64)>, AnalyticsError> {
        let filters = Filters::new()
            .state("state", Some(state))
            .with_param(Value::BigInt(i64::from(limit)));

        let sql = format!(
            "SELECT hour_of_day, CAST(COUNT(*) AS BIGINT) AS cnt
             FROM accidents{}
             GROUP BY hour_of_day
             ORDER BY cnt DESC, hour_of_day
             LIMIT ?",
            filters.where_clause()
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(filters.params()), |row| {
            Ok((small(row.get(0)?), count(row.get(1)?)))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn weather(
        &self,
        conn: &Connection,
        condition: &str,
        state: Option<&str>,
    ) -> Result<WeatherStats, AnalyticsError> {
        let filters = Filters::new()
            .raw("weather_condition IS NOT NULL")
            .contains("weather_condition", Some(condition))
            .state("state", state);

        let sql = format!(
            "SELECT CAST(COUNT(*) AS BIGINT), AVG(severity), AVG(visibility_mi), {SEVERE_COUNT_SQL}
             FROM accidents{}",
            filters.where_clause()
        );

        Ok(conn
            .prepare(&sql)?
            .query_row(params_from_iter(filters.params()), |row| {
                Ok(WeatherStats {
                    accident_count: count(row.get(0)?),
                    avg_severity: mean(row.get(1)?),
                    avg_visibility: mean(row.get(2)?),
                    severe_count: count(row.get(3)?),
                })
            })?)
    }

    fn weather_conditions(
        &self,
        conn: &Connection,
        state: &str,
        limit: u32,
    ) -> Result<Vec<(String, u64)>, AnalyticsError> {
        let filters = Filters::new()
            .raw("weather_condition IS NOT NULL")
            .state("state", Some(state))
            .with_param(Value::BigInt(i64::from(limit)));

        let sql = format!(
            "SELECT weather_condition, CAST(COUNT(*) AS BIGINT) AS cnt
             FROM accidents{}
             GROUP BY weather_condition
             ORDER BY cnt DESC, weather_condition
             LIMIT ?",
            filters.where_clause()
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(filters.params()), |row| {
            Ok((row.get::<_, String>(0)?, count(row.get(1)?)))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn road_feature(
        &self,
        conn: &Connection,
        feature: RoadFeature,
        state: Option<&str>,
    ) -> Result<FeatureSplit, AnalyticsError> {
        let filters = Filters::new().state("state", state);

        let sql = format!(
            "SELECT
                 CAST({feature} AS INTEGER) AS has_feature,
                 CAST(COUNT(*) AS BIGINT),
                 AVG(severity),
                 AVG(duration_minutes)
             FROM accidents{}
             GROUP BY CAST({feature} AS INTEGER)",
            filters.where_clause()
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(filters.params()), |row| {
            Ok((
                row.get::<_, i32>(0)?,
                FeatureStats {
                    count: count(row.get(1)?),
                    avg_severity: mean(row.get(2)?),
                    avg_duration: mean(row.get(3)?),
                },
            ))
        })?;

        let mut split = FeatureSplit::default();
        for row in rows {
            let (has_feature, stats) = row?;
            if has_feature == 1 {
                split.with_feature = stats;
            } else {
                split.without_feature = stats;
            }
        }
        Ok(split)
    }

    fn yearly(
        &self,
        conn: &Connection,
        first: i32,
        last: i32,
        state: Option<&str>,
    ) -> Result<BTreeMap<i32, PeriodStats>, AnalyticsError> {
        let filters = Filters::new()
            .int_between(YEAR_SQL, i64::from(first), i64::from(last))
            .state("state", state);

        let sql = format!(
            "SELECT {YEAR_SQL}, CAST(COUNT(*) AS BIGINT), AVG(severity), AVG(duration_minutes)
             FROM accidents{}
             GROUP BY {YEAR_SQL}
             ORDER BY {YEAR_SQL}",
            filters.where_clause()
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(filters.params()), |row| {
            Ok((
                row.get::<_, i32>(0)?,
                PeriodStats {
                    accident_count: count(row.get(1)?),
                    avg_severity: mean(row.get(2)?),
                    avg_duration: mean(row.get(3)?),
                },
            ))
        })?;
        Ok(rows.collect::<Result<BTreeMap<_, _>, _>>()?)
    }

    fn state_summary(
        &self,
        conn: &Connection,
        state: &str,
    ) -> Result<StateSummary, AnalyticsError> {
        let filters = Filters::new().state("state", Some(state));
        let sql = format!(
            "SELECT
                 CAST(COUNT(*) AS BIGINT),
                 AVG(severity),
                 AVG(duration_minutes),
                 strftime(MIN(start_time), '%Y-%m-%d %H:%M:%S'),
                 strftime(MAX(start_time), '%Y-%m-%d %H:%M:%S')
             FROM accidents{}",
            filters.where_clause()
        );

        Ok(conn
            .prepare(&sql)?
            .query_row(params_from_iter(filters.params()), |row| {
                Ok(StateSummary {
                    total_accidents: count(row.get(0)?),
                    avg_severity: mean(row.get(1)?),
                    avg_duration: mean(row.get(2)?),
                    earliest_record: row.get(3)?,
                    latest_record: row.get(4)?,
                })
            })?)
    }
}
