//! [`StatsSource`] backed by the precomputed summary tables.
//!
//! Group means are recombined weighted by the count of values they were
//! computed over, so a sum across groups equals the raw mean.

use std::collections::BTreeMap;

use accident_risk_accident_models::RoadFeature;
use accident_risk_database_models::{
    BoundingBox, CityAggregate, FeatureSplit, FeatureStats, GlobalBaseline, PeriodStats,
    SeverityStats, StateSummary, WeatherStats,
};
use duckdb::types::Value;
use duckdb::{Connection, params_from_iter};

use crate::AnalyticsError;
use crate::filters::Filters;
use crate::source::{CityFilter, StatsSource, TemporalFilter, count, mean, small};

/// Reads the `*_stats` summary tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateSource;

/// Query over a table shaped like `city_stats`, shared with the raw
/// strategy, which substitutes an inline grouping of `accidents`.
pub(crate) fn query_cities(
    conn: &Connection,
    table: &str,
    filter: &CityFilter<'_>,
) -> Result<Vec<CityAggregate>, AnalyticsError> {
    let mut filters = Filters::new()
        .state("state", filter.state)
        .contains("city", filter.city);

    let mut sql = format!(
        "SELECT city, state, county, accident_count, avg_severity, center_lat, center_lng
         FROM {table}{}
         ORDER BY accident_count DESC, city, state, county",
        filters.where_clause()
    );
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        filters = filters.with_param(Value::BigInt(i64::from(limit)));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(filters.params()), |row| {
        Ok(CityAggregate {
            city: row.get(0)?,
            state: row.get(1)?,
            county: row.get(2)?,
            accident_count: count(row.get(3)?),
            avg_severity: mean(row.get(4)?),
            center_lat: mean(row.get(5)?),
            center_lng: mean(row.get(6)?),
        })
    })?;

    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Sum of `accident_count` over groups centered inside `bbox`.
pub(crate) fn query_location_density(
    conn: &Connection,
    table: &str,
    bbox: &BoundingBox,
) -> Result<u64, AnalyticsError> {
    let filters = Filters::new().within(bbox, "center_lat", "center_lng");
    let sql = format!(
        "SELECT CAST(SUM(accident_count) AS BIGINT) FROM {table}{}",
        filters.where_clause()
    );
    let total: Option<i64> = conn
        .prepare(&sql)?
        .query_row(params_from_iter(filters.params()), |row| row.get(0))?;
    Ok(count(total))
}

impl StatsSource for AggregateSource {
    fn baseline(&self, conn: &Connection) -> Result<GlobalBaseline, AnalyticsError> {
        let mut stmt =
            conn.prepare("SELECT avg_hourly, clear_weather_severity FROM global_stats LIMIT 1")?;
        let result = stmt.query_row([], |row| {
            Ok(GlobalBaseline {
                avg_hourly: mean(row.get(0)?),
                clear_weather_severity: row.get(1)?,
            })
        });

        match result {
            Ok(baseline) => Ok(baseline),
            Err(duckdb::Error::QueryReturnedNoRows) => {
                log::warn!("global_stats is empty; using zero baseline");
                Ok(GlobalBaseline::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn cities(
        &self,
        conn: &Connection,
        filter: &CityFilter<'_>,
    ) -> Result<Vec<CityAggregate>, AnalyticsError> {
        query_cities(conn, "city_stats", filter)
    }

    fn location_density(
        &self,
        conn: &Connection,
        bbox: &BoundingBox,
    ) -> Result<u64, AnalyticsError> {
        query_location_density(conn, "city_stats", bbox)
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
            "SELECT
                 CAST(SUM(accident_count) AS BIGINT),
                 SUM(accident_count * avg_severity) / NULLIF(SUM(accident_count), 0),
                 CAST(SUM(severe_count) AS BIGINT)
             FROM hourly_dow_stats{}",
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
            "SELECT hour_of_day, CAST(SUM(accident_count) AS BIGINT) AS cnt
             FROM hourly_dow_stats{}
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
            .contains("weather_condition", Some(condition))
            .state("state", state);

        let sql = format!(
            "SELECT
                 CAST(SUM(accident_count) AS BIGINT),
                 SUM(accident_count * avg_severity) / NULLIF(SUM(accident_count), 0),
                 SUM(visibility_count * avg_visibility) / NULLIF(SUM(visibility_count), 0),
                 CAST(SUM(severe_count) AS BIGINT)
             FROM weather_stats{}",
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
            .state("state", Some(state))
            .with_param(Value::BigInt(i64::from(limit)));

        let sql = format!(
            "SELECT weather_condition, accident_count
             FROM weather_stats{}
             ORDER BY accident_count DESC, weather_condition
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
        let filters = Filters::new()
            .text_eq("feature", feature.as_ref())
            .state("state", state);

        let sql = format!(
            "SELECT
                 has_feature,
                 CAST(SUM(cnt) AS BIGINT),
                 SUM(cnt * sev) / NULLIF(SUM(cnt), 0),
                 SUM(duration_count * dur) / NULLIF(SUM(duration_count), 0)
             FROM road_feature_stats{}
             GROUP BY has_feature",
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
            .int_between("year", i64::from(first), i64::from(last))
            .state("state", state);

        let sql = format!(
            "SELECT
                 year,
                 CAST(SUM(accident_count) AS BIGINT),
                 SUM(accident_count * avg_severity) / NULLIF(SUM(accident_count), 0),
                 SUM(duration_count * avg_duration) / NULLIF(SUM(duration_count), 0)
             FROM yearly_state_stats{}
             GROUP BY year
             ORDER BY year",
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
            "SELECT total_accidents, avg_severity, avg_duration, earliest_record, latest_record
             FROM state_summary{}",
            filters.where_clause()
        );

        let result = conn
            .prepare(&sql)?
            .query_row(params_from_iter(filters.params()), |row| {
                Ok(StateSummary {
                    total_accidents: count(row.get(0)?),
                    avg_severity: mean(row.get(1)?),
                    avg_duration: mean(row.get(2)?),
                    earliest_record: row.get(3)?,
                    latest_record: row.get(4)?,
                })
            });

        match result {
            Ok(summary) => Ok(summary),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(StateSummary::default()),
            Err(e) => Err(e.into()),
        }
    }
}
