//! Statistics accessor.
//!
//! Every statistic the tools need is resolved through [`StatsSource`]. Two
//! interchangeable implementations exist: [`AggregateSource`] recombines
//! rows of the precomputed summary tables, and [`RawSource`] scans the
//! `accidents` table directly. For any filter set both return the same
//! numbers up to floating-point rounding.
//!
//! Missing rows (an unknown state, a weather condition nobody recorded)
//! produce zero-valued statistics, never an error.

use std::collections::BTreeMap;

use accident_risk_accident_models::RoadFeature;
use accident_risk_database_models::{
    BoundingBox, CityAggregate, FeatureSplit, GlobalBaseline, PeriodStats, SeverityStats,
    StateSummary, WeatherStats,
};
use duckdb::Connection;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

pub use crate::aggregate::AggregateSource;
pub use crate::raw::RawSource;

use crate::AnalyticsError;

/// Filters for hour/day-of-week lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemporalFilter<'a> {
    /// Hour of day.
    pub hour: u8,
    /// Day of week (0 = Monday), or every day.
    pub day_of_week: Option<u8>,
    /// State code, or every state.
    pub state: Option<&'a str>,
}

/// Filters for city-group lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CityFilter<'a> {
    /// State code.
    pub state: Option<&'a str>,
    /// City name substring.
    pub city: Option<&'a str>,
    /// Maximum number of groups.
    pub limit: Option<u32>,
}

/// Read access to accident statistics.
pub trait StatsSource: Send + Sync {
    /// Accidents per hour-of-week slot and clear-weather severity.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the query fails.
    fn baseline(&self, conn: &Connection) -> Result<GlobalBaseline, AnalyticsError>;

    /// City/state/county groups ordered by count (desc), then city, state,
    /// and county.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the query fails.
    fn cities(
        &self,
        conn: &Connection,
        filter: &CityFilter<'_>,
    ) -> Result<Vec<CityAggregate>, AnalyticsError>;

    /// Total accidents in city groups whose center lies inside `bbox`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the query fails.
    fn location_density(&self, conn: &Connection, bbox: &BoundingBox)
    -> Result<u64, AnalyticsError>;

    /// Statistics for an hour, optionally narrowed by day and state.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the query fails.
    fn temporal(
        &self,
        conn: &Connection,
        filter: &TemporalFilter<'_>,
    ) -> Result<SeverityStats, AnalyticsError>;

    /// The `limit` busiest hours of day in a state, as `(hour, count)`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the query fails.
    fn peak_hours(
        &self,
        conn: &Connection,
        state: &str,
        limit: u32,
    ) -> Result<Vec<(u8, u64)>, AnalyticsError>;

    /// Statistics for weather conditions containing `condition`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the query fails.
    fn weather(
        &self,
        conn: &Connection,
        condition: &str,
        state: Option<&str>,
    ) -> Result<WeatherStats, AnalyticsError>;

    /// The `limit` most common weather conditions in a state.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the query fails.
    fn weather_conditions(
        &self,
        conn: &Connection,
        state: &str,
        limit: u32,
    ) -> Result<Vec<(String, u64)>, AnalyticsError>;

    /// Accidents with and without `feature`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the query fails.
    fn road_feature(
        &self,
        conn: &Connection,
        feature: RoadFeature,
        state: Option<&str>,
    ) -> Result<FeatureSplit, AnalyticsError>;

    /// Per-year statistics for `first..=last`. Years without data are
    /// absent from the map.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the query fails.
    fn yearly(
        &self,
        conn: &Connection,
        first: i32,
        last: i32,
        state: Option<&str>,
    ) -> Result<BTreeMap<i32, PeriodStats>, AnalyticsError>;

    /// Whole-state overview.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the query fails.
    fn state_summary(&self, conn: &Connection, state: &str)
    -> Result<StateSummary, AnalyticsError>;
}

/// Which [`StatsSource`] a store reads through.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Strategy {
    /// Summary tables.
    Aggregate,
    /// Raw record scans.
    Raw,
}

static AGGREGATE: AggregateSource = AggregateSource;
static RAW: RawSource = RawSource;

impl Strategy {
    /// Returns the source implementing this strategy.
    #[must_use]
    pub fn source(self) -> &'static dyn StatsSource {
        match self {
            Self::Aggregate => &AGGREGATE,
            Self::Raw => &RAW,
        }
    }
}

/// Converts a `COUNT`/`SUM` result to an unsigned count.
pub(crate) fn count(value: Option<i64>) -> u64 {
    value.and_then(|v| u64::try_from(v).ok()).unwrap_or(0)
}

/// Converts a nullable average to a plain number (0 when absent).
pub(crate) fn mean(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Converts a `SMALLINT` hour or severity column to `u8`.
pub(crate) fn small(value: Option<i16>) -> u8 {
    value.and_then(|v| u8::try_from(v).ok()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AccidentStore;
    use crate::fixture;

    const TOLERANCE: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn detects_strategy_from_summary_tables() {
        let with = AccidentStore::from_connection(fixture::connection(true), 1, None).unwrap();
        assert_eq!(with.strategy(), Strategy::Aggregate);

        let without = AccidentStore::from_connection(fixture::connection(false), 1, None).unwrap();
        assert_eq!(without.strategy(), Strategy::Raw);

        assert!(close(with.baseline().avg_hourly, without.baseline().avg_hourly));
        assert_eq!(with.baseline().clear_weather_severity, Some(2.0));
    }

    #[allow(clippy::too_many_lines)]
    fn assert_strategies_agree(conn: &Connection) {
        let agg = Strategy::Aggregate.source();
        let raw = Strategy::Raw.source();

        let (a, r) = (agg.baseline(conn).unwrap(), raw.baseline(conn).unwrap());
        assert!(close(a.avg_hourly, r.avg_hourly));
        assert_eq!(a.clear_weather_severity, r.clear_weather_severity);

        for filter in [
            CityFilter::default(),
            CityFilter {
                state: Some("tx"),
                city: None,
                limit: Some(3),
            },
            CityFilter {
                state: None,
                city: Some("an"),
                limit: None,
            },
        ] {
            let (a, r) = (
                agg.cities(conn, &filter).unwrap(),
                raw.cities(conn, &filter).unwrap(),
            );
            assert_eq!(a.len(), r.len());
            for (a, r) in a.iter().zip(&r) {
                assert_eq!((&a.city, &a.state, &a.county), (&r.city, &r.state, &r.county));
                assert_eq!(a.accident_count, r.accident_count);
                assert!(close(a.avg_severity, r.avg_severity));
                assert!(close(a.center_lat, r.center_lat));
                assert!(close(a.center_lng, r.center_lng));
            }
        }

        let bbox = BoundingBox::new(-99.0, 29.0, -95.0, 31.0);
        assert_eq!(
            agg.location_density(conn, &bbox).unwrap(),
            raw.location_density(conn, &bbox).unwrap()
        );

        for filter in [
            TemporalFilter {
                hour: 17,
                day_of_week: None,
                state: None,
            },
            TemporalFilter {
                hour: 8,
                day_of_week: Some(4),
                state: Some("TX"),
            },
            TemporalFilter {
                hour: 3,
                day_of_week: None,
                state: Some("ZZ"),
            },
        ] {
            let (a, r) = (
                agg.temporal(conn, &filter).unwrap(),
                raw.temporal(conn, &filter).unwrap(),
            );
            assert_eq!(a.accident_count, r.accident_count);
            assert_eq!(a.severe_count, r.severe_count);
            assert!(close(a.avg_severity, r.avg_severity));
        }

        assert_eq!(
            agg.peak_hours(conn, "TX", 5).unwrap(),
            raw.peak_hours(conn, "TX", 5).unwrap()
        );
        assert_eq!(
            agg.weather_conditions(conn, "TX", 5).unwrap(),
            raw.weather_conditions(conn, "TX", 5).unwrap()
        );

        for (condition, state) in [
            ("rain", None),
            ("Clear", Some("TX")),
            ("Snow", None),
            ("", None),
            ("", Some("TX")),
            ("Light Rain", Some("CA")),
        ] {
            let (a, r) = (
                agg.weather(conn, condition, state).unwrap(),
                raw.weather(conn, condition, state).unwrap(),
            );
            assert_eq!(a.accident_count, r.accident_count);
            assert_eq!(a.severe_count, r.severe_count);
            assert!(close(a.avg_severity, r.avg_severity));
            assert!(close(a.avg_visibility, r.avg_visibility));
        }

        for &feature in RoadFeature::all() {
            for state in [None, Some("CA")] {
                let (a, r) = (
                    agg.road_feature(conn, feature, state).unwrap(),
                    raw.road_feature(conn, feature, state).unwrap(),
                );
                for (a, r) in [
                    (a.with_feature, r.with_feature),
                    (a.without_feature, r.without_feature),
                ] {
                    assert_eq!(a.count, r.count, "{feature}");
                    assert!(close(a.avg_severity, r.avg_severity), "{feature}");
                    assert!(close(a.avg_duration, r.avg_duration), "{feature}");
                }
            }
        }

        for state in [None, Some("TX"), Some("ZZ")] {
            let (a, r) = (
                agg.yearly(conn, 2019, 2023, state).unwrap(),
                raw.yearly(conn, 2019, 2023, state).unwrap(),
            );
            assert_eq!(a.keys().collect::<Vec<_>>(), r.keys().collect::<Vec<_>>());
            for (year, a) in &a {
                let r = &r[year];
                assert_eq!(a.accident_count, r.accident_count);
                assert!(close(a.avg_severity, r.avg_severity));
                assert!(close(a.avg_duration, r.avg_duration));
            }
        }

        for state in ["TX", "CA", "ZZ"] {
            let (a, r) = (
                agg.state_summary(conn, state).unwrap(),
                raw.state_summary(conn, state).unwrap(),
            );
            assert_eq!(a.total_accidents, r.total_accidents);
            assert!(close(a.avg_severity, r.avg_severity));
            assert!(close(a.avg_duration, r.avg_duration));
            assert_eq!(a.earliest_record, r.earliest_record);
            assert_eq!(a.latest_record, r.latest_record);
        }
    }

    #[test]
    fn strategies_agree() {
        assert_strategies_agree(&fixture::connection(true));
    }

    #[test]
    fn strategies_agree_with_missing_fields() {
        assert_strategies_agree(&fixture::sparse_connection());
    }

    #[test]
    fn blank_weather_skips_records_without_a_condition() {
        let conn = fixture::sparse_connection();
        let with_condition = fixture::records().len()
            + fixture::sparse_records()
                .iter()
                .filter(|r| r.weather.condition.is_some())
                .count();

        for strategy in [Strategy::Aggregate, Strategy::Raw] {
            let stats = strategy.source().weather(&conn, "", None).unwrap();
            assert_eq!(stats.accident_count, u64::try_from(with_condition).unwrap(), "{strategy}");
        }
    }
}
