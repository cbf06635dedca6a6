#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Database row types and statistic bundles.
//!
//! These types represent the shapes of data as stored in and retrieved from
//! the accidents `DuckDB`. They are distinct from the tool response types in
//! `accident_risk_analytics_models`, which carry the exact field names the
//! calling agent expects.

use std::collections::BTreeSet;

use accident_risk_accident_models::{RoadFeature, Severity};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Latitude span in degrees.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Longitude span in degrees.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.east - self.west
    }
}

/// A route waypoint as supplied by the calling agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lng: f64,
}

impl Waypoint {
    /// Creates a new waypoint.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// One accident as stored in the `accidents` table.
///
/// Created only by the offline ingestion tool; the serving side never
/// mutates or deletes records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccidentRecord {
    /// Source identifier (e.g. `"A-1"`).
    pub id: String,
    /// Data provider the record came from.
    pub source: Option<String>,
    /// Impact rating.
    pub severity: Severity,
    /// When the accident started.
    pub start_time: NaiveDateTime,
    /// When the traffic impact cleared.
    pub end_time: Option<NaiveDateTime>,
    /// Latitude (WGS84).
    pub start_lat: f64,
    /// Longitude (WGS84).
    pub start_lng: f64,
    /// Length of road affected, in miles.
    pub distance_mi: Option<f64>,
    /// Free-text description.
    pub description: Option<String>,
    /// Street name.
    pub street: Option<String>,
    /// City.
    pub city: Option<String>,
    /// County.
    pub county: Option<String>,
    /// Two-letter state abbreviation.
    pub state: Option<String>,
    /// Postal code.
    pub zipcode: Option<String>,
    /// IANA-ish timezone label from the source (e.g. `"US/Eastern"`).
    pub timezone: Option<String>,
    /// Weather at the time of the accident.
    pub weather: WeatherSnapshot,
    /// Road features present near the accident.
    pub road_features: BTreeSet<RoadFeature>,
    /// Day or night.
    pub sunrise_sunset: Option<String>,
}

impl AccidentRecord {
    /// Hour of day (0-23) derived from `start_time`.
    #[must_use]
    pub fn hour_of_day(&self) -> u8 {
        use chrono::Timelike as _;
        u8::try_from(self.start_time.hour()).unwrap_or_default()
    }

    /// Day of week (0 = Monday) derived from `start_time`.
    #[must_use]
    pub fn day_of_week(&self) -> u8 {
        use chrono::Datelike as _;
        u8::try_from(self.start_time.weekday().num_days_from_monday()).unwrap_or_default()
    }

    /// Minutes between start and end, kept only when strictly positive
    /// and shorter than 48 hours.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_minutes(&self) -> Option<f64> {
        let end = self.end_time?;
        let minutes = (end - self.start_time).num_seconds() as f64 / 60.0;
        (minutes > 0.0 && minutes < MAX_DURATION_MINUTES).then_some(minutes)
    }

    /// Whether the given road feature was flagged on this record.
    #[must_use]
    pub fn has_feature(&self, feature: RoadFeature) -> bool {
        self.road_features.contains(&feature)
    }
}

/// Durations at or beyond this many minutes are treated as bad data.
pub const MAX_DURATION_MINUTES: f64 = 48.0 * 60.0;

/// Weather conditions recorded alongside an accident.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Condition label (e.g. `"Light Rain"`).
    pub condition: Option<String>,
    /// Temperature in Fahrenheit.
    pub temperature_f: Option<f64>,
    /// Relative humidity in percent.
    pub humidity_pct: Option<f64>,
    /// Air pressure in inches.
    pub pressure_in: Option<f64>,
    /// Visibility in miles.
    pub visibility_mi: Option<f64>,
    /// Wind direction label.
    pub wind_direction: Option<String>,
    /// Wind speed in miles per hour.
    pub wind_speed_mph: Option<f64>,
    /// Precipitation in inches.
    pub precipitation_in: Option<f64>,
}

/// A row of the `city_stats` summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityAggregate {
    /// City name.
    pub city: String,
    /// State abbreviation.
    pub state: String,
    /// County name.
    pub county: String,
    /// Number of accidents in this city/state/county.
    pub accident_count: u64,
    /// Mean severity.
    pub avg_severity: f64,
    /// Mean latitude of the constituent accidents.
    pub center_lat: f64,
    /// Mean longitude of the constituent accidents.
    pub center_lng: f64,
}

/// Count, mean severity, and severe count for a group of accidents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityStats {
    /// Number of accidents.
    pub accident_count: u64,
    /// Mean severity (0 when there are no accidents).
    pub avg_severity: f64,
    /// Accidents with severity 3 or higher.
    pub severe_count: u64,
}

/// Statistics for accidents recorded under matching weather conditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherStats {
    /// Number of accidents.
    pub accident_count: u64,
    /// Mean severity (0 when there are no accidents).
    pub avg_severity: f64,
    /// Mean visibility in miles over records that report one.
    pub avg_visibility: f64,
    /// Accidents with severity 3 or higher.
    pub severe_count: u64,
}

/// Statistics for one side (with or without) of a road-feature split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    /// Number of accidents.
    pub count: u64,
    /// Mean severity.
    pub avg_severity: f64,
    /// Mean duration in minutes over records with a valid duration.
    pub avg_duration: f64,
}

/// Accidents with and without a given road feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSplit {
    /// Accidents where the feature was present.
    pub with_feature: FeatureStats,
    /// Accidents where the feature was absent.
    pub without_feature: FeatureStats,
}

/// Statistics for one calendar year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    /// Number of accidents.
    pub accident_count: u64,
    /// Mean severity.
    pub avg_severity: f64,
    /// Mean duration in minutes over records with a valid duration.
    pub avg_duration: f64,
}

/// Whole-state overview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSummary {
    /// Number of accidents.
    pub total_accidents: u64,
    /// Mean severity.
    pub avg_severity: f64,
    /// Mean duration in minutes.
    pub avg_duration: f64,
    /// Earliest start time (`%Y-%m-%d %H:%M:%S`).
    pub earliest_record: Option<String>,
    /// Latest start time (`%Y-%m-%d %H:%M:%S`).
    pub latest_record: Option<String>,
}

/// Statistics for the accidents inside one route segment's bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentStats {
    /// Number of accidents.
    pub accident_count: u64,
    /// Mean severity.
    pub avg_severity: f64,
    /// Highest severity seen (0 when empty).
    pub max_severity: u8,
}

/// Process-wide normalization denominators.
///
/// Loaded once when the store is opened and never mutated afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalBaseline {
    /// Accidents per hour-of-week slot (total / 168).
    pub avg_hourly: f64,
    /// Mean severity under clear or fair weather, if any such accidents
    /// exist.
    pub clear_weather_severity: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(start: NaiveDateTime, end: Option<NaiveDateTime>) -> AccidentRecord {
        AccidentRecord {
            id: "A-1".to_string(),
            source: None,
            severity: Severity::Moderate,
            start_time: start,
            end_time: end,
            start_lat: 30.0,
            start_lng: -97.0,
            distance_mi: None,
            description: None,
            street: None,
            city: None,
            county: None,
            state: None,
            zipcode: None,
            timezone: None,
            weather: WeatherSnapshot::default(),
            road_features: BTreeSet::from([RoadFeature::Junction]),
            sunrise_sunset: None,
        }
    }

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn derives_hour_and_monday_based_weekday() {
        // 2021-03-01 was a Monday
        let r = record(at(1, 17, 5), None);
        assert_eq!(r.hour_of_day(), 17);
        assert_eq!(r.day_of_week(), 0);

        let r = record(at(7, 0, 0), None);
        assert_eq!(r.day_of_week(), 6);
    }

    #[test]
    fn duration_discards_negative_and_overlong() {
        assert_eq!(record(at(1, 10, 0), None).duration_minutes(), None);
        assert_eq!(
            record(at(1, 10, 0), Some(at(1, 10, 45))).duration_minutes(),
            Some(45.0)
        );
        assert_eq!(record(at(1, 10, 0), Some(at(1, 9, 0))).duration_minutes(), None);
        assert_eq!(record(at(1, 10, 0), Some(at(3, 10, 0))).duration_minutes(), None);
        assert_eq!(record(at(1, 10, 0), Some(at(1, 10, 0))).duration_minutes(), None);
    }

    #[test]
    fn feature_membership() {
        let r = record(at(1, 10, 0), None);
        assert!(r.has_feature(RoadFeature::Junction));
        assert!(!r.has_feature(RoadFeature::Crossing));
    }
}
