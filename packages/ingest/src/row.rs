//! One row of the US-Accidents CSV export and its conversion into an
//! [`AccidentRecord`].

use std::collections::BTreeSet;

use accident_risk_accident_models::{RoadFeature, Severity};
use accident_risk_database::records::TIMESTAMP_FORMAT;
use accident_risk_database_models::{AccidentRecord, WeatherSnapshot};
use chrono::NaiveDateTime;
use serde::Deserialize;

/// Longest description kept, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Raw CSV columns. Columns the store does not keep (`End_Lat`,
/// `Airport_Code`, the twilight columns, ...) are ignored by name.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CsvRow {
    #[serde(rename = "ID")]
    id: Option<String>,
    #[serde(rename = "Source")]
    source: Option<String>,
    #[serde(rename = "Severity", deserialize_with = "csv::invalid_option")]
    severity: Option<u8>,
    #[serde(rename = "Start_Time")]
    start_time: Option<String>,
    #[serde(rename = "End_Time")]
    end_time: Option<String>,
    #[serde(rename = "Start_Lat", deserialize_with = "csv::invalid_option")]
    start_lat: Option<f64>,
    #[serde(rename = "Start_Lng", deserialize_with = "csv::invalid_option")]
    start_lng: Option<f64>,
    #[serde(rename = "Distance(mi)", deserialize_with = "csv::invalid_option")]
    distance_mi: Option<f64>,
    #[serde(rename = "Description")]
    description: Option<String>,
    #[serde(rename = "Street")]
    street: Option<String>,
    #[serde(rename = "City")]
    city: Option<String>,
    #[serde(rename = "County")]
    county: Option<String>,
    #[serde(rename = "State")]
    state: Option<String>,
    #[serde(rename = "Zipcode")]
    zipcode: Option<String>,
    #[serde(rename = "Timezone")]
    timezone: Option<String>,
    #[serde(rename = "Temperature(F)", deserialize_with = "csv::invalid_option")]
    temperature_f: Option<f64>,
    #[serde(rename = "Humidity(%)", deserialize_with = "csv::invalid_option")]
    humidity_pct: Option<f64>,
    #[serde(rename = "Pressure(in)", deserialize_with = "csv::invalid_option")]
    pressure_in: Option<f64>,
    #[serde(rename = "Visibility(mi)", deserialize_with = "csv::invalid_option")]
    visibility_mi: Option<f64>,
    #[serde(rename = "Wind_Direction")]
    wind_direction: Option<String>,
    #[serde(rename = "Wind_Speed(mph)", deserialize_with = "csv::invalid_option")]
    wind_speed_mph: Option<f64>,
    #[serde(rename = "Precipitation(in)", deserialize_with = "csv::invalid_option")]
    precipitation_in: Option<f64>,
    #[serde(rename = "Weather_Condition")]
    weather_condition: Option<String>,
    #[serde(rename = "Bump")]
    bump: Option<String>,
    #[serde(rename = "Crossing")]
    crossing: Option<String>,
    #[serde(rename = "Give_Way")]
    give_way: Option<String>,
    #[serde(rename = "Junction")]
    junction: Option<String>,
    #[serde(rename = "No_Exit")]
    no_exit: Option<String>,
    #[serde(rename = "Railway")]
    railway: Option<String>,
    #[serde(rename = "Roundabout")]
    roundabout: Option<String>,
    #[serde(rename = "Station")]
    station: Option<String>,
    #[serde(rename = "Stop")]
    stop: Option<String>,
    #[serde(rename = "Traffic_Signal")]
    traffic_signal: Option<String>,
    #[serde(rename = "Sunrise_Sunset")]
    sunrise_sunset: Option<String>,
}

/// Why a CSV row was not loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No `ID` value.
    MissingId,
    /// `Start_Time` absent or not `%Y-%m-%d %H:%M:%S`.
    BadStartTime,
    /// Latitude or longitude absent or unparseable.
    MissingCoordinates,
    /// Severity absent or outside 1-4.
    BadSeverity,
}

impl CsvRow {
    /// Converts the row into a record, or reports why it must be skipped.
    ///
    /// # Errors
    ///
    /// Returns the [`SkipReason`] for rows missing a required field.
    pub fn into_record(self) -> Result<AccidentRecord, SkipReason> {
        let id = text(self.id).ok_or(SkipReason::MissingId)?;
        let start_time = self
            .start_time
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or(SkipReason::BadStartTime)?;
        let (Some(start_lat), Some(start_lng)) = (self.start_lat, self.start_lng) else {
            return Err(SkipReason::MissingCoordinates);
        };
        let severity = self
            .severity
            .and_then(|v| Severity::from_value(v).ok())
            .ok_or(SkipReason::BadSeverity)?;

        let road_features = [
            (RoadFeature::Bump, &self.bump),
            (RoadFeature::Crossing, &self.crossing),
            (RoadFeature::GiveWay, &self.give_way),
            (RoadFeature::Junction, &self.junction),
            (RoadFeature::NoExit, &self.no_exit),
            (RoadFeature::Railway, &self.railway),
            (RoadFeature::Roundabout, &self.roundabout),
            (RoadFeature::Station, &self.station),
            (RoadFeature::Stop, &self.stop),
            (RoadFeature::TrafficSignal, &self.traffic_signal),
        ]
        .into_iter()
        .filter(|(_, value)| flag(value.as_deref()))
        .map(|(feature, _)| feature)
        .collect::<BTreeSet<_>>();

        Ok(AccidentRecord {
            id,
            source: text(self.source),
            severity,
            start_time,
            end_time: self.end_time.as_deref().and_then(parse_timestamp),
            start_lat,
            start_lng,
            distance_mi: self.distance_mi,
            description: text(self.description).map(|d| truncate(&d, MAX_DESCRIPTION_CHARS)),
            street: text(self.street),
            city: text(self.city),
            county: text(self.county),
            state: text(self.state),
            zipcode: text(self.zipcode),
            timezone: text(self.timezone),
            weather: WeatherSnapshot {
                condition: text(self.weather_condition),
                temperature_f: self.temperature_f,
                humidity_pct: self.humidity_pct,
                pressure_in: self.pressure_in,
                visibility_mi: self.visibility_mi,
                wind_direction: text(self.wind_direction),
                wind_speed_mph: self.wind_speed_mph,
                precipitation_in: self.precipitation_in,
            },
            road_features,
            sunrise_sunset: text(self.sunrise_sunset),
        })
    }
}

/// Parses the first 19 characters of a source timestamp.
///
/// The export carries fractional seconds on some rows
/// (`2016-02-08 05:46:00.000000000`); they are dropped.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    let head = value.get(..19).unwrap_or(value);
    NaiveDateTime::parse_from_str(head, TIMESTAMP_FORMAT).ok()
}

fn text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
