//! In-memory accident store seeded with a small synthetic dataset.

use std::collections::BTreeSet;

use accident_risk_accident_models::{RoadFeature, Severity};
use accident_risk_database::records::insert_records;
use accident_risk_database::summaries::refresh_summaries;
use accident_risk_database_models::{AccidentRecord, WeatherSnapshot};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use duckdb::Connection;

use crate::AccidentStore;
use crate::source::Strategy;

pub const HOUSTON: (f64, f64) = (29.76, -95.37);
pub const AUSTIN: (f64, f64) = (30.27, -97.74);
pub const DALLAS: (f64, f64) = (32.78, -96.80);
const SAN_ANTONIO: (f64, f64) = (29.42, -98.49);
const LOS_ANGELES: (f64, f64) = (34.05, -118.24);

/// Heavy-rain records: 25 at severity 3 and 16 at severity 2, a mean of
/// 107/41 against a clear-weather mean of exactly 2.
pub const HEAVY_RAIN_RECORDS: usize = 41;
const CLEAR_HOUSTON_RECORDS: usize = 30;
pub const HOUSTON_RECORDS: usize = HEAVY_RAIN_RECORDS + CLEAR_HOUSTON_RECORDS;

struct Group {
    city: &'static str,
    county: Option<&'static str>,
    state: &'static str,
    center: (f64, f64),
    weather: &'static str,
    visibility: f64,
    count: usize,
    severity: fn(usize) -> u8,
}

const GROUPS: [Group; 6] = [
    Group {
        city: "Houston",
        county: Some("Harris"),
        state: "TX",
        center: HOUSTON,
        weather: "Heavy Rain",
        visibility: 2.0,
        count: HEAVY_RAIN_RECORDS,
        severity: |i| if i < 25 { 3 } else { 2 },
    },
    Group {
        city: "Houston",
        county: Some("Harris"),
        state: "TX",
        center: HOUSTON,
        weather: "Clear",
        visibility: 10.0,
        count: CLEAR_HOUSTON_RECORDS,
        severity: |_| 2,
    },
    Group {
        city: "Austin",
        county: Some("Travis"),
        state: "TX",
        center: AUSTIN,
        weather: "Fair",
        visibility: 10.0,
        count: 20,
        severity: |_| 2,
    },
    Group {
        city: "Dallas",
        county: Some("Dallas"),
        state: "TX",
        center: DALLAS,
        weather: "Cloudy",
        visibility: 8.0,
        count: 15,
        severity: |i| if i % 3 == 0 { 1 } else { 2 },
    },
    Group {
        city: "San Antonio",
        county: None,
        state: "TX",
        center: SAN_ANTONIO,
        weather: "Overcast",
        visibility: 9.0,
        count: 3,
        severity: |_| 2,
    },
    Group {
        city: "Los Angeles",
        county: Some("Los Angeles"),
        state: "CA",
        center: LOS_ANGELES,
        weather: "Light Rain",
        visibility: 5.0,
        count: 10,
        severity: |i| if i % 2 == 0 { 4 } else { 3 },
    },
];

fn start_time(n: usize) -> NaiveDateTime {
    let year = [2019, 2020, 2021][n % 3];
    let hour = if n % 4 == 0 { 8 } else { 17 };
    let day = u32::try_from(1 + n % 28).unwrap();
    NaiveDate::from_ymd_opt(year, 3, day)
        .unwrap()
        .and_hms_opt(hour, 15, 0)
        .unwrap()
}

/// The synthetic dataset, deterministic across calls.
pub fn records() -> Vec<AccidentRecord> {
    let mut records = Vec::new();
    let mut n = 0usize;

    for group in &GROUPS {
        for i in 0..group.count {
            let severity = Severity::from_value((group.severity)(i)).unwrap();
            let start = start_time(n);
            let offset = f64::from(u32::try_from(i % 5).unwrap()) * 0.002;
            let severe = severity.value() >= 3;

            let mut road_features = BTreeSet::new();
            if severe {
                road_features.insert(RoadFeature::Junction);
            }
            if i % 4 == 1 {
                road_features.insert(RoadFeature::TrafficSignal);
            }

            records.push(AccidentRecord {
                id: format!("A-{n}"),
                source: Some("Source1".to_string()),
                severity,
                start_time: start,
                end_time: Some(start + Duration::minutes(30 + i64::try_from(n % 60).unwrap())),
                start_lat: group.center.0 + offset,
                start_lng: group.center.1 - offset,
                distance_mi: Some(0.5),
                description: Some(if severe {
                    format!("Multi-vehicle crash on {} freeway", group.city)
                } else {
                    "Minor accident on exit ramp".to_string()
                }),
                street: Some("Main St".to_string()),
                city: Some(group.city.to_string()),
                county: group.county.map(ToString::to_string),
                state: Some(group.state.to_string()),
                zipcode: None,
                timezone: Some("US/Central".to_string()),
                weather: WeatherSnapshot {
                    condition: Some(group.weather.to_string()),
                    visibility_mi: Some(group.visibility),
                    ..WeatherSnapshot::default()
                },
                road_features,
                sunrise_sunset: Some("Day".to_string()),
            });
            n += 1;
        }
    }

    records
}

/// Records missing the optional fields: no weather condition, no
/// visibility, no or out-of-range end time, no city, no state.
pub fn sparse_records() -> Vec<AccidentRecord> {
    let start = start_time(3);
    let base = AccidentRecord {
        id: String::new(),
        source: None,
        severity: Severity::from_value(3).unwrap(),
        start_time: start,
        end_time: None,
        start_lat: HOUSTON.0,
        start_lng: HOUSTON.1,
        distance_mi: None,
        description: None,
        street: None,
        city: Some("Houston".to_string()),
        county: Some("Harris".to_string()),
        state: Some("TX".to_string()),
        zipcode: None,
        timezone: None,
        weather: WeatherSnapshot::default(),
        road_features: BTreeSet::new(),
        sunrise_sunset: None,
    };

    vec![
        AccidentRecord {
            id: "G-0".to_string(),
            ..base.clone()
        },
        AccidentRecord {
            id: "G-1".to_string(),
            end_time: Some(start + Duration::hours(72)),
            weather: WeatherSnapshot {
                condition: Some("Heavy Rain".to_string()),
                ..WeatherSnapshot::default()
            },
            road_features: BTreeSet::from([RoadFeature::Junction]),
            ..base.clone()
        },
        AccidentRecord {
            id: "G-2".to_string(),
            severity: Severity::from_value(4).unwrap(),
            end_time: Some(start + Duration::minutes(45)),
            city: None,
            county: None,
            state: None,
            weather: WeatherSnapshot {
                condition: Some("Clear".to_string()),
                visibility_mi: Some(6.0),
                ..WeatherSnapshot::default()
            },
            ..base.clone()
        },
        AccidentRecord {
            id: "G-3".to_string(),
            severity: Severity::from_value(1).unwrap(),
            start_time: start_time(4),
            end_time: Some(start_time(4) + Duration::minutes(10)),
            state: None,
            weather: WeatherSnapshot {
                condition: Some("Light Rain".to_string()),
                visibility_mi: Some(3.0),
                ..WeatherSnapshot::default()
            },
            road_features: BTreeSet::from([RoadFeature::TrafficSignal]),
            ..base.clone()
        },
        AccidentRecord {
            id: "G-4".to_string(),
            severity: Severity::from_value(2).unwrap(),
            end_time: Some(start + Duration::minutes(20)),
            city: None,
            county: None,
            state: Some("CA".to_string()),
            weather: WeatherSnapshot {
                condition: Some("Light Rain".to_string()),
                ..WeatherSnapshot::default()
            },
            ..base
        },
    ]
}

/// An in-memory database holding `records`, with summary tables built
/// when `summaries` is set.
pub fn connection_with(records: &[AccidentRecord], summaries: bool) -> Connection {
    let conn = accident_risk_database::open_in_memory().unwrap();
    insert_records(&conn, records).unwrap();
    if summaries {
        refresh_summaries(&conn).unwrap();
    }
    conn
}

/// An in-memory database holding [`records`].
pub fn connection(summaries: bool) -> Connection {
    connection_with(&records(), summaries)
}

/// [`records`] plus [`sparse_records`], summaries built.
pub fn sparse_connection() -> Connection {
    let mut all = records();
    all.extend(sparse_records());
    connection_with(&all, true)
}

/// A store reading through `strategy`.
pub fn store(strategy: Strategy) -> AccidentStore {
    AccidentStore::from_connection(connection(true), 2, Some(strategy)).unwrap()
}

/// One store per strategy over identical data.
pub fn both_strategies() -> [AccidentStore; 2] {
    [store(Strategy::Aggregate), store(Strategy::Raw)]
}
