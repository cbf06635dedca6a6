#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Accident severity scale, road-feature taxonomy, and risk levels.
//!
//! These are the canonical vocabularies shared by the ingestion tool, the
//! summary tables, and the risk classifiers.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Ordinal impact rating of an accident, from 1 (minor) to 4 (severe).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Level 1: short delay, little impact on traffic
    Minor = 1,
    /// Level 2: noticeable delay
    Moderate = 2,
    /// Level 3: significant delay
    Serious = 3,
    /// Level 4: long delay, major impact on traffic
    Severe = 4,
}

impl Severity {
    /// Severity at or above which an accident counts as "severe" in the
    /// summary tables.
    pub const SEVERE_THRESHOLD: Self = Self::Serious;

    /// Returns the numeric value of this severity level.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Creates a severity level from a numeric value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-4.
    pub const fn from_value(value: u8) -> Result<Self, InvalidSeverityError> {
        match value {
            1 => Ok(Self::Minor),
            2 => Ok(Self::Moderate),
            3 => Ok(Self::Serious),
            4 => Ok(Self::Severe),
            _ => Err(InvalidSeverityError { value }),
        }
    }
}

/// Error returned when attempting to create a [`Severity`] from an invalid
/// numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSeverityError {
    /// The invalid severity value that was provided.
    pub value: u8,
}

impl std::fmt::Display for InvalidSeverityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid severity value {}: expected 1-4", self.value)
    }
}

impl std::error::Error for InvalidSeverityError {}

/// Road features flagged on each accident record.
///
/// The `snake_case` name doubles as the `accidents` column name and the
/// `feature` key in `road_feature_stats`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RoadFeature {
    /// Pedestrian crossing
    Crossing,
    /// Road junction
    Junction,
    /// Traffic signal
    TrafficSignal,
    /// Stop sign
    Stop,
    /// Railway crossing
    Railway,
    /// Roundabout
    Roundabout,
    /// Speed bump
    Bump,
    /// Give-way sign
    GiveWay,
    /// No-exit road
    NoExit,
    /// Nearby station (bus, train, gas)
    Station,
}

impl RoadFeature {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Crossing,
            Self::Junction,
            Self::TrafficSignal,
            Self::Stop,
            Self::Railway,
            Self::Roundabout,
            Self::Bump,
            Self::GiveWay,
            Self::NoExit,
            Self::Station,
        ]
    }

    /// Returns the `snake_case` names of all features, in declaration order.
    #[must_use]
    pub fn names() -> Vec<String> {
        Self::all().iter().map(ToString::to_string).collect()
    }

    /// Parses a user-supplied feature name.
    ///
    /// Matching is case-insensitive and treats `-` and spaces as `_`, so
    /// `"Traffic-Signal"` resolves to [`Self::TrafficSignal`].
    #[must_use]
    pub fn parse_lenient(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();
        normalized.parse().ok()
    }
}

/// A discretized classifier output.
///
/// Ordered from least to most severe so that levels can be compared
/// directly.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Normal conditions
    Low,
    /// Above-average risk
    Moderate,
    /// Well above average risk
    High,
    /// Only produced by the composite real-time scorer
    Critical,
}

/// Day names indexed by day-of-week (0 = Monday).
pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Returns the day name for a day-of-week index, or `None` when the index
/// is outside 0-6.
#[must_use]
pub fn day_name(day_of_week: u8) -> Option<&'static str> {
    DAY_NAMES.get(usize::from(day_of_week)).copied()
}
