#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Parameter and result types for the accident risk tools.
//!
//! Field names and nesting here are the wire contract the calling agent
//! depends on, so several row types keep the original dataset's
//! capitalised column names (`City`, `Start_Time`, ...). Parameter names
//! are `snake_case`; omitted optional parameters take the documented
//! defaults.

use std::collections::BTreeMap;

use accident_risk_accident_models::RiskLevel;
use accident_risk_database_models::Waypoint;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

const fn default_hotspot_limit() -> u32 {
    10
}

const fn default_radius_miles() -> f64 {
    5.0
}

const fn default_near_limit() -> u32 {
    50
}

const fn default_min_severity() -> u8 {
    1
}

const fn default_search_limit() -> u32 {
    20
}

fn default_weather() -> String {
    "Clear".to_string()
}

const fn default_visibility() -> f64 {
    10.0
}

// ---------------------------------------------------------------------------
// get_accident_hotspots
// ---------------------------------------------------------------------------

/// Parameters for ranking cities by accident count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotspotsParams {
    /// Two-letter state code.
    #[serde(default)]
    pub state: Option<String>,
    /// City name substring.
    #[serde(default)]
    pub city: Option<String>,
    /// Maximum number of hotspots to return.
    #[serde(default = "default_hotspot_limit")]
    pub limit: u32,
}

/// One city/state/county group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    /// City name.
    #[serde(rename = "City")]
    pub city: String,
    /// State code.
    #[serde(rename = "State")]
    pub state: String,
    /// County name.
    #[serde(rename = "County")]
    pub county: String,
    /// Accidents recorded in this group.
    pub accident_count: u64,
    /// Mean severity.
    pub avg_severity: f64,
    /// Mean latitude.
    pub center_lat: f64,
    /// Mean longitude.
    pub center_lng: f64,
}

/// Echo of the hotspot filters, with the state code normalised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotspotFilters {
    /// State filter.
    pub state: Option<String>,
    /// City filter.
    pub city: Option<String>,
}

/// Result of the hotspot ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotsResult {
    /// Groups ordered by accident count, highest first.
    pub hotspots: Vec<Hotspot>,
    /// Number of entries in `hotspots`.
    pub total_returned: usize,
    /// Filters used.
    pub filters_applied: HotspotFilters,
}

// ---------------------------------------------------------------------------
// get_accidents_near_location
// ---------------------------------------------------------------------------

/// Parameters for listing accidents around a point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearLocationParams {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Search radius in miles.
    #[serde(default = "default_radius_miles")]
    pub radius_miles: f64,
    /// Maximum number of accidents to fetch.
    #[serde(default = "default_near_limit")]
    pub limit: u32,
}

/// A query point echoed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

/// An accident inside the search box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyAccident {
    /// Record id.
    #[serde(rename = "ID")]
    pub id: String,
    /// Severity 1-4.
    #[serde(rename = "Severity")]
    pub severity: u8,
    /// Start time (`%Y-%m-%d %H:%M:%S`).
    #[serde(rename = "Start_Time")]
    pub start_time: String,
    /// Latitude.
    #[serde(rename = "Start_Lat")]
    pub start_lat: f64,
    /// Longitude.
    #[serde(rename = "Start_Lng")]
    pub start_lng: f64,
    /// Street name.
    #[serde(rename = "Street")]
    pub street: Option<String>,
    /// City.
    #[serde(rename = "City")]
    pub city: Option<String>,
    /// Weather condition.
    #[serde(rename = "Weather_Condition")]
    pub weather_condition: Option<String>,
}

/// Result of a radius search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearLocationResult {
    /// Query point.
    pub location: GeoPoint,
    /// Search radius.
    pub radius_miles: f64,
    /// Number of accidents fetched (up to the limit).
    pub accidents_found: usize,
    /// Mean severity over the fetched accidents.
    pub average_severity: f64,
    /// Fetched accidents per severity level, keyed by level.
    pub severity_distribution: BTreeMap<String, u64>,
    /// The most severe fetched accidents (at most 20).
    pub accidents: Vec<NearbyAccident>,
}

// ---------------------------------------------------------------------------
// get_temporal_risk_assessment
// ---------------------------------------------------------------------------

/// Parameters for the time-of-week risk lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalRiskParams {
    /// Hour of day (0-23).
    pub hour_of_day: u8,
    /// Day of week (0 = Monday).
    #[serde(default)]
    pub day_of_week: Option<u8>,
    /// Two-letter state code.
    #[serde(default)]
    pub state: Option<String>,
}

/// The slot that was assessed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePeriod {
    /// Hour of day.
    pub hour: u8,
    /// Day name, or `"All days"`.
    pub day_of_week: String,
    /// State code, or `"All states"`.
    pub state: String,
}

/// Counts for a time slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalStatistics {
    /// Accidents in the slot.
    pub total_accidents: u64,
    /// Mean severity.
    pub average_severity: f64,
    /// Accidents with severity 3 or higher.
    pub severe_accidents_count: u64,
}

/// A level and the advice that goes with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Risk level.
    pub level: RiskLevel,
    /// Driving advice.
    pub recommendation: String,
}

/// Result of the time-of-week risk lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalRiskResult {
    /// Slot assessed.
    pub time_period: TimePeriod,
    /// Counts for the slot.
    pub statistics: TemporalStatistics,
    /// Classification.
    pub risk_assessment: RiskAssessment,
}

// ---------------------------------------------------------------------------
// get_weather_risk_assessment
// ---------------------------------------------------------------------------

/// Parameters for the weather risk lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherRiskParams {
    /// Weather condition substring (e.g. `"Rain"`).
    pub weather_condition: String,
    /// Current visibility, echoed back.
    #[serde(default)]
    pub visibility_miles: Option<f64>,
    /// Two-letter state code.
    #[serde(default)]
    pub state: Option<String>,
}

/// Echo of the weather inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConditions {
    /// Condition as supplied.
    pub condition: String,
    /// Visibility as supplied.
    pub visibility_miles: Option<f64>,
}

/// Counts for matching weather conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherStatistics {
    /// Accidents under matching conditions.
    pub accidents_in_similar_conditions: u64,
    /// Mean severity.
    pub average_severity: f64,
    /// Accidents with severity 3 or higher.
    pub severe_accidents: u64,
    /// Mean recorded visibility.
    pub average_visibility: f64,
}

/// Weather classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRiskAssessment {
    /// Risk level.
    pub level: RiskLevel,
    /// Severity relative to the clear-weather baseline.
    pub risk_multiplier: f64,
    /// Driving advice.
    pub recommendation: String,
}

/// Result of the weather risk lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRiskResult {
    /// Inputs.
    pub weather_conditions: WeatherConditions,
    /// Counts.
    pub statistics: WeatherStatistics,
    /// Classification.
    pub risk_assessment: WeatherRiskAssessment,
}

// ---------------------------------------------------------------------------
// analyze_route_risk
// ---------------------------------------------------------------------------

/// Parameters for per-segment route analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteRiskParams {
    /// Route waypoints as `{lat, lng}` objects.
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
    /// Current hour, echoed as context.
    #[serde(default)]
    pub time_of_day: Option<u8>,
    /// Current weather, echoed as context.
    #[serde(default)]
    pub weather: Option<String>,
}

/// Whole-route summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Waypoints supplied.
    pub total_waypoints: usize,
    /// Segments analysed (`total_waypoints - 1`).
    pub segments_analyzed: usize,
    /// Sum of per-segment counts.
    pub total_historical_accidents: u64,
    /// Highest severity seen on any segment.
    pub max_severity_encountered: u8,
    /// Overall level.
    pub overall_risk: RiskLevel,
    /// Driving advice.
    pub recommendation: String,
}

/// Context echoed with the route result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteContext {
    /// Hour of day.
    pub time_of_day: Option<u8>,
    /// Weather.
    pub weather: Option<String>,
}

/// One segment's statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentAnalysis {
    /// 1-based segment number.
    pub segment: usize,
    /// Start waypoint.
    pub from: Waypoint,
    /// End waypoint.
    pub to: Waypoint,
    /// Accidents in the segment box.
    pub accidents_count: u64,
    /// Mean severity.
    pub avg_severity: f64,
    /// Segment level.
    pub risk_level: RiskLevel,
}

/// Result of route analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRiskResult {
    /// Whole-route summary.
    pub route_summary: RouteSummary,
    /// Echoed context.
    pub context: RouteContext,
    /// Per-segment breakdown.
    pub segment_analysis: Vec<SegmentAnalysis>,
}

// ---------------------------------------------------------------------------
// get_road_feature_risk
// ---------------------------------------------------------------------------

/// Parameters for the road feature comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadFeatureParams {
    /// Feature name (e.g. `"junction"`).
    pub feature: String,
    /// Two-letter state code.
    #[serde(default)]
    pub state: Option<String>,
}

/// One side of the feature comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    /// Accidents on this side.
    pub accident_count: u64,
    /// Mean severity.
    pub avg_severity: f64,
    /// Mean duration in minutes.
    pub avg_duration_minutes: f64,
}

/// Feature classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRiskAssessment {
    /// Risk level.
    pub level: RiskLevel,
    /// Severity increase with the feature present, in percent.
    pub severity_increase_percent: f64,
    /// Driving advice.
    pub recommendation: String,
}

/// Result of the road feature comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadFeatureResult {
    /// Feature as supplied.
    pub feature: String,
    /// State code, or `"All states"`.
    pub state_filter: String,
    /// Accidents with the feature.
    pub with_feature: FeatureSummary,
    /// Accidents without the feature.
    pub without_feature: FeatureSummary,
    /// Classification.
    pub risk_assessment: FeatureRiskAssessment,
}

// ---------------------------------------------------------------------------
// get_state_statistics
// ---------------------------------------------------------------------------

/// Parameters for the state overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateStatisticsParams {
    /// Two-letter state code.
    pub state: String,
}

/// Earliest and latest record start times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRange {
    /// Earliest start time, empty when there is no data.
    pub from: String,
    /// Latest start time, empty when there is no data.
    pub to: String,
}

/// State-wide totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStatistics {
    /// Accidents in the state.
    pub total_accidents: u64,
    /// Mean severity.
    pub average_severity: f64,
    /// Mean duration in minutes.
    pub average_duration_minutes: f64,
    /// Covered time span.
    pub data_range: DataRange,
}

/// A city and its accident count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityCount {
    /// City name.
    #[serde(rename = "City")]
    pub city: String,
    /// Accidents.
    pub count: u64,
}

/// An hour of day and its accident count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourCount {
    /// Hour of day.
    pub hour_of_day: u8,
    /// Accidents.
    pub count: u64,
}

/// A weather condition and its accident count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherCount {
    /// Weather condition.
    #[serde(rename = "Weather_Condition")]
    pub weather_condition: String,
    /// Accidents.
    pub count: u64,
}

/// Result of the state overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateStatisticsResult {
    /// State code (uppercased).
    pub state: String,
    /// Totals.
    pub overall_statistics: OverallStatistics,
    /// Top five cities.
    pub top_accident_cities: Vec<CityCount>,
    /// Top five hours.
    pub peak_accident_hours: Vec<HourCount>,
    /// Top five weather conditions.
    pub common_weather_conditions: Vec<WeatherCount>,
}

// ---------------------------------------------------------------------------
// search_accident_descriptions
// ---------------------------------------------------------------------------

/// Parameters for description search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDescriptionsParams {
    /// Substring to look for in descriptions.
    pub keywords: String,
    /// Two-letter state code.
    #[serde(default)]
    pub state: Option<String>,
    /// Minimum severity.
    #[serde(default = "default_min_severity")]
    pub min_severity: u8,
    /// Maximum results.
    #[serde(default = "default_search_limit")]
    pub limit: u32,
}

/// Echo of the search filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// State filter as supplied.
    pub state: Option<String>,
    /// Minimum severity.
    pub min_severity: u8,
}

/// An accident whose description matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionMatch {
    /// Record id.
    #[serde(rename = "ID")]
    pub id: String,
    /// Severity 1-4.
    #[serde(rename = "Severity")]
    pub severity: u8,
    /// Start time.
    #[serde(rename = "Start_Time")]
    pub start_time: String,
    /// City.
    #[serde(rename = "City")]
    pub city: Option<String>,
    /// State.
    #[serde(rename = "State")]
    pub state: Option<String>,
    /// Street.
    #[serde(rename = "Street")]
    pub street: Option<String>,
    /// Weather condition.
    #[serde(rename = "Weather_Condition")]
    pub weather_condition: Option<String>,
    /// Description.
    #[serde(rename = "Description")]
    pub description: Option<String>,
}

/// Result of description search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDescriptionsResult {
    /// Keywords as supplied.
    pub search_terms: String,
    /// Filters used.
    pub filters: SearchFilters,
    /// Number of matches returned.
    pub results_count: usize,
    /// Matches, most severe first.
    pub accidents: Vec<DescriptionMatch>,
}

// ---------------------------------------------------------------------------
// get_covid_impact_analysis
// ---------------------------------------------------------------------------

/// Parameters for the pandemic-period comparison.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CovidImpactParams {
    /// Two-letter state code.
    #[serde(default)]
    pub state: Option<String>,
}

/// Statistics for one year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// Accidents in the year.
    pub accident_count: u64,
    /// Mean severity.
    pub avg_severity: f64,
    /// Mean duration in minutes.
    pub avg_duration_minutes: f64,
}

/// The five compared years.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CovidPeriods {
    /// 2019.
    pub pre_covid_2019: PeriodSummary,
    /// 2020.
    pub covid_2020: PeriodSummary,
    /// 2021.
    pub covid_2021: PeriodSummary,
    /// 2022.
    pub post_covid_2022: PeriodSummary,
    /// 2023.
    pub post_covid_2023: PeriodSummary,
}

/// Derived comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovidAnalysis {
    /// Percent change in accident count, 2020 vs 2019.
    pub change_2020_vs_2019_percent: f64,
    /// How to read the percentage.
    pub insight: String,
}

/// Result of the pandemic-period comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovidImpactResult {
    /// State code, or `"All states"`.
    pub state_filter: String,
    /// Per-year statistics.
    pub period_statistics: CovidPeriods,
    /// Comparison.
    pub analysis: CovidAnalysis,
}

// ---------------------------------------------------------------------------
// get_realtime_risk_score
// ---------------------------------------------------------------------------

/// Parameters for the composite real-time score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeRiskParams {
    /// Current latitude.
    pub latitude: f64,
    /// Current longitude.
    pub longitude: f64,
    /// Current hour (0-23).
    pub hour: u8,
    /// Current day (0 = Monday).
    pub day_of_week: u8,
    /// Current weather condition.
    #[serde(default = "default_weather")]
    pub weather: String,
    /// Current visibility in miles.
    #[serde(default = "default_visibility")]
    pub visibility: f64,
}

/// The four 0-100 components of the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    /// Nearby accident density.
    pub location: f64,
    /// Time-of-week density.
    pub temporal: f64,
    /// Weather severity ratio.
    pub weather: f64,
    /// Reduced visibility.
    pub visibility: f64,
}

/// Inputs echoed with the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Current position.
    pub location: Waypoint,
    /// `"{hour}:00 on {day}"`.
    pub time: String,
    /// Weather as supplied.
    pub weather: String,
    /// Visibility as supplied.
    pub visibility_miles: f64,
}

/// What the vehicle should do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrivingRecommendations {
    /// Suggested speed change in mph (zero or negative).
    pub speed_adjustment_mph: i32,
    /// Actions to take.
    pub actions: Vec<String>,
}

/// Result of the composite real-time score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeRiskResult {
    /// Weighted score in `[0, 100]`.
    pub risk_score: f64,
    /// Level derived from the score.
    pub risk_level: RiskLevel,
    /// Component scores.
    pub component_scores: ComponentScores,
    /// Echoed inputs.
    pub current_conditions: CurrentConditions,
    /// Recommendations.
    pub recommendations: DrivingRecommendations,
}

// ---------------------------------------------------------------------------
// Tool boundary
// ---------------------------------------------------------------------------

/// In-band error document returned for invalid arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDocument {
    /// What went wrong.
    pub error: String,
    /// Valid feature names, when the error concerns a road feature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_features: Option<Vec<String>>,
}

/// Tool names for dispatching.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToolName {
    /// Rank cities by accident count.
    GetAccidentHotspots,
    /// List accidents around a point.
    GetAccidentsNearLocation,
    /// Assess an hour/day slot.
    GetTemporalRiskAssessment,
    /// Assess a weather condition.
    GetWeatherRiskAssessment,
    /// Analyse a multi-waypoint route.
    AnalyzeRouteRisk,
    /// Compare accidents with and without a road feature.
    GetRoadFeatureRisk,
    /// Summarise a state.
    GetStateStatistics,
    /// Search descriptions.
    SearchAccidentDescriptions,
    /// Compare 2019-2023.
    GetCovidImpactAnalysis,
    /// Composite real-time score.
    GetRealtimeRiskScore,
}

impl ToolName {
    /// Returns all tools in definition order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::GetAccidentHotspots,
            Self::GetAccidentsNearLocation,
            Self::GetTemporalRiskAssessment,
            Self::GetWeatherRiskAssessment,
            Self::AnalyzeRouteRisk,
            Self::GetRoadFeatureRisk,
            Self::GetStateStatistics,
            Self::SearchAccidentDescriptions,
            Self::GetCovidImpactAnalysis,
            Self::GetRealtimeRiskScore,
        ]
    }
}

/// Returns the JSON Schema tool definitions for all tools.
///
/// These are the descriptions a calling agent uses to decide which tool to
/// invoke and with which parameters.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn tool_definitions() -> Vec<serde_json::Value> {
    vec![
        serde_json::json!({
            "name": "get_accident_hotspots",
            "description": "Get accident hotspot locations ranked by accident frequency.",
            "parameters": {
                "type": "object",
                "properties": {
                    "state": { "type": "string", "description": "Two-letter state code (e.g., 'CA', 'TX', 'FL')" },
                    "city": { "type": "string", "description": "City name to filter by (partial match)" },
                    "limit": { "type": "integer", "description": "Maximum number of hotspots to return (default 10)" }
                },
                "required": []
            }
        }),
        serde_json::json!({
            "name": "get_accidents_near_location",
            "description": "Find accidents near a GPS coordinate within a given radius, with summary statistics.",
            "parameters": {
                "type": "object",
                "properties": {
                    "latitude": { "type": "number", "description": "GPS latitude" },
                    "longitude": { "type": "number", "description": "GPS longitude" },
                    "radius_miles": { "type": "number", "description": "Search radius in miles (default 5.0)" },
                    "limit": { "type": "integer", "description": "Maximum number of accidents to fetch (default 50)" }
                },
                "required": ["latitude", "longitude"]
            }
        }),
        serde_json::json!({
            "name": "get_temporal_risk_assessment",
            "description": "Get accident risk for an hour of day, optionally narrowed to a day of week and state.",
            "parameters": {
                "type": "object",
                "properties": {
                    "hour_of_day": { "type": "integer", "description": "Hour in 24-hour format (0-23)" },
                    "day_of_week": { "type": "integer", "description": "Day of week (0=Monday, 6=Sunday)" },
                    "state": { "type": "string", "description": "Two-letter state code" }
                },
                "required": ["hour_of_day"]
            }
        }),
        serde_json::json!({
            "name": "get_weather_risk_assessment",
            "description": "Get accident risk for a weather condition relative to clear weather.",
            "parameters": {
                "type": "object",
                "properties": {
                    "weather_condition": { "type": "string", "description": "Current weather (e.g., 'Rain', 'Snow', 'Fog', 'Clear')" },
                    "visibility_miles": { "type": "number", "description": "Current visibility in miles" },
                    "state": { "type": "string", "description": "Two-letter state code" }
                },
                "required": ["weather_condition"]
            }
        }),
        serde_json::json!({
            "name": "analyze_route_risk",
            "description": "Analyze historical accident risk along a route, segment by segment.",
            "parameters": {
                "type": "object",
                "properties": {
                    "waypoints": {
                        "type": "array",
                        "description": "Route waypoints in travel order (at least 2)",
                        "items": {
                            "type": "object",
                            "properties": {
                                "lat": { "type": "number" },
                                "lng": { "type": "number" }
                            },
                            "required": ["lat", "lng"]
                        }
                    },
                    "time_of_day": { "type": "integer", "description": "Current hour (0-23)" },
                    "weather": { "type": "string", "description": "Current weather condition" }
                },
                "required": ["waypoints"]
            }
        }),
        serde_json::json!({
            "name": "get_road_feature_risk",
            "description": "Compare accident severity with and without a road feature.",
            "parameters": {
                "type": "object",
                "properties": {
                    "feature": {
                        "type": "string",
                        "description": "Road feature",
                        "enum": ["crossing", "junction", "traffic_signal", "stop", "railway", "roundabout", "bump", "give_way", "no_exit", "station"]
                    },
                    "state": { "type": "string", "description": "Two-letter state code" }
                },
                "required": ["feature"]
            }
        }),
        serde_json::json!({
            "name": "get_state_statistics",
            "description": "Get accident totals, top cities, peak hours, and common weather for a state.",
            "parameters": {
                "type": "object",
                "properties": {
                    "state": { "type": "string", "description": "Two-letter state code (e.g., 'CA', 'TX', 'FL')" }
                },
                "required": ["state"]
            }
        }),
        serde_json::json!({
            "name": "search_accident_descriptions",
            "description": "Search accident records by keywords in their descriptions.",
            "parameters": {
                "type": "object",
                "properties": {
                    "keywords": { "type": "string", "description": "Text to find in accident descriptions" },
                    "state": { "type": "string", "description": "Two-letter state code" },
                    "min_severity": { "type": "integer", "description": "Minimum severity 1-4 (default 1)" },
                    "limit": { "type": "integer", "description": "Maximum results (default 20)" }
                },
                "required": ["keywords"]
            }
        }),
        serde_json::json!({
            "name": "get_covid_impact_analysis",
            "description": "Compare accident counts, severity, and duration across 2019-2023.",
            "parameters": {
                "type": "object",
                "properties": {
                    "state": { "type": "string", "description": "Two-letter state code" }
                },
                "required": []
            }
        }),
        serde_json::json!({
            "name": "get_realtime_risk_score",
            "description": "Compute a 0-100 risk score for current position, time, weather, and visibility, with speed and action recommendations.",
            "parameters": {
                "type": "object",
                "properties": {
                    "latitude": { "type": "number", "description": "Current GPS latitude" },
                    "longitude": { "type": "number", "description": "Current GPS longitude" },
                    "hour": { "type": "integer", "description": "Current hour (0-23)" },
                    "day_of_week": { "type": "integer", "description": "Current day (0=Monday, 6=Sunday)" },
                    "weather": { "type": "string", "description": "Current weather condition (default 'Clear')" },
                    "visibility": { "type": "number", "description": "Current visibility in miles (default 10.0)" }
                },
                "required": ["latitude", "longitude", "hour", "day_of_week"]
            }
        }),
    ]
}
