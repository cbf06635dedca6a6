//! Name-based tool execution for transports.

use std::str::FromStr as _;

use accident_risk_analytics_models::{ErrorDocument, ToolName};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{AccidentStore, AnalyticsError, tools};

/// Executes a single tool by name with the given JSON parameters.
///
/// Invalid arguments (unknown tool, malformed parameters, unknown road
/// feature, too few waypoints, bad day of week) come back as an error
/// document rather than an `Err`, so the caller always gets a well-formed
/// answer.
///
/// # Errors
///
/// Returns [`AnalyticsError`] only when the store itself fails.
pub fn execute_tool(
    store: &AccidentStore,
    name: &str,
    input: &serde_json::Value,
) -> Result<serde_json::Value, AnalyticsError> {
    log::debug!("execute_tool: {name} {input}");

    let result = ToolName::from_str(name)
        .map_err(|_| AnalyticsError::invalid_argument(format!("Unknown tool: {name}")))
        .and_then(|tool| run_tool(store, tool, input));

    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_fatal() => {
            log::error!("{name} failed: {e}");
            Err(e)
        }
        Err(e) => {
            log::debug!("{name} rejected: {e}");
            Ok(serde_json::to_value(error_document(e))?)
        }
    }
}

fn run_tool(
    store: &AccidentStore,
    tool: ToolName,
    input: &serde_json::Value,
) -> Result<serde_json::Value, AnalyticsError> {
    match tool {
        ToolName::GetAccidentHotspots => run(store, input, tools::get_accident_hotspots),
        ToolName::GetAccidentsNearLocation => {
            run(store, input, tools::get_accidents_near_location)
        }
        ToolName::GetTemporalRiskAssessment => {
            run(store, input, tools::get_temporal_risk_assessment)
        }
        ToolName::GetWeatherRiskAssessment => {
            run(store, input, tools::get_weather_risk_assessment)
        }
        ToolName::AnalyzeRouteRisk => run(store, input, tools::analyze_route_risk),
        ToolName::GetRoadFeatureRisk => run(store, input, tools::get_road_feature_risk),
        ToolName::GetStateStatistics => run(store, input, tools::get_state_statistics),
        ToolName::SearchAccidentDescriptions => {
            run(store, input, tools::search_accident_descriptions)
        }
        ToolName::GetCovidImpactAnalysis => run(store, input, tools::get_covid_impact_analysis),
        ToolName::GetRealtimeRiskScore => run(store, input, tools::get_realtime_risk_score),
    }
}

fn run<P, R>(
    store: &AccidentStore,
    input: &serde_json::Value,
    tool: fn(&AccidentStore, &P) -> Result<R, AnalyticsError>,
) -> Result<serde_json::Value, AnalyticsError>
where
    P: DeserializeOwned,
    R: Serialize,
{
    // A missing body means "all defaults"
    let input = if input.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        input.clone()
    };

    let params: P = serde_json::from_value(input)
        .map_err(|e| AnalyticsError::invalid_argument(format!("Invalid parameters: {e}")))?;
    let result = tool(store, &params)?;
    Ok(serde_json::to_value(result)?)
}

fn error_document(error: AnalyticsError) -> ErrorDocument {
    match error {
        AnalyticsError::InvalidArgument {
            message,
            valid_options,
        } => ErrorDocument {
            error: message,
            available_features: valid_options,
        },
        other => ErrorDocument {
            error: other.to_string(),
            available_features: None,
        },
    }
}

/// Serialises a result document with 2-space indentation.
#[must_use]
pub fn render(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
