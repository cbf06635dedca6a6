//! Tool execution functions.
//!
//! Each function implements one of the tools the calling agent can invoke.
//! A call borrows one pooled connection for its whole duration, reads
//! statistics through the store's [`crate::source::StatsSource`], and
//! returns a typed result. Nothing here writes to the database.

use accident_risk_accident_models::{RoadFeature, day_name};
use accident_risk_analytics_models::{
    CovidImpactParams, CovidImpactResult, CurrentConditions, GeoPoint, HotspotFilters,
    HotspotsParams, HotspotsResult, NearLocationParams, NearLocationResult, RealtimeRiskParams,
    RealtimeRiskResult, RoadFeatureParams, RoadFeatureResult, RouteContext, RouteRiskParams,
    RouteRiskResult, SearchDescriptionsParams, SearchDescriptionsResult, SearchFilters,
    StateStatisticsParams, StateStatisticsResult, TemporalRiskParams, TemporalRiskResult,
    WeatherConditions, WeatherRiskParams, WeatherRiskResult,
};
use accident_risk_database_models::Waypoint;
use accident_risk_spatial::{bounding_box_around, box_with_ranges, route_segments};

use crate::classify::{
    self, ROAD_FEATURE, ROUTE, Rate, RouteTotals, SEGMENT, TEMPORAL, WEATHER,
};
use crate::filters::{non_blank, normalize_state};
use crate::scoring::{self, LOCATION_LAT_RANGE, LOCATION_LNG_RANGE, ScoreInputs};
use crate::source::{CityFilter, TemporalFilter};
use crate::{AnalyticsError, AccidentStore, assemble, records};

/// Years covered by the COVID comparison.
const COVID_YEARS: (i32, i32) = (2019, 2023);

/// Entries in each state-statistics ranking.
const STATE_TOP_N: u32 = 5;

fn day_label(day_of_week: u8) -> Result<&'static str, AnalyticsError> {
    day_name(day_of_week).ok_or_else(|| {
        AnalyticsError::invalid_argument(format!(
            "day_of_week must be between 0 (Monday) and 6 (Sunday), got {day_of_week}"
        ))
    })
}

/// Ranks city/state/county groups by accident count.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the query fails.
pub fn get_accident_hotspots(
    store: &AccidentStore,
    params: &HotspotsParams,
) -> Result<HotspotsResult, AnalyticsError> {
    let state = normalize_state(params.state.as_deref());
    let city = non_blank(params.city.as_deref());

    let conn = store.connection()?;
    let rows = store.source().cities(
        &conn,
        &CityFilter {
            state: state.as_deref(),
            city,
            limit: Some(params.limit),
        },
    )?;

    Ok(assemble::hotspots(
        rows,
        HotspotFilters {
            state,
            city: city.map(ToString::to_string),
        },
    ))
}

/// Lists the most severe accidents inside a radius and summarises them.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the query fails.
pub fn get_accidents_near_location(
    store: &AccidentStore,
    params: &NearLocationParams,
) -> Result<NearLocationResult, AnalyticsError> {
    let bbox = bounding_box_around(params.latitude, params.longitude, params.radius_miles);

    let conn = store.connection()?;
    let rows = records::accidents_in_box(&conn, &bbox, params.limit)?;

    Ok(assemble::near_location(
        GeoPoint {
            latitude: params.latitude,
            longitude: params.longitude,
        },
        params.radius_miles,
        rows,
    ))
}

/// Compares an hour (and optionally a day and state) against the global
/// hourly average.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidArgument`] for a day of week outside
/// 0-6, or another [`AnalyticsError`] if the query fails.
pub fn get_temporal_risk_assessment(
    store: &AccidentStore,
    params: &TemporalRiskParams,
) -> Result<TemporalRiskResult, AnalyticsError> {
    let day = params.day_of_week.map(day_label).transpose()?;
    let state = normalize_state(params.state.as_deref());

    let conn = store.connection()?;
    let stats = store.source().temporal(
        &conn,
        &TemporalFilter {
            hour: params.hour_of_day,
            day_of_week: params.day_of_week,
            state: state.as_deref(),
        },
    )?;

    #[allow(clippy::cast_precision_loss)]
    let classification = TEMPORAL.classify(&Rate {
        count: stats.accident_count as f64,
        baseline: store.baseline().avg_hourly,
    });

    Ok(assemble::temporal(
        params.hour_of_day,
        day,
        state.as_deref(),
        &stats,
        classification,
    ))
}

/// Compares severity under a weather condition with the clear-weather
/// baseline.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the query fails.
pub fn get_weather_risk_assessment(
    store: &AccidentStore,
    params: &WeatherRiskParams,
) -> Result<WeatherRiskResult, AnalyticsError> {
    let state = normalize_state(params.state.as_deref());

    let conn = store.connection()?;
    let stats = store
        .source()
        .weather(&conn, &params.weather_condition, state.as_deref())?;

    let clear = scoring::clear_baseline(store.baseline());
    let multiplier = classify::weather_multiplier(stats.avg_severity, clear);
    let classification = WEATHER.classify(&multiplier);

    Ok(assemble::weather(
        WeatherConditions {
            condition: params.weather_condition.clone(),
            visibility_miles: params.visibility_miles,
        },
        &stats,
        multiplier,
        classification,
    ))
}

/// Scores each leg of a route and the route as a whole.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidArgument`] for fewer than two
/// waypoints, or another [`AnalyticsError`] if a query fails.
pub fn analyze_route_risk(
    store: &AccidentStore,
    params: &RouteRiskParams,
) -> Result<RouteRiskResult, AnalyticsError> {
    let segments = route_segments(&params.waypoints)?;

    let conn = store.connection()?;
    let mut totals = RouteTotals::default();
    let mut analyses = Vec::with_capacity(segments.len());

    for segment in &segments {
        let stats = records::segment_stats(&conn, &segment.bbox)?;
        totals.total += stats.accident_count;
        totals.max_severity = totals.max_severity.max(stats.max_severity);
        analyses.push(assemble::segment(segment, &stats, SEGMENT.classify(&stats)));
    }

    Ok(assemble::route(
        &params.waypoints,
        analyses,
        totals,
        ROUTE.classify(&totals),
        RouteContext {
            time_of_day: params.time_of_day,
            weather: params.weather.clone(),
        },
    ))
}

/// Compares accidents with and without a road feature.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidArgument`] listing the valid names for
/// an unknown feature, or another [`AnalyticsError`] if the query fails.
pub fn get_road_feature_risk(
    store: &AccidentStore,
    params: &RoadFeatureParams,
) -> Result<RoadFeatureResult, AnalyticsError> {
    let Some(feature) = RoadFeature::parse_lenient(&params.feature) else {
        return Err(AnalyticsError::InvalidArgument {
            message: format!("Unknown feature: {}", params.feature),
            valid_options: Some(RoadFeature::names()),
        });
    };
    let state = normalize_state(params.state.as_deref());

    let conn = store.connection()?;
    let split = store
        .source()
        .road_feature(&conn, feature, state.as_deref())?;

    let increase = classify::severity_increase_percent(
        split.with_feature.avg_severity,
        split.without_feature.avg_severity,
    );

    Ok(assemble::road_feature(
        &params.feature,
        state.as_deref(),
        &split,
        increase,
        ROAD_FEATURE.classify(&increase),
    ))
}

/// Overview of one state: totals, busiest cities, peak hours, and common
/// weather.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidArgument`] for a blank state, or
/// another [`AnalyticsError`] if a query fails.
pub fn get_state_statistics(
    store: &AccidentStore,
    params: &StateStatisticsParams,
) -> Result<StateStatisticsResult, AnalyticsError> {
    let Some(state) = normalize_state(Some(&params.state)) else {
        return Err(AnalyticsError::invalid_argument("state is required"));
    };

    let conn = store.connection()?;
    let source = store.source();

    let summary = source.state_summary(&conn, &state)?;
    let cities = source.cities(
        &conn,
        &CityFilter {
            state: Some(&state),
            city: None,
            limit: Some(STATE_TOP_N),
        },
    )?;
    let hours = source.peak_hours(&conn, &state, STATE_TOP_N)?;
    let conditions = source.weather_conditions(&conn, &state, STATE_TOP_N)?;

    Ok(assemble::state_statistics(
        &state, summary, cities, hours, conditions,
    ))
}

/// Finds accidents whose description mentions the keywords.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the query fails.
pub fn search_accident_descriptions(
    store: &AccidentStore,
    params: &SearchDescriptionsParams,
) -> Result<SearchDescriptionsResult, AnalyticsError> {
    let state = normalize_state(params.state.as_deref());

    let conn = store.connection()?;
    let accidents = records::search_descriptions(
        &conn,
        &params.keywords,
        state.as_deref(),
        params.min_severity,
        params.limit,
    )?;

    Ok(SearchDescriptionsResult {
        search_terms: params.keywords.clone(),
        filters: SearchFilters {
            state,
            min_severity: params.min_severity,
        },
        results_count: accidents.len(),
        accidents,
    })
}

/// Compares 2019 through 2023.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the query fails.
pub fn get_covid_impact_analysis(
    store: &AccidentStore,
    params: &CovidImpactParams,
) -> Result<CovidImpactResult, AnalyticsError> {
    let state = normalize_state(params.state.as_deref());

    let conn = store.connection()?;
    let years = store
        .source()
        .yearly(&conn, COVID_YEARS.0, COVID_YEARS.1, state.as_deref())?;

    Ok(assemble::covid(state.as_deref(), &years))
}

/// Combines location, time, weather, and visibility into one score.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidArgument`] for a day of week outside
/// 0-6, or another [`AnalyticsError`] if a query fails.
pub fn get_realtime_risk_score(
    store: &AccidentStore,
    params: &RealtimeRiskParams,
) -> Result<RealtimeRiskResult, AnalyticsError> {
    let day = day_label(params.day_of_week)?;
    let bbox = box_with_ranges(
        params.latitude,
        params.longitude,
        LOCATION_LAT_RANGE,
        LOCATION_LNG_RANGE,
    );

    let conn = store.connection()?;
    let source = store.source();

    let nearby_accidents = source.location_density(&conn, &bbox)?;
    let slot = source.temporal(
        &conn,
        &TemporalFilter {
            hour: params.hour,
            day_of_week: Some(params.day_of_week),
            state: None,
        },
    )?;
    let weather = source.weather(&conn, &params.weather, None)?;

    let score = scoring::score(
        &ScoreInputs {
            nearby_accidents,
            hour_dow_accidents: slot.accident_count,
            weather_severity: (weather.accident_count > 0).then_some(weather.avg_severity),
            visibility_miles: params.visibility,
        },
        store.baseline(),
    );

    Ok(assemble::realtime(
        &score,
        CurrentConditions {
            location: Waypoint::new(params.latitude, params.longitude),
            time: format!("{}:00 on {day}", params.hour),
            weather: params.weather.clone(),
            visibility_miles: params.visibility,
        },
    ))
}
