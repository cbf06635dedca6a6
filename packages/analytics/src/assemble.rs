//! Shapes statistics and classifications into response documents.
//!
//! Rounding happens here and nowhere else: severities and component scores
//! to 2 decimals, durations, percentages and the overall score to 1, city
//! centers to 4.

use std::collections::BTreeMap;

use accident_risk_analytics_models::{
    CityCount, ComponentScores, CovidAnalysis, CovidImpactResult, CovidPeriods, CurrentConditions,
    DataRange, DrivingRecommendations, FeatureRiskAssessment, FeatureSummary, GeoPoint, Hotspot,
    HotspotFilters, HotspotsResult, HourCount, NearLocationResult, NearbyAccident,
    OverallStatistics, PeriodSummary, RealtimeRiskResult, RiskAssessment, RoadFeatureResult,
    RouteContext, RouteRiskResult, RouteSummary, SegmentAnalysis, StateStatisticsResult,
    TemporalRiskResult, TemporalStatistics, TimePeriod, WeatherConditions, WeatherCount,
    WeatherRiskAssessment, WeatherRiskResult, WeatherStatistics,
};
use accident_risk_database_models::{
    CityAggregate, FeatureSplit, FeatureStats, PeriodStats, SegmentStats, SeverityStats,
    StateSummary, Waypoint, WeatherStats,
};
use accident_risk_spatial::RouteSegment;

use crate::classify::{Classification, RouteTotals};
use crate::scoring::CompositeScore;

/// Label used when no state filter was given.
pub const ALL_STATES: &str = "All states";
/// Label used when no day-of-week filter was given.
pub const ALL_DAYS: &str = "All days";
/// Rows echoed by the near-location search.
pub const NEAR_LOCATION_ECHO: usize = 20;

const COVID_INSIGHT: &str =
    "Positive values indicate more accidents during COVID compared to pre-pandemic.";

/// Rounds to `places` decimal places, half away from zero.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[must_use]
pub fn round1(value: f64) -> f64 {
    round_to(value, 1)
}

#[must_use]
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

#[must_use]
pub fn round4(value: f64) -> f64 {
    round_to(value, 4)
}

/// Label for an optional state filter.
#[must_use]
pub fn state_label(state: Option<&str>) -> String {
    state.map_or_else(|| ALL_STATES.to_string(), ToString::to_string)
}

fn assessment(classification: Classification) -> RiskAssessment {
    RiskAssessment {
        level: classification.level,
        recommendation: classification.recommendation.to_string(),
    }
}

#[must_use]
pub fn hotspots(rows: Vec<CityAggregate>, filters: HotspotFilters) -> HotspotsResult {
    let hotspots: Vec<Hotspot> = rows
        .into_iter()
        .map(|row| Hotspot {
            city: row.city,
            state: row.state,
            county: row.county,
            accident_count: row.accident_count,
            avg_severity: round2(row.avg_severity),
            center_lat: round4(row.center_lat),
            center_lng: round4(row.center_lng),
        })
        .collect();

    HotspotsResult {
        total_returned: hotspots.len(),
        hotspots,
        filters_applied: filters,
    }
}

/// Summarises the fetched rows and keeps the first
/// [`NEAR_LOCATION_ECHO`] of them.
#[must_use]
pub fn near_location(
    location: GeoPoint,
    radius_miles: f64,
    mut rows: Vec<NearbyAccident>,
) -> NearLocationResult {
    let mut severity_distribution = BTreeMap::new();
    let mut severity_sum = 0.0;
    for row in &rows {
        *severity_distribution
            .entry(row.severity.to_string())
            .or_insert(0) += 1;
        severity_sum += f64::from(row.severity);
    }

    let accidents_found = rows.len();
    let average_severity = if accidents_found == 0 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let n = accidents_found as f64;
        severity_sum / n
    };

    rows.truncate(NEAR_LOCATION_ECHO);

    NearLocationResult {
        location,
        radius_miles,
        accidents_found,
        average_severity: round2(average_severity),
        severity_distribution,
        accidents: rows,
    }
}

#[must_use]
pub fn temporal(
    hour: u8,
    day_name: Option<&str>,
    state: Option<&str>,
    stats: &SeverityStats,
    classification: Classification,
) -> TemporalRiskResult {
    TemporalRiskResult {
        time_period: TimePeriod {
            hour,
            day_of_week: day_name.unwrap_or(ALL_DAYS).to_string(),
            state: state_label(state),
        },
        statistics: TemporalStatistics {
            total_accidents: stats.accident_count,
            average_severity: round2(stats.avg_severity),
            severe_accidents_count: stats.severe_count,
        },
        risk_assessment: assessment(classification),
    }
}

#[must_use]
pub fn weather(
    conditions: WeatherConditions,
    stats: &WeatherStats,
    multiplier: f64,
    classification: Classification,
) -> WeatherRiskResult {
    WeatherRiskResult {
        weather_conditions: conditions,
        statistics: WeatherStatistics {
            accidents_in_similar_conditions: stats.accident_count,
            average_severity: round2(stats.avg_severity),
            severe_accidents: stats.severe_count,
            average_visibility: round2(stats.avg_visibility),
        },
        risk_assessment: WeatherRiskAssessment {
            level: classification.level,
            risk_multiplier: round2(multiplier),
            recommendation: classification.recommendation.to_string(),
        },
    }
}

#[must_use]
pub fn segment(
    segment: &RouteSegment,
    stats: &SegmentStats,
    classification: Classification,
) -> SegmentAnalysis {
    SegmentAnalysis {
        segment: segment.index,
        from: segment.from,
        to: segment.to,
        accidents_count: stats.accident_count,
        avg_severity: round2(stats.avg_severity),
        risk_level: classification.level,
    }
}

#[must_use]
pub fn route(
    waypoints: &[Waypoint],
    segments: Vec<SegmentAnalysis>,
    totals: RouteTotals,
    classification: Classification,
    context: RouteContext,
) -> RouteRiskResult {
    RouteRiskResult {
        route_summary: RouteSummary {
            total_waypoints: waypoints.len(),
            segments_analyzed: segments.len(),
            total_historical_accidents: totals.total,
            max_severity_encountered: totals.max_severity,
            overall_risk: classification.level,
            recommendation: classification.recommendation.to_string(),
        },
        context,
        segment_analysis: segments,
    }
}

fn feature_summary(stats: &FeatureStats) -> FeatureSummary {
    FeatureSummary {
        accident_count: stats.count,
        avg_severity: round2(stats.avg_severity),
        avg_duration_minutes: round1(stats.avg_duration),
    }
}

#[must_use]
pub fn road_feature(
    feature: &str,
    state: Option<&str>,
    split: &FeatureSplit,
    increase_percent: f64,
    classification: Classification,
) -> RoadFeatureResult {
    RoadFeatureResult {
        feature: feature.to_string(),
        state_filter: state_label(state),
        with_feature: feature_summary(&split.with_feature),
        without_feature: feature_summary(&split.without_feature),
        risk_assessment: FeatureRiskAssessment {
            level: classification.level,
            severity_increase_percent: round1(increase_percent),
            recommendation: classification.recommendation_for(feature),
        },
    }
}

#[must_use]
pub fn state_statistics(
    state: &str,
    summary: StateSummary,
    cities: Vec<CityAggregate>,
    hours: Vec<(u8, u64)>,
    conditions: Vec<(String, u64)>,
) -> StateStatisticsResult {
    StateStatisticsResult {
        state: state.to_string(),
        overall_statistics: OverallStatistics {
            total_accidents: summary.total_accidents,
            average_severity: round2(summary.avg_severity),
            average_duration_minutes: round1(summary.avg_duration),
            data_range: DataRange {
                from: summary.earliest_record.unwrap_or_default(),
                to: summary.latest_record.unwrap_or_default(),
            },
        },
        top_accident_cities: cities
            .into_iter()
            .map(|city| CityCount {
                city: city.city,
                count: city.accident_count,
            })
            .collect(),
        peak_accident_hours: hours
            .into_iter()
            .map(|(hour_of_day, count)| HourCount { hour_of_day, count })
            .collect(),
        common_weather_conditions: conditions
            .into_iter()
            .map(|(weather_condition, count)| WeatherCount {
                weather_condition,
                count,
            })
            .collect(),
    }
}

fn period(stats: Option<&PeriodStats>) -> PeriodSummary {
    let stats = stats.copied().unwrap_or_default();
    PeriodSummary {
        accident_count: stats.accident_count,
        avg_severity: round2(stats.avg_severity),
        avg_duration_minutes: round1(stats.avg_duration),
    }
}

/// Percent change in accident count from 2019 to 2020. A 2019 count of
/// zero is treated as one.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn covid_change_percent(count_2019: u64, count_2020: u64) -> f64 {
    let pre = count_2019.max(1) as f64;
    (count_2020 as f64 - pre) / pre * 100.0
}

#[must_use]
pub fn covid(state: Option<&str>, years: &BTreeMap<i32, PeriodStats>) -> CovidImpactResult {
    let count = |year: i32| years.get(&year).map_or(0, |stats| stats.accident_count);

    CovidImpactResult {
        state_filter: state_label(state),
        period_statistics: CovidPeriods {
            pre_covid_2019: period(years.get(&2019)),
            covid_2020: period(years.get(&2020)),
            covid_2021: period(years.get(&2021)),
            post_covid_2022: period(years.get(&2022)),
            post_covid_2023: period(years.get(&2023)),
        },
        analysis: CovidAnalysis {
            change_2020_vs_2019_percent: round1(covid_change_percent(count(2019), count(2020))),
            insight: COVID_INSIGHT.to_string(),
        },
    }
}

#[must_use]
pub fn realtime(score: &CompositeScore, conditions: CurrentConditions) -> RealtimeRiskResult {
    RealtimeRiskResult {
        risk_score: round1(score.overall),
        risk_level: score.level,
        component_scores: ComponentScores {
            location: round1(score.components.location),
            temporal: round1(score.components.temporal),
            weather: round1(score.components.weather),
            visibility: round1(score.components.visibility),
        },
        current_conditions: conditions,
        recommendations: DrivingRecommendations {
            speed_adjustment_mph: score.speed_adjustment_mph,
            actions: score.actions.iter().map(ToString::to_string).collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nearby(id: &str, severity: u8) -> NearbyAccident {
        NearbyAccident {
            id: id.to_string(),
            severity,
            start_time: "2021-01-01 00:00:00".to_string(),
            start_lat: 0.0,
            start_lng: 0.0,
            street: None,
            city: None,
            weather_condition: None,
        }
    }

    #[test]
    fn rounding_precisions() {
        assert!((round2(2.345_67) - 2.35).abs() < 1e-12);
        assert!((round1(12.34) - 12.3).abs() < 1e-12);
        assert!((round4(-97.123_456) - -97.1235).abs() < 1e-12);
    }

    #[test]
    fn near_location_stats_cover_all_fetched_rows() {
        let rows: Vec<_> = (0..25)
            .map(|i| nearby(&format!("A-{i}"), if i < 5 { 4 } else { 2 }))
            .collect();
        let result = near_location(
            GeoPoint {
                latitude: 30.0,
                longitude: -97.0,
            },
            5.0,
            rows,
        );

        assert_eq!(result.accidents_found, 25);
        assert_eq!(result.accidents.len(), NEAR_LOCATION_ECHO);
        assert!((result.average_severity - 2.4).abs() < 1e-12);
        assert_eq!(result.severity_distribution.get("4"), Some(&5));
        assert_eq!(result.severity_distribution.get("2"), Some(&20));
    }

    #[test]
    fn near_location_empty() {
        let result = near_location(
            GeoPoint {
                latitude: 0.0,
                longitude: 0.0,
            },
            1.0,
            Vec::new(),
        );
        assert_eq!(result.accidents_found, 0);
        assert!(result.average_severity.abs() < f64::EPSILON);
        assert!(result.severity_distribution.is_empty());
    }

    #[test]
    fn covid_change_guards_empty_2019() {
        assert!((covid_change_percent(100, 80) - -20.0).abs() < 1e-12);
        assert!((covid_change_percent(0, 3) - 200.0).abs() < 1e-12);
        assert!((covid_change_percent(0, 0) - -100.0).abs() < 1e-12);
    }

    #[test]
    fn covid_missing_years_are_zero() {
        let mut years = BTreeMap::new();
        years.insert(
            2020,
            PeriodStats {
                accident_count: 4,
                avg_severity: 2.333_33,
                avg_duration: 45.67,
            },
        );
        let result = covid(None, &years);
        assert_eq!(result.state_filter, ALL_STATES);
        assert_eq!(result.period_statistics.pre_covid_2019.accident_count, 0);
        assert!((result.period_statistics.covid_2020.avg_severity - 2.33).abs() < 1e-12);
        assert!((result.period_statistics.covid_2020.avg_duration_minutes - 45.7).abs() < 1e-12);
        assert!((result.analysis.change_2020_vs_2019_percent - 300.0).abs() < 1e-12);
    }

    #[test]
    fn state_statistics_without_data_has_empty_range() {
        let result = state_statistics("ZZ", StateSummary::default(), vec![], vec![], vec![]);
        assert_eq!(result.overall_statistics.total_accidents, 0);
        assert_eq!(result.overall_statistics.data_range.from, "");
        assert_eq!(result.overall_statistics.data_range.to, "");
    }
}
