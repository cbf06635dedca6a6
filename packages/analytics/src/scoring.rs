//! Composite real-time risk score.
//!
//! Four component scores, each in `[0, 100]`, are combined with fixed
//! weights into one overall score, which is then banded into a level with
//! a speed adjustment and an action list.

use accident_risk_accident_models::RiskLevel;
use accident_risk_database_models::GlobalBaseline;

/// Weight of the location-density component.
pub const LOCATION_WEIGHT: f64 = 0.35;
/// Weight of the hour/day-of-week component.
pub const TEMPORAL_WEIGHT: f64 = 0.25;
/// Weight of the weather-severity component.
pub const WEATHER_WEIGHT: f64 = 0.25;
/// Weight of the visibility component.
pub const VISIBILITY_WEIGHT: f64 = 0.15;

/// Nearby city-aggregate accidents that saturate the location score.
pub const LOCATION_SATURATION: f64 = 1000.0;
/// Half-height in degrees of the location window (roughly 5 miles).
pub const LOCATION_LAT_RANGE: f64 = 0.07;
/// Half-width in degrees of the location window.
pub const LOCATION_LNG_RANGE: f64 = 0.09;

/// Severity baseline used when no clear-weather accidents exist.
pub const FALLBACK_SEVERITY_BASELINE: f64 = 2.0;

/// Visibility in miles at and beyond which the visibility score is zero.
pub const CLEAR_VISIBILITY_MILES: f64 = 10.0;

const MAX_SCORE: f64 = 100.0;

/// Score bands, highest first: minimum score, level, speed adjustment,
/// actions.
pub const SCORE_BANDS: [(f64, RiskLevel, i32, &[&str]); 4] = [
    (
        70.0,
        RiskLevel::Critical,
        -15,
        &[
            "Reduce speed by at least 15 mph",
            "Maximize following distance",
            "Enable all safety sensors",
            "Consider stopping if conditions worsen",
        ],
    ),
    (
        50.0,
        RiskLevel::High,
        -10,
        &[
            "Reduce speed by 10 mph",
            "Increase following distance",
            "Stay alert for sudden hazards",
        ],
    ),
    (
        30.0,
        RiskLevel::Moderate,
        -5,
        &["Slight speed reduction recommended", "Maintain awareness"],
    ),
    (
        f64::NEG_INFINITY,
        RiskLevel::Low,
        0,
        &["Normal driving conditions", "Maintain standard safety protocols"],
    ),
];

/// Clear-weather severity, or the fallback when absent or non-positive.
#[must_use]
pub fn clear_baseline(baseline: &GlobalBaseline) -> f64 {
    baseline
        .clear_weather_severity
        .filter(|severity| *severity > 0.0)
        .unwrap_or(FALLBACK_SEVERITY_BASELINE)
}

fn clamp(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, MAX_SCORE)
    }
}

/// `min(100, nearby / 1000 * 100)`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn location_score(nearby_accidents: u64) -> f64 {
    clamp(nearby_accidents as f64 / LOCATION_SATURATION * MAX_SCORE)
}

/// `min(100, count / (2 * avg_hourly) * 100)`, or 0 without a baseline.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn temporal_score(hour_dow_accidents: u64, avg_hourly: f64) -> f64 {
    if avg_hourly <= 0.0 {
        return 0.0;
    }
    clamp(hour_dow_accidents as f64 / (avg_hourly * 2.0) * MAX_SCORE)
}

/// `(severity / clear - 1) * 200 + 50`, clamped to `[0, 100]`.
#[must_use]
pub fn weather_score(weather_severity: f64, clear_severity: f64) -> f64 {
    let clear = if clear_severity > 0.0 {
        clear_severity
    } else {
        FALLBACK_SEVERITY_BASELINE
    };
    clamp((weather_severity / clear - 1.0).mul_add(200.0, 50.0))
}

/// `100 - 10 * visibility` below 10 miles, otherwise 0.
#[must_use]
pub fn visibility_score(visibility_miles: f64) -> f64 {
    if visibility_miles < CLEAR_VISIBILITY_MILES {
        clamp(visibility_miles.mul_add(-10.0, MAX_SCORE))
    } else {
        0.0
    }
}

/// Raw signals for one scoring call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    /// Accidents in city groups centered near the point.
    pub nearby_accidents: u64,
    /// Accidents recorded at this hour and day of week.
    pub hour_dow_accidents: u64,
    /// Mean severity under the current weather, if any matched.
    pub weather_severity: Option<f64>,
    /// Current visibility in miles.
    pub visibility_miles: f64,
}

/// The four component scores.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Components {
    pub location: f64,
    pub temporal: f64,
    pub weather: f64,
    pub visibility: f64,
}

impl Components {
    /// Weighted sum.
    #[must_use]
    pub fn weighted(&self) -> f64 {
        self.location * LOCATION_WEIGHT
            + self.temporal * TEMPORAL_WEIGHT
            + self.weather * WEATHER_WEIGHT
            + self.visibility * VISIBILITY_WEIGHT
    }
}

/// Every output of the scorer, unrounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeScore {
    /// Weighted overall score in `[0, 100]`.
    pub overall: f64,
    /// Banded level.
    pub level: RiskLevel,
    /// Component scores.
    pub components: Components,
    /// Suggested speed change in mph.
    pub speed_adjustment_mph: i32,
    /// Suggested actions.
    pub actions: &'static [&'static str],
}

/// Level, speed adjustment, and actions for an overall score. Each band
/// includes its lower bound.
#[must_use]
pub fn band(overall: f64) -> (RiskLevel, i32, &'static [&'static str]) {
    let (_, level, speed_adjustment_mph, actions) = SCORE_BANDS
        .iter()
        .copied()
        .find(|(min, ..)| overall >= *min)
        .unwrap_or(SCORE_BANDS[SCORE_BANDS.len() - 1]);
    (level, speed_adjustment_mph, actions)
}

/// Scores a set of inputs against the store baseline.
#[must_use]
pub fn score(inputs: &ScoreInputs, baseline: &GlobalBaseline) -> CompositeScore {
    let clear = clear_baseline(baseline);
    let weather_severity = inputs.weather_severity.unwrap_or(clear);

    let components = Components {
        location: location_score(inputs.nearby_accidents),
        temporal: temporal_score(inputs.hour_dow_accidents, baseline.avg_hourly),
        weather: weather_score(weather_severity, clear),
        visibility: visibility_score(inputs.visibility_miles),
    };
    let overall = clamp(components.weighted());

    let (level, speed_adjustment_mph, actions) = band(overall);

    log::debug!("score: {components:?} -> {overall:.2} ({level})");

    CompositeScore {
        overall,
        level,
        components,
        speed_adjustment_mph,
        actions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASELINE: GlobalBaseline = GlobalBaseline {
        avg_hourly: 10.0,
        clear_weather_severity: Some(2.0),
    };

    #[test]
    fn weights_sum_to_one() {
        let sum = LOCATION_WEIGHT + TEMPORAL_WEIGHT + WEATHER_WEIGHT + VISIBILITY_WEIGHT;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn visibility_four_miles_scores_sixty() {
        assert!((visibility_score(4.0) - 60.0).abs() < 1e-9);
        assert!(visibility_score(10.0).abs() < f64::EPSILON);
        assert!(visibility_score(25.0).abs() < f64::EPSILON);
        assert!((visibility_score(0.0) - 100.0).abs() < f64::EPSILON);
        assert!((visibility_score(-3.0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn weather_score_floors_at_zero() {
        assert!(weather_score(1.0, 2.0).abs() < f64::EPSILON);
        assert!((weather_score(2.0, 2.0) - 50.0).abs() < 1e-9);
        assert!((weather_score(4.0, 2.0) - 100.0).abs() < f64::EPSILON);
        assert!((weather_score(2.0, 0.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn temporal_score_without_baseline_is_zero() {
        assert!(temporal_score(500, 0.0).abs() < f64::EPSILON);
        assert!((temporal_score(10, 10.0) - 50.0).abs() < 1e-9);
        assert!((temporal_score(1_000, 10.0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn composite_reproduces_component_arithmetic() {
        let result = score(
            &ScoreInputs {
                nearby_accidents: 500,
                hour_dow_accidents: 30,
                weather_severity: Some(2.5),
                visibility_miles: 4.0,
            },
            &BASELINE,
        );

        assert!((result.components.location - 50.0).abs() < 1e-9);
        assert!((result.components.temporal - 100.0).abs() < 1e-9);
        assert!((result.components.weather - 100.0).abs() < 1e-9);
        assert!((result.components.visibility - 60.0).abs() < 1e-9);

        let expected = 0.35 * 50.0 + 0.25 * 100.0 + 0.25 * 100.0 + 0.15 * 60.0;
        assert!((result.overall - expected).abs() < 1e-9);
        assert_eq!(result.level, RiskLevel::Critical);
        assert_eq!(result.speed_adjustment_mph, -15);
        assert_eq!(result.actions.len(), 4);
    }

    #[test]
    fn band_lower_bounds_are_inclusive() {
        let level_at = |visibility: f64| {
            // Only the visibility component is non-zero, and the unmatched
            // weather sits at 50, contributing 12.5.
            score(
                &ScoreInputs {
                    nearby_accidents: 0,
                    hour_dow_accidents: 0,
                    weather_severity: None,
                    visibility_miles: visibility,
                },
                &BASELINE,
            )
        };

        let low = level_at(10.0);
        assert!((low.overall - 12.5).abs() < 1e-9);
        assert_eq!(low.level, RiskLevel::Low);
        assert_eq!(low.actions.len(), 2);

        // 12.5 + 0.15 * 100 = 27.5
        assert_eq!(level_at(0.0).level, RiskLevel::Low);

        let cases = [
            (29.999, RiskLevel::Low, 0, 2),
            (30.0, RiskLevel::Moderate, -5, 2),
            (49.999, RiskLevel::Moderate, -5, 2),
            (50.0, RiskLevel::High, -10, 3),
            (69.999, RiskLevel::High, -10, 3),
            (70.0, RiskLevel::Critical, -15, 4),
            (100.0, RiskLevel::Critical, -15, 4),
            (0.0, RiskLevel::Low, 0, 2),
        ];
        for (overall, level, speed, actions) in cases {
            let (got_level, got_speed, got_actions) = band(overall);
            assert_eq!(got_level, level, "{overall}");
            assert_eq!(got_speed, speed, "{overall}");
            assert_eq!(got_actions.len(), actions, "{overall}");
        }
    }

    #[test]
    fn score_is_bounded() {
        for nearby in [0, 10, 1_000, 1_000_000] {
            for count in [0, 5, 50_000] {
                for severity in [None, Some(0.5), Some(4.0)] {
                    for visibility in [-5.0, 0.0, 3.3, 50.0] {
                        let result = score(
                            &ScoreInputs {
                                nearby_accidents: nearby,
                                hour_dow_accidents: count,
                                weather_severity: severity,
                                visibility_miles: visibility,
                            },
                            &BASELINE,
                        );
                        assert!((0.0..=100.0).contains(&result.overall));
                    }
                }
            }
        }
    }

    #[test]
    fn missing_clear_baseline_falls_back() {
        let baseline = GlobalBaseline {
            avg_hourly: 0.0,
            clear_weather_severity: None,
        };
        assert!((clear_baseline(&baseline) - FALLBACK_SEVERITY_BASELINE).abs() < f64::EPSILON);
        let result = score(
            &ScoreInputs {
                nearby_accidents: 0,
                hour_dow_accidents: 100,
                weather_severity: Some(3.0),
                visibility_miles: 10.0,
            },
            &baseline,
        );
        assert!(result.components.temporal.abs() < f64::EPSILON);
        assert!((result.components.weather - 100.0).abs() < 1e-9);
    }
}
