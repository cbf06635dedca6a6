//! Threshold tables for the four risk classifiers.
//!
//! Each table is an ordered list of bands checked top to bottom; the first
//! band whose rule matches decides the level and recommendation, and the
//! `otherwise` entry applies when none does.

use accident_risk_accident_models::RiskLevel;
use accident_risk_database_models::SegmentStats;

/// A predicate over a classifier's input.
pub trait Rule {
    /// What the rule inspects.
    type Input: ?Sized;

    /// Whether `input` falls into this band.
    fn matches(&self, input: &Self::Input) -> bool;
}

/// One row of a threshold table.
#[derive(Debug, Clone, Copy)]
pub struct Band<R> {
    /// Condition for this band.
    pub rule: R,
    /// Level assigned when the rule matches.
    pub level: RiskLevel,
    /// Recommendation text. May contain a `{feature}` placeholder.
    pub recommendation: &'static str,
}

/// An ordered set of bands with a catch-all.
#[derive(Debug, Clone, Copy)]
pub struct Table<R: 'static> {
    /// Bands, most severe first.
    pub bands: &'static [Band<R>],
    /// Level and recommendation when no band matches.
    pub otherwise: (RiskLevel, &'static str),
}

/// Result of running a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Assigned level.
    pub level: RiskLevel,
    /// Recommendation template.
    pub recommendation: &'static str,
}

impl Classification {
    /// Recommendation with `{feature}` replaced.
    #[must_use]
    pub fn recommendation_for(&self, feature: &str) -> String {
        self.recommendation.replace("{feature}", feature)
    }
}

impl<R: Rule> Table<R> {
    /// Returns the first matching band, or the catch-all.
    #[must_use]
    pub fn classify(&self, input: &R::Input) -> Classification {
        self.bands
            .iter()
            .find(|band| band.rule.matches(input))
            .map_or(
                Classification {
                    level: self.otherwise.0,
                    recommendation: self.otherwise.1,
                },
                |band| Classification {
                    level: band.level,
                    recommendation: band.recommendation,
                },
            )
    }
}

/// A count compared against a baseline rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rate {
    /// Observed count.
    pub count: f64,
    /// Expected count.
    pub baseline: f64,
}

/// Matches when `count > factor * baseline`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateRule {
    /// Multiple of the baseline that must be exceeded.
    pub factor: f64,
}

impl Rule for RateRule {
    type Input = Rate;

    fn matches(&self, input: &Rate) -> bool {
        input.count > self.factor * input.baseline
    }
}

/// Matches when a value is strictly greater than the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Above(pub f64);

impl Rule for Above {
    type Input = f64;

    fn matches(&self, input: &f64) -> bool {
        *input > self.0
    }
}

/// Matches on a segment's count and mean severity, combined with `AND`
/// or, when `any` is set, with `OR`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentRule {
    /// Count that must be exceeded.
    pub count: u64,
    /// Mean severity that must be exceeded.
    pub severity: f64,
    /// Whether either condition suffices.
    pub any: bool,
}

impl Rule for SegmentRule {
    type Input = SegmentStats;

    fn matches(&self, input: &SegmentStats) -> bool {
        let busy = input.accident_count > self.count;
        let severe = input.avg_severity > self.severity;
        if self.any { busy || severe } else { busy && severe }
    }
}

/// Whole-route totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteTotals {
    /// Highest severity over all segments.
    pub max_severity: u8,
    /// Sum of segment counts.
    pub total: u64,
}

/// Matches when `max_severity >= severity` or `total > total_above`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRule {
    /// Severity reached by at least one segment.
    pub severity: u8,
    /// Total count that must be exceeded.
    pub total_above: u64,
}

impl Rule for RouteRule {
    type Input = RouteTotals;

    fn matches(&self, input: &RouteTotals) -> bool {
        input.max_severity >= self.severity || input.total > self.total_above
    }
}

/// Hour/day count against the global hourly average.
pub const TEMPORAL: Table<RateRule> = Table {
    bands: &[
        Band {
            rule: RateRule { factor: 1.5 },
            level: RiskLevel::High,
            recommendation: "Exercise extreme caution. Reduce speed and increase following distance.",
        },
        Band {
            rule: RateRule { factor: 1.0 },
            level: RiskLevel::Moderate,
            recommendation: "Be alert. This is a higher-than-average risk period.",
        },
    ],
    otherwise: (RiskLevel::Low, "Normal driving conditions expected."),
};

/// Weather severity relative to the clear-weather baseline.
pub const WEATHER: Table<Above> = Table {
    bands: &[
        Band {
            rule: Above(1.3),
            level: RiskLevel::High,
            recommendation: "Hazardous conditions. Significantly reduce speed and increase following distance.",
        },
        Band {
            rule: Above(1.1),
            level: RiskLevel::Moderate,
            recommendation: "Exercise caution. Weather conditions increase accident risk.",
        },
    ],
    otherwise: (
        RiskLevel::Low,
        "Normal risk level for current weather conditions.",
    ),
};

/// Percent severity increase near a road feature.
pub const ROAD_FEATURE: Table<Above> = Table {
    bands: &[
        Band {
            rule: Above(10.0),
            level: RiskLevel::High,
            recommendation: "Extra caution needed near {feature}. Significantly higher accident severity.",
        },
        Band {
            rule: Above(5.0),
            level: RiskLevel::Moderate,
            recommendation: "Be alert near {feature}. Slightly elevated accident risk.",
        },
    ],
    otherwise: (RiskLevel::Low, "Normal risk level near {feature}."),
};

/// Per-segment history.
pub const SEGMENT: Table<SegmentRule> = Table {
    bands: &[
        Band {
            rule: SegmentRule {
                count: 100,
                severity: 2.5,
                any: false,
            },
            level: RiskLevel::High,
            recommendation: "",
        },
        Band {
            rule: SegmentRule {
                count: 50,
                severity: 2.3,
                any: true,
            },
            level: RiskLevel::Moderate,
            recommendation: "",
        },
    ],
    otherwise: (RiskLevel::Low, ""),
};

/// Whole-route verdict.
pub const ROUTE: Table<RouteRule> = Table {
    bands: &[
        Band {
            rule: RouteRule {
                severity: 4,
                total_above: 500,
            },
            level: RiskLevel::High,
            recommendation: "High-risk route. Consider alternative routes or extra precautions.",
        },
        Band {
            rule: RouteRule {
                severity: 3,
                total_above: 200,
            },
            level: RiskLevel::Moderate,
            recommendation: "Moderate risk route. Stay alert, especially in identified segments.",
        },
    ],
    otherwise: (
        RiskLevel::Low,
        "Relatively safe route based on historical data.",
    ),
};

/// Ratio of a weather condition's mean severity to the clear baseline.
#[must_use]
pub fn weather_multiplier(avg_severity: f64, clear_baseline: f64) -> f64 {
    if clear_baseline > 0.0 {
        avg_severity / clear_baseline
    } else {
        1.0
    }
}

/// Percent by which severity with a feature exceeds severity without it.
/// Zero when there is nothing to compare against.
#[must_use]
pub fn severity_increase_percent(with_feature: f64, without_feature: f64) -> f64 {
    if without_feature > 0.0 {
        (with_feature / without_feature - 1.0) * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temporal_bands_are_strict() {
        let at = |count: f64| TEMPORAL.classify(&Rate { count, baseline: 10.0 }).level;
        assert_eq!(at(15.0), RiskLevel::Moderate);
        assert_eq!(at(15.1), RiskLevel::High);
        assert_eq!(at(10.0), RiskLevel::Low);
        assert_eq!(at(10.5), RiskLevel::Moderate);
    }

    #[test]
    fn temporal_is_monotone_in_count() {
        let mut previous = RiskLevel::Low;
        for count in 0..100 {
            let level = TEMPORAL
                .classify(&Rate {
                    count: f64::from(count),
                    baseline: 20.0,
                })
                .level;
            assert!(level >= previous, "level dropped at count {count}");
            previous = level;
        }
        assert_eq!(previous, RiskLevel::High);
    }

    #[test]
    fn zero_data_is_low_everywhere() {
        assert_eq!(
            TEMPORAL.classify(&Rate { count: 0.0, baseline: 0.0 }).level,
            RiskLevel::Low
        );
        assert_eq!(WEATHER.classify(&0.0).level, RiskLevel::Low);
        assert_eq!(ROAD_FEATURE.classify(&0.0).level, RiskLevel::Low);
        assert_eq!(SEGMENT.classify(&SegmentStats::default()).level, RiskLevel::Low);
        assert_eq!(ROUTE.classify(&RouteTotals::default()).level, RiskLevel::Low);
    }

    #[test]
    fn weather_multiplier_bands() {
        assert_eq!(WEATHER.classify(&1.31).level, RiskLevel::High);
        assert_eq!(WEATHER.classify(&1.3).level, RiskLevel::Moderate);
        assert_eq!(WEATHER.classify(&1.1).level, RiskLevel::Low);
        assert!((weather_multiplier(3.0, 2.0) - 1.5).abs() < f64::EPSILON);
        assert!((weather_multiplier(3.0, 0.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn feature_recommendation_names_the_feature() {
        let c = ROAD_FEATURE.classify(&12.0);
        assert_eq!(c.level, RiskLevel::High);
        assert_eq!(
            c.recommendation_for("junction"),
            "Extra caution needed near junction. Significantly higher accident severity."
        );
        assert_eq!(
            ROAD_FEATURE.classify(&5.0).recommendation_for("stop"),
            "Normal risk level near stop."
        );
    }

    #[test]
    fn severity_increase_guards_zero() {
        assert!((severity_increase_percent(2.2, 2.0) - 10.0).abs() < 1e-9);
        assert!(severity_increase_percent(2.2, 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn segment_high_needs_both_conditions() {
        let stats = |accident_count, avg_severity| SegmentStats {
            accident_count,
            avg_severity,
            max_severity: 4,
        };
        assert_eq!(SEGMENT.classify(&stats(101, 2.6)).level, RiskLevel::High);
        assert_eq!(SEGMENT.classify(&stats(101, 2.0)).level, RiskLevel::Moderate);
        assert_eq!(SEGMENT.classify(&stats(10, 2.4)).level, RiskLevel::Moderate);
        assert_eq!(SEGMENT.classify(&stats(50, 2.3)).level, RiskLevel::Low);
    }

    #[test]
    fn route_uses_max_severity_or_total() {
        let totals = |max_severity, total| RouteTotals { max_severity, total };
        assert_eq!(ROUTE.classify(&totals(4, 0)).level, RiskLevel::High);
        assert_eq!(ROUTE.classify(&totals(2, 501)).level, RiskLevel::High);
        assert_eq!(ROUTE.classify(&totals(3, 0)).level, RiskLevel::Moderate);
        assert_eq!(ROUTE.classify(&totals(2, 201)).level, RiskLevel::Moderate);
        assert_eq!(ROUTE.classify(&totals(2, 200)).level, RiskLevel::Low);
    }
}
