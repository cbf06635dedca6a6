#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spatial windowing for accident lookups.
//!
//! Converts a center point and radius into a latitude/longitude bounding
//! box with a flat-earth approximation, and splits a multi-point route
//! into padded per-segment boxes. Good for regional queries (tens of
//! miles); not meant for anything near the poles.

use accident_risk_database_models::{BoundingBox, Waypoint};
use geo::{BoundingRect, Coord, Line};

/// Approximate miles per degree of latitude.
pub const MILES_PER_DEGREE: f64 = 69.0;

/// Degrees added on every side of a route segment's endpoints.
pub const SEGMENT_PAD_DEGREES: f64 = 0.05;

/// Above this latitude magnitude the longitude span is clamped.
pub const MAX_PROJECTED_LATITUDE: f64 = 89.0;

/// Longitude half-span used once the projection degenerates.
pub const MAX_LNG_RANGE: f64 = 180.0;

/// Errors produced while building spatial windows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpatialError {
    /// A route needs at least two waypoints to form a segment.
    #[error("At least 2 waypoints required for route analysis")]
    TooFewWaypoints {
        /// Number of waypoints supplied.
        count: usize,
    },
}

/// One leg of a route, between consecutive waypoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSegment {
    /// 1-based position along the route.
    pub index: usize,
    /// Start waypoint.
    pub from: Waypoint,
    /// End waypoint.
    pub to: Waypoint,
    /// Padded box covering both endpoints.
    pub bbox: BoundingBox,
}

/// Builds the bounding box covering `radius_miles` around a point.
///
/// `lat_range = r / 69`, `lng_range = r / (69 * |cos(lat)|)`. When
/// `|lat| > 89` or the cosine vanishes, the longitude half-span is clamped
/// to 180 degrees. Negative radii are treated as zero.
#[must_use]
pub fn bounding_box_around(lat: f64, lng: f64, radius_miles: f64) -> BoundingBox {
    let radius = radius_miles.max(0.0);
    let lat_range = radius / MILES_PER_DEGREE;

    let cos_lat = lat.to_radians().cos().abs();
    let lng_range = if lat.abs() > MAX_PROJECTED_LATITUDE || cos_lat < f64::EPSILON {
        MAX_LNG_RANGE
    } else {
        (radius / (MILES_PER_DEGREE * cos_lat)).min(MAX_LNG_RANGE)
    };

    box_with_ranges(lat, lng, lat_range, lng_range)
}

/// Builds a box extending `lat_range` / `lng_range` degrees either side of
/// a point.
#[must_use]
pub fn box_with_ranges(lat: f64, lng: f64, lat_range: f64, lng_range: f64) -> BoundingBox {
    BoundingBox::new(
        lng - lng_range,
        lat - lat_range,
        lng + lng_range,
        lat + lat_range,
    )
}

/// Splits a route into `N - 1` segments, each covering its two endpoints
/// padded by [`SEGMENT_PAD_DEGREES`].
///
/// # Errors
///
/// Returns [`SpatialError::TooFewWaypoints`] for fewer than two waypoints.
pub fn route_segments(waypoints: &[Waypoint]) -> Result<Vec<RouteSegment>, SpatialError> {
    if waypoints.len() < 2 {
        return Err(SpatialError::TooFewWaypoints {
            count: waypoints.len(),
        });
    }

    Ok(waypoints
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let (from, to) = (pair[0], pair[1]);
            RouteSegment {
                index: i + 1,
                from,
                to,
                bbox: segment_box(from, to),
            }
        })
        .collect())
}

fn segment_box(from: Waypoint, to: Waypoint) -> BoundingBox {
    let line = Line::new(
        Coord {
            x: from.lng,
            y: from.lat,
        },
        Coord { x: to.lng, y: to.lat },
    );
    let rect = line.bounding_rect();

    BoundingBox::new(
        rect.min().x - SEGMENT_PAD_DEGREES,
        rect.min().y - SEGMENT_PAD_DEGREES,
        rect.max().x + SEGMENT_PAD_DEGREES,
        rect.max().y + SEGMENT_PAD_DEGREES,
    )
}

#[cfg(test)]
mod tests {
    use geo::{Intersects, Point, Rect};

    use super::*;

    const EPS: f64 = 1e-9;

    fn contains(bbox: &BoundingBox, lat: f64, lng: f64) -> bool {
        let rect = Rect::new(
            Coord {
                x: bbox.west,
                y: bbox.south,
            },
            Coord {
                x: bbox.east,
                y: bbox.north,
            },
        );
        rect.intersects(&Point::new(lng, lat))
    }

    #[test]
    fn radius_box_contains_center_with_expected_height() {
        for &(lat, lng, r) in &[
            (30.27, -97.74, 5.0),
            (47.6, -122.3, 25.0),
            (-33.9, 151.2, 0.5),
            (0.0, 0.0, 10.0),
            (88.9, 10.0, 3.0),
        ] {
            let bbox = bounding_box_around(lat, lng, r);
            assert!(contains(&bbox, lat, lng), "center outside box at {lat},{lng}");
            assert!((bbox.height() - 2.0 * r / MILES_PER_DEGREE).abs() < EPS);
        }
    }

    #[test]
    fn longitude_span_widens_with_latitude() {
        let equator = bounding_box_around(0.0, 0.0, 10.0);
        let north = bounding_box_around(60.0, 0.0, 10.0);
        assert!((equator.width() - equator.height()).abs() < EPS);
        // cos(60) = 0.5
        assert!((north.width() - 2.0 * equator.width()).abs() < 1e-6);
    }

    #[test]
    fn polar_latitude_clamps_longitude() {
        let bbox = bounding_box_around(89.5, 20.0, 5.0);
        assert!((bbox.west - (20.0 - MAX_LNG_RANGE)).abs() < EPS);
        assert!((bbox.east - (20.0 + MAX_LNG_RANGE)).abs() < EPS);

        let pole = bounding_box_around(90.0, 0.0, 5.0);
        assert!(pole.width().is_finite());
    }

    #[test]
    fn route_of_three_points_has_two_segments() {
        let waypoints = [
            Waypoint::new(30.0, -97.0),
            Waypoint::new(30.5, -97.5),
            Waypoint::new(31.0, -97.2),
        ];
        let segments = route_segments(&waypoints).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].index, 1);
        assert_eq!(segments[1].index, 2);
        assert_eq!(segments[1].from, waypoints[1]);

        let first = segments[0].bbox;
        assert!((first.south - 29.95).abs() < EPS);
        assert!((first.north - 30.55).abs() < EPS);
        assert!((first.west - (-97.55)).abs() < EPS);
        assert!((first.east - (-96.95)).abs() < EPS);
    }

    #[test]
    fn fewer_than_two_waypoints_is_rejected() {
        assert_eq!(
            route_segments(&[]).unwrap_err(),
            SpatialError::TooFewWaypoints { count: 0 }
        );
        let err = route_segments(&[Waypoint::new(1.0, 1.0)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "At least 2 waypoints required for route analysis"
        );
    }

    #[test]
    fn containment_includes_edges() {
        let bbox = BoundingBox::new(-1.0, -1.0, 1.0, 1.0);
        assert!(contains(&bbox, 1.0, -1.0));
        assert!(!contains(&bbox, 1.0001, 0.0));
    }
}
