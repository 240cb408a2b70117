//! Geographic utilities: great-circle distance, radius predicates, bearings,
//! arc-length sampling, and encoded-polyline decoding.
//!
//! Distances use the haversine formula with a fixed Earth radius so results
//! are reproducible across modules and tests.

use geo::LineString;

use crate::error::{Result, RouteDrillError};
use crate::GeoPoint;

/// Mean Earth radius in meters used by every distance computation.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates in meters.
///
/// `haversine_distance(a, a)` is exactly 0 and the function is symmetric.
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    EARTH_RADIUS_M * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Whether `b` lies within `radius_m` meters of `a`.
///
/// The comparison is inclusive: a point at exactly `radius_m` counts as
/// inside. Every proximity decision in the crate goes through this predicate
/// so the convention is applied consistently.
pub fn within_radius(a: &GeoPoint, b: &GeoPoint, radius_m: f64) -> bool {
    haversine_distance(a, b) <= radius_m
}

/// Initial (forward-azimuth) bearing from `a` toward `b`, in degrees
/// normalized to [0, 360).
pub fn initial_bearing(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Total length of a path in meters (sum of consecutive segment distances).
pub fn path_distance(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_distance(&pair[0], &pair[1]))
        .sum()
}

/// Sample a path at fixed arc-length spacing.
///
/// Walks the path accumulating haversine distance and emits the current
/// vertex (resetting the accumulator) each time the accumulated distance
/// reaches `spacing_m`. The first raw point is always emitted. For a path of
/// length `L` this yields about `L / spacing_m + 1` samples.
pub fn sample_path_by_spacing(points: &[GeoPoint], spacing_m: f64) -> Vec<GeoPoint> {
    let mut samples = Vec::new();
    let Some(first) = points.first() else {
        return samples;
    };
    samples.push(*first);

    let mut accumulated = 0.0;
    for pair in points.windows(2) {
        accumulated += haversine_distance(&pair[0], &pair[1]);
        if accumulated >= spacing_m {
            samples.push(pair[1]);
            accumulated = 0.0;
        }
    }

    samples
}

/// Decode an encoded polyline (precision 5) into an ordered coordinate
/// sequence.
///
/// The codec itself is external; this wrapper only converts the decoded
/// line string's `(x, y)` = `(lng, lat)` coordinates into [`GeoPoint`]s.
pub fn decode_route_path(encoded: &str) -> Result<Vec<GeoPoint>> {
    if encoded.is_empty() {
        return Ok(Vec::new());
    }

    let line: LineString<f64> =
        polyline::decode_polyline(encoded, 5).map_err(|e| RouteDrillError::PolylineDecode {
            reason: e.to_string(),
        })?;

    Ok(line.0.iter().map(|c| GeoPoint::new(c.y, c.x)).collect())
}
