//! Tests for geo_utils module

use routedrill::geo_utils::*;
use routedrill::GeoPoint;

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

#[test]
fn test_haversine_distance_same_point() {
    let p = GeoPoint::new(55.6295, 12.6372);
    assert_eq!(haversine_distance(&p, &p), 0.0);
}

#[test]
fn test_haversine_distance_symmetric() {
    let a = GeoPoint::new(55.6295, 12.6372);
    let b = GeoPoint::new(55.634464, 12.650135);
    assert_eq!(haversine_distance(&a, &b), haversine_distance(&b, &a));
}

#[test]
fn test_haversine_distance_known_value() {
    // London to Paris is approximately 344 km
    let london = GeoPoint::new(51.5074, -0.1278);
    let paris = GeoPoint::new(48.8566, 2.3522);
    let dist = haversine_distance(&london, &paris);
    assert!(approx_eq(dist, 343_560.0, 5000.0)); // Within 5km
}

#[test]
fn test_within_radius_inside_and_outside() {
    let anchor = GeoPoint::new(0.0, 0.0);
    // ~50m and ~150m north of the anchor
    let near = GeoPoint::new(50.0 / 111_320.0, 0.0);
    let far = GeoPoint::new(150.0 / 111_320.0, 0.0);

    assert!(within_radius(&anchor, &near, 100.0));
    assert!(!within_radius(&anchor, &far, 100.0));
}

#[test]
fn test_within_radius_is_inclusive() {
    let a = GeoPoint::new(55.6295, 12.6372);
    let b = GeoPoint::new(55.6310, 12.6372);
    let exact = haversine_distance(&a, &b);
    assert!(within_radius(&a, &b, exact));
}

#[test]
fn test_initial_bearing_cardinal_directions() {
    let origin = GeoPoint::new(0.0, 0.0);
    let north = GeoPoint::new(1.0, 0.0);
    let east = GeoPoint::new(0.0, 1.0);
    let south = GeoPoint::new(-1.0, 0.0);
    let west = GeoPoint::new(0.0, -1.0);

    assert!(approx_eq(initial_bearing(&origin, &north), 0.0, 0.1));
    assert!(approx_eq(initial_bearing(&origin, &east), 90.0, 0.1));
    assert!(approx_eq(initial_bearing(&origin, &south), 180.0, 0.1));
    assert!(approx_eq(initial_bearing(&origin, &west), 270.0, 0.1));
}

#[test]
fn test_initial_bearing_normalized() {
    let a = GeoPoint::new(55.63, 12.64);
    let b = GeoPoint::new(55.62, 12.63);
    let bearing = initial_bearing(&a, &b);
    assert!((0.0..360.0).contains(&bearing));
}

#[test]
fn test_path_distance_sums_segments() {
    // Three points, each ~111m apart along a meridian
    let step = 111.32 / 111_320.0;
    let path = vec![
        GeoPoint::new(0.0, 0.0),
        GeoPoint::new(step, 0.0),
        GeoPoint::new(2.0 * step, 0.0),
    ];
    assert!(approx_eq(path_distance(&path), 222.64, 1.0));
}

#[test]
fn test_path_distance_trivial() {
    assert_eq!(path_distance(&[]), 0.0);
    assert_eq!(path_distance(&[GeoPoint::new(1.0, 1.0)]), 0.0);
}

#[test]
fn test_sample_path_spacing_count() {
    // A dense path, vertices ~1m apart, ~300m total, sampled at 30m
    let step = 1.0 / 111_320.0;
    let path: Vec<GeoPoint> = (0..300)
        .map(|i| GeoPoint::new(i as f64 * step, 0.0))
        .collect();

    let length = path_distance(&path);
    let samples = sample_path_by_spacing(&path, 30.0);

    let expected = (length / 30.0).ceil() as usize;
    assert!(samples.len() >= expected.saturating_sub(1));
    assert!(samples.len() <= expected + 1);
    assert_eq!(samples[0], path[0]);
}

#[test]
fn test_sample_path_emits_every_vertex_when_segments_exceed_spacing() {
    // Vertices ~40m apart, sampled at 30m: every vertex crosses the
    // threshold
    let step = 40.0 / 111_320.0;
    let path: Vec<GeoPoint> = (0..10)
        .map(|i| GeoPoint::new(i as f64 * step, 0.0))
        .collect();

    let samples = sample_path_by_spacing(&path, 30.0);
    assert_eq!(samples.len(), path.len());
}

#[test]
fn test_sample_path_degenerate_inputs() {
    assert!(sample_path_by_spacing(&[], 30.0).is_empty());

    let single = vec![GeoPoint::new(55.63, 12.64)];
    assert_eq!(sample_path_by_spacing(&single, 30.0), single);
}

#[test]
fn test_decode_route_path_known_polyline() {
    // Reference polyline for (38.5, -120.2), (40.7, -120.95), (43.252, -126.453)
    let decoded = decode_route_path("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
    assert_eq!(decoded.len(), 3);
    assert!((decoded[0].lat - 38.5).abs() < 1e-5);
    assert!((decoded[0].lng - -120.2).abs() < 1e-5);
    assert!((decoded[2].lat - 43.252).abs() < 1e-5);
}

#[test]
fn test_decode_route_path_empty() {
    assert!(decode_route_path("").unwrap().is_empty());
}
