//! Tests for proximity module

use routedrill::proximity::*;
use routedrill::{Annotation, AnnotationKind, GeoPoint, RoadSegment, VillaStreet};

/// Degrees of latitude per meter, for building test geometry.
const DEG_PER_M: f64 = 1.0 / 111_320.0;

fn junction(id: u64, lat: f64, lng: f64) -> Annotation {
    Annotation::new(id, lat, lng, AnnotationKind::PriorityToRight)
}

#[test]
fn test_filter_annotations_by_radius() {
    let anchor = vec![GeoPoint::new(0.0, 0.0)];
    let candidates = vec![
        junction(1, 50.0 * DEG_PER_M, 0.0),
        junction(2, 150.0 * DEG_PER_M, 0.0),
    ];

    let matched = filter_annotations_near(&candidates, &anchor, 100.0);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].id, 1);
}

#[test]
fn test_filter_annotations_any_anchor_matches() {
    let anchors = vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.01, 0.0)];
    // Near the second anchor only
    let candidates = vec![junction(1, 0.01 + 30.0 * DEG_PER_M, 0.0)];

    let matched = filter_annotations_near(&candidates, &anchors, 100.0);
    assert_eq!(matched.len(), 1);
}

#[test]
fn test_filter_annotations_preserves_order() {
    let anchor = vec![GeoPoint::new(0.0, 0.0)];
    let candidates = vec![
        junction(3, 10.0 * DEG_PER_M, 0.0),
        junction(1, 20.0 * DEG_PER_M, 0.0),
        junction(2, 30.0 * DEG_PER_M, 0.0),
    ];

    let matched = filter_annotations_near(&candidates, &anchor, 100.0);
    let ids: Vec<u64> = matched.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![3, 1, 2]);
}

#[test]
fn test_filter_annotations_empty_anchors() {
    let candidates = vec![junction(1, 0.0, 0.0)];
    assert!(filter_annotations_near(&candidates, &[], 100.0).is_empty());
}

#[test]
fn test_filter_roads_existential_vertex_match() {
    let anchor = vec![GeoPoint::new(0.0, 0.0)];

    // First road: one far vertex, one near vertex. Second road: all far.
    let near_road = RoadSegment {
        id: 1,
        name: "Near".to_string(),
        max_speed: "50".to_string(),
        category: "residential".to_string(),
        geometry: vec![
            GeoPoint::new(0.05, 0.05),
            GeoPoint::new(40.0 * DEG_PER_M, 0.0),
        ],
    };
    let far_road = RoadSegment {
        id: 2,
        name: "Far".to_string(),
        max_speed: "50".to_string(),
        category: "residential".to_string(),
        geometry: vec![GeoPoint::new(0.05, 0.05), GeoPoint::new(0.06, 0.06)],
    };

    let roads = [near_road, far_road];
    let matched = filter_roads_near(&roads, &anchor, 100.0);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].id, 1);
}

#[test]
fn test_dedupe_by_grid_keeps_first_per_cell() {
    // Two signs ~20m apart share a 100m cell; a third sits far away
    let a = junction(1, 10.0 * DEG_PER_M, 0.0);
    let b = junction(2, 30.0 * DEG_PER_M, 0.0);
    let c = junction(3, 0.05, 0.05);

    let refs = vec![&a, &b, &c];
    let deduped = dedupe_by_grid(&refs, SIGN_DEDUPE_CELL_M);

    let ids: Vec<u64> = deduped.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn test_dedupe_by_grid_is_order_dependent() {
    let a = junction(1, 10.0 * DEG_PER_M, 0.0);
    let b = junction(2, 30.0 * DEG_PER_M, 0.0);

    let forward = dedupe_by_grid(&[&a, &b], SIGN_DEDUPE_CELL_M);
    let reverse = dedupe_by_grid(&[&b, &a], SIGN_DEDUPE_CELL_M);

    assert_eq!(forward[0].id, 1);
    assert_eq!(reverse[0].id, 2);
}

fn villa(id: u64, name: &str, lat: f64, lng: f64) -> VillaStreet {
    VillaStreet {
        id,
        name: name.to_string(),
        lat,
        lng,
        category: "residential".to_string(),
        geometry: vec![],
    }
}

#[test]
fn test_street_index_nearest_within_radius() {
    let index = StreetIndex::build(vec![
        villa(1, "Close Street", 55.6300, 12.6372),
        villa(2, "Far Street", 55.6500, 12.6372),
    ]);

    let junction_pos = GeoPoint::new(55.6295, 12.6372);
    let nearest = index.nearest_within(&junction_pos, NEARBY_STREET_RADIUS_M);
    assert_eq!(nearest.unwrap().name, "Close Street");
}

#[test]
fn test_street_index_respects_cutoff() {
    // Only street is ~1.1km away, beyond the 500m cutoff
    let index = StreetIndex::build(vec![villa(1, "Distant", 55.6395, 12.6372)]);

    let junction_pos = GeoPoint::new(55.6295, 12.6372);
    assert!(index.nearest_within(&junction_pos, NEARBY_STREET_RADIUS_M).is_none());
    assert!(index.describe_junction(&junction_pos).is_none());
}

#[test]
fn test_street_index_skips_unnamed_streets() {
    let index = StreetIndex::build(vec![
        villa(1, "", 55.6296, 12.6372),
        villa(2, "Named Street", 55.6300, 12.6372),
    ]);

    assert_eq!(index.len(), 1);
    let junction_pos = GeoPoint::new(55.6295, 12.6372);
    let nearest = index.nearest_within(&junction_pos, NEARBY_STREET_RADIUS_M);
    assert_eq!(nearest.unwrap().name, "Named Street");
}

#[test]
fn test_describe_junction_reports_distances() {
    let index = StreetIndex::build(vec![villa(1, "Villavej", 55.6300, 12.6372)]);

    let junction_pos = GeoPoint::new(55.6295, 12.6372);
    let info = index.describe_junction(&junction_pos).unwrap();

    assert_eq!(info.street_name, "Villavej");
    assert!(info.distance_m > 0.0 && info.distance_m < NEARBY_STREET_RADIUS_M);
    assert!(info.junction_from_start_m > 0.0);
}
