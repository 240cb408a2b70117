//! Proximity matching between annotation collections and route geometry.
//!
//! Filters are existential and order-preserving: a candidate matches when it
//! (or, for roads, any of its vertices) lies within the radius of any anchor
//! point. Input sizes are metro-scale (low thousands of points), so linear
//! scans are sufficient; the one nearest-neighbor query (villa street lookup)
//! uses an R-tree.
//!
//! Radii are deliberately per-feature-type constants rather than a single
//! unified threshold: route-wide queries use wide radii to tolerate drift
//! between route and annotation sources, step-local queries use tight ones.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::geo_utils::{haversine_distance, within_radius};
use crate::steps::RouteStep;
use crate::{Annotation, GeoPoint, RoadSegment, VillaStreet, TRAINER_START};

/// Meters per degree of latitude, for degree-space approximations.
const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Route-wide radius for intersection annotations.
pub const ROUTE_INTERSECTION_RADIUS_M: f64 = 150.0;

/// Route-wide radius for speed-limit roads (widest, the road geometry and
/// the generated route come from different sources).
pub const ROUTE_SPEED_ROAD_RADIUS_M: f64 = 200.0;

/// Step-local radius for intersection annotations.
pub const STEP_INTERSECTION_RADIUS_M: f64 = 60.0;

/// Step-local radius for speed signage.
pub const STEP_SPEED_SIGN_RADIUS_M: f64 = 80.0;

/// Step-local radius for pedestrian crossings.
pub const STEP_CROSSING_RADIUS_M: f64 = 40.0;

/// Grid cell size for clustering near-duplicate signs.
pub const SIGN_DEDUPE_CELL_M: f64 = 100.0;

/// Cutoff for naming the villa street closest to a junction.
pub const NEARBY_STREET_RADIUS_M: f64 = 500.0;

/// Keep the annotations lying within `radius_m` of any anchor point.
///
/// Input order is preserved.
pub fn filter_annotations_near<'a>(
    candidates: &'a [Annotation],
    anchors: &[GeoPoint],
    radius_m: f64,
) -> Vec<&'a Annotation> {
    candidates
        .iter()
        .filter(|a| {
            let pos = a.position();
            anchors.iter().any(|anchor| within_radius(anchor, &pos, radius_m))
        })
        .collect()
}

/// Keep the annotations relevant to a single step.
///
/// A step's anchors are its start and end coordinates (whichever are
/// present); matching is a logical OR over them.
pub fn annotations_near_step<'a>(
    candidates: &'a [Annotation],
    step: &RouteStep,
    radius_m: f64,
) -> Vec<&'a Annotation> {
    let anchors = step.anchors();
    filter_annotations_near(candidates, &anchors, radius_m)
}

/// Keep the road segments with any vertex within `radius_m` of any anchor.
///
/// Existential vertex matching, not path-to-path distance; acceptable at the
/// bounded input sizes this crate deals with. Input order is preserved.
pub fn filter_roads_near<'a>(
    roads: &'a [RoadSegment],
    anchors: &[GeoPoint],
    radius_m: f64,
) -> Vec<&'a RoadSegment> {
    roads
        .iter()
        .filter(|road| {
            road.geometry.iter().any(|vertex| {
                anchors
                    .iter()
                    .any(|anchor| within_radius(anchor, vertex, radius_m))
            })
        })
        .collect()
}

/// Bucket annotations onto a fixed grid and keep the first-seen occurrence
/// per cell.
///
/// Deterministic and order-dependent; not true spatial clustering. Good
/// enough to collapse a run of speed signs posted meters apart into one
/// marker.
pub fn dedupe_by_grid<'a>(annotations: &[&'a Annotation], cell_m: f64) -> Vec<&'a Annotation> {
    let mut occupied = std::collections::HashSet::new();
    let mut kept = Vec::new();

    for annotation in annotations {
        let cell = grid_cell(&annotation.position(), cell_m);
        if occupied.insert(cell) {
            kept.push(*annotation);
        }
    }

    kept
}

/// Cell index of a coordinate on a fixed grid of roughly `cell_m`-sized
/// cells; longitude cells widen with latitude.
fn grid_cell(p: &GeoPoint, cell_m: f64) -> (i64, i64) {
    let lat_cell_deg = cell_m / METERS_PER_DEGREE_LAT;
    let lng_cell_deg = lat_cell_deg / p.lat.to_radians().cos().abs().max(0.01);
    (
        (p.lat / lat_cell_deg).floor() as i64,
        (p.lng / lng_cell_deg).floor() as i64,
    )
}

// ============================================================================
// Villa street lookup
// ============================================================================

/// A villa street entry with its index for R-tree queries.
#[derive(Debug, Clone, Copy)]
struct IndexedStreet {
    idx: usize,
    lat: f64,
    lng: f64,
}

impl RTreeObject for IndexedStreet {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lat, self.lng])
    }
}

impl PointDistance for IndexedStreet {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.lat - point[0];
        let dlng = self.lng - point[1];
        dlat * dlat + dlng * dlng
    }
}

/// Context shown for a trainer junction: the nearest named villa street and
/// how far the junction sits from the examination start.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyStreetInfo {
    pub street_name: String,
    /// Junction-to-street distance in meters.
    pub distance_m: f64,
    /// Junction-to-exam-start distance in meters.
    pub junction_from_start_m: f64,
}

/// R-tree over villa streets answering "nearest named street" queries.
///
/// Built once per session from the fetched street collection.
#[derive(Debug)]
pub struct StreetIndex {
    tree: RTree<IndexedStreet>,
    streets: Vec<VillaStreet>,
}

impl StreetIndex {
    /// Build the index. Streets without a name are skipped; they can never
    /// be the answer.
    pub fn build(streets: Vec<VillaStreet>) -> Self {
        let streets: Vec<VillaStreet> =
            streets.into_iter().filter(|s| !s.name.is_empty()).collect();

        let indexed: Vec<IndexedStreet> = streets
            .iter()
            .enumerate()
            .map(|(i, s)| IndexedStreet {
                idx: i,
                lat: s.lat,
                lng: s.lng,
            })
            .collect();

        Self {
            tree: RTree::bulk_load(indexed),
            streets,
        }
    }

    /// Nearest street to `point` within `radius_m`, by exact haversine
    /// distance of the R-tree's candidate.
    pub fn nearest_within(&self, point: &GeoPoint, radius_m: f64) -> Option<&VillaStreet> {
        let nearest = self.tree.nearest_neighbor(&[point.lat, point.lng])?;
        let street = &self.streets[nearest.idx];
        if within_radius(point, &street.position(), radius_m) {
            Some(street)
        } else {
            None
        }
    }

    /// Describe a trainer junction: nearest villa street within
    /// [`NEARBY_STREET_RADIUS_M`], plus the junction's distance from the
    /// examination start. `None` when no named street is close enough.
    pub fn describe_junction(&self, junction: &GeoPoint) -> Option<NearbyStreetInfo> {
        let street = self.nearest_within(junction, NEARBY_STREET_RADIUS_M)?;
        Some(NearbyStreetInfo {
            street_name: street.name.clone(),
            distance_m: haversine_distance(junction, &street.position()),
            junction_from_start_m: haversine_distance(junction, &TRAINER_START),
        })
    }

    pub fn len(&self) -> usize {
        self.streets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streets.is_empty()
    }
}
