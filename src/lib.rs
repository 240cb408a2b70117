//! # Route Drill
//!
//! Study aid for a fixed driving-test examination area. The crate computes
//! everything the map layer does not: which road-safety annotations apply to
//! an ephemeral practice route or to one step of it, how a step-by-step
//! walkthrough advances (manually, on a timer, or as a simulated
//! drive-through), and how a spaced-exposure trainer drills a junction
//! catalog to completion across sessions.
//!
//! This library provides:
//! - Great-circle geometry and encoded-polyline decoding
//! - Proximity filtering of point and road annotations against routes/steps
//! - A tolerant parser for multi-leg turn-by-turn payloads
//! - A navigation state machine with auto-advance and drive-through timers
//! - A persistent, shuffled trainer scheduler with seen/unseen progress
//! - A key-value persistence port for saved routes and trainer progress
//!
//! Map rendering, tiles, and panorama imagery belong to the embedding map
//! platform; this crate only decides *what* should be shown.
//!
//! ## Features
//!
//! - **`http`** - Blocking client for the route/annotation backend
//!
//! ## Quick Start
//!
//! ```rust
//! use routedrill::{Annotation, AnnotationKind, GeoPoint};
//! use routedrill::proximity::{filter_annotations_near, ROUTE_INTERSECTION_RADIUS_M};
//!
//! let junction = Annotation::new(1, 55.6295, 12.6372, AnnotationKind::PriorityToRight);
//! let route_path = vec![
//!     GeoPoint::new(55.6295, 12.6372),
//!     GeoPoint::new(55.6310, 12.6390),
//! ];
//!
//! let junctions = [junction];
//! let nearby = filter_annotations_near(&junctions, &route_path, ROUTE_INTERSECTION_RADIUS_M);
//! assert_eq!(nearby.len(), 1);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{Result, RouteDrillError};

// Geographic utilities (distance, bearing, sampling, polyline decode)
pub mod geo_utils;

// Proximity filtering of annotations against routes and steps
pub mod proximity;
pub use proximity::StreetIndex;

// Turn-by-turn payload parsing
pub mod steps;
pub use steps::{parse_steps, Maneuver, RawLeg, RouteStep};

// Navigation state machine (overview/step traversal, timers, drive-through)
pub mod nav;
pub use nav::{DriveFrame, NavigationController, TimerId, ViewMode};

// Spaced-exposure trainer over a junction catalog
pub mod trainer;
pub use trainer::TrainerScheduler;

// Persistence port and stores for saved routes / trainer progress
pub mod storage;
pub use storage::{FileStore, KeyValueStore, MemoryStore};

// Visibility filters composed into a render-ready overlay plan
pub mod overlay;
pub use overlay::{plan_overlay, FilterState, OverlayPlan, SpeedBand};

// Panorama lookup port with fallback anchor
pub mod imagery;
pub use imagery::{locate_panorama, PanoramaSource};

// HTTP client for the route/annotation backend
#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
pub use http::BackendClient;

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate in degrees.
///
/// Field names match the wire format used by the backend and by persisted
/// route geometry (`lat`/`lng`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check that the coordinate is finite and within valid range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lng >= -180.0
            && self.lng <= 180.0
    }
}

/// The examination center the practice routes loop from and back to.
pub const EXAM_START: GeoPoint = GeoPoint {
    lat: 55.6295,
    lng: 12.6372,
};

/// Secondary anchor used by the trainer (the examination route's first
/// junction cluster); also the fallback anchor for panorama lookups.
pub const TRAINER_START: GeoPoint = GeoPoint {
    lat: 55.634464,
    lng: 12.650135,
};

/// Examination time window in minutes; a generated route is flagged
/// `within_target` when its duration falls inside it.
pub const EXAM_WINDOW_MIN_MINUTES: f64 = 25.0;
pub const EXAM_WINDOW_MAX_MINUTES: f64 = 40.0;

/// Assumed limit when a road carries no parsable `maxspeed` tag.
pub const DEFAULT_SPEED_LIMIT_KMH: u32 = 50;

/// Category of a road-safety annotation.
///
/// Serde names are the wire strings produced by the annotation feed; unknown
/// categories fold into [`AnnotationKind::Crossing`] so a feed extension
/// never breaks decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationKind {
    /// Unsignposted junction where traffic from the right has priority.
    #[serde(rename = "hojre_vigepligt")]
    PriorityToRight,
    /// Signed unconditional give-way (shark's teeth).
    #[serde(rename = "ubetinget_vigepligt")]
    GiveWay,
    #[serde(rename = "trafiklys")]
    TrafficSignal,
    #[serde(rename = "stopskilt")]
    StopSign,
    #[serde(rename = "crossing", other)]
    Crossing,
}

impl AnnotationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationKind::PriorityToRight => "hojre_vigepligt",
            AnnotationKind::GiveWay => "ubetinget_vigepligt",
            AnnotationKind::TrafficSignal => "trafiklys",
            AnnotationKind::StopSign => "stopskilt",
            AnnotationKind::Crossing => "crossing",
        }
    }

    /// Human-readable label for marker titles.
    pub fn label(&self) -> &'static str {
        match self {
            AnnotationKind::PriorityToRight => "Priority to the right",
            AnnotationKind::GiveWay => "Give way",
            AnnotationKind::TrafficSignal => "Traffic signal",
            AnnotationKind::StopSign => "Stop sign",
            AnnotationKind::Crossing => "Crossing",
        }
    }
}

impl std::fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable point feature: one intersection or sign in the examination
/// area. Identity is the feed-assigned `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: u64,
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
    /// Optional display metadata (e.g. a junction's street name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Annotation {
    pub fn new(id: u64, lat: f64, lng: f64, kind: AnnotationKind) -> Self {
        Self {
            id,
            lat,
            lng,
            kind,
            name: None,
        }
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// An immutable linear feature: a road with a posted speed limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    /// Raw `maxspeed` tag from the feed; kept verbatim, parsed on demand.
    #[serde(rename = "maxspeed", default)]
    pub max_speed: String,
    #[serde(rename = "highway_type", default)]
    pub category: String,
    /// Ordered vertex sequence; a valid segment has at least 2.
    #[serde(default)]
    pub geometry: Vec<GeoPoint>,
}

impl RoadSegment {
    /// Parse the leading digits of the `maxspeed` tag, falling back to
    /// [`DEFAULT_SPEED_LIMIT_KMH`] when absent or unparsable.
    pub fn speed_limit_kmh(&self) -> u32 {
        let digits: String = self
            .max_speed
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().unwrap_or(DEFAULT_SPEED_LIMIT_KMH)
    }
}

/// A residential street inside one of the examination area's villa quarters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VillaStreet {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "highway_type", default)]
    pub category: String,
    #[serde(default)]
    pub geometry: Vec<GeoPoint>,
}

impl VillaStreet {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// A named villa quarter with a representative coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighborhood {
    #[serde(default)]
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub source: String,
}

impl Neighborhood {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// A generated practice route. Value object: computed once per generation
/// request, never mutated, persisted verbatim when saved.
///
/// `legs` keeps the raw turn-by-turn payload so a saved route replays
/// through [`parse_steps`] identically to a freshly generated one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PracticeRoute {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub duration_seconds: u64,
    #[serde(default)]
    pub duration_minutes: f64,
    #[serde(default)]
    pub distance_meters: f64,
    /// Encoded polyline of the full route.
    #[serde(default)]
    pub polyline: String,
    #[serde(default)]
    pub include_motorway: bool,
    #[serde(default)]
    pub within_target: bool,
    #[serde(default)]
    pub legs: Vec<RawLeg>,
}

impl PracticeRoute {
    /// Decode the route's full polyline into an ordered coordinate sequence.
    pub fn decoded_path(&self) -> Result<Vec<GeoPoint>> {
        geo_utils::decode_route_path(&self.polyline)
    }

    /// Flatten the raw legs into the display-ready step sequence.
    pub fn parsed_steps(&self) -> Vec<RouteStep> {
        parse_steps(&self.legs)
    }

    /// Whether the duration falls inside the examination time window.
    pub fn is_within_exam_window(&self) -> bool {
        self.duration_minutes >= EXAM_WINDOW_MIN_MINUTES
            && self.duration_minutes <= EXAM_WINDOW_MAX_MINUTES
    }
}
