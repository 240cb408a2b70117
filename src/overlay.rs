//! Visibility filters composed into a render-ready overlay plan.
//!
//! The rendering adapter owns markers and polylines; this module only
//! computes the desired set as a pure function of the fetched data and the
//! user's filter toggles. Re-running the function after any change yields
//! the full desired state, and the adapter reconciles.

use serde::{Deserialize, Serialize};

use crate::{Annotation, AnnotationKind, GeoPoint, RoadSegment};

/// Which annotation categories the user wants rendered.
///
/// Mutated only by direct user action; affects rendering, never the
/// underlying data. Crossings carry no toggle and are always visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(rename = "hojre_vigepligt")]
    pub priority_to_right: bool,
    #[serde(rename = "ubetinget_vigepligt")]
    pub give_way: bool,
    #[serde(rename = "trafiklys")]
    pub traffic_signal: bool,
    #[serde(rename = "stopskilt")]
    pub stop_sign: bool,
    pub speed_limits: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            priority_to_right: true,
            give_way: true,
            traffic_signal: true,
            stop_sign: true,
            speed_limits: true,
        }
    }
}

impl FilterState {
    pub fn is_kind_visible(&self, kind: AnnotationKind) -> bool {
        match kind {
            AnnotationKind::PriorityToRight => self.priority_to_right,
            AnnotationKind::GiveWay => self.give_way,
            AnnotationKind::TrafficSignal => self.traffic_signal,
            AnnotationKind::StopSign => self.stop_sign,
            AnnotationKind::Crossing => true,
        }
    }
}

/// Speed-limit band a road overlay is colored by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedBand {
    UpTo30,
    UpTo50,
    UpTo60,
    UpTo80,
    Above80,
}

impl SpeedBand {
    pub fn from_kmh(kmh: u32) -> Self {
        match kmh {
            0..=30 => SpeedBand::UpTo30,
            31..=50 => SpeedBand::UpTo50,
            51..=60 => SpeedBand::UpTo60,
            61..=80 => SpeedBand::UpTo80,
            _ => SpeedBand::Above80,
        }
    }
}

/// Desired marker for one annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub id: u64,
    pub position: GeoPoint,
    pub kind: AnnotationKind,
    /// Marker title; the annotation's own name when it has one, the kind
    /// label otherwise.
    pub title: String,
}

/// Desired colored polyline for one speed-limited road.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadOverlay {
    pub id: u64,
    pub name: String,
    pub speed_limit_kmh: u32,
    pub band: SpeedBand,
    pub path: Vec<GeoPoint>,
}

/// The complete desired overlay state for the current data and filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlayPlan {
    pub markers: Vec<MarkerSpec>,
    pub roads: Vec<RoadOverlay>,
}

/// Compute the desired marker and road-overlay set.
///
/// Pure: same inputs, same plan. Annotations hidden by a filter toggle are
/// omitted; roads are omitted entirely when the speed-limit toggle is off,
/// and individually when their geometry has fewer than 2 vertices.
pub fn plan_overlay(
    annotations: &[Annotation],
    roads: &[RoadSegment],
    filters: &FilterState,
) -> OverlayPlan {
    let markers = annotations
        .iter()
        .filter(|a| filters.is_kind_visible(a.kind))
        .map(|a| MarkerSpec {
            id: a.id,
            position: a.position(),
            kind: a.kind,
            title: a
                .name
                .clone()
                .unwrap_or_else(|| a.kind.label().to_string()),
        })
        .collect();

    let roads = if filters.speed_limits {
        roads
            .iter()
            .filter(|r| r.geometry.len() >= 2)
            .map(|r| {
                let kmh = r.speed_limit_kmh();
                RoadOverlay {
                    id: r.id,
                    name: r.name.clone(),
                    speed_limit_kmh: kmh,
                    band: SpeedBand::from_kmh(kmh),
                    path: r.geometry.clone(),
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    OverlayPlan { markers, roads }
}
