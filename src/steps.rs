//! Turn-by-turn payload parsing.
//!
//! The route backend relays the raw `legs` array of the upstream directions
//! response. This module flattens that nested legs/steps payload into a
//! single, globally ordered step sequence ready for display. Parsing is pure
//! and total: missing fields degrade to documented defaults, never an error.

use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// Enumerated kind of navigation instruction.
///
/// Wire strings are the upstream directions API maneuver identifiers.
/// Anything absent or unrecognized folds into [`Maneuver::Straight`] so a
/// payload extension never breaks parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Maneuver {
    TurnLeft,
    TurnRight,
    TurnSlightLeft,
    TurnSlightRight,
    TurnSharpLeft,
    TurnSharpRight,
    UturnLeft,
    UturnRight,
    RampLeft,
    RampRight,
    ForkLeft,
    ForkRight,
    Merge,
    RoundaboutLeft,
    RoundaboutRight,
    Depart,
    NameChange,
    #[serde(other)]
    Straight,
}

impl Maneuver {
    pub fn as_str(&self) -> &'static str {
        match self {
            Maneuver::TurnLeft => "TURN_LEFT",
            Maneuver::TurnRight => "TURN_RIGHT",
            Maneuver::TurnSlightLeft => "TURN_SLIGHT_LEFT",
            Maneuver::TurnSlightRight => "TURN_SLIGHT_RIGHT",
            Maneuver::TurnSharpLeft => "TURN_SHARP_LEFT",
            Maneuver::TurnSharpRight => "TURN_SHARP_RIGHT",
            Maneuver::UturnLeft => "UTURN_LEFT",
            Maneuver::UturnRight => "UTURN_RIGHT",
            Maneuver::RampLeft => "RAMP_LEFT",
            Maneuver::RampRight => "RAMP_RIGHT",
            Maneuver::ForkLeft => "FORK_LEFT",
            Maneuver::ForkRight => "FORK_RIGHT",
            Maneuver::Merge => "MERGE",
            Maneuver::RoundaboutLeft => "ROUNDABOUT_LEFT",
            Maneuver::RoundaboutRight => "ROUNDABOUT_RIGHT",
            Maneuver::Depart => "DEPART",
            Maneuver::NameChange => "NAME_CHANGE",
            Maneuver::Straight => "STRAIGHT",
        }
    }

    /// Whether the maneuver changes direction (used to badge a step).
    pub fn is_turn(&self) -> bool {
        !matches!(
            self,
            Maneuver::Straight | Maneuver::Depart | Maneuver::NameChange | Maneuver::Merge
        )
    }
}

impl Default for Maneuver {
    fn default() -> Self {
        Maneuver::Straight
    }
}

impl std::fmt::Display for Maneuver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Maneuver {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "TURN_LEFT" => Ok(Maneuver::TurnLeft),
            "TURN_RIGHT" => Ok(Maneuver::TurnRight),
            "TURN_SLIGHT_LEFT" => Ok(Maneuver::TurnSlightLeft),
            "TURN_SLIGHT_RIGHT" => Ok(Maneuver::TurnSlightRight),
            "TURN_SHARP_LEFT" => Ok(Maneuver::TurnSharpLeft),
            "TURN_SHARP_RIGHT" => Ok(Maneuver::TurnSharpRight),
            "UTURN_LEFT" => Ok(Maneuver::UturnLeft),
            "UTURN_RIGHT" => Ok(Maneuver::UturnRight),
            "RAMP_LEFT" => Ok(Maneuver::RampLeft),
            "RAMP_RIGHT" => Ok(Maneuver::RampRight),
            "FORK_LEFT" => Ok(Maneuver::ForkLeft),
            "FORK_RIGHT" => Ok(Maneuver::ForkRight),
            "MERGE" => Ok(Maneuver::Merge),
            "ROUNDABOUT_LEFT" => Ok(Maneuver::RoundaboutLeft),
            "ROUNDABOUT_RIGHT" => Ok(Maneuver::RoundaboutRight),
            "DEPART" => Ok(Maneuver::Depart),
            "NAME_CHANGE" => Ok(Maneuver::NameChange),
            _ => Ok(Maneuver::Straight),
        }
    }
}

// ============================================================================
// Raw wire types
// ============================================================================

/// One leg of the raw directions payload, kept verbatim on a saved route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLeg {
    #[serde(default)]
    pub steps: Vec<RawStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyline: Option<RawPolyline>,
    #[serde(rename = "distanceMeters", default)]
    pub distance_meters: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// One step of a raw leg. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStep {
    #[serde(rename = "navigationInstruction", default)]
    pub navigation_instruction: Option<RawInstruction>,
    #[serde(rename = "startLocation", default)]
    pub start_location: Option<RawLocation>,
    #[serde(rename = "endLocation", default)]
    pub end_location: Option<RawLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyline: Option<RawPolyline>,
    #[serde(rename = "localizedValues", default)]
    pub localized_values: Option<RawLocalizedValues>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInstruction {
    #[serde(default)]
    pub maneuver: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLocation {
    #[serde(rename = "latLng", default)]
    pub lat_lng: Option<RawLatLng>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLatLng {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

impl RawLatLng {
    fn to_point(self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPolyline {
    #[serde(rename = "encodedPolyline", default)]
    pub encoded_polyline: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLocalizedValues {
    #[serde(default)]
    pub distance: Option<RawLocalizedText>,
    #[serde(rename = "staticDuration", default)]
    pub static_duration: Option<RawLocalizedText>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLocalizedText {
    #[serde(default)]
    pub text: String,
}

// ============================================================================
// Parsed steps
// ============================================================================

/// One display-ready navigation step, 0-indexed across all legs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    /// Global index across the whole route.
    pub index: usize,
    /// Instruction text; empty when the payload carried none (the caller
    /// supplies a fallback label).
    pub instruction: String,
    pub maneuver: Maneuver,
    /// Localized distance string, e.g. "0,4 km"; empty when absent.
    pub distance_text: String,
    /// Localized duration string; empty when absent.
    pub duration_text: String,
    /// Encoded sub-path for this step. `None` means the consumer pans to
    /// the end coordinate without drawing a sub-path.
    pub polyline: Option<String>,
    pub start: Option<GeoPoint>,
    pub end: Option<GeoPoint>,
}

impl RouteStep {
    /// The coordinates a step-local proximity query anchors on: start and
    /// end, whichever are present.
    pub fn anchors(&self) -> Vec<GeoPoint> {
        self.start.into_iter().chain(self.end).collect()
    }

    /// Decode the step's own sub-path, if it has one.
    pub fn decoded_path(&self) -> Option<Vec<GeoPoint>> {
        let encoded = self.polyline.as_deref()?;
        crate::geo_utils::decode_route_path(encoded).ok()
    }
}

/// Flatten a raw multi-leg payload into a single globally ordered step
/// sequence.
///
/// Total and exception-free: absent instruction text becomes an empty
/// string, an absent or unrecognized maneuver becomes
/// [`Maneuver::Straight`], absent localized values become empty strings,
/// and an absent per-step polyline stays `None`.
pub fn parse_steps(legs: &[RawLeg]) -> Vec<RouteStep> {
    let mut steps = Vec::new();

    for leg in legs {
        for raw in &leg.steps {
            let (instruction, maneuver) = match &raw.navigation_instruction {
                Some(nav) => {
                    let text = nav.instructions.clone().unwrap_or_default();
                    let maneuver = nav
                        .maneuver
                        .as_deref()
                        .map(|m| m.parse().unwrap_or_default())
                        .unwrap_or_default();
                    (text, maneuver)
                }
                None => (String::new(), Maneuver::Straight),
            };

            let (distance_text, duration_text) = match &raw.localized_values {
                Some(values) => (
                    values
                        .distance
                        .as_ref()
                        .map(|t| t.text.clone())
                        .unwrap_or_default(),
                    values
                        .static_duration
                        .as_ref()
                        .map(|t| t.text.clone())
                        .unwrap_or_default(),
                ),
                None => (String::new(), String::new()),
            };

            let polyline = raw
                .polyline
                .as_ref()
                .map(|p| p.encoded_polyline.clone())
                .filter(|encoded| !encoded.is_empty());

            steps.push(RouteStep {
                index: steps.len(),
                instruction,
                maneuver,
                distance_text,
                duration_text,
                polyline,
                start: raw.start_location.as_ref().and_then(|l| l.lat_lng).map(RawLatLng::to_point),
                end: raw.end_location.as_ref().and_then(|l| l.lat_lng).map(RawLatLng::to_point),
            });
        }
    }

    steps
}
