//! Panorama lookup with a fallback anchor.
//!
//! The map platform owns the actual panorama service; this module defines
//! the lookup port and the one policy the client adds on top: when nothing
//! is available near the target, try once more against a secondary anchor
//! before giving up. A failed lookup is never an error, just `None`.

use crate::GeoPoint;

/// Search radius for panorama lookups around a junction.
pub const PANORAMA_SEARCH_RADIUS_M: f64 = 200.0;

/// A located panorama: the platform's identifier and the actual capture
/// position (which may sit some meters from the requested coordinate).
#[derive(Debug, Clone, PartialEq)]
pub struct Panorama {
    pub id: String,
    pub position: GeoPoint,
}

/// Nearest-available panorama lookup, implemented by the map platform
/// adapter.
pub trait PanoramaSource {
    /// The nearest panorama within `radius_m` of `near`, or `None`.
    fn find_panorama(&self, near: &GeoPoint, radius_m: f64) -> Option<Panorama>;
}

/// Locate a panorama for `target`, falling back to one attempt against
/// `fallback_anchor` when the primary lookup finds nothing.
pub fn locate_panorama(
    source: &impl PanoramaSource,
    target: &GeoPoint,
    fallback_anchor: &GeoPoint,
    radius_m: f64,
) -> Option<Panorama> {
    source
        .find_panorama(target, radius_m)
        .or_else(|| source.find_panorama(fallback_anchor, radius_m))
}
