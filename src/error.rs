//! Unified error handling for the route drill crate.
//!
//! Only failures the caller can meaningfully react to become errors here.
//! Degraded-but-recoverable situations (a feed returning garbage, corrupt
//! persisted state) are handled locally by the owning module, which logs and
//! substitutes an empty default instead.

use thiserror::Error;

/// Result type alias using [`RouteDrillError`].
pub type Result<T> = std::result::Result<T, RouteDrillError>;

#[derive(Debug, Error)]
pub enum RouteDrillError {
    /// The route backend could not be reached or answered with garbage.
    #[error("route backend request failed: {reason}")]
    Backend { reason: String },

    /// Route generation succeeded but produced zero routes. Surfaced to the
    /// user as a non-fatal message; screen state is unchanged.
    #[error("route generation returned no routes")]
    NoRoutesGenerated,

    /// An encoded polyline could not be decoded.
    #[error("failed to decode polyline: {reason}")]
    PolylineDecode { reason: String },
}
