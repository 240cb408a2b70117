//! Blocking client for the route/annotation backend.
//!
//! Each data feed is fetched and degraded independently: a failing feed
//! returns an empty collection with a warning and never blocks the others.
//! Only route generation surfaces an error, because the user explicitly
//! asked for a route and must be told when none came back.

use log::warn;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{Result, RouteDrillError};
use crate::{Annotation, Neighborhood, PracticeRoute, RoadSegment, VillaStreet};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client against the route/annotation backend.
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    /// `base_url` without a trailing slash, e.g. `http://localhost:8000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Generate a practice route and select the first candidate.
    ///
    /// Errors are surfaced (non-fatal to the caller's screen state):
    /// transport or decode failure as [`RouteDrillError::Backend`], an empty
    /// candidate list as [`RouteDrillError::NoRoutesGenerated`].
    pub fn generate_route(&self, include_motorway: bool) -> Result<PracticeRoute> {
        let url = format!(
            "{}/api/routes/generate?include_motorway={}",
            self.base_url, include_motorway
        );
        let resp: GenerateResponse = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| RouteDrillError::Backend {
                reason: e.to_string(),
            })?
            .json()
            .map_err(|e| RouteDrillError::Backend {
                reason: e.to_string(),
            })?;

        resp.routes
            .into_iter()
            .next()
            .ok_or(RouteDrillError::NoRoutesGenerated)
    }

    /// All signed intersections. Empty on any failure.
    pub fn fetch_intersections(&self) -> Vec<Annotation> {
        self.fetch_feed::<IntersectionsResponse>("/api/overpass/intersections")
            .map(|r| r.intersections)
            .unwrap_or_default()
    }

    /// Priority-to-the-right junctions plus signed intersections, in feed
    /// order. Empty on any failure.
    pub fn fetch_priority_junctions(&self) -> Vec<Annotation> {
        self.fetch_feed::<PriorityResponse>("/api/overpass/hojre-vigepligt")
            .map(|mut r| {
                r.hojre_vigepligt.append(&mut r.signed);
                r.hojre_vigepligt
            })
            .unwrap_or_default()
    }

    /// All speed-limited roads. Empty on any failure.
    pub fn fetch_speed_limits(&self) -> Vec<RoadSegment> {
        self.fetch_feed::<SpeedLimitsResponse>("/api/overpass/speed-limits")
            .map(|r| r.roads)
            .unwrap_or_default()
    }

    /// Villa streets and neighborhoods. Both empty on any failure.
    pub fn fetch_villa_areas(&self) -> (Vec<VillaStreet>, Vec<Neighborhood>) {
        self.fetch_feed::<VillaResponse>("/api/villa/areas")
            .map(|r| (r.villa_streets, r.neighborhoods))
            .unwrap_or_default()
    }

    /// Fetch and decode one feed, logging instead of propagating failure.
    fn fetch_feed<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Option<T> {
        let url = format!("{}{}", self.base_url, path);
        let result = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json::<T>());
        match result {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!("feed {path} unavailable, continuing without it: {e}");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    routes: Vec<PracticeRoute>,
}

#[derive(Debug, Deserialize)]
struct IntersectionsResponse {
    #[serde(default)]
    intersections: Vec<Annotation>,
}

#[derive(Debug, Deserialize)]
struct PriorityResponse {
    #[serde(default)]
    hojre_vigepligt: Vec<Annotation>,
    #[serde(default)]
    signed: Vec<Annotation>,
}

#[derive(Debug, Deserialize)]
struct SpeedLimitsResponse {
    #[serde(default)]
    roads: Vec<RoadSegment>,
}

#[derive(Debug, Deserialize)]
struct VillaResponse {
    #[serde(default)]
    villa_streets: Vec<VillaStreet>,
    #[serde(default)]
    neighborhoods: Vec<Neighborhood>,
}
