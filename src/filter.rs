//! Hotspot proximity filtering against sampled route geometry.

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::debug;

use crate::haversine::Coordinate;
use crate::route::RouteResult;
use crate::traits::Hotspot;

/// Distance within which a route is considered to pass through a hotspot.
pub const DEFAULT_DETECTION_RADIUS_M: f64 = 500.0;

/// Ordered coordinates sampled from a route for proximity testing.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSample {
    points: Vec<Coordinate>,
    coarse: bool,
}

impl PathSample {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self {
            points,
            coarse: false,
        }
    }

    /// Samples a provider route.
    ///
    /// Prefers the full route geometry, then per-leg step coordinates. When
    /// neither is present only leg endpoints are available, which can miss
    /// hotspots mid-leg; such samples are flagged as coarse.
    pub fn from_route(route: &RouteResult) -> Self {
        if let Some(geometry) = route.geometry.as_ref().filter(|g| !g.is_empty()) {
            return Self::new(geometry.points().to_vec());
        }

        let step_points: Vec<Coordinate> = route
            .legs
            .iter()
            .flat_map(|leg| leg.path.iter().copied())
            .collect();
        if !step_points.is_empty() {
            return Self::new(step_points);
        }

        let points = route
            .legs
            .iter()
            .flat_map(|leg| [leg.start, leg.end])
            .collect();
        Self {
            points,
            coarse: true,
        }
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// True when the sample was built from leg endpoints only.
    pub fn is_coarse(&self) -> bool {
        self.coarse
    }
}

/// Returns the hotspots with at least one path sample within `radius_m`.
///
/// Results keep input order and each hotspot id appears once.
pub fn hotspots_near<'h, H: Hotspot>(
    path: &PathSample,
    hotspots: &'h [H],
    radius_m: f64,
) -> Vec<&'h H> {
    let near: Vec<&H> = hotspots
        .par_iter()
        .filter(|hotspot| {
            let location = hotspot.location();
            path.points()
                .iter()
                .any(|point| point.is_within(&location, radius_m))
        })
        .collect();

    let mut seen = HashSet::new();
    near.into_iter()
        .filter(|hotspot| seen.insert(hotspot.id().clone()))
        .collect()
}

/// Ids of the hotspots near `route`, ready to attach to a `ScoredRoute`.
pub fn hotspot_ids_near<H: Hotspot>(
    route: &RouteResult,
    hotspots: &[H],
    radius_m: f64,
) -> Vec<H::Id> {
    let path = PathSample::from_route(route);
    if path.is_coarse() {
        debug!("Route has no geometry, sampling leg endpoints only");
    }
    hotspots_near(&path, hotspots, radius_m)
        .into_iter()
        .map(|hotspot| hotspot.id().clone())
        .collect()
}
