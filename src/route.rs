//! Route values exchanged with routing providers.

use serde::{Deserialize, Serialize};

use crate::haversine::Coordinate;
use crate::polyline::Polyline;

/// A via-point sent to the routing provider to bias the computed path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub location: Coordinate,
    /// Always false for synthesized waypoints: they shape the route, the
    /// traveller does not stop there.
    pub stopover: bool,
}

impl Waypoint {
    /// Non-stopover via-point.
    pub fn via(location: Coordinate) -> Self {
        Self {
            location,
            stopover: false,
        }
    }
}

/// One leg of a provider route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub start: Coordinate,
    pub end: Coordinate,
    pub distance_m: f64,
    pub duration_s: f64,
    /// Step-level coordinates, when the provider reports them.
    pub path: Vec<Coordinate>,
}

/// A route as returned by a provider. Geometry is opaque to the planner
/// except for proximity sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub legs: Vec<RouteLeg>,
    pub geometry: Option<Polyline>,
    pub distance_m: f64,
    pub duration_s: f64,
}

impl RouteResult {
    pub fn metrics(&self) -> RouteMetrics {
        RouteMetrics {
            distance_m: self.distance_m,
            duration_s: self.duration_s,
        }
    }
}

/// Distance and duration of a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteMetrics {
    pub distance_m: f64,
    pub duration_s: f64,
}

/// A provider route annotated with the hotspots it passes.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRoute<I> {
    pub route: RouteResult,
    /// Ids of input hotspots within the detection radius of the path.
    pub hotspots_on_path: Vec<I>,
}

impl<I> ScoredRoute<I> {
    pub fn hotspot_count(&self) -> usize {
        self.hotspots_on_path.len()
    }

    pub fn is_clear(&self) -> bool {
        self.hotspots_on_path.is_empty()
    }

    pub fn metrics(&self) -> RouteMetrics {
        self.route.metrics()
    }
}
