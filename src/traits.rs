//! Core domain traits for the safe-route planner.
//!
//! These are intentionally minimal. Host applications implement them for
//! their own incident records and routing backends.

use std::future::Future;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::haversine::Coordinate;
use crate::route::{RouteResult, Waypoint};

/// Waypoint limit of the common hosted routing APIs (25 locations minus
/// origin and destination).
pub const DEFAULT_MAX_WAYPOINTS: usize = 23;

/// Unique identifier for planner entities.
pub trait Id: Clone + Eq + Hash + Send + Sync {}

impl<T> Id for T where T: Clone + Eq + Hash + Send + Sync {}

/// A reported incident location to route away from.
pub trait Hotspot: Sync {
    type Id: Id;

    fn id(&self) -> &Self::Id;

    /// Incident location.
    fn location(&self) -> Coordinate;
}

/// Plain hotspot record for callers without their own incident type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleHotspot<I> {
    pub id: I,
    pub location: Coordinate,
}

impl<I> SimpleHotspot<I> {
    pub fn new(id: I, location: Coordinate) -> Self {
        Self { id, location }
    }
}

impl<I: Id> Hotspot for SimpleHotspot<I> {
    type Id = I;

    fn id(&self) -> &I {
        &self.id
    }

    fn location(&self) -> Coordinate {
        self.location
    }
}

/// Supplies a snapshot of the currently active hotspots.
///
/// The planner treats the snapshot as a value; it never polls the source
/// during a search.
pub trait HotspotSource {
    type Hotspot: Hotspot;

    fn active_hotspots(&self) -> Vec<Self::Hotspot>;
}

impl<H: Hotspot + Clone> HotspotSource for Vec<H> {
    type Hotspot = H;

    fn active_hotspots(&self) -> Vec<H> {
        self.clone()
    }
}

/// Computes a road route between two points through optional via-points.
///
/// Failures are reported through `Err` and are never fatal to a search;
/// the strategy that issued the call simply yields no candidate.
pub trait RoutingProvider: Sync {
    fn compute_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        waypoints: &[Waypoint],
        avoid_major_roads: bool,
    ) -> impl Future<Output = Result<RouteResult, ProviderError>> + Send;

    /// Maximum number of via-points a single request may carry.
    fn max_waypoints(&self) -> usize {
        DEFAULT_MAX_WAYPOINTS
    }
}
