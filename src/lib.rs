//! safe-route-planner core
//!
//! Plans road routes that steer around reported incident hotspots by
//! feeding synthetic via-points to an external routing provider.

pub mod traits;
pub mod error;
pub mod haversine;
pub mod polyline;
pub mod route;
pub mod filter;
pub mod synthesizer;
pub mod strategy;
pub mod evaluator;
pub mod planner;
pub mod osrm;

pub use haversine::Coordinate;
pub use planner::{SearchConfig, SearchOutcome, Termination, plan_safe_route, plan_safe_route_with_cancel};
pub use route::{RouteResult, ScoredRoute, Waypoint};
pub use traits::{Hotspot, HotspotSource, RoutingProvider, SimpleHotspot};
