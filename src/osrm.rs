//! OSRM HTTP adapter for route computation.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::haversine::Coordinate;
use crate::polyline::{OSRM_PRECISION, Polyline};
use crate::route::{RouteLeg, RouteResult, Waypoint};
use crate::traits::{DEFAULT_MAX_WAYPOINTS, RoutingProvider};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
    /// Via-points allowed per request.
    pub max_waypoints: usize,
    /// Value of OSRM's `exclude` parameter when major roads are avoided.
    /// Must name a class the server's profile defines.
    pub major_road_class: String,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
            max_waypoints: DEFAULT_MAX_WAYPOINTS,
            major_road_class: "motorway".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Request URL for a route through `waypoints`.
    ///
    /// Only the first and last coordinates are marked as OSRM waypoints, so
    /// via-points shape the route without splitting it into legs.
    fn route_url(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        waypoints: &[Waypoint],
        avoid_major_roads: bool,
    ) -> String {
        let coords = std::iter::once(origin)
            .chain(waypoints.iter().map(|waypoint| waypoint.location))
            .chain(std::iter::once(destination))
            .map(|coord| format!("{:.6},{:.6}", coord.lng, coord.lat))
            .collect::<Vec<_>>()
            .join(";");

        let mut url = format!(
            "{}/route/v1/{}/{}?overview=full&geometries=polyline&steps=true",
            self.config.base_url, self.config.profile, coords
        );
        if !waypoints.is_empty() {
            url.push_str(&format!("&waypoints=0;{}", waypoints.len() + 1));
        }
        if avoid_major_roads {
            url.push_str(&format!("&exclude={}", self.config.major_road_class));
        }
        url
    }
}

impl RoutingProvider for OsrmClient {
    async fn compute_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        waypoints: &[Waypoint],
        avoid_major_roads: bool,
    ) -> Result<RouteResult, ProviderError> {
        let url = self.route_url(origin, destination, waypoints, avoid_major_roads);

        // OSRM reports routing failures (NoRoute, InvalidQuery, ...) as
        // JSON with a 4xx status, so the body is parsed before the status.
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .json::<OsrmRouteResponse>()
            .await?;

        body.into_route(origin, destination)
    }

    fn max_waypoints(&self) -> usize {
        self.config.max_waypoints
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: Option<String>,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    distance: f64,
    duration: f64,
    #[serde(default)]
    steps: Vec<OsrmStep>,
}

#[derive(Debug, Deserialize)]
struct OsrmStep {
    maneuver: OsrmManeuver,
}

#[derive(Debug, Deserialize)]
struct OsrmManeuver {
    /// `[longitude, latitude]`.
    location: [f64; 2],
}

impl OsrmRouteResponse {
    fn into_route(self, origin: Coordinate, destination: Coordinate) -> Result<RouteResult, ProviderError> {
        if self.code != "Ok" {
            let status = match self.message {
                Some(message) => format!("{}: {}", self.code, message),
                None => self.code,
            };
            return Err(ProviderError::Status(status));
        }

        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)?;

        let geometry = route
            .geometry
            .as_deref()
            .map(|encoded| Polyline::decode(encoded, OSRM_PRECISION))
            .transpose()?;

        let legs = route
            .legs
            .into_iter()
            .map(|leg| {
                let path: Vec<Coordinate> = leg
                    .steps
                    .iter()
                    .map(|step| Coordinate::new(step.maneuver.location[1], step.maneuver.location[0]))
                    .collect();
                RouteLeg {
                    start: path.first().copied().unwrap_or(origin),
                    end: path.last().copied().unwrap_or(destination),
                    distance_m: leg.distance,
                    duration_s: leg.duration,
                    path,
                }
            })
            .collect();

        Ok(RouteResult {
            legs,
            geometry,
            distance_m: route.distance,
            duration_s: route.duration,
        })
    }
}
