//! Great-circle geometry and a straight-line routing fallback.
//!
//! Distances use the Haversine formula on a spherical Earth. Poles and the
//! antimeridian are not special-cased; the planner targets mid-latitude
//! road networks where neither occurs.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::polyline::Polyline;
use crate::route::{RouteLeg, RouteResult, Waypoint};
use crate::traits::RoutingProvider;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters spanned by one degree of latitude on the Haversine sphere.
pub const METERS_PER_DEGREE_LAT: f64 = 111_195.0;

/// Average driving speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Minor roads are slower than the arterial network the default speed models.
const DEFAULT_MINOR_ROAD_SPEED_FACTOR: f64 = 0.8;

/// Spacing between generated geometry points.
const DEFAULT_SAMPLE_SPACING_M: f64 = 50.0;

/// A WGS84 (latitude, longitude) pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance_meters(*self, *other)
    }

    /// True when `other` lies within `radius_m` meters (inclusive).
    pub fn is_within(&self, other: &Coordinate, radius_m: f64) -> bool {
        self.distance_to(other) <= radius_m
    }

    /// Shifts the coordinate by raw degree deltas.
    pub fn offset_degrees(&self, delta_lat: f64, delta_lng: f64) -> Self {
        Self::new(self.lat + delta_lat, self.lng + delta_lng)
    }

    /// Shifts the coordinate by meter deltas (north, east) using a local
    /// equirectangular approximation.
    pub fn offset_meters(&self, north_m: f64, east_m: f64) -> Self {
        let delta_lat = north_m / METERS_PER_DEGREE_LAT;
        let delta_lng = east_m / meters_per_degree_lng(self.lat);
        self.offset_degrees(delta_lat, delta_lng)
    }

    /// Point a fraction `t` of the way towards `other`, interpolated in
    /// degree space. Accurate enough for the short segments between route
    /// vertices.
    pub fn lerp(&self, other: &Coordinate, t: f64) -> Self {
        Self::new(
            self.lat + (other.lat - self.lat) * t,
            self.lng + (other.lng - self.lng) * t,
        )
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

/// Meters spanned by one degree of longitude at `lat`.
pub fn meters_per_degree_lng(lat: f64) -> f64 {
    (METERS_PER_DEGREE_LAT * lat.to_radians().cos()).max(1.0)
}

/// Calculate haversine distance between two points in meters.
pub fn distance_meters(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push `a` past 1.0 for near-antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Straight-line routing provider.
///
/// Connects origin, waypoints and destination with great-circle segments
/// and estimates travel time from an assumed speed. Ignores the road
/// network entirely, so it is a fallback for when OSRM is unavailable and
/// a deterministic provider for tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HaversineRouter {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
    /// Speed multiplier applied when major roads are avoided.
    pub minor_road_speed_factor: f64,
    /// Maximum spacing between geometry points in meters.
    pub sample_spacing_m: f64,
}

impl Default for HaversineRouter {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
            minor_road_speed_factor: DEFAULT_MINOR_ROAD_SPEED_FACTOR,
            sample_spacing_m: DEFAULT_SAMPLE_SPACING_M,
        }
    }
}

impl HaversineRouter {
    pub fn new(speed_kmh: f64) -> Self {
        Self {
            speed_kmh,
            ..Self::default()
        }
    }

    /// Convert distance in meters to travel time in seconds.
    fn meters_to_seconds(&self, meters: f64, avoid_major_roads: bool) -> f64 {
        let mut speed_kmh = self.speed_kmh;
        if avoid_major_roads {
            speed_kmh *= self.minor_road_speed_factor;
        }
        if speed_kmh <= 0.0 {
            return f64::INFINITY;
        }
        meters / (speed_kmh / 3.6)
    }

    /// Builds the straight-line route synchronously.
    pub fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        waypoints: &[Waypoint],
        avoid_major_roads: bool,
    ) -> RouteResult {
        let mut stops = Vec::with_capacity(waypoints.len() + 2);
        stops.push(origin);
        stops.extend(waypoints.iter().map(|waypoint| waypoint.location));
        stops.push(destination);

        // Via-points do not split the route, so the whole journey is one leg.
        let geometry = Polyline::new(stops).densify(self.sample_spacing_m);
        let distance_m = geometry.length_meters();
        let duration_s = self.meters_to_seconds(distance_m, avoid_major_roads);

        let leg = RouteLeg {
            start: origin,
            end: destination,
            distance_m,
            duration_s,
            path: Vec::new(),
        };

        RouteResult {
            legs: vec![leg],
            geometry: Some(geometry),
            distance_m,
            duration_s,
        }
    }
}

impl RoutingProvider for HaversineRouter {
    async fn compute_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        waypoints: &[Waypoint],
        avoid_major_roads: bool,
    ) -> Result<RouteResult, ProviderError> {
        Ok(self.route(origin, destination, waypoints, avoid_major_roads))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOHANNESBURG: Coordinate = Coordinate::new(-26.2041, 28.0473);
    const PRETORIA: Coordinate = Coordinate::new(-25.7479, 28.2293);

    #[test]
    fn test_haversine_same_point() {
        assert_eq!(distance_meters(JOHANNESBURG, JOHANNESBURG), 0.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Johannesburg CBD to Pretoria CBD is ~54 km as the crow flies.
        let dist = distance_meters(JOHANNESBURG, PRETORIA);
        assert!(
            dist > 50_000.0 && dist < 58_000.0,
            "JHB to PTA should be ~54km, got {}",
            dist
        );
    }

    #[test]
    fn test_haversine_symmetric() {
        assert_eq!(
            distance_meters(JOHANNESBURG, PRETORIA),
            distance_meters(PRETORIA, JOHANNESBURG)
        );
    }

    #[test]
    fn test_antipodal_points_are_finite() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 180.0);
        let dist = distance_meters(a, b);
        assert!(dist.is_finite());
        assert!((dist - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1.0);
    }

    #[test]
    fn test_offset_meters_round_trip_distance() {
        let moved = JOHANNESBURG.offset_meters(1_000.0, 0.0);
        let dist = JOHANNESBURG.distance_to(&moved);
        assert!((dist - 1_000.0).abs() < 5.0, "got {}", dist);

        let moved = JOHANNESBURG.offset_meters(0.0, 1_000.0);
        let dist = JOHANNESBURG.distance_to(&moved);
        assert!((dist - 1_000.0).abs() < 5.0, "got {}", dist);
    }

    #[test]
    fn test_reasonable_travel_time() {
        let router = HaversineRouter::new(36.0); // 10 m/s
        assert_eq!(router.meters_to_seconds(1_000.0, false), 100.0);
        assert!(router.meters_to_seconds(1_000.0, true) > 100.0);
    }

    #[test]
    fn test_route_through_waypoint_is_longer() {
        let router = HaversineRouter::default();
        let destination = Coordinate::new(-26.1900, 28.0600);
        let direct = router.route(JOHANNESBURG, destination, &[], false);
        let detour = router.route(
            JOHANNESBURG,
            destination,
            &[Waypoint::via(Coordinate::new(-26.1800, 28.0300))],
            false,
        );

        assert!(detour.distance_m > direct.distance_m);
        assert!(detour.duration_s > direct.duration_s);
        assert_eq!(direct.legs.len(), 1);

        let geometry = direct.geometry.expect("geometry");
        assert_eq!(geometry.points().first(), Some(&JOHANNESBURG));
        assert_eq!(geometry.points().last(), Some(&destination));
    }
}
