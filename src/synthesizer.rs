//! Synthetic via-point generation around hotspots.
//!
//! The search is greedy: for each hotspot, closest to the origin first, the
//! first compass offset that clears every hotspot by the safety margin is
//! taken. If no direction clears at the requested offset, the offset is
//! doubled once; after that the hotspot is skipped.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::haversine::{Coordinate, METERS_PER_DEGREE_LAT, meters_per_degree_lng};
use crate::route::Waypoint;
use crate::traits::Hotspot;

/// The eight compass directions, clockwise from north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compass {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Compass {
    pub const ALL: [Compass; 8] = [
        Compass::North,
        Compass::NorthEast,
        Compass::East,
        Compass::SouthEast,
        Compass::South,
        Compass::SouthWest,
        Compass::West,
        Compass::NorthWest,
    ];

    /// Direction at `index`, wrapping modulo 8.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// Unit step in (latitude, longitude) degrees. Diagonals move a full
    /// step on both axes.
    pub fn unit(self) -> (f64, f64) {
        match self {
            Compass::North => (1.0, 0.0),
            Compass::NorthEast => (1.0, 1.0),
            Compass::East => (0.0, 1.0),
            Compass::SouthEast => (-1.0, 1.0),
            Compass::South => (-1.0, 0.0),
            Compass::SouthWest => (-1.0, -1.0),
            Compass::West => (0.0, -1.0),
            Compass::NorthWest => (1.0, -1.0),
        }
    }
}

/// Which compass directions an offset search tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompassSweep {
    /// All eight directions.
    Full,
    /// Every other direction from the start (four in total).
    Alternate,
}

impl CompassSweep {
    /// Directions in trial order, beginning at `start`.
    pub fn directions(self, start: usize) -> impl Iterator<Item = Compass> {
        let step = match self {
            CompassSweep::Full => 1,
            CompassSweep::Alternate => 2,
        };
        (0..Compass::ALL.len() / step).map(move |i| Compass::from_index(start + i * step))
    }
}

/// Offset magnitude and direction order for one synthesis pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetPattern {
    pub offset_deg: f64,
    pub compass_start: usize,
    pub sweep: CompassSweep,
}

/// True when `point` is at least `min_safety_m` from every hotspot.
pub fn is_safe<H: Hotspot>(point: Coordinate, hotspots: &[H], min_safety_m: f64) -> bool {
    hotspots
        .iter()
        .all(|hotspot| point.distance_to(&hotspot.location()) >= min_safety_m)
}

/// Builds at most `cap` via-points that steer around `hotspots`.
///
/// Every returned waypoint is at least `min_safety_m` from every hotspot.
/// The list may be shorter than the hotspot list, or empty.
pub fn synthesize_waypoints<H: Hotspot>(
    hotspots: &[H],
    pattern: OffsetPattern,
    min_safety_m: f64,
    origin: Coordinate,
    cap: usize,
) -> Vec<Waypoint> {
    let mut by_distance: Vec<(f64, &H)> = hotspots
        .iter()
        .map(|hotspot| (origin.distance_to(&hotspot.location()), hotspot))
        .collect();
    by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut waypoints = Vec::with_capacity(cap.min(hotspots.len()));
    for (_, hotspot) in by_distance {
        if waypoints.len() >= cap {
            break;
        }

        let center = hotspot.location();
        let found = [pattern.offset_deg, pattern.offset_deg * 2.0]
            .into_iter()
            .find_map(|offset_deg| {
                pattern
                    .sweep
                    .directions(pattern.compass_start)
                    .map(|direction| {
                        let (unit_lat, unit_lng) = direction.unit();
                        center.offset_degrees(unit_lat * offset_deg, unit_lng * offset_deg)
                    })
                    .find(|candidate| is_safe(*candidate, hotspots, min_safety_m))
            });

        match found {
            Some(location) => waypoints.push(Waypoint::via(location)),
            None => trace!(
                lat = center.lat,
                lng = center.lng,
                offset_deg = pattern.offset_deg,
                "No safe offset around hotspot, skipping"
            ),
        }
    }

    waypoints
}

/// Side of the hotspot bounding box a detour skirts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    North,
    South,
    East,
    West,
}

/// Axis-aligned rectangle enclosing a set of hotspots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Smallest box containing every hotspot, or `None` for no hotspots.
    pub fn enclosing<H: Hotspot>(hotspots: &[H]) -> Option<Self> {
        let first = hotspots.first()?.location();
        let seed = Self {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lng: first.lng,
            max_lng: first.lng,
        };

        Some(hotspots.iter().fold(seed, |bounds, hotspot| {
            let location = hotspot.location();
            Self {
                min_lat: bounds.min_lat.min(location.lat),
                max_lat: bounds.max_lat.max(location.lat),
                min_lng: bounds.min_lng.min(location.lng),
                max_lng: bounds.max_lng.max(location.lng),
            }
        }))
    }

    /// The two corners of the box grown by `margin_m` on `side`.
    fn skirt(&self, side: Side, margin_m: f64) -> [Coordinate; 2] {
        let center_lat = (self.min_lat + self.max_lat) / 2.0;
        let margin_lat = margin_m / METERS_PER_DEGREE_LAT;
        let margin_lng = margin_m / meters_per_degree_lng(center_lat);

        let north = self.max_lat + margin_lat;
        let south = self.min_lat - margin_lat;
        let east = self.max_lng + margin_lng;
        let west = self.min_lng - margin_lng;

        match side {
            Side::North => [Coordinate::new(north, west), Coordinate::new(north, east)],
            Side::South => [Coordinate::new(south, west), Coordinate::new(south, east)],
            Side::East => [Coordinate::new(south, east), Coordinate::new(north, east)],
            Side::West => [Coordinate::new(south, west), Coordinate::new(north, west)],
        }
    }
}

/// Two via-points skirting one side of the hotspot bounding box at
/// `margin_m`, ordered nearest-to-origin first.
///
/// Returns no waypoints when either point is closer than `min_safety_m`
/// to any hotspot.
pub fn detour_waypoints<H: Hotspot>(
    hotspots: &[H],
    side: Side,
    margin_m: f64,
    min_safety_m: f64,
    origin: Coordinate,
) -> Vec<Waypoint> {
    let Some(bounds) = BoundingBox::enclosing(hotspots) else {
        return Vec::new();
    };

    let mut corners = bounds.skirt(side, margin_m);
    if corners
        .iter()
        .any(|corner| !is_safe(*corner, hotspots, min_safety_m))
    {
        trace!(?side, margin_m, "Detour corner too close to a hotspot");
        return Vec::new();
    }

    if origin.distance_to(&corners[1]) < origin.distance_to(&corners[0]) {
        corners.swap(0, 1);
    }
    corners.into_iter().map(Waypoint::via).collect()
}
