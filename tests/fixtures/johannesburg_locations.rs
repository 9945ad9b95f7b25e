//! Real Johannesburg locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap. These are routable locations
//! that work with OSRM Gauteng data.

#![allow(dead_code)]

use safe_route_planner::{Coordinate, SimpleHotspot};

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

// ============================================================================
// Trip endpoints
// ============================================================================

pub const JOHANNESBURG_CBD: Location = Location::new("Johannesburg CBD", -26.2041, 28.0473);
pub const BRAAMFONTEIN: Location = Location::new("Braamfontein", -26.1900, 28.0600);
pub const ROSEBANK: Location = Location::new("Rosebank", -26.1456, 28.0437);
pub const SANDTON: Location = Location::new("Sandton City", -26.1076, 28.0567);
pub const SOWETO: Location = Location::new("Soweto (Orlando)", -26.2485, 27.8546);
pub const MELVILLE: Location = Location::new("Melville", -26.1766, 28.0088);

// ============================================================================
// Hotspot layouts
// ============================================================================

/// The incident on the straight line between the CBD and Braamfontein.
pub const MIDPOINT_INCIDENT: Location = Location::new("Midpoint incident", -26.1970, 28.0535);

/// Incidents reported along the M1 corridor between the CBD and Sandton.
pub const M1_CORRIDOR: &[Location] = &[
    Location::new("M1 Empire Rd", -26.1870, 28.0390),
    Location::new("M1 Houghton", -26.1660, 28.0450),
    Location::new("M1 Killarney", -26.1550, 28.0470),
    Location::new("M1 Grayston", -26.1140, 28.0530),
];

pub fn hotspots(locations: &[Location]) -> Vec<SimpleHotspot<&'static str>> {
    locations
        .iter()
        .map(|location| SimpleHotspot::new(location.name, location.coords()))
        .collect()
}

/// A `side` x `side` grid of hotspots centred on `center`, `spacing_m`
/// apart.
pub fn hotspot_grid(center: Coordinate, side: usize, spacing_m: f64) -> Vec<SimpleHotspot<usize>> {
    let half = (side as f64 - 1.0) / 2.0;
    (0..side * side)
        .map(|i| {
            let row = (i / side) as f64 - half;
            let col = (i % side) as f64 - half;
            SimpleHotspot::new(i, center.offset_meters(row * spacing_m, col * spacing_m))
        })
        .collect()
}
