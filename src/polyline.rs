//! Polyline representation for route geometries.
//!
//! Routes arrive from providers as encoded polylines and are decoded once,
//! at the adapter boundary. Everything inside the planner works on the
//! decoded coordinate sequence.

use serde::{Deserialize, Serialize};

use crate::error::PolylineError;
use crate::haversine::Coordinate;

/// Coordinate precision used by OSRM's `geometries=polyline` output.
pub const OSRM_PRECISION: u32 = 5;

/// A polyline representing a route geometry as decoded coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Decodes a Google encoded polyline with `precision` decimal digits.
    pub fn decode(encoded: &str, precision: u32) -> Result<Self, PolylineError> {
        let factor = 10f64.powi(precision as i32);
        let bytes = encoded.as_bytes();
        let mut index = 0;
        let mut lat: i64 = 0;
        let mut lng: i64 = 0;
        let mut points = Vec::new();

        while index < bytes.len() {
            let position = index;
            lat = lat
                .checked_add(next_delta(bytes, &mut index)?)
                .ok_or(PolylineError::Overflow { position })?;
            let position = index;
            lng = lng
                .checked_add(next_delta(bytes, &mut index)?)
                .ok_or(PolylineError::Overflow { position })?;
            points.push(Coordinate::new(lat as f64 / factor, lng as f64 / factor));
        }

        Ok(Self { points })
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total great-circle length in meters.
    pub fn length_meters(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum()
    }

    /// Inserts interpolated points so no two consecutive points are more
    /// than `max_spacing_m` apart. Original vertices are kept.
    pub fn densify(&self, max_spacing_m: f64) -> Self {
        if self.points.len() < 2 || max_spacing_m <= 0.0 {
            return self.clone();
        }

        let mut points = Vec::with_capacity(self.points.len());
        points.push(self.points[0]);
        for pair in self.points.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let segments = (from.distance_to(&to) / max_spacing_m).ceil().max(1.0) as usize;
            for step in 1..segments {
                points.push(from.lerp(&to, step as f64 / segments as f64));
            }
            points.push(to);
        }

        Self { points }
    }
}

/// Reads one zig-zag encoded signed value, advancing `index`.
fn next_delta(bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let position = *index;
        let byte = *bytes
            .get(position)
            .ok_or(PolylineError::Truncated { position })?;
        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidCharacter {
                position,
                byte: byte as char,
            });
        }
        if shift > 60 {
            return Err(PolylineError::Overflow { position });
        }

        let chunk = (byte - 63) as i64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        *index += 1;

        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 != 0 { !(result >> 1) } else { result >> 1 })
}
