//! Test fixtures for safe-route-planner.
//!
//! Provides realistic test data including:
//! - Real Johannesburg locations (from OpenStreetMap)
//! - Hotspot layouts around those locations

pub mod johannesburg_locations;

pub use johannesburg_locations::*;
