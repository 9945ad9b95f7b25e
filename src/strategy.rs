//! The ordered list of waypoint strategies a search works through.
//!
//! Strategies are grouped in phases of increasing detour size. Within a
//! phase the order is the priority order used to reconcile concurrent
//! results.

use serde::{Deserialize, Serialize};

use crate::haversine::{Coordinate, METERS_PER_DEGREE_LAT};
use crate::route::Waypoint;
use crate::synthesizer::{CompassSweep, OffsetPattern, Side, detour_waypoints, synthesize_waypoints};
use crate::traits::Hotspot;

/// Compass starts for the offset phases: north, east, south, west first.
const CARDINAL_STARTS: [usize; 4] = [0, 2, 4, 6];

/// Margins tried when skirting the hotspot bounding box.
const DETOUR_MARGINS_M: [f64; 4] = [3_000.0, 6_000.0, 10_000.0, 15_000.0];

const DETOUR_SIDES: [Side; 4] = [Side::North, Side::South, Side::East, Side::West];

/// Search phases in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// ~1.5-2 km offsets, 1 km safety margin.
    SmallOffset,
    /// ~3 km offsets, 1.5 km safety margin.
    MediumOffset,
    /// ~5 km offsets, 2 km safety margin.
    LargeOffset,
    /// Skirt the box enclosing all hotspots at 3-15 km.
    BoundingDetour,
    /// ~15-20 km offsets in four directions, 4 km safety margin.
    WideOffset,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::SmallOffset,
        Phase::MediumOffset,
        Phase::LargeOffset,
        Phase::BoundingDetour,
        Phase::WideOffset,
    ];

    /// Fallback phases only run when the time budget allows.
    pub fn is_fallback(self) -> bool {
        matches!(self, Phase::BoundingDetour | Phase::WideOffset)
    }

    /// Strategies of this phase in priority order.
    pub fn strategies(self) -> Vec<SearchStrategy> {
        match self {
            Phase::SmallOffset => {
                let mut strategies = offset_ring(self, km_to_degrees(1.5), 1_000.0, false);
                strategies.extend(offset_ring(self, km_to_degrees(2.0), 1_000.0, true));
                strategies
            }
            Phase::MediumOffset => offset_pair(self, km_to_degrees(3.0), 1_500.0),
            Phase::LargeOffset => offset_pair(self, km_to_degrees(5.0), 2_000.0),
            Phase::BoundingDetour => DETOUR_MARGINS_M
                .iter()
                .flat_map(|&margin_m| {
                    DETOUR_SIDES.iter().map(move |&side| SearchStrategy {
                        phase: Phase::BoundingDetour,
                        kind: StrategyKind::Detour { side, margin_m },
                        min_safety_m: 1_000.0,
                        avoid_major_roads: false,
                    })
                })
                .collect(),
            Phase::WideOffset => [km_to_degrees(15.0), km_to_degrees(20.0)]
                .into_iter()
                .flat_map(|offset_deg| {
                    (0..2).map(move |compass_start| SearchStrategy {
                        phase: Phase::WideOffset,
                        kind: StrategyKind::Offset(OffsetPattern {
                            offset_deg,
                            compass_start,
                            sweep: CompassSweep::Alternate,
                        }),
                        min_safety_m: 4_000.0,
                        avoid_major_roads: false,
                    })
                })
                .collect(),
        }
    }
}

/// How a strategy places its waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StrategyKind {
    /// One compass offset per hotspot.
    Offset(OffsetPattern),
    /// Two points skirting one side of the hotspot bounding box.
    Detour { side: Side, margin_m: f64 },
}

/// One parameterized attempt in the search sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchStrategy {
    pub phase: Phase,
    pub kind: StrategyKind,
    /// Minimum distance between any waypoint and any hotspot.
    pub min_safety_m: f64,
    /// Ask the provider to prefer minor roads.
    pub avoid_major_roads: bool,
}

impl SearchStrategy {
    /// Waypoints for this strategy, at most `cap` of them. Empty when no
    /// safe placement exists.
    pub fn waypoints<H: Hotspot>(
        &self,
        hotspots: &[H],
        origin: Coordinate,
        cap: usize,
    ) -> Vec<Waypoint> {
        match self.kind {
            StrategyKind::Offset(pattern) => {
                synthesize_waypoints(hotspots, pattern, self.min_safety_m, origin, cap)
            }
            StrategyKind::Detour { side, margin_m } => {
                let mut waypoints =
                    detour_waypoints(hotspots, side, margin_m, self.min_safety_m, origin);
                waypoints.truncate(cap);
                waypoints
            }
        }
    }
}

/// Converts kilometers to degrees of latitude on the Haversine sphere.
fn km_to_degrees(km: f64) -> f64 {
    km * 1_000.0 / METERS_PER_DEGREE_LAT
}

fn offset_ring(
    phase: Phase,
    offset_deg: f64,
    min_safety_m: f64,
    avoid_major_roads: bool,
) -> Vec<SearchStrategy> {
    CARDINAL_STARTS
        .iter()
        .map(|&compass_start| SearchStrategy {
            phase,
            kind: StrategyKind::Offset(OffsetPattern {
                offset_deg,
                compass_start,
                sweep: CompassSweep::Full,
            }),
            min_safety_m,
            avoid_major_roads,
        })
        .collect()
}

/// The same ring without, then with, the minor-road bias.
fn offset_pair(phase: Phase, offset_deg: f64, min_safety_m: f64) -> Vec<SearchStrategy> {
    let mut strategies = offset_ring(phase, offset_deg, min_safety_m, false);
    strategies.extend(offset_ring(phase, offset_deg, min_safety_m, true));
    strategies
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset_of(strategy: &SearchStrategy) -> f64 {
        match strategy.kind {
            StrategyKind::Offset(pattern) => pattern.offset_deg,
            StrategyKind::Detour { .. } => panic!("expected offset strategy"),
        }
    }

    #[test]
    fn test_plan_is_grouped_by_phase_in_order() {
        let plan: Vec<SearchStrategy> = Phase::ALL.into_iter().flat_map(Phase::strategies).collect();
        assert_eq!(plan.len(), 44);
        assert!(plan.windows(2).all(|pair| pair[0].phase <= pair[1].phase));
        assert_eq!(plan.first().map(|s| s.phase), Some(Phase::SmallOffset));
        assert_eq!(plan.last().map(|s| s.phase), Some(Phase::WideOffset));
    }

    #[test]
    fn test_offsets_and_margins_grow_by_phase() {
        let max_offset = |phase: Phase| {
            phase
                .strategies()
                .iter()
                .map(offset_of)
                .fold(0.0_f64, f64::max)
        };
        let small = max_offset(Phase::SmallOffset);
        let medium = max_offset(Phase::MediumOffset);
        let large = max_offset(Phase::LargeOffset);
        let wide = max_offset(Phase::WideOffset);
        assert!(small < medium && medium < large && large < wide);

        // ~2 km in degrees.
        assert!((small - 0.018).abs() < 0.001);

        let margin = |phase: Phase| phase.strategies()[0].min_safety_m;
        assert_eq!(margin(Phase::SmallOffset), 1_000.0);
        assert_eq!(margin(Phase::MediumOffset), 1_500.0);
        assert_eq!(margin(Phase::LargeOffset), 2_000.0);
        assert_eq!(margin(Phase::WideOffset), 4_000.0);
    }

    #[test]
    fn test_each_offset_phase_tries_both_road_classes() {
        for phase in [Phase::SmallOffset, Phase::MediumOffset, Phase::LargeOffset] {
            let strategies = phase.strategies();
            assert!(strategies.iter().any(|s| s.avoid_major_roads), "{:?}", phase);
            assert!(strategies.iter().any(|s| !s.avoid_major_roads), "{:?}", phase);
            // Unbiased routes come first.
            assert!(!strategies[0].avoid_major_roads);
        }
    }

    #[test]
    fn test_wide_phase_uses_four_directions() {
        for strategy in Phase::WideOffset.strategies() {
            match strategy.kind {
                StrategyKind::Offset(pattern) => assert_eq!(pattern.sweep, CompassSweep::Alternate),
                StrategyKind::Detour { .. } => panic!("wide phase has no detours"),
            }
        }
    }

    #[test]
    fn test_detour_margins_ascend() {
        let margins: Vec<f64> = Phase::BoundingDetour
            .strategies()
            .iter()
            .map(|s| match s.kind {
                StrategyKind::Detour { margin_m, .. } => margin_m,
                StrategyKind::Offset(_) => panic!("expected detour"),
            })
            .collect();
        assert_eq!(margins.first(), Some(&3_000.0));
        assert_eq!(margins.last(), Some(&15_000.0));
        assert!(margins.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn test_fallback_phases() {
        let fallback: Vec<_> = Phase::ALL.into_iter().filter(|p| p.is_fallback()).collect();
        assert_eq!(fallback, vec![Phase::BoundingDetour, Phase::WideOffset]);
    }
}
