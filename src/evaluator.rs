//! Candidate route scoring against the baseline and the best so far.
//!
//! Fewer hotspots always wins. A route that still passes hotspots must pass
//! fewer than the baseline before it is recorded. Among equally safe routes
//! the faster, shorter or more efficient one wins. A clear route that is
//! comparable to the baseline ends the search.

use crate::route::{RouteMetrics, ScoredRoute};

/// A clear route within this factor of the baseline on both duration and
/// distance is accepted immediately.
pub const ACCEPTABLE_DETOUR_RATIO: f64 = 1.2;

/// Hotspot reduction (relative to the current best, or the baseline before
/// any best exists) that, together with a
/// faster-than-baseline route, ends the search early.
pub const LARGE_REDUCTION_RATIO: f64 = 0.5;

/// What to do with a candidate route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Make it the best and stop searching.
    Accept,
    /// Make it the best and keep searching.
    Replace,
    /// Keep the current best.
    Discard,
}

/// `(baseline.duration / candidate.duration) * (baseline.distance / candidate.distance)`.
///
/// Above 1.0 the candidate beats the baseline overall.
pub fn efficiency(candidate: RouteMetrics, baseline: RouteMetrics) -> f64 {
    ratio(baseline.duration_s, candidate.duration_s) * ratio(baseline.distance_m, candidate.distance_m)
}

fn ratio(reference: f64, value: f64) -> f64 {
    if value > 0.0 {
        reference / value
    } else if reference > 0.0 {
        f64::INFINITY
    } else {
        1.0
    }
}

fn is_faster(candidate: RouteMetrics, baseline: RouteMetrics) -> bool {
    candidate.duration_s <= baseline.duration_s
}

fn is_comparable(candidate: RouteMetrics, baseline: RouteMetrics) -> bool {
    candidate.duration_s <= baseline.duration_s * ACCEPTABLE_DETOUR_RATIO
        && candidate.distance_m <= baseline.distance_m * ACCEPTABLE_DETOUR_RATIO
}

/// Tie-break between routes with the same hotspot count.
fn improves_on(candidate: RouteMetrics, best: RouteMetrics, baseline: Option<RouteMetrics>) -> bool {
    if candidate.duration_s < best.duration_s {
        return true;
    }
    if candidate.duration_s == best.duration_s && candidate.distance_m < best.distance_m {
        return true;
    }
    baseline.is_some_and(|baseline| efficiency(candidate, baseline) > efficiency(best, baseline))
}

/// Decides the fate of `candidate`.
///
/// Without a baseline only hotspot counts and the tie-break on duration and
/// distance apply, and a clear route is always accepted.
pub fn evaluate<I>(
    candidate: &ScoredRoute<I>,
    baseline: Option<&ScoredRoute<I>>,
    best: Option<&ScoredRoute<I>>,
) -> Decision {
    let metrics = candidate.metrics();
    let baseline_metrics = baseline.map(ScoredRoute::metrics);

    if candidate.is_clear() {
        let acceptable = baseline_metrics
            .is_none_or(|baseline| is_faster(metrics, baseline) || is_comparable(metrics, baseline));
        if acceptable {
            return Decision::Accept;
        }

        return match best {
            Some(best) if best.is_clear() && !improves_on(metrics, best.metrics(), baseline_metrics) => {
                Decision::Discard
            }
            _ => Decision::Replace,
        };
    }

    // The baseline sets the bar until a best exists.
    let Some(reference) = best.or(baseline) else {
        return Decision::Replace;
    };

    let count = candidate.hotspot_count();
    let reference_count = reference.hotspot_count();
    if count < reference_count {
        let reduction = (reference_count - count) as f64 / reference_count as f64;
        let faster = baseline_metrics.is_some_and(|baseline| is_faster(metrics, baseline));
        if reduction >= LARGE_REDUCTION_RATIO && faster {
            Decision::Accept
        } else {
            Decision::Replace
        }
    } else if count == reference_count && improves_on(metrics, reference.metrics(), baseline_metrics) {
        Decision::Replace
    } else {
        Decision::Discard
    }
}
