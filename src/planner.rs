//! Hotspot-avoiding route search.
//!
//! The search asks the routing provider for an unconstrained baseline, then
//! works through the strategy phases, sending each strategy's waypoints to
//! the provider and scoring the returned route. Calls within a phase run
//! concurrently in bounded batches; results are reconciled in strategy
//! order so the outcome matches a sequential search. Everything is bound to
//! a wall-clock deadline and an optional cancellation token, and the best
//! route seen so far is returned when either fires.

use std::future::Future;
use std::time::Duration;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde::{Deserialize, Serialize};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::ProviderError;
use crate::evaluator::{Decision, evaluate};
use crate::filter::{DEFAULT_DETECTION_RADIUS_M, hotspot_ids_near};
use crate::haversine::Coordinate;
use crate::route::{RouteResult, ScoredRoute, Waypoint};
use crate::strategy::{Phase, SearchStrategy};
use crate::traits::{DEFAULT_MAX_WAYPOINTS, Hotspot, RoutingProvider};

/// Fraction of the deadline after which the bounding-box detour phase is
/// no longer started.
const DETOUR_PHASE_CUTOFF: f64 = 0.7;

/// Fraction of the deadline after which the wide-offset phase is no longer
/// started.
const WIDE_PHASE_CUTOFF: f64 = 0.9;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Distance within which a route passes through a hotspot.
    pub detection_radius_m: f64,
    /// Wall-clock budget for the whole search in milliseconds.
    pub deadline_ms: u64,
    /// Maximum via-points per provider request. Further limited by the
    /// provider's own maximum.
    pub waypoint_cap: usize,
    /// Provider calls in flight at once within a phase.
    pub max_concurrent_requests: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            detection_radius_m: DEFAULT_DETECTION_RADIUS_M,
            deadline_ms: 5_000,
            waypoint_cap: DEFAULT_MAX_WAYPOINTS,
            max_concurrent_requests: 4,
        }
    }
}

impl SearchConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// No hotspots were supplied; the baseline is the answer.
    NoHotspots,
    /// The baseline already avoids every hotspot.
    BaselineClear,
    /// A candidate was good enough to stop early.
    Accepted,
    /// Every phase ran without an early accept.
    Exhausted,
    /// The time budget ran out.
    DeadlineExceeded,
    /// The caller cancelled the search.
    Cancelled,
}

/// Result of one planning call.
#[derive(Debug, Clone)]
pub struct SearchOutcome<I> {
    /// Best route found, possibly still passing hotspots. Falls back to the
    /// baseline when strategies returned routes but none passed fewer
    /// hotspots. `None` when no strategy produced a route; callers should
    /// show the baseline with a caution notice.
    pub best_route: Option<ScoredRoute<I>>,
    /// Strategy that produced `best_route`; `None` when it is the baseline.
    pub best_strategy: Option<SearchStrategy>,
    /// Unconstrained route, `None` when the provider failed to produce it.
    pub baseline: Option<ScoredRoute<I>>,
    pub strategies_attempted: usize,
    pub provider_failures: usize,
    pub elapsed: Duration,
    pub termination: Termination,
}

impl<I> SearchOutcome<I> {
    pub fn best_hotspot_count(&self) -> Option<usize> {
        self.best_route.as_ref().map(ScoredRoute::hotspot_count)
    }

    pub fn best_distance_m(&self) -> Option<f64> {
        self.best_route.as_ref().map(|route| route.route.distance_m)
    }

    pub fn best_duration_s(&self) -> Option<f64> {
        self.best_route.as_ref().map(|route| route.route.duration_s)
    }

    pub fn baseline_distance_m(&self) -> Option<f64> {
        self.baseline.as_ref().map(|route| route.route.distance_m)
    }

    pub fn baseline_duration_s(&self) -> Option<f64> {
        self.baseline.as_ref().map(|route| route.route.duration_s)
    }
}

/// Plans a route from `origin` to `destination` that avoids `hotspots`.
///
/// Never fails: provider errors only degrade the result.
pub async fn plan_safe_route<P, H>(
    provider: &P,
    origin: Coordinate,
    destination: Coordinate,
    hotspots: &[H],
    config: &SearchConfig,
) -> SearchOutcome<H::Id>
where
    P: RoutingProvider,
    H: Hotspot,
{
    plan_safe_route_with_cancel(
        provider,
        origin,
        destination,
        hotspots,
        config,
        CancellationToken::new(),
    )
    .await
}

/// Like [`plan_safe_route`], stopping early with the best route so far when
/// `cancel` fires.
pub async fn plan_safe_route_with_cancel<P, H>(
    provider: &P,
    origin: Coordinate,
    destination: Coordinate,
    hotspots: &[H],
    config: &SearchConfig,
    cancel: CancellationToken,
) -> SearchOutcome<H::Id>
where
    P: RoutingProvider,
    H: Hotspot,
{
    let started = Instant::now();
    let search = Search {
        provider,
        origin,
        destination,
        hotspots,
        radius_m: config.detection_radius_m,
        waypoint_cap: config.waypoint_cap.min(provider.max_waypoints()),
        concurrency: config.max_concurrent_requests.max(1),
        started,
        budget: config.deadline(),
        deadline: started + config.deadline(),
        cancel,
        baseline: None,
        best: None,
        attempted: 0,
        failures: 0,
        candidates: 0,
    };

    search.run().await
}

/// Per-call search state. Owned by one control flow; concurrent provider
/// results are merged back here.
struct Search<'a, P, H: Hotspot> {
    provider: &'a P,
    origin: Coordinate,
    destination: Coordinate,
    hotspots: &'a [H],
    radius_m: f64,
    waypoint_cap: usize,
    concurrency: usize,
    started: Instant,
    budget: Duration,
    deadline: Instant,
    cancel: CancellationToken,
    baseline: Option<ScoredRoute<H::Id>>,
    best: Option<(ScoredRoute<H::Id>, Option<SearchStrategy>)>,
    attempted: usize,
    failures: usize,
    /// Routes returned by strategy calls.
    candidates: usize,
}

type ProviderResult = Result<RouteResult, ProviderError>;

impl<'a, P, H> Search<'a, P, H>
where
    P: RoutingProvider,
    H: Hotspot,
{
    async fn run(mut self) -> SearchOutcome<H::Id> {
        info!(
            hotspots = self.hotspots.len(),
            deadline_ms = self.budget.as_millis() as u64,
            waypoint_cap = self.waypoint_cap,
            "Planning safe route"
        );

        let baseline = self
            .bounded(self.provider.compute_route(self.origin, self.destination, &[], false))
            .await;
        match baseline {
            Ok(Ok(route)) => self.baseline = Some(self.score(route)),
            Ok(Err(err)) => {
                self.failures += 1;
                warn!(error = %err, "Baseline route unavailable, scoring by hotspot count only");
            }
            Err(termination) => return self.finish(termination),
        }

        if self.hotspots.is_empty() {
            self.best = self.baseline.clone().map(|route| (route, None));
            return self.finish(Termination::NoHotspots);
        }
        if let Some(baseline) = self.baseline.as_ref().filter(|route| route.is_clear()) {
            self.best = Some((baseline.clone(), None));
            return self.finish(Termination::BaselineClear);
        }

        for phase in Phase::ALL {
            if let Some(reason) = self.skip_reason(phase) {
                debug!(?phase, reason, "Skipping phase");
                continue;
            }
            if let Some(termination) = self.run_phase(phase).await {
                return self.finish(termination);
            }
        }

        self.finish(Termination::Exhausted)
    }

    fn elapsed_fraction(&self) -> f64 {
        if self.budget.is_zero() {
            return 1.0;
        }
        self.started.elapsed().as_secs_f64() / self.budget.as_secs_f64()
    }

    fn best_count(&self) -> Option<usize> {
        self.best.as_ref().map(|(route, _)| route.hotspot_count())
    }

    /// Gating for the fallback phases.
    fn skip_reason(&self, phase: Phase) -> Option<&'static str> {
        if !phase.is_fallback() {
            return None;
        }
        let clear_best = self.best_count() == Some(0);
        match phase {
            Phase::BoundingDetour => {
                if clear_best {
                    Some("clear route already found")
                } else if self.elapsed_fraction() >= DETOUR_PHASE_CUTOFF {
                    Some("time budget nearly spent")
                } else {
                    None
                }
            }
            Phase::WideOffset => {
                let halved = match (self.best_count(), &self.baseline) {
                    (Some(best), Some(baseline)) => best * 2 < baseline.hotspot_count(),
                    _ => false,
                };
                if clear_best {
                    Some("clear route already found")
                } else if halved {
                    Some("best route already halves baseline hotspots")
                } else if self.elapsed_fraction() >= WIDE_PHASE_CUTOFF {
                    Some("time budget nearly spent")
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Runs one phase. Returns the termination if the search should stop.
    async fn run_phase(&mut self, phase: Phase) -> Option<Termination> {
        let prepared: Vec<(SearchStrategy, Vec<Waypoint>)> = phase
            .strategies()
            .into_iter()
            .filter_map(|strategy| {
                let waypoints = strategy.waypoints(self.hotspots, self.origin, self.waypoint_cap);
                if waypoints.is_empty() {
                    debug!(?strategy, "No safe waypoints, skipping strategy");
                    None
                } else {
                    Some((strategy, waypoints))
                }
            })
            .collect();

        debug!(?phase, strategies = prepared.len(), "Starting phase");

        for batch in prepared.chunks(self.concurrency) {
            if self.cancel.is_cancelled() {
                return Some(Termination::Cancelled);
            }
            if Instant::now() >= self.deadline {
                return Some(Termination::DeadlineExceeded);
            }

            self.attempted += batch.len();
            let (results, interrupted) = self.fan_out(batch).await;

            for ((strategy, _), result) in batch.iter().zip(results) {
                match result {
                    Some(Ok(route)) => {
                        self.candidates += 1;
                        if self.consider(*strategy, route) {
                            return Some(Termination::Accepted);
                        }
                    }
                    Some(Err(err)) => {
                        self.failures += 1;
                        debug!(?strategy, error = %err, "Provider call failed");
                    }
                    None => {}
                }
            }

            if interrupted.is_some() {
                return interrupted;
            }
        }

        None
    }

    /// Issues every call of `batch` at once. Results are slotted by batch
    /// index; calls still running when the deadline or cancellation fires
    /// are dropped and their slot stays empty.
    async fn fan_out(
        &self,
        batch: &[(SearchStrategy, Vec<Waypoint>)],
    ) -> (Vec<Option<ProviderResult>>, Option<Termination>) {
        let mut slots: Vec<Option<ProviderResult>> = batch.iter().map(|_| None).collect();
        let mut pending: FuturesUnordered<_> = batch
            .iter()
            .enumerate()
            .map(|(index, (strategy, waypoints))| {
                let call = self.provider.compute_route(
                    self.origin,
                    self.destination,
                    waypoints,
                    strategy.avoid_major_roads,
                );
                async move { (index, call.await) }
            })
            .collect();

        let deadline = sleep_until(self.deadline);
        tokio::pin!(deadline);

        let interrupted = loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => break Some(Termination::Cancelled),

                _ = &mut deadline => break Some(Termination::DeadlineExceeded),

                next = pending.next() => match next {
                    Some((index, result)) => slots[index] = Some(result),
                    None => break None,
                },
            }
        };

        (slots, interrupted)
    }

    /// Scores and evaluates one provider route. Returns true on accept.
    fn consider(&mut self, strategy: SearchStrategy, route: RouteResult) -> bool {
        let candidate = self.score(route);
        let decision = evaluate(
            &candidate,
            self.baseline.as_ref(),
            self.best.as_ref().map(|(best, _)| best),
        );

        debug!(
            phase = ?strategy.phase,
            hotspots = candidate.hotspot_count(),
            distance_m = candidate.route.distance_m,
            duration_s = candidate.route.duration_s,
            ?decision,
            "Evaluated candidate"
        );

        match decision {
            Decision::Accept => {
                self.best = Some((candidate, Some(strategy)));
                true
            }
            Decision::Replace => {
                self.best = Some((candidate, Some(strategy)));
                false
            }
            Decision::Discard => false,
        }
    }

    fn score(&self, route: RouteResult) -> ScoredRoute<H::Id> {
        let hotspots_on_path = hotspot_ids_near(&route, self.hotspots, self.radius_m);
        ScoredRoute {
            route,
            hotspots_on_path,
        }
    }

    /// Races `future` against the deadline and the cancellation token.
    async fn bounded<F: Future>(&self, future: F) -> Result<F::Output, Termination> {
        tokio::select! {
            biased;

            _ = self.cancel.cancelled() => Err(Termination::Cancelled),

            _ = sleep_until(self.deadline) => Err(Termination::DeadlineExceeded),

            output = future => Ok(output),
        }
    }

    fn finish(mut self, termination: Termination) -> SearchOutcome<H::Id> {
        let elapsed = self.started.elapsed();
        if self.best.is_none() && self.candidates > 0 {
            debug!("No candidate passed fewer hotspots than the baseline");
            self.best = self.baseline.clone().map(|route| (route, None));
        }
        let (best_route, best_strategy) = match self.best {
            Some((route, strategy)) => (Some(route), strategy),
            None => (None, None),
        };

        info!(
            ?termination,
            best_hotspots = best_route.as_ref().map(ScoredRoute::hotspot_count),
            baseline_hotspots = self.baseline.as_ref().map(ScoredRoute::hotspot_count),
            strategies_attempted = self.attempted,
            provider_failures = self.failures,
            elapsed_ms = elapsed.as_millis() as u64,
            "Safe route search finished"
        );

        SearchOutcome {
            best_route,
            best_strategy,
            baseline: self.baseline,
            strategies_attempted: self.attempted,
            provider_failures: self.failures,
            elapsed,
            termination,
        }
    }
}
