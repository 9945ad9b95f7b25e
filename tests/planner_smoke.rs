mod fixtures;

use safe_route_planner::haversine::HaversineRouter;
use safe_route_planner::{SearchConfig, SimpleHotspot, Termination, plan_safe_route};

use fixtures::{BRAAMFONTEIN, JOHANNESBURG_CBD, MIDPOINT_INCIDENT};

#[tokio::test]
async fn routes_around_midpoint_incident() {
    let router = HaversineRouter::default();
    let hotspots = vec![SimpleHotspot::new("incident", MIDPOINT_INCIDENT.coords())];

    let outcome = plan_safe_route(
        &router,
        JOHANNESBURG_CBD.coords(),
        BRAAMFONTEIN.coords(),
        &hotspots,
        &SearchConfig::default(),
    )
    .await;

    let baseline = outcome.baseline.as_ref().expect("baseline route");
    assert_eq!(baseline.hotspots_on_path, vec!["incident"]);

    // Straight-line detours are always much longer than the baseline, so
    // nothing is accepted early; the best clear route wins.
    assert_eq!(outcome.best_hotspot_count(), Some(0));
    assert_eq!(outcome.termination, Termination::Exhausted);
    assert!(outcome.best_distance_m() > outcome.baseline_distance_m());
    assert_eq!(outcome.provider_failures, 0);
}
