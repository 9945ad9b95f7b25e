//! Live OSRM tests.
//!
//! Needs docker and a Gauteng extract already prepared for the MLD
//! algorithm (`osrm-extract`, `osrm-partition`, `osrm-customize`) under
//! `$OSRM_DATA_DIR/gauteng`. Run with `cargo test -- --ignored`.

mod fixtures;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use testcontainers::core::{IntoContainerPort, Mount, WaitFor};
use testcontainers::runners::SyncRunner;
use testcontainers::{Container, GenericImage, ImageExt, ReuseDirective, TestcontainersError};

use safe_route_planner::osrm::{OsrmClient, OsrmConfig};
use safe_route_planner::{RoutingProvider, SearchConfig, Termination, plan_safe_route};

use fixtures::{BRAAMFONTEIN, JOHANNESBURG_CBD, MIDPOINT_INCIDENT, SANDTON, hotspots};

const DATASET: &str = "gauteng-latest.osrm";

fn data_dir() -> PathBuf {
    let root = env::var("OSRM_DATA_DIR").unwrap_or_else(|_| "osrm-data".to_string());
    let root = PathBuf::from(root);
    let root = if root.is_absolute() {
        root
    } else {
        env::current_dir().map(|dir| dir.join(&root)).unwrap_or(root)
    };
    root.join("gauteng")
}

fn osrm_container() -> Result<(Container<GenericImage>, String), TestcontainersError> {
    let data_dir = data_dir();
    let partition = data_dir.join(DATASET).with_extension("osrm.partition");
    if !partition.exists() {
        return Err(TestcontainersError::other(format!(
            "no prepared dataset at {}",
            data_dir.display()
        )));
    }

    let image = GenericImage::new("osrm/osrm-backend", "latest")
        .with_wait_for(WaitFor::message_on_stdout("running and waiting for requests"))
        .with_exposed_port(5000.tcp())
        .with_mount(Mount::bind_mount(data_dir.to_string_lossy().to_string(), "/data"))
        .with_cmd(vec![
            "osrm-routed".to_string(),
            "--algorithm".to_string(),
            "mld".to_string(),
            format!("/data/{}", DATASET),
        ])
        .with_container_name("osrm-gauteng-mld")
        .with_startup_timeout(Duration::from_secs(30))
        .with_reuse(ReuseDirective::Always);

    let container = image.start()?;
    let port = container.get_host_port_ipv4(5000.tcp())?;
    Ok((container, format!("http://127.0.0.1:{}", port)))
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("build tokio runtime")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn client(base_url: String) -> OsrmClient {
    OsrmClient::new(OsrmConfig {
        base_url,
        ..OsrmConfig::default()
    })
    .expect("build OSRM client")
}

#[test]
#[ignore = "requires docker and a prepared OSRM dataset"]
fn osrm_route_has_geometry() {
    init_tracing();
    let (container, base_url) = osrm_container().expect("start OSRM container");
    let client = client(base_url);

    let route = runtime()
        .block_on(client.compute_route(JOHANNESBURG_CBD.coords(), SANDTON.coords(), &[], false))
        .expect("route between CBD and Sandton");

    assert!(route.distance_m > 10_000.0, "distance {}", route.distance_m);
    assert!(route.duration_s > 0.0);
    let geometry = route.geometry.expect("full overview geometry");
    assert!(geometry.points().len() > 10);

    drop(container);
}

#[test]
#[ignore = "requires docker and a prepared OSRM dataset"]
fn osrm_plans_around_incident() {
    init_tracing();
    let (container, base_url) = osrm_container().expect("start OSRM container");
    let client = client(base_url);
    let incident = hotspots(&[MIDPOINT_INCIDENT]);
    let config = SearchConfig {
        deadline_ms: 15_000,
        ..SearchConfig::default()
    };

    let outcome = runtime().block_on(plan_safe_route(
        &client,
        JOHANNESBURG_CBD.coords(),
        BRAAMFONTEIN.coords(),
        &incident,
        &config,
    ));

    assert!(outcome.baseline.is_some(), "baseline failed: {:?}", outcome.termination);
    assert!(outcome.best_route.is_some());
    if outcome.termination != Termination::BaselineClear {
        let baseline = outcome.baseline.as_ref().map(|route| route.hotspot_count());
        assert!(outcome.best_hotspot_count() <= baseline);
    }

    drop(container);
}
