//! Live OSRM checks against a dockerized `osrm-routed`.
//!
//! Needs docker and a dataset already prepared with the MLD pipeline
//! (`osrm-extract`, `osrm-partition`, `osrm-customize`) for a region covering
//! the Klang Valley, e.g. the Geofabrik `malaysia-singapore-brunei` extract.
//!
//! `OSRM_DATA_DIR` is the directory holding the prepared files and
//! `OSRM_DATASET` the base file name (default `malaysia-singapore-brunei-latest.osrm`).
//!
//! Run with `cargo test --test osrm_integration -- --ignored`.

mod fixtures;

use std::env;
use std::time::{Duration, Instant};

use testcontainers::core::{IntoContainerPort, Mount};
use testcontainers::runners::SyncRunner;
use testcontainers::{Container, GenericImage, ImageExt, ReuseDirective, TestcontainersError};

use batch_planner::config::BatchPolicy;
use batch_planner::error::RoutingError;
use batch_planner::orchestrator::assign_batches;
use batch_planner::osrm::{OsrmClient, OsrmConfig};
use batch_planner::traits::{RouteProvider, RouteRequest, RouteResponse};

use fixtures::{TestOrder, HQ, KLANG_VALLEY, NEAR_HQ};

fn osrm_container() -> Result<(Container<GenericImage>, String), TestcontainersError> {
    let data_dir = env::var("OSRM_DATA_DIR").unwrap_or_else(|_| "osrm-data".to_string());
    let dataset = env::var("OSRM_DATASET")
        .unwrap_or_else(|_| "malaysia-singapore-brunei-latest.osrm".to_string());

    let image = GenericImage::new("osrm/osrm-backend", "latest")
        .with_exposed_port(5000.tcp())
        .with_mount(Mount::bind_mount(data_dir, "/data"))
        .with_cmd(vec![
            "osrm-routed".to_string(),
            "--algorithm".to_string(),
            "mld".to_string(),
            format!("/data/{}", dataset),
        ])
        .with_container_name("osrm-klang-valley-mld")
        .with_startup_timeout(Duration::from_secs(60))
        .with_reuse(ReuseDirective::Always);

    let container = image.start()?;
    let port = container.get_host_port_ipv4(5000.tcp())?;
    let base_url = format!("http://127.0.0.1:{}", port);

    Ok((container, base_url))
}

fn client_for(base_url: &str) -> OsrmClient {
    OsrmClient::new(OsrmConfig {
        base_url: base_url.to_string(),
        profile: "car".to_string(),
        timeout_secs: 10,
    })
    .expect("build OSRM client")
}

/// `osrm-routed` accepts connections before the dataset is fully loaded.
fn route_when_ready(client: &OsrmClient, request: &RouteRequest) -> Result<RouteResponse, RoutingError> {
    let start = Instant::now();
    loop {
        match client.route(request) {
            Err(RoutingError::Http(err)) if start.elapsed() < Duration::from_secs(30) => {
                eprintln!("OSRM not ready yet: {}", err);
                std::thread::sleep(Duration::from_millis(500));
            }
            other => return other,
        }
    }
}

#[test]
#[ignore = "requires docker and a prepared OSRM dataset"]
fn osrm_route_returns_one_leg_per_stop() {
    let (container, base_url) = osrm_container().expect("start OSRM container");
    let client = client_for(&base_url);

    let request = RouteRequest {
        origin: HQ.coordinate(),
        waypoints: vec![KLANG_VALLEY[0].coordinate(), KLANG_VALLEY[1].coordinate()],
        destination: KLANG_VALLEY[2].coordinate(),
        optimize_waypoints: false,
    };
    let response = route_when_ready(&client, &request).expect("route");

    assert_eq!(response.legs.len(), 3);
    assert_eq!(response.waypoint_order, vec![0, 1]);
    assert!(response.legs.iter().all(|leg| leg.distance_meters > 0.0));
    assert!(response.geometry.is_some_and(|g| g.len() > 2));

    drop(container);
}

#[test]
#[ignore = "requires docker and a prepared OSRM dataset"]
fn osrm_trip_keeps_endpoints_and_permutes_waypoints() {
    let (container, base_url) = osrm_container().expect("start OSRM container");
    let client = client_for(&base_url);

    let request = RouteRequest {
        origin: HQ.coordinate(),
        waypoints: KLANG_VALLEY[..4].iter().map(|l| l.coordinate()).collect(),
        destination: KLANG_VALLEY[4].coordinate(),
        optimize_waypoints: true,
    };
    let response = route_when_ready(&client, &request).expect("trip");

    assert_eq!(response.legs.len(), 5);
    let mut order = response.waypoint_order.clone();
    order.sort_unstable();
    assert_eq!(order, vec![0, 1, 2, 3]);

    drop(container);
}

#[test]
#[ignore = "requires docker and a prepared OSRM dataset"]
fn osrm_backed_assignment_routes_every_batch() {
    let (container, base_url) = osrm_container().expect("start OSRM container");
    let client = client_for(&base_url);

    // Warm up so the first batch does not race dataset loading.
    let warm_up = RouteRequest {
        origin: HQ.coordinate(),
        waypoints: vec![],
        destination: NEAR_HQ[0].coordinate(),
        optimize_waypoints: false,
    };
    route_when_ready(&client, &warm_up).expect("warm-up route");

    let orders: Vec<_> = NEAR_HQ
        .iter()
        .chain(KLANG_VALLEY)
        .enumerate()
        .map(|(i, location)| TestOrder::new(&format!("{:03}", i + 1)).at(location).build())
        .collect();

    let result = assign_batches(&orders, HQ.coordinate(), &BatchPolicy::default(), &client)
        .expect("assignment");

    assert!(result.warnings.is_empty(), "unexpected warnings: {:?}", result.warnings);
    assert_eq!(result.total_deliveries, orders.len());
    for batch in &result.batches {
        assert!(batch.total_distance_meters > 0.0);
        assert_eq!(batch.destinations.len(), batch.stops.len());
    }

    drop(container);
}
