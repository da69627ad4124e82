//! OSRM HTTP adapter for driving routes.
//!
//! Plain routes use the `route` service. Waypoint optimization uses the
//! `trip` service with the first and last coordinates pinned, which keeps the
//! depot as origin and the final stop as destination.

use std::env;

use serde::Deserialize;

use crate::error::{PlannerError, RoutingError};
use crate::polyline::Polyline;
use crate::traits::{RouteLeg, RouteProvider, RouteRequest, RouteResponse};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

impl OsrmConfig {
    /// Reads `OSRM_BASE_URL`, `OSRM_PROFILE` and `OSRM_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, PlannerError> {
        dotenv::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            base_url: env::var("OSRM_BASE_URL").unwrap_or(defaults.base_url),
            profile: env::var("OSRM_PROFILE").unwrap_or(defaults.profile),
            timeout_secs: match env::var("OSRM_TIMEOUT_SECS") {
                Ok(raw) => raw
                    .parse()
                    .map_err(|_| PlannerError::Config(format!("Invalid OSRM_TIMEOUT_SECS: {:?}", raw)))?,
                Err(_) => defaults.timeout_secs,
            },
        })
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn url_for(&self, request: &RouteRequest) -> String {
        let coords = std::iter::once(&request.origin)
            .chain(&request.waypoints)
            .chain(std::iter::once(&request.destination))
            .map(|c| format!("{:.6},{:.6}", c.lng, c.lat))
            .collect::<Vec<_>>()
            .join(";");

        let base = self.config.base_url.trim_end_matches('/');
        if request.optimize_waypoints {
            format!(
                "{}/trip/v1/{}/{}?source=first&destination=last&roundtrip=false&overview=full&geometries=geojson&steps=false",
                base, self.config.profile, coords
            )
        } else {
            format!(
                "{}/route/v1/{}/{}?overview=full&geometries=geojson&steps=false",
                base, self.config.profile, coords
            )
        }
    }
}

impl RouteProvider for OsrmClient {
    fn route(&self, request: &RouteRequest) -> Result<RouteResponse, RoutingError> {
        let url = self.url_for(request);

        tracing::debug!(
            waypoints = request.waypoints.len(),
            optimize = request.optimize_waypoints,
            profile = %self.config.profile,
            "OSRM request"
        );

        let response = self.client.get(url).send()?;
        let status = response.status();
        let text = response.text()?;

        let body: OsrmResponse = serde_json::from_str(&text).map_err(|e| {
            if status.is_success() {
                RoutingError::InvalidResponse(format!("failed to parse OSRM response: {}", e))
            } else {
                RoutingError::NoRoute(format!("HTTP {}: {}", status, text))
            }
        })?;

        into_route_response(body, request.waypoints.len())
    }
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
    #[serde(default)]
    trips: Vec<OsrmRoute>,
    #[serde(default)]
    waypoints: Vec<OsrmWaypoint>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    legs: Vec<OsrmLeg>,
    #[serde(default)]
    geometry: Option<OsrmGeometry>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    distance: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct OsrmWaypoint {
    #[serde(default)]
    name: String,
    location: [f64; 2],
    /// Position in the trip; only present on `trip` responses.
    #[serde(default)]
    waypoint_index: Option<usize>,
}

fn into_route_response(body: OsrmResponse, waypoint_count: usize) -> Result<RouteResponse, RoutingError> {
    if body.code != "Ok" {
        return Err(RoutingError::NoRoute(format!(
            "{}: {}",
            body.code,
            body.message.unwrap_or_default()
        )));
    }

    let route = body
        .trips
        .into_iter()
        .next()
        .or_else(|| body.routes.into_iter().next())
        .ok_or_else(|| RoutingError::NoRoute("no routes in response".to_string()))?;

    let point_count = waypoint_count + 2;
    if body.waypoints.len() != point_count {
        return Err(RoutingError::InvalidResponse(format!(
            "expected {} waypoints, got {}",
            point_count,
            body.waypoints.len()
        )));
    }

    // visit_order[p] = input index of the point driven to p-th.
    let mut visit_order: Vec<Option<usize>> = vec![None; point_count];
    for (input, waypoint) in body.waypoints.iter().enumerate() {
        let position = waypoint.waypoint_index.unwrap_or(input);
        match visit_order.get_mut(position) {
            Some(slot) if slot.is_none() => *slot = Some(input),
            _ => {
                return Err(RoutingError::InvalidResponse(format!(
                    "duplicate or out-of-range waypoint_index {}",
                    position
                )));
            }
        }
    }
    let visit_order: Vec<usize> = visit_order.into_iter().flatten().collect();
    if visit_order.first() != Some(&0) || visit_order.last() != Some(&(point_count - 1)) {
        return Err(RoutingError::InvalidResponse(
            "trip did not keep origin and destination fixed".to_string(),
        ));
    }

    if route.legs.len() != point_count - 1 {
        return Err(RoutingError::InvalidResponse(format!(
            "expected {} legs, got {}",
            point_count - 1,
            route.legs.len()
        )));
    }

    let label = |input: usize| {
        let waypoint = &body.waypoints[input];
        if waypoint.name.is_empty() {
            let [lng, lat] = waypoint.location;
            format!("{:.6},{:.6}", lat, lng)
        } else {
            waypoint.name.clone()
        }
    };

    let legs = route
        .legs
        .iter()
        .zip(visit_order.windows(2))
        .map(|(leg, pair)| RouteLeg {
            distance_meters: leg.distance,
            duration_seconds: leg.duration,
            start_address: label(pair[0]),
            end_address: label(pair[1]),
        })
        .collect();

    let waypoint_order = visit_order[1..point_count - 1]
        .iter()
        .map(|input| input - 1)
        .collect();

    Ok(RouteResponse {
        legs,
        waypoint_order,
        geometry: route
            .geometry
            .map(|geometry| Polyline::from_lng_lat(&geometry.coordinates)),
    })
}
