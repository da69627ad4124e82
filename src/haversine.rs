//! Great-circle geometry and the straight-line routing fallback.
//!
//! Distances ignore the road network. They drive clustering decisions and
//! feasibility pre-checks; real leg metrics come from a [`RouteProvider`].

use crate::error::RoutingError;
use crate::model::Coordinate;
use crate::polyline::Polyline;
use crate::traits::{RouteLeg, RouteProvider, RouteRequest, RouteResponse};

/// Average urban driving speed assumption for time estimation.
pub const ASSUMED_AVERAGE_SPEED_KMH: f64 = 30.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points in kilometers.
///
/// NaN inputs propagate to a NaN result.
pub fn distance_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Travel time in seconds at [`ASSUMED_AVERAGE_SPEED_KMH`].
pub fn estimated_travel_seconds(distance_km: f64) -> f64 {
    travel_seconds_at(distance_km, ASSUMED_AVERAGE_SPEED_KMH)
}

/// Travel time in seconds at an explicit speed.
pub fn travel_seconds_at(distance_km: f64, speed_kmh: f64) -> f64 {
    distance_km / speed_kmh * 3600.0
}

/// Straight-line route provider.
///
/// Less accurate than OSRM (ignores roads) but always available. Never
/// reorders waypoints.
#[derive(Debug, Clone)]
pub struct HaversineRouter {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineRouter {
    fn default() -> Self {
        Self {
            speed_kmh: ASSUMED_AVERAGE_SPEED_KMH,
        }
    }
}

impl HaversineRouter {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }
}

impl RouteProvider for HaversineRouter {
    fn route(&self, request: &RouteRequest) -> Result<RouteResponse, RoutingError> {
        let mut points = Vec::with_capacity(request.waypoints.len() + 2);
        points.push(request.origin);
        points.extend(request.waypoints.iter().copied());
        points.push(request.destination);

        if points.iter().any(|point| !point.is_valid()) {
            return Err(RoutingError::NoRoute(
                "request contains an invalid coordinate".to_string(),
            ));
        }

        let legs = points
            .windows(2)
            .map(|pair| {
                let km = distance_km(pair[0], pair[1]);
                RouteLeg {
                    distance_meters: km * 1000.0,
                    duration_seconds: travel_seconds_at(km, self.speed_kmh),
                    start_address: format_point(pair[0]),
                    end_address: format_point(pair[1]),
                }
            })
            .collect();

        Ok(RouteResponse {
            legs,
            waypoint_order: (0..request.waypoints.len()).collect(),
            geometry: Some(Polyline::new(points.iter().map(Coordinate::as_tuple).collect())),
        })
    }
}

fn format_point(point: Coordinate) -> String {
    format!("{:.6},{:.6}", point.lat, point.lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KL: Coordinate = Coordinate::new(3.1390, 101.6869);
    const PJ: Coordinate = Coordinate::new(3.1073, 101.6067);

    #[test]
    fn test_haversine_same_point() {
        assert_eq!(distance_km(KL, KL), 0.0);
    }

    #[test]
    fn test_haversine_symmetric() {
        assert_eq!(distance_km(KL, PJ), distance_km(PJ, KL));
    }

    #[test]
    fn test_haversine_known_distance() {
        // Kuala Lumpur to Singapore, ~315 km
        let singapore = Coordinate::new(1.3521, 103.8198);
        let dist = distance_km(KL, singapore);
        assert!(dist > 300.0 && dist < 330.0, "KL to SG should be ~315km, got {}", dist);
    }

    #[test]
    fn test_nan_propagates() {
        let dist = distance_km(Coordinate::new(f64::NAN, 101.0), KL);
        assert!(dist.is_nan());
    }

    #[test]
    fn test_reasonable_travel_time() {
        // 10 km at 30 km/h = 20 minutes
        assert_eq!(estimated_travel_seconds(10.0), 1200.0);
        assert_eq!(travel_seconds_at(10.0, 40.0), 900.0);
    }

    #[test]
    fn test_router_legs_follow_request_order() {
        let router = HaversineRouter::default();
        let request = RouteRequest {
            origin: KL,
            destination: KL,
            waypoints: vec![PJ, Coordinate::new(3.0738, 101.5183)],
            optimize_waypoints: true,
        };

        let response = router.route(&request).expect("straight-line route");
        assert_eq!(response.legs.len(), 3);
        assert_eq!(response.waypoint_order, vec![0, 1]);
        let expected = distance_km(KL, PJ) * 1000.0;
        assert!((response.legs[0].distance_meters - expected).abs() < 1e-6);
    }

    #[test]
    fn test_router_rejects_invalid_points() {
        let router = HaversineRouter::default();
        let request = RouteRequest {
            origin: KL,
            destination: Coordinate::new(f64::NAN, 0.0),
            waypoints: vec![],
            optimize_waypoints: false,
        };
        assert!(matches!(router.route(&request), Err(RoutingError::NoRoute(_))));
    }
}
