//! Routing provider seam.
//!
//! The batching core never talks to a routing backend directly. Concrete
//! backends (OSRM, a straight-line fallback, test doubles) implement
//! [`RouteProvider`] and are injected into the orchestrator.

use serde::{Deserialize, Serialize};

use crate::error::RoutingError;
use crate::model::Coordinate;
use crate::polyline::Polyline;

/// One driving route request: origin, optional intermediate waypoints, destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub waypoints: Vec<Coordinate>,
    /// Allow the provider to reorder `waypoints`. Origin and destination stay fixed.
    pub optimize_waypoints: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub start_address: String,
    pub end_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    /// Legs in driving order; `waypoints.len() + 1` of them.
    pub legs: Vec<RouteLeg>,
    /// `waypoint_order[k]` is the request index of the k-th visited waypoint.
    pub waypoint_order: Vec<usize>,
    pub geometry: Option<Polyline>,
}

/// Provides real driving routes.
///
/// Implementations must be callable from several threads at once.
pub trait RouteProvider {
    fn route(&self, request: &RouteRequest) -> Result<RouteResponse, RoutingError>;
}

impl<P: RouteProvider + ?Sized> RouteProvider for &P {
    fn route(&self, request: &RouteRequest) -> Result<RouteResponse, RoutingError> {
        (**self).route(request)
    }
}
