//! Boundary between finished stop sequences and the routing provider.

use crate::config::BatchPolicy;
use crate::error::RoutingError;
use crate::model::{Batch, Coordinate, StopEstimate, StopSequence};
use crate::traits::{RouteProvider, RouteRequest, RouteResponse};

/// Turns a [`StopSequence`] into an enriched [`Batch`] with one provider call.
pub struct RouteRequestAdapter<'a, P: ?Sized> {
    provider: &'a P,
    depot: Coordinate,
    policy: &'a BatchPolicy,
}

impl<'a, P> RouteRequestAdapter<'a, P>
where
    P: RouteProvider + ?Sized,
{
    pub fn new(provider: &'a P, depot: Coordinate, policy: &'a BatchPolicy) -> Self {
        Self {
            provider,
            depot,
            policy,
        }
    }

    /// Depot → every stop but the last (as waypoints) → last stop.
    pub fn request_for(&self, sequence: &StopSequence) -> Option<RouteRequest> {
        let (last, rest) = sequence.stops.split_last()?;
        let waypoints: Vec<Coordinate> = rest.iter().map(|order| order.coordinate).collect();

        Some(RouteRequest {
            origin: self.depot,
            destination: last.coordinate,
            optimize_waypoints: self.policy.optimize_waypoints && waypoints.len() > 1,
            waypoints,
        })
    }

    /// Routes the sequence and decorates it with real leg metrics.
    ///
    /// When the provider reorders waypoints, stops are re-mapped onto its
    /// order before arrival times are computed.
    pub fn enrich(&self, id: impl Into<String>, sequence: StopSequence) -> Result<Batch, RoutingError> {
        let id = id.into();
        let request = self
            .request_for(&sequence)
            .ok_or_else(|| RoutingError::NoRoute(format!("batch {} has no stops", id)))?;

        let response = self.provider.route(&request)?;
        check_response(&request, &response)?;

        let sequence = reorder(sequence, &response.waypoint_order);
        let start_time = self
            .policy
            .departure_time
            .or_else(|| sequence.delivery_window().map(|window| window.start))
            .unwrap_or_default();

        let service = self.policy.service_time_per_stop_secs;
        let mut clock = start_time;
        let mut stops = Vec::with_capacity(sequence.len());
        for (order, leg) in sequence.stops.iter().zip(&response.legs) {
            clock += leg.duration_seconds.round() as i64;
            stops.push(StopEstimate {
                order_id: order.id.clone(),
                arrival_time: clock,
                leg_distance_meters: leg.distance_meters,
                leg_duration_seconds: leg.duration_seconds,
            });
            clock += service;
        }

        let total_distance_meters = response.legs.iter().map(|leg| leg.distance_meters).sum();
        let total_duration_seconds = response.legs.iter().map(|leg| leg.duration_seconds).sum::<f64>()
            + (service * sequence.len() as i64) as f64;

        tracing::debug!(
            batch = %id,
            stops = sequence.len(),
            distance_km = %format!("{:.2}", total_distance_meters / 1000.0),
            duration_min = %format!("{:.0}", total_duration_seconds / 60.0),
            "Enriched batch"
        );

        Ok(Batch {
            id,
            delivery_window: sequence.delivery_window(),
            destinations: response.legs.iter().map(|leg| leg.end_address.clone()).collect(),
            geometry: response.geometry,
            total_distance_meters,
            total_duration_seconds,
            start_time,
            estimated_completion_time: clock,
            stops,
            sequence,
        })
    }
}

fn check_response(request: &RouteRequest, response: &RouteResponse) -> Result<(), RoutingError> {
    let expected_legs = request.waypoints.len() + 1;
    if response.legs.len() != expected_legs {
        return Err(RoutingError::InvalidResponse(format!(
            "expected {} legs, got {}",
            expected_legs,
            response.legs.len()
        )));
    }

    let order = &response.waypoint_order;
    if order.is_empty() {
        return Ok(());
    }

    let mut seen = vec![false; request.waypoints.len()];
    let is_permutation = order.len() == seen.len()
        && order.iter().all(|&index| {
            index < seen.len() && !std::mem::replace(&mut seen[index], true)
        });
    if !is_permutation {
        return Err(RoutingError::InvalidResponse(format!(
            "waypoint order {:?} is not a permutation of {} waypoints",
            order,
            request.waypoints.len()
        )));
    }

    Ok(())
}

/// Applies the provider's waypoint order to every stop but the last.
///
/// An empty order means the provider kept the request order.
fn reorder(sequence: StopSequence, waypoint_order: &[usize]) -> StopSequence {
    if waypoint_order.is_empty() {
        return sequence;
    }

    let mut slots: Vec<Option<_>> = sequence.stops.into_iter().map(Some).collect();
    let last = slots.pop().flatten();
    let mut stops: Vec<_> = waypoint_order
        .iter()
        .filter_map(|&index| slots.get_mut(index).and_then(Option::take))
        .collect();
    stops.extend(last);
    StopSequence::new(stops)
}
