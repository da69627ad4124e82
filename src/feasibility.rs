//! Time-window feasibility simulation for a single batch.

use crate::config::BatchPolicy;
use crate::haversine::{distance_km, travel_seconds_at};
use crate::model::{Coordinate, Order};

/// Outcome of simulating a stop sequence that satisfied every constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    /// Service start at each stop, in sequence order.
    pub service_starts: Vec<i64>,
    /// Clock value after the last stop's service.
    pub completion_time: i64,
    /// Seconds from the first stop's window start to completion.
    pub elapsed_secs: i64,
}

/// Decides whether a stop sequence can be serviced as one continuous trip
/// from the depot.
#[derive(Debug, Clone, Copy)]
pub struct FeasibilityEvaluator<'a> {
    policy: &'a BatchPolicy,
}

impl<'a> FeasibilityEvaluator<'a> {
    pub fn new(policy: &'a BatchPolicy) -> Self {
        Self { policy }
    }

    pub fn is_feasible<'o, I>(&self, sequence: I, depot: Coordinate) -> bool
    where
        I: IntoIterator<Item = &'o Order>,
    {
        self.simulate(sequence, depot).is_some()
    }

    /// Walks the sequence with a simulated clock.
    ///
    /// The clock starts at the first stop's window start, or later when a
    /// depot departure time is configured and the drive out takes longer.
    /// Arriving early waits for the window; arriving after the window end
    /// fails immediately. Returns `None` for an empty or infeasible sequence.
    pub fn simulate<'o, I>(&self, sequence: I, depot: Coordinate) -> Option<Schedule>
    where
        I: IntoIterator<Item = &'o Order>,
    {
        let service = self.policy.service_time_per_stop_secs;
        let mut stops = sequence.into_iter();

        let first = stops.next()?;
        let origin = first.window.start;
        let mut time = match self.policy.departure_time {
            Some(departure) => departure + self.travel(depot, first.coordinate),
            None => origin,
        };

        let mut service_starts = Vec::new();
        let mut current = first;
        loop {
            if time < current.window.start {
                time = current.window.start;
            }
            if time > current.window.end {
                return None;
            }
            service_starts.push(time);
            time += service;

            match stops.next() {
                Some(next) => {
                    time += self.travel(current.coordinate, next.coordinate);
                    current = next;
                }
                None => break,
            }
        }

        let elapsed_secs = time - origin;
        if elapsed_secs as f64 > self.policy.route_duration_budget_secs() {
            return None;
        }

        Some(Schedule {
            service_starts,
            completion_time: time,
            elapsed_secs,
        })
    }

    fn travel(&self, from: Coordinate, to: Coordinate) -> i64 {
        travel_seconds_at(distance_km(from, to), self.policy.assumed_average_speed_kmh).round() as i64
    }
}
