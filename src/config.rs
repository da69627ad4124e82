//! Batching policy.
//!
//! Every constant the batching core depends on lives here so callers can
//! tune it per run instead of recompiling.

use std::env;
use std::str::FromStr;

use crate::error::{PlannerError, Result};
use crate::model::Coordinate;

/// BloomThis HQ, the depot every batch departs from unless told otherwise.
pub const DEFAULT_DEPOT: Coordinate = Coordinate::new(3.100240985840765, 101.63122341164973);

#[derive(Debug, Clone, PartialEq)]
pub struct BatchPolicy {
    /// Maximum number of stops in one batch.
    pub max_batch_size: usize,
    /// Dwell time at every stop, in seconds.
    pub service_time_per_stop_secs: i64,
    /// Ceiling on a batch's elapsed time from its first window start.
    pub max_route_duration_hours: f64,
    /// Speed used for straight-line travel estimates.
    pub assumed_average_speed_kmh: f64,
    /// Score per stop in a candidate batch.
    pub stop_count_weight: f64,
    /// Seconds of unused duration budget worth one score point.
    pub duration_bonus_divisor: f64,
    /// Earliest depot departure (unix seconds).
    pub departure_time: Option<i64>,
    /// Upper bound on routing calls in flight at once.
    pub max_concurrent_requests: usize,
    /// Let the routing provider reorder intermediate stops.
    pub optimize_waypoints: bool,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            max_batch_size: 10,
            service_time_per_stop_secs: 15 * 60,
            max_route_duration_hours: 4.0,
            assumed_average_speed_kmh: 30.0,
            stop_count_weight: 10.0,
            duration_bonus_divisor: 60.0,
            departure_time: None,
            max_concurrent_requests: 4,
            optimize_waypoints: true,
        }
    }
}

impl BatchPolicy {
    pub fn route_duration_budget_secs(&self) -> f64 {
        self.max_route_duration_hours * 3600.0
    }

    /// Rejects policies the batching core cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_batch_size == 0 {
            return Err(invalid("max_batch_size must be at least 1"));
        }
        if self.service_time_per_stop_secs < 0 {
            return Err(invalid("service_time_per_stop_secs must not be negative"));
        }
        if !(self.max_route_duration_hours.is_finite() && self.max_route_duration_hours > 0.0) {
            return Err(invalid("max_route_duration_hours must be a positive number"));
        }
        if !(self.assumed_average_speed_kmh.is_finite() && self.assumed_average_speed_kmh > 0.0) {
            return Err(invalid("assumed_average_speed_kmh must be a positive number"));
        }
        if !self.stop_count_weight.is_finite() {
            return Err(invalid("stop_count_weight must be finite"));
        }
        if !(self.duration_bonus_divisor.is_finite() && self.duration_bonus_divisor > 0.0) {
            return Err(invalid("duration_bonus_divisor must be a positive number"));
        }
        if self.max_concurrent_requests == 0 {
            return Err(invalid("max_concurrent_requests must be at least 1"));
        }
        Ok(())
    }

    /// Loads overrides from the environment (and a `.env` file, if present).
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a policy from defaults plus whatever `lookup` returns per key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let policy = Self {
            max_batch_size: parse_or(&lookup, "BATCH_MAX_SIZE", defaults.max_batch_size)?,
            service_time_per_stop_secs: parse_or(
                &lookup,
                "BATCH_SERVICE_TIME_SECS",
                defaults.service_time_per_stop_secs,
            )?,
            max_route_duration_hours: parse_or(
                &lookup,
                "BATCH_MAX_ROUTE_HOURS",
                defaults.max_route_duration_hours,
            )?,
            assumed_average_speed_kmh: parse_or(
                &lookup,
                "BATCH_AVERAGE_SPEED_KMH",
                defaults.assumed_average_speed_kmh,
            )?,
            stop_count_weight: parse_or(&lookup, "BATCH_STOP_WEIGHT", defaults.stop_count_weight)?,
            duration_bonus_divisor: parse_or(
                &lookup,
                "BATCH_DURATION_DIVISOR",
                defaults.duration_bonus_divisor,
            )?,
            departure_time: match lookup("BATCH_DEPARTURE_TIME") {
                Some(raw) => Some(parse_value("BATCH_DEPARTURE_TIME", &raw)?),
                None => defaults.departure_time,
            },
            max_concurrent_requests: parse_or(
                &lookup,
                "BATCH_MAX_CONCURRENT_REQUESTS",
                defaults.max_concurrent_requests,
            )?,
            optimize_waypoints: parse_or(
                &lookup,
                "BATCH_OPTIMIZE_WAYPOINTS",
                defaults.optimize_waypoints,
            )?,
        };

        policy.validate()?;
        Ok(policy)
    }
}

fn invalid(message: &str) -> PlannerError {
    PlannerError::InvalidPolicy(message.to_string())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| PlannerError::Config(format!("Invalid {}: {:?}", key, raw)))
}
