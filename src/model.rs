//! Data model shared by the batching core and its callers.
//!
//! All timestamps are unix seconds. Everything here serializes with serde so a
//! `BatchingResult` can be handed to any wire format.

use serde::{Deserialize, Serialize};

use crate::polyline::Polyline;

/// A point on the globe in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and within lat [-90, 90], lng [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

/// Delivery window `[start, end)` in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }
}

/// Opaque order payload. Carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
}

/// An immutable delivery request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub destination: String,
    pub coordinate: Coordinate,
    pub window: TimeWindow,
    #[serde(default)]
    pub details: OrderDetails,
}

impl Order {
    pub fn new(
        id: impl Into<String>,
        destination: impl Into<String>,
        coordinate: Coordinate,
        window: TimeWindow,
    ) -> Self {
        Self {
            id: id.into(),
            destination: destination.into(),
            coordinate,
            window,
            details: OrderDetails::default(),
        }
    }
}

/// Planned visiting order within one batch, depot excluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopSequence {
    pub stops: Vec<Order>,
}

impl StopSequence {
    pub fn new(stops: Vec<Order>) -> Self {
        Self { stops }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn order_ids(&self) -> Vec<String> {
        self.stops.iter().map(|order| order.id.clone()).collect()
    }

    /// Earliest window start to latest window end across all stops.
    pub fn delivery_window(&self) -> Option<TimeWindow> {
        let start = self.stops.iter().map(|order| order.window.start).min()?;
        let end = self.stops.iter().map(|order| order.window.end).max()?;
        Some(TimeWindow { start, end })
    }
}

/// Estimated arrival at one stop of an enriched batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopEstimate {
    pub order_id: String,
    pub arrival_time: i64,
    pub leg_distance_meters: f64,
    pub leg_duration_seconds: f64,
}

/// A finalized, route-enriched unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: String,
    pub sequence: StopSequence,
    pub total_distance_meters: f64,
    /// Leg durations plus per-stop service time.
    pub total_duration_seconds: f64,
    pub start_time: i64,
    pub estimated_completion_time: i64,
    pub stops: Vec<StopEstimate>,
    pub delivery_window: Option<TimeWindow>,
    /// End address of every leg, in visiting order.
    pub destinations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Polyline>,
}

/// An order left out of batching because it has no usable coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedOrder {
    pub order_id: String,
    pub reason: String,
}

/// A batch dropped because its routing call failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchWarning {
    pub batch_id: String,
    pub order_ids: Vec<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchingResult {
    pub batches: Vec<Batch>,
    pub total_batches: usize,
    pub total_deliveries: usize,
    pub average_deliveries_per_batch: f64,
    pub total_distance_meters: f64,
    pub total_duration_seconds: f64,
    #[serde(default)]
    pub excluded: Vec<ExcludedOrder>,
    #[serde(default)]
    pub warnings: Vec<BatchWarning>,
}

impl BatchingResult {
    /// Builds the result and its aggregate counts from the surviving batches.
    pub fn from_batches(
        batches: Vec<Batch>,
        excluded: Vec<ExcludedOrder>,
        warnings: Vec<BatchWarning>,
    ) -> Self {
        let total_batches = batches.len();
        let total_deliveries = batches.iter().map(|batch| batch.sequence.len()).sum();
        let average_deliveries_per_batch = if total_batches == 0 {
            0.0
        } else {
            total_deliveries as f64 / total_batches as f64
        };

        Self {
            total_distance_meters: batches.iter().map(|b| b.total_distance_meters).sum(),
            total_duration_seconds: batches.iter().map(|b| b.total_duration_seconds).sum(),
            batches,
            total_batches,
            total_deliveries,
            average_deliveries_per_batch,
            excluded,
            warnings,
        }
    }
}
