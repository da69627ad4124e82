//! batch-planner core
//!
//! Partitions delivery orders into time-feasible, size-bounded batches that
//! start from a shared depot, then enriches each batch with real route
//! metrics from an external routing provider.

pub mod error;
pub mod config;
pub mod logging;
pub mod model;
pub mod traits;
pub mod haversine;
pub mod feasibility;
pub mod builder;
pub mod routing;
pub mod osrm;
pub mod polyline;
pub mod orchestrator;

pub use builder::{build_batches, BatchBuilder};
pub use config::BatchPolicy;
pub use error::{PlannerError, RoutingError};
pub use feasibility::FeasibilityEvaluator;
pub use model::{Batch, BatchingResult, Coordinate, Order, StopSequence, TimeWindow};
pub use orchestrator::assign_batches;
pub use routing::RouteRequestAdapter;
pub use traits::RouteProvider;
