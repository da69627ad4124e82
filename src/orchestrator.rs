//! End-to-end batch assignment: filter, build, route, assemble.

use rayon::prelude::*;

use crate::builder::BatchBuilder;
use crate::config::BatchPolicy;
use crate::error::{PlannerError, Result};
use crate::model::{Batch, BatchWarning, BatchingResult, Coordinate, ExcludedOrder, Order};
use crate::routing::RouteRequestAdapter;
use crate::traits::RouteProvider;

/// Assigns `orders` to routed batches departing from `depot`.
///
/// Only an invalid policy or depot fails the run. Orders without a usable
/// coordinate are listed in `excluded`; batches whose routing call fails are
/// dropped and listed in `warnings`. Routing calls run concurrently, at most
/// `policy.max_concurrent_requests` at a time.
pub fn assign_batches<P>(
    orders: &[Order],
    depot: Coordinate,
    policy: &BatchPolicy,
    provider: &P,
) -> Result<BatchingResult>
where
    P: RouteProvider + Sync + ?Sized,
{
    policy.validate()?;
    if !depot.is_valid() {
        return Err(PlannerError::Config(format!(
            "depot coordinate ({}, {}) is not a valid location",
            depot.lat, depot.lng
        )));
    }

    let (valid, excluded) = partition_orders(orders);
    if valid.is_empty() {
        tracing::info!(excluded = excluded.len(), "No orders to batch");
        return Ok(BatchingResult::from_batches(Vec::new(), excluded, Vec::new()));
    }

    let sequences = BatchBuilder::new(policy).build_batches(&valid, depot);
    tracing::info!(
        orders = valid.len(),
        batches = sequences.len(),
        "Built delivery batches"
    );

    let adapter = RouteRequestAdapter::new(provider, depot, policy);
    let workers = rayon::ThreadPoolBuilder::new()
        .num_threads(policy.max_concurrent_requests)
        .thread_name(|i| format!("batch-routing-{}", i))
        .build()?;

    let outcomes: Vec<std::result::Result<Batch, BatchWarning>> = workers.install(|| {
        sequences
            .into_par_iter()
            .enumerate()
            .map(|(index, sequence)| {
                let batch_id = format!("batch-{}", index + 1);
                let order_ids = sequence.order_ids();
                adapter.enrich(batch_id.clone(), sequence).map_err(|err| {
                    tracing::warn!(batch = %batch_id, error = %err, "Dropping batch after routing failure");
                    BatchWarning {
                        batch_id,
                        order_ids,
                        message: err.to_string(),
                    }
                })
            })
            .collect()
    });

    let mut batches = Vec::new();
    let mut warnings = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(batch) => batches.push(batch),
            Err(warning) => warnings.push(warning),
        }
    }

    let result = BatchingResult::from_batches(batches, excluded, warnings);
    tracing::info!(
        batches = result.total_batches,
        deliveries = result.total_deliveries,
        dropped = result.warnings.len(),
        excluded = result.excluded.len(),
        "Batch assignment complete"
    );
    Ok(result)
}

/// Splits orders into those with a usable coordinate and exclusion records.
fn partition_orders(orders: &[Order]) -> (Vec<Order>, Vec<ExcludedOrder>) {
    let mut valid = Vec::with_capacity(orders.len());
    let mut excluded = Vec::new();

    for order in orders {
        if order.coordinate.is_valid() {
            valid.push(order.clone());
        } else {
            tracing::warn!(
                order = %order.id,
                lat = order.coordinate.lat,
                lng = order.coordinate.lng,
                "Excluding order without a usable coordinate"
            );
            excluded.push(ExcludedOrder {
                order_id: order.id.clone(),
                reason: format!(
                    "unusable coordinate ({}, {})",
                    order.coordinate.lat, order.coordinate.lng
                ),
            });
        }
    }

    (valid, excluded)
}
