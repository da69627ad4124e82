//! Greedy batch construction.
//!
//! Orders are pre-sorted by distance from the depot. Each batch starts from
//! the closest unassigned order (the seed) and grows by repeatedly committing
//! the best-scoring feasible insertion, then a final append sweep.
//!
//! The working set is an immutable sorted slice of order references plus an
//! `assigned` flag per slot; batches are index lists into that slice until
//! they are emitted.

use crate::config::BatchPolicy;
use crate::feasibility::FeasibilityEvaluator;
use crate::haversine::distance_km;
use crate::model::{Coordinate, Order, StopSequence};

#[derive(Debug, Clone, Copy)]
struct Insertion {
    score: f64,
    slot: usize,
    position: usize,
}

/// Partitions an order pool into feasible, size-bounded stop sequences.
#[derive(Debug, Clone, Copy)]
pub struct BatchBuilder<'a> {
    policy: &'a BatchPolicy,
    evaluator: FeasibilityEvaluator<'a>,
}

impl<'a> BatchBuilder<'a> {
    pub fn new(policy: &'a BatchPolicy) -> Self {
        Self {
            policy,
            evaluator: FeasibilityEvaluator::new(policy),
        }
    }

    /// Builds batches in seeding order (roughly increasing depot distance).
    ///
    /// Every order lands in exactly one batch. A seed is never checked for
    /// feasibility on its own, so an order nobody can reach in time still
    /// becomes a one-stop batch.
    pub fn build_batches(&self, orders: &[Order], depot: Coordinate) -> Vec<StopSequence> {
        let pool = sort_by_depot_distance(orders, depot);
        let mut assigned = vec![false; pool.len()];
        let mut batches = Vec::new();
        let mut candidate: Vec<&Order> = Vec::with_capacity(self.policy.max_batch_size);

        while let Some(seed) = assigned.iter().position(|taken| !taken) {
            assigned[seed] = true;
            let mut batch = vec![seed];

            while batch.len() < self.policy.max_batch_size {
                let Some(best) = self.best_insertion(&pool, &assigned, &batch, depot, &mut candidate)
                else {
                    break;
                };
                batch.insert(best.position, best.slot);
                assigned[best.slot] = true;
            }

            self.append_sweep(&pool, &mut assigned, &mut batch, depot, &mut candidate);

            tracing::debug!(
                batch = batches.len() + 1,
                stops = batch.len(),
                seed = %pool[seed].id,
                "Built batch"
            );
            batches.push(StopSequence::new(
                batch.iter().map(|&slot| pool[slot].clone()).collect(),
            ));
        }

        batches
    }

    /// Scans every unassigned order at every position of `batch`.
    ///
    /// Ties keep the first candidate found, which makes the choice depend only
    /// on the sorted pool order.
    fn best_insertion<'o>(
        &self,
        pool: &[&'o Order],
        assigned: &[bool],
        batch: &[usize],
        depot: Coordinate,
        candidate: &mut Vec<&'o Order>,
    ) -> Option<Insertion> {
        if batch.len() + 1 > self.policy.max_batch_size {
            return None;
        }

        let budget = self.policy.route_duration_budget_secs();
        let mut best: Option<Insertion> = None;

        for (slot, &order) in pool.iter().enumerate() {
            if assigned[slot] {
                continue;
            }

            for position in 0..=batch.len() {
                candidate.clear();
                candidate.extend(batch[..position].iter().map(|&i| pool[i]));
                candidate.push(order);
                candidate.extend(batch[position..].iter().map(|&i| pool[i]));

                let Some(schedule) = self.evaluator.simulate(candidate.iter().copied(), depot)
                else {
                    continue;
                };

                let score = candidate.len() as f64 * self.policy.stop_count_weight
                    + (budget - schedule.elapsed_secs as f64) / self.policy.duration_bonus_divisor;

                if best.is_none_or(|current| score > current.score) {
                    best = Some(Insertion {
                        score,
                        slot,
                        position,
                    });
                }
            }
        }

        best
    }

    /// Appends any order whose plain append stays feasible, until a full pass
    /// adds nothing.
    fn append_sweep<'o>(
        &self,
        pool: &[&'o Order],
        assigned: &mut [bool],
        batch: &mut Vec<usize>,
        depot: Coordinate,
        candidate: &mut Vec<&'o Order>,
    ) {
        loop {
            let mut appended = false;

            for slot in 0..pool.len() {
                if batch.len() >= self.policy.max_batch_size {
                    return;
                }
                if assigned[slot] {
                    continue;
                }

                candidate.clear();
                candidate.extend(batch.iter().map(|&i| pool[i]));
                candidate.push(pool[slot]);

                if self.evaluator.is_feasible(candidate.iter().copied(), depot) {
                    batch.push(slot);
                    assigned[slot] = true;
                    appended = true;
                }
            }

            if !appended {
                return;
            }
        }
    }
}

/// Builds batches with the given policy. See [`BatchBuilder::build_batches`].
pub fn build_batches(orders: &[Order], depot: Coordinate, policy: &BatchPolicy) -> Vec<StopSequence> {
    BatchBuilder::new(policy).build_batches(orders, depot)
}

/// Stable sort by distance from the depot; equal distances keep input order.
fn sort_by_depot_distance(orders: &[Order], depot: Coordinate) -> Vec<&Order> {
    let mut keyed: Vec<(f64, &Order)> = orders
        .iter()
        .map(|order| (distance_km(depot, order.coordinate), order))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().map(|(_, order)| order).collect()
}
