use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use crate::{
    config::{Constraints, ObjectiveWeights},
    kpi::{KpiEvaluator, KpiMetrics},
    solution::Solution,
};

/// Seed of the search's own random source.
pub const SEARCH_RNG_SEED: u64 = 42;

/// Weighted cost of a set of metrics. Lower is better.
pub fn score(kpis: &KpiMetrics, weights: &ObjectiveWeights) -> f64 {
    weights.p90_travel_time * kpis.p90_travel_time
        + weights.passenger_weighted_travel_time * kpis.passenger_weighted_travel_time
        + weights.coverage_within_400m * (1.0 - kpis.coverage_ratio)
}

/// Drops the lowest-degree stop if it has fewer than two arcs.
///
/// Ties go to the stop that entered the graph first. The candidate is always
/// a fresh copy of `solution`, changed or not. The random source is not
/// consulted.
pub fn propose_move<R: Rng + ?Sized>(solution: &Solution, _rng: &mut R) -> Solution {
    let mut candidate = solution.clone();

    let weakest = solution
        .graph
        .degrees()
        .into_iter()
        .min_by_key(|&(_, degree)| degree);

    if let Some((stop_id, degree)) = weakest {
        if degree < 2 && candidate.graph.remove_node(stop_id).is_some() {
            candidate.removed_stops.push(stop_id.to_owned());
        }
    }

    candidate
}

/// First-improvement hill climbing over [`propose_move`].
///
/// A candidate replaces the best solution only when its score is strictly
/// lower. Constraints are carried along but never reject a move.
#[derive(Debug)]
pub struct LocalSearch<'a> {
    pub evaluator: &'a KpiEvaluator,
    pub constraints: &'a Constraints,
    pub rng: ChaCha8Rng,

    pub best: Solution,
    pub best_score: f64,

    pub iterations: usize,
    pub accepted: usize,
}

impl<'a> LocalSearch<'a> {
    pub fn new(seed: &Solution, evaluator: &'a KpiEvaluator, constraints: &'a Constraints) -> Self {
        let best = seed.clone();
        let best_score = evaluator.score(&best);

        Self {
            evaluator,
            constraints,
            rng: ChaCha8Rng::seed_from_u64(SEARCH_RNG_SEED),
            best,
            best_score,
            iterations: 0,
            accepted: 0,
        }
    }

    pub fn run(&mut self, max_iters: usize) {
        info!(
            event = "search_start",
            max_iters = max_iters,
            score = self.best_score,
            nodes = self.best.graph.node_count(),
        );

        for _ in 0..max_iters {
            self.step();
        }

        info!(
            event = "search_end",
            iterations = self.iterations,
            accepted = self.accepted,
            score = self.best_score,
            removed_stops = self.best.removed_stops.len(),
        );
    }

    /// Runs one propose, evaluate, accept cycle. Returns whether the
    /// candidate was kept.
    pub fn step(&mut self) -> bool {
        self.iterations += 1;

        let candidate = propose_move(&self.best, &mut self.rng);
        let candidate_score = self.evaluator.score(&candidate);

        if candidate_score < self.best_score {
            debug!(
                event = "move_accepted",
                iteration = self.iterations,
                score = candidate_score,
                previous = self.best_score,
            );
            self.best = candidate;
            self.best_score = candidate_score;
            self.accepted += 1;
            true
        } else {
            trace!(
                event = "move_rejected",
                iteration = self.iterations,
                score = candidate_score,
            );
            false
        }
    }

    pub fn into_best(self) -> Solution {
        self.best
    }
}

/// Runs `max_iters` search iterations from `seed` and returns the best
/// solution found, which is a copy of `seed` if nothing improved on it.
pub fn optimize(
    seed: &Solution,
    evaluator: &KpiEvaluator,
    constraints: &Constraints,
    max_iters: usize,
) -> Solution {
    let mut search = LocalSearch::new(seed, evaluator, constraints);
    search.run(max_iters);
    search.into_best()
}
