use serde::{Deserialize, Serialize};

use crate::{
    config::Objective, data::TransitGraph, search, solution::Solution, timetable::Timetable,
};

/// Wait time assumed when the schedule carries no headways.
pub const FALLBACK_WAIT_SECONDS: f64 = 300.0;

/// z-score of the 90th percentile of a normal distribution.
const P90_Z: f64 = 1.28;

/// Network-wide travel time metrics, in seconds unless noted otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiMetrics {
    pub average_travel_time: f64,
    pub passenger_weighted_travel_time: f64,
    pub p50_travel_time: f64,
    pub p90_travel_time: f64,
    pub on_time_percentage: f64,
    pub coverage_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiReport {
    pub baseline: KpiMetrics,
    pub optimized: KpiMetrics,
}

/// Scores a graph and its tables.
///
/// The result depends only on the graph and the tables. `sample_size` and
/// `seed` are carried for a sampled simulation and do not affect output.
/// On-time percentage and coverage are fixed at 0.9 and 1.0.
#[derive(Debug, Clone)]
pub struct KpiEvaluator {
    pub objective: Objective,
    pub sample_size: usize,
    pub seed: Option<u64>,
}

impl KpiEvaluator {
    pub fn new(objective: Objective, sample_size: usize, seed: Option<u64>) -> Self {
        Self {
            objective,
            sample_size,
            seed,
        }
    }

    /// Half the mean headway, or [`FALLBACK_WAIT_SECONDS`] without headways.
    pub fn estimated_wait(&self, timetable: &Timetable) -> f64 {
        if timetable.frequencies.is_empty() {
            return FALLBACK_WAIT_SECONDS;
        }

        let total: f64 = timetable
            .frequencies
            .iter()
            .map(|frequency| f64::from(frequency.headway_secs))
            .sum();
        total / timetable.frequencies.len() as f64 / 2.0
    }

    pub fn average_in_vehicle_time(&self, graph: &TransitGraph) -> f64 {
        if graph.arc_count() == 0 {
            return 0.0;
        }

        let total: f64 = graph
            .arcs()
            .map(|arc| f64::from(arc.travel_time_seconds))
            .sum();
        total / graph.arc_count() as f64
    }

    pub fn compute_kpis(&self, graph: &TransitGraph, timetable: &Timetable) -> KpiMetrics {
        let mean_travel_time = self.estimated_wait(timetable) + self.average_in_vehicle_time(graph);
        // Spread is assumed, not measured.
        let std_proxy = 0.5 * mean_travel_time;

        KpiMetrics {
            average_travel_time: mean_travel_time,
            passenger_weighted_travel_time: mean_travel_time,
            p50_travel_time: mean_travel_time,
            p90_travel_time: mean_travel_time + P90_Z * std_proxy,
            on_time_percentage: 0.9,
            coverage_ratio: 1.0,
        }
    }

    /// Scores a solution under this evaluator's objective weights.
    pub fn score(&self, solution: &Solution) -> f64 {
        search::score(
            &self.compute_kpis(&solution.graph, &solution.timetable),
            &self.objective.weights,
        )
    }
}
