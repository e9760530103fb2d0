use tracing::debug;

use crate::{
    config::{Constraints, Objective},
    data::TransitGraph,
    solution::Solution,
    timetable::Timetable,
};

/// Builds the starting point of a search: the baseline network, copied.
#[derive(Debug, Default)]
pub struct SeedGenerator;

impl SeedGenerator {
    /// Returns a solution owning fresh copies of `graph` and `timetable`
    /// with an empty change log. `constraints` and `objective` are only
    /// read.
    pub fn create(
        graph: &TransitGraph,
        timetable: &Timetable,
        _constraints: &Constraints,
        _objective: &Objective,
    ) -> Solution {
        debug!(
            nodes = graph.node_count(),
            arcs = graph.arc_count(),
            "seeding search from baseline"
        );

        Solution::new(graph.clone(), timetable.clone())
    }
}
