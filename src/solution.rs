use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    config::Constraints,
    data::TransitGraph,
    timetable::{StopId, Timetable},
};

/// One candidate network state: the graph, the tables it came from, and the
/// changes made so far.
///
/// Every field is owned, so a clone shares nothing with its source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub graph: TransitGraph,
    pub timetable: Timetable,
    pub changed_routes: Vec<String>,
    pub removed_stops: Vec<StopId>,
}

impl Solution {
    pub fn new(graph: TransitGraph, timetable: Timetable) -> Self {
        Self {
            graph,
            timetable,
            changed_routes: Vec::default(),
            removed_stops: Vec::default(),
        }
    }

    pub fn diff(&self, constraints: &Constraints) -> ScenarioDiff {
        ScenarioDiff {
            routes_changed: self.changed_routes.len(),
            stops_removed: self.removed_stops.len(),
            removed_stops: self.removed_stops.clone(),
            fleet_size: constraints.fleet_size,
        }
    }
}

/// Summary of how a solution departs from the baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioDiff {
    pub routes_changed: usize,
    pub stops_removed: usize,
    pub removed_stops: Vec<StopId>,
    pub fleet_size: Option<u32>,
}

impl fmt::Display for ScenarioDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Scenario Diff")?;
        writeln!(f)?;
        writeln!(f, "- Routes changed: {}", self.routes_changed)?;
        writeln!(f, "- Stops removed: {}", self.stops_removed)?;
        match self.fleet_size {
            Some(fleet_size) => writeln!(f, "- Fleet size constraint: {fleet_size}")?,
            None => writeln!(f, "- Fleet size constraint: none")?,
        }

        if !self.removed_stops.is_empty() {
            writeln!(f)?;
            writeln!(f, "## Removed stops")?;
            writeln!(f)?;
            for stop_id in &self.removed_stops {
                writeln!(f, "- {stop_id}")?;
            }
        }

        Ok(())
    }
}
