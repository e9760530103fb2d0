use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::timetable::{StopId, Time};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopNode {
    pub id: StopId,
    /// `None` for a stop that only appears in stop times.
    pub position: Option<LatLon>,
}

/// A scheduled hop from one stop to the next on some trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelArc {
    pub from: StopId,
    pub to: StopId,
    pub travel_time_seconds: Time,
    pub distance_meters: f64,
    pub trip_id: String,
}

/// Directed stop graph. Nodes keep insertion order: stops table order first,
/// then stops first seen on an arc. That order breaks ties between nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitGraph {
    nodes: IndexMap<StopId, StopNode>,
    arcs: BTreeMap<(StopId, StopId), TravelArc>,
}

impl TransitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: StopNode) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Inserts `arc`, replacing any arc already present between the same
    /// ordered pair of stops. Endpoints missing from the graph are added
    /// without a position.
    pub fn add_arc(&mut self, arc: TravelArc) {
        for id in [&arc.from, &arc.to] {
            if !self.nodes.contains_key(id) {
                self.add_node(StopNode {
                    id: id.clone(),
                    position: None,
                });
            }
        }

        self.arcs.insert((arc.from.clone(), arc.to.clone()), arc);
    }

    pub fn node(&self, id: &str) -> Option<&StopNode> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn arc(&self, from: &str, to: &str) -> Option<&TravelArc> {
        self.arcs.get(&(from.to_owned(), to.to_owned()))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &StopNode> {
        self.nodes.values()
    }

    pub fn arcs(&self) -> impl Iterator<Item = &TravelArc> {
        self.arcs.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// In-degree plus out-degree. A self-loop counts twice.
    pub fn degree(&self, id: &str) -> usize {
        self.arcs
            .values()
            .map(|arc| usize::from(arc.from == id) + usize::from(arc.to == id))
            .sum()
    }

    /// Degree of every node, in node order.
    pub fn degrees(&self) -> IndexMap<&str, usize> {
        let mut degrees: IndexMap<&str, usize> =
            self.nodes.keys().map(|id| (id.as_str(), 0)).collect();

        for arc in self.arcs.values() {
            for id in [&arc.from, &arc.to] {
                if let Some(degree) = degrees.get_mut(id.as_str()) {
                    *degree += 1;
                }
            }
        }

        degrees
    }

    /// Removes the node together with every arc touching it.
    pub fn remove_node(&mut self, id: &str) -> Option<StopNode> {
        let node = self.nodes.shift_remove(id)?;
        self.arcs.retain(|_, arc| arc.from != id && arc.to != id);
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arc(from: &str, to: &str, time: Time, trip: &str) -> TravelArc {
        TravelArc {
            from: from.to_owned(),
            to: to.to_owned(),
            travel_time_seconds: time,
            distance_meters: 0.0,
            trip_id: trip.to_owned(),
        }
    }

    fn node(id: &str) -> StopNode {
        StopNode {
            id: id.to_owned(),
            position: Some(LatLon { lat: 0.0, lon: 0.0 }),
        }
    }

    #[test]
    fn later_arc_replaces_earlier_one() {
        let mut graph = TransitGraph::new();
        graph.add_arc(arc("A", "B", 60, "T1"));
        graph.add_arc(arc("A", "B", 90, "T2"));

        assert_eq!(graph.arc_count(), 1);
        let kept = graph.arc("A", "B").unwrap();
        assert_eq!(kept.travel_time_seconds, 90);
        assert_eq!(kept.trip_id, "T2");
    }

    #[test]
    fn arc_endpoints_become_nodes() {
        let mut graph = TransitGraph::new();
        graph.add_node(node("A"));
        graph.add_arc(arc("A", "B", 60, "T1"));

        assert_eq!(graph.node_count(), 2);
        assert!(graph.node("A").unwrap().position.is_some());
        assert_eq!(graph.node("B").unwrap().position, None);
    }

    #[test]
    fn degree_counts_both_directions_and_self_loops_twice() {
        let mut graph = TransitGraph::new();
        for id in ["A", "B", "C", "D"] {
            graph.add_node(node(id));
        }
        graph.add_arc(arc("A", "B", 60, "T1"));
        graph.add_arc(arc("B", "A", 60, "T2"));
        graph.add_arc(arc("B", "C", 60, "T1"));
        graph.add_arc(arc("C", "C", 1, "T3"));

        assert_eq!(graph.degree("A"), 2);
        assert_eq!(graph.degree("B"), 3);
        assert_eq!(graph.degree("C"), 3);
        assert_eq!(graph.degree("D"), 0);

        let degrees = graph.degrees();
        assert_eq!(degrees.keys().copied().collect::<Vec<_>>(), ["A", "B", "C", "D"]);
        assert_eq!(degrees["C"], graph.degree("C"));
    }

    #[test]
    fn nodes_keep_insertion_order() {
        let mut graph = TransitGraph::new();
        for id in ["S2", "S10", "S1"] {
            graph.add_node(node(id));
        }
        graph.add_arc(arc("S1", "GHOST", 60, "T1"));
        graph.remove_node("S10");

        let order: Vec<&str> = graph.nodes().map(|node| node.id.as_str()).collect();
        assert_eq!(order, ["S2", "S1", "GHOST"]);
        assert_eq!(
            graph.degrees().keys().copied().collect::<Vec<_>>(),
            ["S2", "S1", "GHOST"]
        );
    }

    #[test]
    fn removing_a_node_drops_incident_arcs() {
        let mut graph = TransitGraph::new();
        graph.add_arc(arc("A", "B", 60, "T1"));
        graph.add_arc(arc("B", "C", 60, "T1"));
        graph.add_arc(arc("C", "A", 60, "T1"));

        assert!(graph.remove_node("B").is_some());
        assert!(graph.remove_node("B").is_none());

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.arc_count(), 1);
        assert!(graph.arc("C", "A").is_some());
    }
}
