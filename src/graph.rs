use std::collections::HashMap;

use itertools::Itertools;
use tracing::debug;

use crate::{
    data::{LatLon, StopNode, TransitGraph, TravelArc},
    timetable::{StopTime, Timetable},
};

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance in meters between two points given in degrees.
pub fn haversine_distance(a: LatLon, b: LatLon) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Turns canonical tables into a [`TransitGraph`] with one node per stop and
/// one arc per consecutive stop pair on any trip.
#[derive(Debug, Default)]
pub struct GraphBuilder;

impl GraphBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, timetable: &Timetable) -> TransitGraph {
        let mut graph = TransitGraph::new();

        let mut positions: HashMap<&str, LatLon> = HashMap::with_capacity(timetable.stops.len());
        for stop in &timetable.stops {
            let position = LatLon {
                lat: stop.lat,
                lon: stop.lon,
            };
            graph.add_node(StopNode {
                id: stop.stop_id.clone(),
                position: Some(position),
            });
            positions.insert(stop.stop_id.as_str(), position);
        }

        // Trips are processed in id order, so on a shared stop pair the arc
        // from the trip with the greatest id is the one that remains.
        let trips = timetable
            .stop_times
            .iter()
            .map(|stop_time| (stop_time.trip_id.as_str(), stop_time))
            .into_group_map();

        for (trip_id, stop_times) in trips.into_iter().sorted_by_key(|(trip_id, _)| *trip_id) {
            let ordered: Vec<&StopTime> = stop_times
                .into_iter()
                .sorted_by_key(|stop_time| stop_time.stop_sequence)
                .collect();

            for (prev, cur) in ordered.iter().tuple_windows() {
                let travel_time_seconds = (i64::from(cur.arrival_time_sec)
                    - i64::from(prev.departure_time_sec))
                .max(1) as u32;

                let distance_meters = match (
                    positions.get(prev.stop_id.as_str()),
                    positions.get(cur.stop_id.as_str()),
                ) {
                    (Some(&from), Some(&to)) => haversine_distance(from, to),
                    _ => 0.0,
                };

                graph.add_arc(TravelArc {
                    from: prev.stop_id.clone(),
                    to: cur.stop_id.clone(),
                    travel_time_seconds,
                    distance_meters,
                    trip_id: trip_id.to_owned(),
                });
            }
        }

        debug!(
            nodes = graph.node_count(),
            arcs = graph.arc_count(),
            "built transit graph"
        );

        graph
    }
}
