use std::path::Path;

use serde::Deserialize;

use crate::error::LoadError;

#[derive(Deserialize, Debug)]
pub struct Stop {
    pub stop_id: String,
    pub stop_name: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
    #[serde(default)]
    pub zone_id: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct Route {
    pub route_id: String,
    #[serde(default)]
    pub route_short_name: String,
    #[serde(default)]
    pub route_long_name: String,
    pub route_type: i32,
}

#[derive(Deserialize, Debug)]
pub struct Trip {
    pub route_id: String,
    pub service_id: String,
    pub trip_id: String,
    #[serde(default)]
    pub trip_headsign: Option<String>,
    #[serde(default)]
    pub shape_id: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct StopTime {
    pub trip_id: String,
    #[serde(default)]
    pub arrival_time: String,
    #[serde(default)]
    pub departure_time: String,
    pub stop_id: String,
    pub stop_sequence: u32,
    #[serde(default)]
    pub timepoint: Option<u8>,
}

#[derive(Deserialize, Debug)]
pub struct Frequency {
    pub trip_id: String,
    pub start_time: String,
    pub end_time: String,
    pub headway_secs: u32,
}

/// A feed exactly as read from its `*.txt` files.
#[derive(Debug)]
pub struct Timetable {
    pub stops: Vec<Stop>,
    pub routes: Vec<Route>,
    pub trips: Vec<Trip>,
    pub stop_times: Vec<StopTime>,
    pub frequencies: Vec<Frequency>,
}

fn deserialize_into<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, LoadError> {
    let rows = csv::Reader::from_path(path)?
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "read feed file");
    Ok(rows)
}

impl Timetable {
    /// Reads an unzipped feed directory. `frequencies.txt` may be absent.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, LoadError> {
        let dir = dir.as_ref();
        let frequencies_path = dir.join("frequencies.txt");

        Ok(Self {
            stops: deserialize_into(&dir.join("stops.txt"))?,
            routes: deserialize_into(&dir.join("routes.txt"))?,
            trips: deserialize_into(&dir.join("trips.txt"))?,
            stop_times: deserialize_into(&dir.join("stop_times.txt"))?,
            frequencies: if frequencies_path.exists() {
                deserialize_into(&frequencies_path)?
            } else {
                Vec::default()
            },
        })
    }
}
