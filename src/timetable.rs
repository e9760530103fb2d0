use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{error::LoadError, gtfs};

pub type StopId = String;
pub type Time = u32;

pub const SECONDS_PER_DAY: Time = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub stop_id: StopId,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub zone_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub route_id: String,
    pub short_name: String,
    pub long_name: String,
    pub route_type: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub trip_id: String,
    pub route_id: String,
    pub service_id: String,
    pub trip_headsign: Option<String>,
    pub shape_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopTime {
    pub trip_id: String,
    pub arrival_time_sec: Time,
    pub departure_time_sec: Time,
    pub stop_sequence: u32,
    pub stop_id: StopId,
    pub timepoint: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frequency {
    pub trip_id: String,
    pub start_time: String,
    pub end_time: String,
    pub headway_secs: u32,
}

/// Canonical schedule tables.
///
/// Shape and referential integrity are assumed to have been checked before
/// a `Timetable` reaches the optimizer; nothing here re-validates them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timetable {
    pub stops: Vec<Stop>,
    pub routes: Vec<Route>,
    pub trips: Vec<Trip>,
    pub stop_times: Vec<StopTime>,
    pub frequencies: Vec<Frequency>,
}

impl Timetable {
    pub fn stop(&self, stop_id: &str) -> Option<&Stop> {
        self.stops.iter().find(|stop| stop.stop_id == stop_id)
    }

    /// Sorts stop times by trip and sequence, then lifts every trip onto a
    /// non-decreasing timeline. Whenever a raw time is smaller than the one
    /// before it, the trip has crossed midnight and another day is added.
    /// A trip whose timeline runs past `u32::MAX` seconds is rejected.
    pub fn normalize_stop_times(&mut self) -> Result<(), LoadError> {
        self.stop_times.sort_by(|a, b| {
            a.trip_id
                .cmp(&b.trip_id)
                .then(a.stop_sequence.cmp(&b.stop_sequence))
        });

        let mut current_trip: Option<String> = None;
        let mut offset: Time = 0;
        let mut previous: Option<Time> = None;

        for stop_time in self.stop_times.iter_mut() {
            let StopTime {
                trip_id,
                arrival_time_sec,
                departure_time_sec,
                ..
            } = stop_time;

            if current_trip.as_deref() != Some(trip_id.as_str()) {
                current_trip = Some(trip_id.clone());
                offset = 0;
                previous = None;
            }

            for time in [arrival_time_sec, departure_time_sec] {
                let raw = *time;
                let overflow = || LoadError::InvalidTime {
                    value: raw.to_string(),
                    trip_id: trip_id.clone(),
                };

                if previous.is_some_and(|prev| raw < prev) {
                    offset = offset.checked_add(SECONDS_PER_DAY).ok_or_else(overflow)?;
                }
                previous = Some(raw);
                *time = raw.checked_add(offset).ok_or_else(overflow)?;
            }
        }

        Ok(())
    }
}

/// Parses `H:MM:SS` into seconds of day. Hours past 23 are kept as-is and an
/// empty value is treated as 0.
pub fn parse_time(value: &str, trip_id: &str) -> Result<Time, LoadError> {
    let invalid = || LoadError::InvalidTime {
        value: value.to_owned(),
        trip_id: trip_id.to_owned(),
    };

    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }

    let (h, m, s) = value
        .split(':')
        .map(|part| part.parse::<Time>().map_err(|_| invalid()))
        .collect_tuple()
        .ok_or_else(invalid)?;

    let (h, m, s) = (h?, m?, s?);
    h.checked_mul(3600)
        .and_then(|total| total.checked_add(m.checked_mul(60)?))
        .and_then(|total| total.checked_add(s))
        .ok_or_else(invalid)
}

impl TryFrom<gtfs::Timetable> for Timetable {
    type Error = LoadError;

    fn try_from(value: gtfs::Timetable) -> Result<Self, Self::Error> {
        let stops = value
            .stops
            .into_iter()
            .map(|stop| Stop {
                stop_id: stop.stop_id,
                name: stop.stop_name,
                lat: stop.stop_lat,
                lon: stop.stop_lon,
                zone_id: stop.zone_id,
            })
            .collect();

        let routes = value
            .routes
            .into_iter()
            .map(|route| Route {
                route_id: route.route_id,
                short_name: route.route_short_name,
                long_name: route.route_long_name,
                route_type: route.route_type,
            })
            .collect();

        let trips = value
            .trips
            .into_iter()
            .map(|trip| Trip {
                trip_id: trip.trip_id,
                route_id: trip.route_id,
                service_id: trip.service_id,
                trip_headsign: trip.trip_headsign,
                shape_id: trip.shape_id,
            })
            .collect();

        let stop_times = value
            .stop_times
            .into_iter()
            .map(|stop_time| {
                Ok(StopTime {
                    arrival_time_sec: parse_time(&stop_time.arrival_time, &stop_time.trip_id)?,
                    departure_time_sec: parse_time(
                        &stop_time.departure_time,
                        &stop_time.trip_id,
                    )?,
                    stop_sequence: stop_time.stop_sequence,
                    stop_id: stop_time.stop_id,
                    timepoint: stop_time.timepoint.unwrap_or(1),
                    trip_id: stop_time.trip_id,
                })
            })
            .collect::<Result<Vec<_>, LoadError>>()?;

        let frequencies = value
            .frequencies
            .into_iter()
            .map(|frequency| Frequency {
                trip_id: frequency.trip_id,
                start_time: frequency.start_time,
                end_time: frequency.end_time,
                headway_secs: frequency.headway_secs,
            })
            .collect();

        let mut timetable = Self {
            stops,
            routes,
            trips,
            stop_times,
            frequencies,
        };
        timetable.normalize_stop_times()?;

        Ok(timetable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop_time(trip_id: &str, seq: u32, stop_id: &str, arr: Time, dep: Time) -> StopTime {
        StopTime {
            trip_id: trip_id.to_owned(),
            arrival_time_sec: arr,
            departure_time_sec: dep,
            stop_sequence: seq,
            stop_id: stop_id.to_owned(),
            timepoint: 1,
        }
    }

    #[test]
    fn parses_times_past_midnight_and_blank_values() {
        assert_eq!(parse_time("08:10:05", "T1").unwrap(), 8 * 3600 + 10 * 60 + 5);
        assert_eq!(parse_time("25:00:00", "T1").unwrap(), 25 * 3600);
        assert_eq!(parse_time("7:05:00", "T1").unwrap(), 7 * 3600 + 300);
        assert_eq!(parse_time("", "T1").unwrap(), 0);
    }

    #[test]
    fn rejects_malformed_times() {
        assert!(matches!(
            parse_time("8:10", "T1"),
            Err(LoadError::InvalidTime { .. })
        ));
        assert!(parse_time("08:xx:00", "T1").is_err());
        assert!(parse_time("08:00:00:00", "T1").is_err());
    }

    #[test]
    fn out_of_range_hours_are_invalid_not_a_panic() {
        assert!(matches!(
            parse_time("2000000:00:00", "T1"),
            Err(LoadError::InvalidTime { .. })
        ));
        assert!(matches!(
            parse_time("1193046:28:16", "T1"),
            Err(LoadError::InvalidTime { .. })
        ));
        assert_eq!(parse_time("1193046:28:15", "T1").unwrap(), u32::MAX);
    }

    #[test]
    fn normalization_rejects_timeline_past_range() {
        let mut timetable = Timetable {
            stop_times: vec![
                stop_time("T1", 1, "S1", u32::MAX - 10, u32::MAX - 10),
                stop_time("T1", 2, "S2", 100, u32::MAX - 5),
            ],
            ..Timetable::default()
        };

        assert!(matches!(
            timetable.normalize_stop_times(),
            Err(LoadError::InvalidTime { trip_id, .. }) if trip_id == "T1"
        ));
    }

    #[test]
    fn normalization_sorts_by_trip_and_sequence() {
        let mut timetable = Timetable {
            stop_times: vec![
                stop_time("T2", 1, "S1", 100, 100),
                stop_time("T1", 2, "S2", 600, 600),
                stop_time("T1", 1, "S1", 0, 0),
            ],
            ..Timetable::default()
        };

        timetable.normalize_stop_times().unwrap();

        let order: Vec<(&str, u32)> = timetable
            .stop_times
            .iter()
            .map(|st| (st.trip_id.as_str(), st.stop_sequence))
            .collect();
        assert_eq!(order, vec![("T1", 1), ("T1", 2), ("T2", 1)]);
    }

    #[test]
    fn normalization_rolls_trips_over_midnight() {
        let mut timetable = Timetable {
            stop_times: vec![
                stop_time("T1", 1, "S1", 86_000, 86_100),
                stop_time("T1", 2, "S2", 200, 260),
                stop_time("T1", 3, "S3", 500, 500),
                stop_time("T2", 1, "S1", 300, 300),
            ],
            ..Timetable::default()
        };

        timetable.normalize_stop_times().unwrap();

        let times: Vec<(Time, Time)> = timetable
            .stop_times
            .iter()
            .map(|st| (st.arrival_time_sec, st.departure_time_sec))
            .collect();
        assert_eq!(
            times,
            vec![
                (86_000, 86_100),
                (86_600, 86_660),
                (86_900, 86_900),
                (300, 300),
            ]
        );
    }

    #[test]
    fn canonicalizes_raw_feed() {
        let feed = gtfs::Timetable {
            stops: vec![gtfs::Stop {
                stop_id: "S1".to_owned(),
                stop_name: "A".to_owned(),
                stop_lat: 1.5,
                stop_lon: 2.5,
                zone_id: None,
            }],
            routes: vec![],
            trips: vec![],
            stop_times: vec![gtfs::StopTime {
                trip_id: "T1".to_owned(),
                arrival_time: "00:10:00".to_owned(),
                departure_time: "00:11:00".to_owned(),
                stop_id: "S1".to_owned(),
                stop_sequence: 1,
                timepoint: None,
            }],
            frequencies: vec![],
        };

        let timetable = Timetable::try_from(feed).unwrap();

        assert_eq!(timetable.stop("S1").map(|s| (s.lat, s.lon)), Some((1.5, 2.5)));
        assert_eq!(timetable.stop_times[0].arrival_time_sec, 600);
        assert_eq!(timetable.stop_times[0].departure_time_sec, 660);
        assert_eq!(timetable.stop_times[0].timepoint, 1);
    }
}
