//! Local-search optimization of transit schedules.
//!
//! Canonical tables go through [`graph::GraphBuilder`] to become a stop
//! graph, [`seed::SeedGenerator`] copies that into a starting
//! [`solution::Solution`], and [`search::optimize`] hill-climbs on the
//! weighted KPI score computed by [`kpi::KpiEvaluator`].

pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod gtfs;
pub mod kpi;
pub mod search;
pub mod seed;
pub mod solution;
pub mod timetable;
