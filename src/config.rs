//! Operator constraints, objective weights and run settings.
//!
//! Constraints and objectives are read from JSON; a whole run can also be
//! described in TOML:
//!
//! ```
//! use transit_optimizer::config::RunConfig;
//!
//! let config = RunConfig::from_toml_str(r#"
//!     feed_dir = "feeds/city"
//!     constraints_path = "constraints.json"
//!     objective_path = "objective.json"
//!     max_iters = 50
//! "#).unwrap();
//!
//! assert_eq!(config.max_iters, 50);
//! assert_eq!(config.sample_size, 5000);
//! ```

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::LoadError;

fn from_json_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, LoadError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depot {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
}

/// Operational limits. They travel with a run but do not filter moves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    pub fleet_size: Option<u32>,
    pub depots: Vec<Depot>,
    pub max_interline: Option<u32>,
    pub max_vehicle_km_per_day: Option<f64>,
    pub vehicle_capacity: Option<u32>,
}

impl Constraints {
    pub fn from_json_str(s: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        from_json_file(path)
    }
}

/// Weights of the search score. A key missing from the input keeps its
/// default rather than dropping to zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveWeights {
    pub p90_travel_time: f64,
    pub passenger_weighted_travel_time: f64,
    pub coverage_within_400m: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            p90_travel_time: 0.5,
            passenger_weighted_travel_time: 0.3,
            coverage_within_400m: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Objective {
    pub weights: ObjectiveWeights,
    pub coverage_radius_m: f64,
}

impl Default for Objective {
    fn default() -> Self {
        Self {
            weights: ObjectiveWeights::default(),
            coverage_radius_m: 400.0,
        }
    }
}

impl Objective {
    pub fn from_json_str(s: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        from_json_file(path)
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

fn default_sample_size() -> usize {
    5000
}

fn default_max_iters() -> usize {
    500
}

/// Everything the `run` command needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Directory holding the unzipped feed files.
    pub feed_dir: PathBuf,
    pub constraints_path: PathBuf,
    pub objective_path: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_max_iters")]
    pub max_iters: usize,
}

impl RunConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, LoadError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
