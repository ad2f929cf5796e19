//! Argus - Next-Best-View Planning Service
//!
//! This library provides the core functionality of Argus, a planning node
//! that selects the sensor viewpoint expected to reveal the most unknown
//! space in a partially observed 3D occupancy map. It covers the occupancy
//! map model, candidate view sampling, information-gain evaluation, and the
//! TCP node surface the planner is served over.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

pub mod io;
pub mod map;
pub mod sensor;
pub mod solver;
pub mod view;

// Re-export commonly used items for easier access
pub use io::{CloudPublisher, IoConfig, MapSource, NbvService, TcpMapClient};
pub use map::{BoundingBox, MapConfig, MapSnapshot, OccupancyMap, VoxelKey, VoxelState};
pub use sensor::{SensorConfig, SensorModel};
pub use solver::{NbvSolution, NbvSolver};
pub use view::{EvaluationConfig, GainEvaluator, SamplingConfig, ScoredView, ViewCandidate, ViewSampler};

use std::fs::File;
use std::path::Path;

/// Main configuration structure for the Argus node
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ArgusConfig {
    /// Network endpoints for the node surface
    pub io: IoConfig,
    /// Occupancy-map discretization and sensor model
    pub map: MapConfig,
    /// Range-sensor frustum parameters
    pub sensor: SensorConfig,
    /// Candidate-view sampling pattern
    pub sampling: SamplingConfig,
    /// Gain evaluation and termination parameters
    pub evaluation: EvaluationConfig,
    /// Default exploration bounds
    pub bounds: BoundingBox,
}

impl Default for ArgusConfig {
    fn default() -> Self {
        ArgusConfig {
            io: IoConfig::default(),
            map: MapConfig::default(),
            sensor: SensorConfig::default(),
            sampling: SamplingConfig::default(),
            evaluation: EvaluationConfig::default(),
            bounds: BoundingBox::default(),
        }
    }
}

impl ArgusConfig {
    /// Loads and validates a configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ArgusError> {
        let file = File::open(path.as_ref()).map_err(|e| {
            ArgusError::Config(format!(
                "cannot open config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let config: ArgusConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations no component can be built from.
    pub fn validate(&self) -> Result<(), ArgusError> {
        self.io.validate()?;
        self.map.validate()?;
        self.sensor.validate()?;
        self.sampling.validate()?;
        self.evaluation.validate()?;
        if !self.bounds.is_valid() {
            return Err(ArgusError::Config(format!(
                "exploration bounds are empty: min {:?}, max {:?}",
                self.bounds.min, self.bounds.max
            )));
        }
        Ok(())
    }
}

/// Argus error types
#[derive(Debug)]
pub enum ArgusError {
    /// Configuration loading or validation error
    Config(String),
    /// Occupancy-map encoding, decoding, or persistence error
    Map(String),
    /// Network or wire-protocol error
    Transport(String),
    /// Planning request error
    Planning(String),
}

impl std::fmt::Display for ArgusError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ArgusError::Config(msg) => write!(f, "configuration error: {}", msg),
            ArgusError::Map(msg) => write!(f, "map error: {}", msg),
            ArgusError::Transport(msg) => write!(f, "transport error: {}", msg),
            ArgusError::Planning(msg) => write!(f, "planning error: {}", msg),
        }
    }
}

impl std::error::Error for ArgusError {}

impl From<std::io::Error> for ArgusError {
    fn from(err: std::io::Error) -> Self {
        ArgusError::Transport(err.to_string())
    }
}

impl From<serde_yaml::Error> for ArgusError {
    fn from(err: serde_yaml::Error) -> Self {
        ArgusError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ArgusError {
    fn from(err: serde_json::Error) -> Self {
        ArgusError::Transport(err.to_string())
    }
}
