// src/map/occupancy.rs

// Sparse log-odds occupancy map over 3D space. Voxels the robot has never
// observed are simply absent, which is what makes "unknown space" a
// first-class query here: the planner's whole job is to shrink the set of
// absent voxels inside the exploration bounds.

use log::debug;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::raycast::RayTraversal;
use super::voxel::VoxelKey;
use super::{BoundingBox, VoxelState};
use crate::ArgusError;

/// Discretization and inverse sensor model for the occupancy map.
///
/// The defaults are the standard occupancy-octree sensor model: a beam
/// endpoint raises a voxel toward occupied with probability 0.7, a traversed
/// voxel lowers it with probability 0.4, and log-odds are clamped so stale
/// evidence can still be overturned.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Edge length of one voxel (meters).
    pub resolution: f64,
    /// Update probability for a voxel observed as a beam endpoint.
    pub prob_hit: f64,
    /// Update probability for a voxel a beam passed through.
    pub prob_miss: f64,
    /// Lower clamp on stored occupancy probability.
    pub clamp_min: f64,
    /// Upper clamp on stored occupancy probability.
    pub clamp_max: f64,
    /// Probability at or above which a voxel classifies as occupied.
    pub occupancy_threshold: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            resolution: 0.1,
            prob_hit: 0.7,
            prob_miss: 0.4,
            clamp_min: 0.12,
            clamp_max: 0.97,
            occupancy_threshold: 0.5,
        }
    }
}

impl MapConfig {
    /// Rejects parameter combinations the update rule cannot work with.
    pub fn validate(&self) -> Result<(), ArgusError> {
        if self.resolution <= 0.0 {
            return Err(ArgusError::Config(format!(
                "map resolution must be positive, got {}",
                self.resolution
            )));
        }
        for (name, p) in [
            ("prob_hit", self.prob_hit),
            ("prob_miss", self.prob_miss),
            ("clamp_min", self.clamp_min),
            ("clamp_max", self.clamp_max),
            ("occupancy_threshold", self.occupancy_threshold),
        ] {
            if p <= 0.0 || p >= 1.0 {
                return Err(ArgusError::Config(format!(
                    "{} must lie strictly between 0 and 1, got {}",
                    name, p
                )));
            }
        }
        if self.prob_miss >= self.prob_hit {
            return Err(ArgusError::Config(
                "prob_miss must be below prob_hit".to_string(),
            ));
        }
        if self.clamp_min >= self.clamp_max {
            return Err(ArgusError::Config(
                "clamp_min must be below clamp_max".to_string(),
            ));
        }
        Ok(())
    }
}

/// Serializable form of a map: the config plus every stored cell.
///
/// Doubles as the wire representation when a map travels between nodes and
/// as the on-disk format for persistence.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapSnapshot {
    /// Map parameters the cells were built with.
    pub config: MapConfig,
    /// Stored voxels and their log-odds.
    pub cells: Vec<(VoxelKey, f64)>,
}

fn log_odds(probability: f64) -> f64 {
    (probability / (1.0 - probability)).ln()
}

fn probability(log_odds: f64) -> f64 {
    1.0 - 1.0 / (1.0 + log_odds.exp())
}

/// Sparse voxel occupancy map.
#[derive(Debug)]
pub struct OccupancyMap {
    config: MapConfig,
    cells: HashMap<VoxelKey, f64>,
    // Precomputed log-odds forms of the config probabilities.
    hit_update: f64,
    miss_update: f64,
    min_log_odds: f64,
    max_log_odds: f64,
    occupied_log_odds: f64,
}

impl OccupancyMap {
    /// Creates an empty map; fails when the config is unusable.
    pub fn new(config: MapConfig) -> Result<Self, ArgusError> {
        config.validate()?;
        Ok(OccupancyMap {
            hit_update: log_odds(config.prob_hit),
            miss_update: log_odds(config.prob_miss),
            min_log_odds: log_odds(config.clamp_min),
            max_log_odds: log_odds(config.clamp_max),
            occupied_log_odds: log_odds(config.occupancy_threshold),
            cells: HashMap::new(),
            config,
        })
    }

    /// Voxel edge length in meters.
    pub fn resolution(&self) -> f64 {
        self.config.resolution
    }

    /// Parameters this map was built with.
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Number of voxels with stored evidence.
    pub fn known_voxels(&self) -> usize {
        self.cells.len()
    }

    /// True when nothing has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Stored log-odds for a voxel, or `None` for unknown voxels.
    pub fn log_odds_of(&self, key: &VoxelKey) -> Option<f64> {
        self.cells.get(key).copied()
    }

    /// Stored occupancy probability, or `None` for unknown voxels.
    pub fn occupancy_probability(&self, key: &VoxelKey) -> Option<f64> {
        self.cells.get(key).map(|lo| probability(*lo))
    }

    /// Classifies a voxel.
    pub fn state(&self, key: &VoxelKey) -> VoxelState {
        match self.cells.get(key) {
            None => VoxelState::Unknown,
            Some(&lo) if lo >= self.occupied_log_odds => VoxelState::Occupied,
            Some(_) => VoxelState::Free,
        }
    }

    /// Classifies the voxel containing a world point.
    pub fn state_at(&self, point: &Point3<f64>) -> VoxelState {
        self.state(&VoxelKey::of_point(point, self.config.resolution))
    }

    /// Applies one hit or miss observation to a voxel.
    pub fn observe(&mut self, key: &VoxelKey, hit: bool) {
        let update = if hit { self.hit_update } else { self.miss_update };
        let value = self.cells.get(key).copied().unwrap_or(0.0) + update;
        self.cells
            .insert(*key, value.clamp(self.min_log_odds, self.max_log_odds));
    }

    /// Writes a log-odds value directly, clamped to the configured range.
    pub fn set_log_odds(&mut self, key: VoxelKey, value: f64) {
        self.cells
            .insert(key, value.clamp(self.min_log_odds, self.max_log_odds));
    }

    /// Saturates a voxel to the occupied clamp.
    pub fn mark_occupied(&mut self, key: VoxelKey) {
        self.cells.insert(key, self.max_log_odds);
    }

    /// Saturates a voxel to the free clamp.
    pub fn mark_free(&mut self, key: VoxelKey) {
        self.cells.insert(key, self.min_log_odds);
    }

    /// Integrates one range scan taken from `origin`.
    ///
    /// Every voxel between the origin and an endpoint receives a miss
    /// update; the endpoint voxel receives a hit update.
    pub fn integrate_scan(&mut self, origin: &Point3<f64>, endpoints: &[Point3<f64>]) {
        let resolution = self.config.resolution;
        for endpoint in endpoints {
            let end_key = VoxelKey::of_point(endpoint, resolution);
            let beam: Vec<VoxelKey> = RayTraversal::between(origin, endpoint, resolution)
                .take_while(|key| *key != end_key)
                .collect();
            for key in beam {
                self.observe(&key, false);
            }
            self.observe(&end_key, true);
        }
        debug!(
            "integrated {} beams from ({:.2}, {:.2}, {:.2}); map holds {} voxels",
            endpoints.len(),
            origin.x,
            origin.y,
            origin.z,
            self.cells.len()
        );
    }

    /// Centers of every unobserved voxel inside `bounds`.
    ///
    /// This is the cloud the node publishes for visualization and the raw
    /// material the gain evaluator scores views against.
    pub fn unknown_in_bounds(&self, bounds: &BoundingBox) -> Vec<Point3<f64>> {
        let resolution = self.config.resolution;
        let low = VoxelKey::of_point(&bounds.min, resolution);
        let high = VoxelKey::of_point(&bounds.max, resolution);

        let mut centers = Vec::new();
        for x in low.x..=high.x {
            for y in low.y..=high.y {
                for z in low.z..=high.z {
                    let key = VoxelKey::new(x, y, z);
                    if self.cells.contains_key(&key) {
                        continue;
                    }
                    let center = key.center(resolution);
                    if bounds.contains(&center) {
                        centers.push(center);
                    }
                }
            }
        }
        centers
    }

    /// Iterates over every stored voxel and its log-odds.
    pub fn iter(&self) -> impl Iterator<Item = (&VoxelKey, &f64)> {
        self.cells.iter()
    }

    /// Copies the map into its serializable form.
    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            config: self.config,
            cells: self.cells.iter().map(|(k, v)| (*k, *v)).collect(),
        }
    }

    /// Rebuilds a map from a snapshot, re-clamping every cell.
    pub fn from_snapshot(snapshot: MapSnapshot) -> Result<Self, ArgusError> {
        let mut map = OccupancyMap::new(snapshot.config)?;
        for (key, value) in snapshot.cells {
            map.set_log_odds(key, value);
        }
        Ok(map)
    }

    /// Persists the map as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ArgusError> {
        let file = File::create(path.as_ref())
            .map_err(|e| ArgusError::Map(format!("cannot create map file: {}", e)))?;
        serde_json::to_writer(BufWriter::new(file), &self.snapshot())
            .map_err(|e| ArgusError::Map(format!("cannot encode map: {}", e)))?;
        Ok(())
    }

    /// Loads a map previously written by [`OccupancyMap::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ArgusError> {
        let file = File::open(path.as_ref())
            .map_err(|e| ArgusError::Map(format!("cannot open map file: {}", e)))?;
        let snapshot: MapSnapshot = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ArgusError::Map(format!("cannot decode map: {}", e)))?;
        OccupancyMap::from_snapshot(snapshot)
    }
}
