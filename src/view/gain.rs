// src/view/gain.rs

// Information-gain scoring. A candidate's gain is the number of distinct
// unknown voxels inside the exploration bounds that the sensor frustum
// would touch from that pose: rays walk the map voxel by voxel and stop at
// the first occupied voxel or at the sensor range, whichever comes first.
// Rays pass through unknown space - a planner that assumed unknown space
// was opaque could never see anything worth exploring.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{ScoredView, ViewCandidate};
use crate::ArgusError;
use crate::map::{BoundingBox, OccupancyMap, RayTraversal, VoxelKey, VoxelState};
use crate::sensor::SensorModel;

/// Scoring and termination parameters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Best-candidate gain below which exploration counts as finished
    /// (units: unknown voxels).
    pub gain_threshold: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        EvaluationConfig {
            gain_threshold: 5.0,
        }
    }
}

impl EvaluationConfig {
    /// Rejects thresholds the termination test cannot use.
    pub fn validate(&self) -> Result<(), ArgusError> {
        if self.gain_threshold < 0.0 || !self.gain_threshold.is_finite() {
            return Err(ArgusError::Config(format!(
                "gain_threshold must be finite and not negative, got {}",
                self.gain_threshold
            )));
        }
        Ok(())
    }
}

/// Scores view candidates against an occupancy map.
#[derive(Clone, Debug)]
pub struct GainEvaluator {
    sensor: SensorModel,
}

impl GainEvaluator {
    /// Builds an evaluator casting the given sensor's ray pattern.
    pub fn new(sensor: SensorModel) -> Self {
        GainEvaluator { sensor }
    }

    /// Information gain of one candidate.
    ///
    /// Counts each unknown voxel once even when several rays cross it. A
    /// candidate whose own voxel is occupied scores 0.
    pub fn gain(&self, map: &OccupancyMap, view: &ViewCandidate, bounds: &BoundingBox) -> f64 {
        if map.state_at(&view.position) == VoxelState::Occupied {
            return 0.0;
        }

        let resolution = map.resolution();
        let mut revealed: HashSet<VoxelKey> = HashSet::new();

        for direction in self.sensor.world_rays(&view.orientation) {
            let walk = RayTraversal::new(
                &view.position,
                &direction,
                self.sensor.max_range(),
                resolution,
            );
            for key in walk {
                match map.state(&key) {
                    VoxelState::Occupied => break,
                    VoxelState::Unknown => {
                        if bounds.contains(&key.center(resolution)) {
                            revealed.insert(key);
                        }
                    }
                    VoxelState::Free => {}
                }
            }
        }

        revealed.len() as f64
    }

    /// Scores every candidate and sorts by descending gain.
    ///
    /// The sort is stable, so equal-gain candidates keep sampler order.
    pub fn rank(
        &self,
        map: &OccupancyMap,
        candidates: Vec<ViewCandidate>,
        bounds: &BoundingBox,
    ) -> Vec<ScoredView> {
        let mut scored: Vec<ScoredView> = candidates
            .into_iter()
            .map(|view| ScoredView {
                gain: self.gain(map, &view, bounds),
                view,
            })
            .collect();
        scored.sort_by(|a, b| {
            b.gain
                .partial_cmp(&a.gain)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored
    }
}
