//! Candidate viewpoints and their scoring.
//!
//! This module turns "where could the sensor go next?" into data:
//! - `ViewCandidate`: a sensor pose under consideration
//! - `ViewSampler`: generates candidates around the exploration volume
//! - `GainEvaluator`: scores candidates by the unknown space they reveal

mod gain;
mod sampler;

use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

pub use gain::{EvaluationConfig, GainEvaluator};
pub use sampler::{SamplingConfig, ViewSampler};

/// A sensor pose the planner may propose.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ViewCandidate {
    /// Sensor position (meters, world frame).
    pub position: Point3<f64>,
    /// Sensor orientation; the sensor looks along its rotated x axis.
    pub orientation: UnitQuaternion<f64>,
}

impl ViewCandidate {
    /// Builds a candidate from an explicit pose.
    pub fn new(position: Point3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        ViewCandidate {
            position,
            orientation,
        }
    }

    /// Builds a candidate at `position` oriented toward `target`.
    ///
    /// Yaw and pitch aim the x axis at the target; roll stays zero. When
    /// the two points coincide the orientation falls back to identity.
    pub fn looking_at(position: Point3<f64>, target: Point3<f64>) -> Self {
        let forward = target - position;
        let norm = forward.norm();
        if norm <= f64::EPSILON {
            return ViewCandidate::new(position, UnitQuaternion::identity());
        }
        let f = forward / norm;
        let yaw = f.y.atan2(f.x);
        let pitch = -f.z.clamp(-1.0, 1.0).asin();
        ViewCandidate::new(position, UnitQuaternion::from_euler_angles(0.0, pitch, yaw))
    }

    /// The direction the sensor faces.
    pub fn forward(&self) -> Vector3<f64> {
        self.orientation * Vector3::x()
    }
}

/// A candidate together with its evaluated information gain.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ScoredView {
    /// The evaluated pose.
    pub view: ViewCandidate,
    /// Distinct unknown voxels the sensor would reveal from it.
    pub gain: f64,
}
