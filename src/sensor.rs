//! Range-sensor frustum model.
//!
//! A view candidate is only as good as what the sensor could actually see
//! from it, so evaluation casts one ray per cell of an azimuth/elevation
//! lattice spanning the sensor's field of view. Directions are generated in
//! the sensor body frame (x forward, y left, z up) and rotated into the
//! world frame per candidate.

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::ArgusError;

/// Field-of-view and ray-pattern parameters.
///
/// The defaults approximate a small RGB-D camera.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Horizontal field of view (degrees).
    pub horizontal_fov_deg: f64,
    /// Vertical field of view (degrees).
    pub vertical_fov_deg: f64,
    /// Rays spread across the horizontal FOV.
    pub horizontal_rays: usize,
    /// Rays spread across the vertical FOV.
    pub vertical_rays: usize,
    /// Maximum sensing range (meters).
    pub max_range: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        SensorConfig {
            horizontal_fov_deg: 58.0,
            vertical_fov_deg: 45.0,
            horizontal_rays: 20,
            vertical_rays: 15,
            max_range: 3.5,
        }
    }
}

impl SensorConfig {
    /// Rejects patterns that would produce no usable rays.
    pub fn validate(&self) -> Result<(), ArgusError> {
        if self.horizontal_fov_deg <= 0.0 || self.horizontal_fov_deg > 360.0 {
            return Err(ArgusError::Config(format!(
                "horizontal FOV must be in (0, 360] degrees, got {}",
                self.horizontal_fov_deg
            )));
        }
        if self.vertical_fov_deg <= 0.0 || self.vertical_fov_deg > 180.0 {
            return Err(ArgusError::Config(format!(
                "vertical FOV must be in (0, 180] degrees, got {}",
                self.vertical_fov_deg
            )));
        }
        if self.horizontal_rays == 0 || self.vertical_rays == 0 {
            return Err(ArgusError::Config(
                "sensor needs at least one ray per axis".to_string(),
            ));
        }
        if self.max_range <= 0.0 {
            return Err(ArgusError::Config(format!(
                "sensor max_range must be positive, got {}",
                self.max_range
            )));
        }
        Ok(())
    }
}

/// Generates the ray pattern for one sensor.
#[derive(Clone, Debug)]
pub struct SensorModel {
    config: SensorConfig,
}

impl SensorModel {
    /// Builds a model from a validated config.
    pub fn new(config: SensorConfig) -> Result<Self, ArgusError> {
        config.validate()?;
        Ok(SensorModel { config })
    }

    /// Maximum sensing range (meters).
    pub fn max_range(&self) -> f64 {
        self.config.max_range
    }

    /// Number of rays in the pattern.
    pub fn ray_count(&self) -> usize {
        self.config.horizontal_rays * self.config.vertical_rays
    }

    /// Unit ray directions in the sensor body frame.
    ///
    /// The lattice spans the FOV symmetrically around the x axis; a
    /// single-ray axis collapses to straight ahead.
    pub fn ray_directions(&self) -> Vec<Vector3<f64>> {
        let h_fov = self.config.horizontal_fov_deg.to_radians();
        let v_fov = self.config.vertical_fov_deg.to_radians();
        let mut directions = Vec::with_capacity(self.ray_count());

        for v in 0..self.config.vertical_rays {
            let elevation = spread(v, self.config.vertical_rays, v_fov);
            for h in 0..self.config.horizontal_rays {
                let azimuth = spread(h, self.config.horizontal_rays, h_fov);
                directions.push(Vector3::new(
                    elevation.cos() * azimuth.cos(),
                    elevation.cos() * azimuth.sin(),
                    elevation.sin(),
                ));
            }
        }
        directions
    }

    /// Ray directions rotated into the world frame.
    pub fn world_rays(&self, orientation: &UnitQuaternion<f64>) -> Vec<Vector3<f64>> {
        self.ray_directions()
            .into_iter()
            .map(|dir| orientation * dir)
            .collect()
    }
}

/// Evenly spaced sample `index` of `count` across `[-full/2, full/2]`.
fn spread(index: usize, count: usize, full: f64) -> f64 {
    if count <= 1 {
        0.0
    } else {
        -full / 2.0 + index as f64 * full / (count - 1) as f64
    }
}
