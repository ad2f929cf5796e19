// src/view/sampler.rs

// Samples candidate sensor poses on rings around the exploration volume:
// `ring_count` azimuth steps per ring, `elevation_levels` rings stacked
// between the bottom and top of the bounds, every pose aimed at the bounds
// center. Deterministic order (level-major, then azimuth) so downstream
// ranking is reproducible.

use log::debug;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use super::ViewCandidate;
use crate::ArgusError;
use crate::map::BoundingBox;

/// Ring-pattern parameters for candidate generation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Candidate poses per ring.
    pub ring_count: usize,
    /// Rings stacked across the vertical extent of the bounds.
    pub elevation_levels: usize,
    /// Extra ring radius beyond the bounds' horizontal half-diagonal (meters).
    pub standoff: f64,
    /// Fixed ring radius override (meters); `None` derives it from the bounds.
    pub radius: Option<f64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            ring_count: 16,
            elevation_levels: 3,
            standoff: 0.5,
            radius: None,
        }
    }
}

impl SamplingConfig {
    /// Rejects patterns that cannot place a single candidate.
    pub fn validate(&self) -> Result<(), ArgusError> {
        if self.ring_count == 0 {
            return Err(ArgusError::Config(
                "ring_count must be at least 1".to_string(),
            ));
        }
        if self.elevation_levels == 0 {
            return Err(ArgusError::Config(
                "elevation_levels must be at least 1".to_string(),
            ));
        }
        if self.standoff < 0.0 {
            return Err(ArgusError::Config(format!(
                "standoff must not be negative, got {}",
                self.standoff
            )));
        }
        if let Some(radius) = self.radius {
            if radius <= 0.0 {
                return Err(ArgusError::Config(format!(
                    "radius override must be positive, got {}",
                    radius
                )));
            }
        }
        Ok(())
    }
}

/// Generates view candidates around an exploration volume.
#[derive(Clone, Debug)]
pub struct ViewSampler {
    config: SamplingConfig,
}

impl ViewSampler {
    /// Builds a sampler from a validated config.
    pub fn new(config: SamplingConfig) -> Result<Self, ArgusError> {
        config.validate()?;
        Ok(ViewSampler { config })
    }

    /// Ring radius used for the given bounds.
    pub fn ring_radius(&self, bounds: &BoundingBox) -> f64 {
        self.config.radius.unwrap_or_else(|| {
            let extent = bounds.extent();
            (extent.x * extent.x + extent.y * extent.y).sqrt() / 2.0 + self.config.standoff
        })
    }

    /// Candidate poses for the given bounds, aimed at its center.
    pub fn generate(&self, bounds: &BoundingBox) -> Vec<ViewCandidate> {
        let center = bounds.center();
        let radius = self.ring_radius(bounds);
        let levels = self.config.elevation_levels;
        let per_ring = self.config.ring_count;

        let mut candidates = Vec::with_capacity(levels * per_ring);
        for level in 0..levels {
            let z = if levels == 1 {
                center.z
            } else {
                bounds.min.z + bounds.extent().z * level as f64 / (levels - 1) as f64
            };
            for i in 0..per_ring {
                let azimuth = 2.0 * std::f64::consts::PI * i as f64 / per_ring as f64;
                let position = Point3::new(
                    center.x + radius * azimuth.cos(),
                    center.y + radius * azimuth.sin(),
                    z,
                );
                candidates.push(ViewCandidate::looking_at(position, center));
            }
        }

        debug!(
            "sampled {} candidates on {} ring(s) of radius {:.2} m",
            candidates.len(),
            levels,
            radius
        );
        candidates
    }
}
