//! Occupancy mapping for view planning.
//!
//! This module holds the 3D world model the planner reasons about:
//! - A sparse voxel map with log-odds occupancy (`OccupancyMap`)
//! - Voxel indexing and world/voxel conversions (`VoxelKey`)
//! - Ray traversal through the voxel grid (`RayTraversal`)
//! - Axis-aligned exploration bounds (`BoundingBox`)

mod occupancy;
mod raycast;
mod voxel;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

pub use occupancy::{MapConfig, MapSnapshot, OccupancyMap};
pub use raycast::RayTraversal;
pub use voxel::VoxelKey;

/// Classification of a single voxel.
///
/// `Unknown` means the voxel has never been observed; it is not stored in
/// the map at all, matching how unmapped space behaves in an occupancy
/// octree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoxelState {
    /// Observed and below the occupancy threshold.
    Free,
    /// Observed and at or above the occupancy threshold.
    Occupied,
    /// Never observed.
    Unknown,
}

/// Axis-aligned box delimiting the volume the planner explores.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Lower corner (meters, world frame).
    pub min: Point3<f64>,
    /// Upper corner (meters, world frame).
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// Creates a box from its two corners.
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        BoundingBox { min, max }
    }

    /// True when `point` lies inside the box (inclusive on all faces).
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Geometric center of the box.
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Edge lengths along x, y, z.
    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// A box is usable only when `min` is strictly below `max` on every axis.
    pub fn is_valid(&self) -> bool {
        self.min.x < self.max.x && self.min.y < self.max.y && self.min.z < self.max.z
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        // A small room-sized volume in front of the robot.
        BoundingBox {
            min: Point3::new(-2.0, -2.0, 0.0),
            max: Point3::new(2.0, 2.0, 2.0),
        }
    }
}
