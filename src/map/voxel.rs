// src/map/voxel.rs

// Integer voxel addressing. World coordinates are discretized by flooring
// each component at the map resolution, so voxels tile the whole space and
// negative coordinates index correctly.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Index of one voxel in the map grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoxelKey {
    /// Grid index along x.
    pub x: i32,
    /// Grid index along y.
    pub y: i32,
    /// Grid index along z.
    pub z: i32,
}

impl VoxelKey {
    /// Builds a key directly from grid indices.
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        VoxelKey { x, y, z }
    }

    /// Key of the voxel containing `point` at the given resolution.
    ///
    /// Points exactly on a voxel boundary belong to the upper voxel.
    pub fn of_point(point: &Point3<f64>, resolution: f64) -> Self {
        VoxelKey {
            x: (point.x / resolution).floor() as i32,
            y: (point.y / resolution).floor() as i32,
            z: (point.z / resolution).floor() as i32,
        }
    }

    /// World coordinates of this voxel's center.
    pub fn center(&self, resolution: f64) -> Point3<f64> {
        Point3::new(
            (self.x as f64 + 0.5) * resolution,
            (self.y as f64 + 0.5) * resolution,
            (self.z as f64 + 0.5) * resolution,
        )
    }
}
