// src/map/raycast.rs

// Voxel ray traversal (Amanatides & Woo). Both scan integration and view
// evaluation need to know which voxels a beam crosses; this iterator yields
// them in visiting order, starting with the voxel containing the ray
// origin, until the ray parameter exceeds the range limit.

use nalgebra::{Point3, Vector3};

use super::voxel::VoxelKey;

// Direction components below this are treated as zero so boundary
// distances stay finite.
const DIR_EPSILON: f64 = 1e-12;

/// Iterator over the voxels a ray passes through.
///
/// Consecutive keys differ in exactly one axis by one step, so callers can
/// stop traversal at the first occupied voxel without missing cells.
#[derive(Debug)]
pub struct RayTraversal {
    current: VoxelKey,
    step: [i32; 3],
    t_max: [f64; 3],
    t_delta: [f64; 3],
    limit: f64,
    started: bool,
    finished: bool,
}

impl RayTraversal {
    /// Traversal from `origin` along `direction`, out to `max_range` meters.
    ///
    /// `direction` does not need to be normalized. A zero-length direction
    /// or non-positive range yields only the origin voxel.
    pub fn new(
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
        max_range: f64,
        resolution: f64,
    ) -> Self {
        let key = VoxelKey::of_point(origin, resolution);
        let norm = direction.norm();

        if norm <= DIR_EPSILON || max_range <= 0.0 {
            return RayTraversal {
                current: key,
                step: [0; 3],
                t_max: [f64::INFINITY; 3],
                t_delta: [f64::INFINITY; 3],
                limit: 0.0,
                started: false,
                finished: false,
            };
        }

        let dir = direction / norm;
        let indices = [key.x, key.y, key.z];
        let coords = [origin.x, origin.y, origin.z];
        let mut step = [0_i32; 3];
        let mut t_max = [f64::INFINITY; 3];
        let mut t_delta = [f64::INFINITY; 3];

        for axis in 0..3 {
            let d = dir[axis];
            if d > DIR_EPSILON {
                step[axis] = 1;
                t_delta[axis] = resolution / d;
                let boundary = (indices[axis] + 1) as f64 * resolution;
                t_max[axis] = (boundary - coords[axis]) / d;
            } else if d < -DIR_EPSILON {
                step[axis] = -1;
                t_delta[axis] = -resolution / d;
                let boundary = indices[axis] as f64 * resolution;
                t_max[axis] = (boundary - coords[axis]) / d;
            }
        }

        RayTraversal {
            current: key,
            step,
            t_max,
            t_delta,
            limit: max_range,
            started: false,
            finished: false,
        }
    }

    /// Bounded traversal toward a known endpoint; the endpoint's voxel is
    /// the last one visited.
    pub fn between(origin: &Point3<f64>, endpoint: &Point3<f64>, resolution: f64) -> Self {
        let delta = endpoint - origin;
        RayTraversal::new(origin, &delta, delta.norm(), resolution)
    }
}

impl Iterator for RayTraversal {
    type Item = VoxelKey;

    fn next(&mut self) -> Option<VoxelKey> {
        if self.finished {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.current);
        }

        // Step across the nearest voxel boundary.
        let mut axis = 0;
        if self.t_max[1] < self.t_max[axis] {
            axis = 1;
        }
        if self.t_max[2] < self.t_max[axis] {
            axis = 2;
        }

        if self.t_max[axis] > self.limit {
            self.finished = true;
            return None;
        }

        match axis {
            0 => self.current.x += self.step[0],
            1 => self.current.y += self.step[1],
            _ => self.current.z += self.step[2],
        }
        self.t_max[axis] += self.t_delta[axis];

        Some(self.current)
    }
}
