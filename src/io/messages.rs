//! Wire types for the node surface.
//!
//! Every exchange is one JSON document per line; field layouts follow the
//! usual robotics message conventions (point/quaternion/pose shapes) so
//! existing tooling can parse the stream. Map snapshots travel as
//! [`MapSnapshot`](crate::map::MapSnapshot) directly.

use nalgebra::{Point3, Quaternion, UnitQuaternion};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::map::BoundingBox;
use crate::solver::NbvSolution;
use crate::view::{ScoredView, ViewCandidate};

/// A 3D point (meters, world frame).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointMsg {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl From<&Point3<f64>> for PointMsg {
    fn from(point: &Point3<f64>) -> Self {
        PointMsg {
            x: point.x,
            y: point.y,
            z: point.z,
        }
    }
}

impl From<PointMsg> for Point3<f64> {
    fn from(msg: PointMsg) -> Self {
        Point3::new(msg.x, msg.y, msg.z)
    }
}

/// An orientation as a unit quaternion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuaternionMsg {
    /// X (i) component.
    pub x: f64,
    /// Y (j) component.
    pub y: f64,
    /// Z (k) component.
    pub z: f64,
    /// W (scalar) component.
    pub w: f64,
}

impl From<&UnitQuaternion<f64>> for QuaternionMsg {
    fn from(q: &UnitQuaternion<f64>) -> Self {
        QuaternionMsg {
            x: q.coords.x,
            y: q.coords.y,
            z: q.coords.z,
            w: q.coords.w,
        }
    }
}

impl From<QuaternionMsg> for UnitQuaternion<f64> {
    fn from(msg: QuaternionMsg) -> Self {
        // Renormalizes, so slightly off-unit inputs stay usable.
        UnitQuaternion::from_quaternion(Quaternion::new(msg.w, msg.x, msg.y, msg.z))
    }
}

/// A full sensor pose.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PoseMsg {
    /// Sensor position.
    pub position: PointMsg,
    /// Sensor orientation; the sensor looks along the rotated x axis.
    pub orientation: QuaternionMsg,
}

impl From<&ViewCandidate> for PoseMsg {
    fn from(view: &ViewCandidate) -> Self {
        PoseMsg {
            position: PointMsg::from(&view.position),
            orientation: QuaternionMsg::from(&view.orientation),
        }
    }
}

impl From<PoseMsg> for ViewCandidate {
    fn from(msg: PoseMsg) -> Self {
        ViewCandidate::new(msg.position.into(), msg.orientation.into())
    }
}

/// An axis-aligned exploration volume.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BoundsMsg {
    /// Lower corner.
    pub min: PointMsg,
    /// Upper corner.
    pub max: PointMsg,
}

impl From<&BoundingBox> for BoundsMsg {
    fn from(bounds: &BoundingBox) -> Self {
        BoundsMsg {
            min: PointMsg::from(&bounds.min),
            max: PointMsg::from(&bounds.max),
        }
    }
}

impl From<BoundsMsg> for BoundingBox {
    fn from(msg: BoundsMsg) -> Self {
        BoundingBox::new(msg.min.into(), msg.max.into())
    }
}

/// A candidate pose with its evaluated gain.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ScoredViewMsg {
    /// The candidate pose.
    pub pose: PoseMsg,
    /// Distinct unknown voxels the sensor would reveal from it.
    pub gain: f64,
}

impl From<&ScoredView> for ScoredViewMsg {
    fn from(scored: &ScoredView) -> Self {
        ScoredViewMsg {
            pose: PoseMsg::from(&scored.view),
            gain: scored.gain,
        }
    }
}

/// One planning request.
///
/// `bounds` overrides the node's configured exploration volume for this
/// request only; omit it to plan against the configured bounds.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct GetNbvRequest {
    /// Optional per-request exploration bounds.
    #[serde(default)]
    pub bounds: Option<BoundsMsg>,
}

/// One successful planning reply.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GetNbvResponse {
    /// True when no candidate clears the gain threshold anymore.
    pub exploration_done: bool,
    /// Number of unknown voxels inside the bounds when planning ran.
    pub unknown_voxels: usize,
    /// Candidates sorted by descending gain.
    pub views: Vec<ScoredViewMsg>,
}

impl From<&NbvSolution> for GetNbvResponse {
    fn from(solution: &NbvSolution) -> Self {
        GetNbvResponse {
            exploration_done: solution.exploration_done,
            unknown_voxels: solution.unknown.len(),
            views: solution.views.iter().map(ScoredViewMsg::from).collect(),
        }
    }
}

/// A failed request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorMsg {
    /// Human-readable failure description.
    pub error: String,
}

/// One reply line from the planning service.
///
/// A reply is either a [`GetNbvResponse`] or an [`ErrorMsg`]; the two carry
/// disjoint fields, so clients can parse a line as `NbvReply` and match.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NbvReply {
    /// The request was handled and planning produced a result.
    Ok(GetNbvResponse),
    /// The request failed; the connection stays open.
    Err(ErrorMsg),
}

/// Request line sent to the mapping server; the reply is one
/// [`MapSnapshot`](crate::map::MapSnapshot) line.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct GetMapRequest {}

/// One published cloud of unknown-voxel centers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CloudMsg {
    /// Microseconds since the Unix epoch at publish time.
    pub stamp_us: u64,
    /// Voxel centers (meters, world frame).
    pub points: Vec<PointMsg>,
}

impl CloudMsg {
    /// Builds a cloud stamped with the current wall-clock time.
    pub fn now(points: &[Point3<f64>]) -> Self {
        let stamp_us = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_micros() as u64)
            .unwrap_or(0);
        CloudMsg {
            stamp_us,
            points: points.iter().map(PointMsg::from).collect(),
        }
    }
}
