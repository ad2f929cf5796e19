//! Next-best-view solving.
//!
//! `NbvSolver` ties the pieces together: extract the unknown space inside
//! the exploration bounds, sample candidate poses around the volume, score
//! them by information gain, and decide whether exploration is finished.

use log::info;
use nalgebra::Point3;

use crate::map::{BoundingBox, OccupancyMap};
use crate::sensor::SensorModel;
use crate::view::{EvaluationConfig, GainEvaluator, ScoredView, ViewSampler};
use crate::{ArgusConfig, ArgusError};

/// One complete planning result.
#[derive(Clone, Debug)]
pub struct NbvSolution {
    /// Candidates sorted by descending gain.
    pub views: Vec<ScoredView>,
    /// True when no candidate is worth visiting anymore.
    pub exploration_done: bool,
    /// Centers of the unknown voxels inside the bounds.
    pub unknown: Vec<Point3<f64>>,
}

impl NbvSolution {
    /// The winning view, if any candidate was generated.
    pub fn best(&self) -> Option<&ScoredView> {
        self.views.first()
    }
}

/// Chooses the next sensor pose that reveals the most unknown space.
pub struct NbvSolver {
    sampler: ViewSampler,
    evaluator: GainEvaluator,
    evaluation: EvaluationConfig,
    bounds: BoundingBox,
}

impl NbvSolver {
    /// Builds a solver from a validated configuration.
    pub fn new(config: &ArgusConfig) -> Result<Self, ArgusError> {
        config.validate()?;
        let sensor = SensorModel::new(config.sensor)?;
        Ok(NbvSolver {
            sampler: ViewSampler::new(config.sampling)?,
            evaluator: GainEvaluator::new(sensor),
            evaluation: config.evaluation,
            bounds: config.bounds,
        })
    }

    /// The configured exploration bounds.
    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Plans against the configured exploration bounds.
    pub fn solve(&self, map: &OccupancyMap) -> Result<NbvSolution, ArgusError> {
        self.solve_in(map, &self.bounds)
    }

    /// Plans against caller-supplied bounds (per-request override).
    pub fn solve_in(
        &self,
        map: &OccupancyMap,
        bounds: &BoundingBox,
    ) -> Result<NbvSolution, ArgusError> {
        if !bounds.is_valid() {
            return Err(ArgusError::Planning(format!(
                "exploration bounds are empty: min {:?}, max {:?}",
                bounds.min, bounds.max
            )));
        }

        let unknown = map.unknown_in_bounds(bounds);
        let candidates = self.sampler.generate(bounds);
        let views = self.evaluator.rank(map, candidates, bounds);

        let best_gain = views.first().map(|scored| scored.gain).unwrap_or(0.0);
        let exploration_done = unknown.is_empty() || best_gain < self.evaluation.gain_threshold;

        info!(
            "evaluated {} candidates: best gain {:.0}, {} unknown voxels in bounds, exploration {}",
            views.len(),
            best_gain,
            unknown.len(),
            if exploration_done { "finished" } else { "ongoing" }
        );

        Ok(NbvSolution {
            views,
            exploration_done,
            unknown,
        })
    }
}
