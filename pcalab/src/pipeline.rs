//! The five step PCA walkthrough as an explicit state machine.
//!
//! Each stage needs the one before it. Reading a stage that has not been
//! reached is a `StageNotReady` error, and any edit to the points drops every
//! cached result and returns to `Stage::Empty`.

use rand::Rng;
use tracing::{debug, info};

use crate::{
    agg,
    cov::{self, CovarianceMatrix},
    eigen::{self, EigenPair},
    error::PcaError,
    points::{LabConfig, Point, PointId, PointSet},
    project::{self, Projection},
    vector::Vec2,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Empty = 0,
    MeanComputed = 1,
    Centered = 2,
    CovarianceComputed = 3,
    EigendecompositionDone = 4,
    Projected = 5,
}

impl Stage {
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Empty => Some(Stage::MeanComputed),
            Stage::MeanComputed => Some(Stage::Centered),
            Stage::Centered => Some(Stage::CovarianceComputed),
            Stage::CovarianceComputed => Some(Stage::EigendecompositionDone),
            Stage::EigendecompositionDone => Some(Stage::Projected),
            Stage::Projected => None,
        }
    }

    fn previous(&self) -> Option<Stage> {
        match self {
            Stage::Empty => None,
            Stage::MeanComputed => Some(Stage::Empty),
            Stage::Centered => Some(Stage::MeanComputed),
            Stage::CovarianceComputed => Some(Stage::Centered),
            Stage::EigendecompositionDone => Some(Stage::CovarianceComputed),
            Stage::Projected => Some(Stage::EigendecompositionDone),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Cache {
    mean: Option<Vec2>,
    centered: Option<Vec<Point>>,
    covariance: Option<CovarianceMatrix>,
    eigen: Option<[EigenPair; 2]>,
    projections: Option<Vec<Projection>>,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    points: PointSet,
    stage: Stage,
    cache: Cache,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_points(PointSet::new())
    }

    pub fn with_config(config: LabConfig) -> Self {
        Self::with_points(PointSet::with_config(config))
    }

    pub fn with_points(points: PointSet) -> Self {
        Self {
            points,
            stage: Stage::Empty,
            cache: Cache::default(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn reset(&mut self) {
        if self.stage != Stage::Empty {
            debug!(from = ?self.stage, "pipeline reset");
        }
        self.stage = Stage::Empty;
        self.cache = Cache::default();
    }

    // Point edits. Every one of them invalidates the whole chain.

    pub fn add_point(&mut self, x: f64, y: f64) -> Point {
        let point = self.points.add(x, y);
        self.reset();
        point
    }

    pub fn remove_point(&mut self, id: PointId) -> Result<Point, PcaError> {
        let point = self.points.remove(id)?;
        self.reset();
        Ok(point)
    }

    pub fn move_point(&mut self, id: PointId, x: f64, y: f64) -> Result<Point, PcaError> {
        let point = self.points.move_to(id, x, y)?;
        self.reset();
        Ok(point)
    }

    pub fn delete_nearest(&mut self, x: f64, y: f64) -> Option<Point> {
        let point = self.points.delete_nearest(x, y)?;
        self.reset();
        Some(point)
    }

    pub fn undo_last(&mut self) -> Option<Point> {
        let point = self.points.undo_last()?;
        self.reset();
        Some(point)
    }

    pub fn clear_points(&mut self) {
        self.points.clear();
        self.reset();
    }

    pub fn add_random_points<R: Rng>(&mut self, count: usize, rng: &mut R) -> Vec<Point> {
        let added = self.points.add_random(count, rng);
        self.reset();
        added
    }

    pub fn add_grid_points<R: Rng>(&mut self, rng: &mut R) -> Vec<Point> {
        let added = self.points.add_grid(rng);
        self.reset();
        added
    }

    pub fn add_example_points(&mut self) -> Vec<Point> {
        let added = self.points.add_example();
        self.reset();
        added
    }

    // Transitions.

    /// Runs the next stage. At `Projected` there is nothing left and the stage
    /// is returned unchanged.
    pub fn advance(&mut self) -> Result<Stage, PcaError> {
        match self.stage {
            Stage::Empty => {
                let mean = agg::compute_mean(self.points.points())?;
                self.cache.mean = Some(mean);
            }
            Stage::MeanComputed => {
                let mean = *self.mean_vector()?;
                self.cache.centered = Some(agg::center(self.points.points(), mean));
            }
            Stage::Centered => {
                let centered = self.centered_points()?;
                let covariance = cov::compute_covariance(centered, centered.len())?;
                self.cache.covariance = Some(covariance);
            }
            Stage::CovarianceComputed => {
                let pairs = eigen::decompose(self.covariance_matrix()?);
                self.cache.eigen = Some(pairs);
            }
            Stage::EigendecompositionDone => {
                let pc1 = self.eigen_pairs()?[0];
                let projections = project::project(self.centered_points()?, &pc1);
                self.cache.projections = Some(projections);
            }
            Stage::Projected => return Ok(self.stage),
        }
        // Every arm above either returned or produced the next stage's data.
        self.stage = self.stage.next().unwrap_or(Stage::Projected);
        debug!(stage = ?self.stage, "pipeline advanced");
        Ok(self.stage)
    }

    /// Runs every remaining stage immediately.
    pub fn run_all(&mut self) -> Result<Stage, PcaError> {
        while self.stage != Stage::Projected {
            self.advance()?;
        }
        info!(points = self.points.len(), "pca complete");
        Ok(self.stage)
    }

    /// Computes `target` if the pipeline sits right before it. A stage that is
    /// already done is left alone, anything further back is an error.
    fn step_to(&mut self, target: Stage) -> Result<(), PcaError> {
        if self.stage >= target {
            return Ok(());
        }
        if Some(self.stage) != target.previous() {
            return Err(PcaError::StageNotReady {
                required: target.previous().unwrap_or(Stage::Empty),
                current: self.stage,
            });
        }
        self.advance()?;
        Ok(())
    }

    pub fn mean(&mut self) -> Result<Vec2, PcaError> {
        self.step_to(Stage::MeanComputed)?;
        self.mean_vector().copied()
    }

    pub fn center(&mut self) -> Result<&[Point], PcaError> {
        self.step_to(Stage::Centered)?;
        self.centered_points()
    }

    pub fn covariance(&mut self) -> Result<CovarianceMatrix, PcaError> {
        self.step_to(Stage::CovarianceComputed)?;
        self.covariance_matrix().copied()
    }

    pub fn eigen(&mut self) -> Result<[EigenPair; 2], PcaError> {
        self.step_to(Stage::EigendecompositionDone)?;
        self.eigen_pairs().copied()
    }

    pub fn project(&mut self) -> Result<&[Projection], PcaError> {
        self.step_to(Stage::Projected)?;
        self.projections()
    }

    // Read only views.

    pub fn mean_vector(&self) -> Result<&Vec2, PcaError> {
        self.cache.mean.as_ref().ok_or(self.not_ready(Stage::MeanComputed))
    }

    pub fn centered_points(&self) -> Result<&[Point], PcaError> {
        self.cache
            .centered
            .as_deref()
            .ok_or(self.not_ready(Stage::Centered))
    }

    pub fn covariance_matrix(&self) -> Result<&CovarianceMatrix, PcaError> {
        self.cache
            .covariance
            .as_ref()
            .ok_or(self.not_ready(Stage::CovarianceComputed))
    }

    pub fn eigen_pairs(&self) -> Result<&[EigenPair; 2], PcaError> {
        self.cache
            .eigen
            .as_ref()
            .ok_or(self.not_ready(Stage::EigendecompositionDone))
    }

    pub fn projections(&self) -> Result<&[Projection], PcaError> {
        self.cache
            .projections
            .as_deref()
            .ok_or(self.not_ready(Stage::Projected))
    }

    pub fn explained_variance_ratio(&self, k: usize) -> Result<f64, PcaError> {
        let values = eigen::eigenvalues(self.eigen_pairs()?);
        Ok(project::explained_variance_ratio(&values, k))
    }

    /// Reconstruction error of the single component projection.
    pub fn reconstruction_error(&self) -> Result<f64, PcaError> {
        Ok(project::point_reconstruction_error(self.projections()?))
    }

    /// Centered points rebuilt from the first `k` principal components.
    pub fn reconstruct(&self, k: usize) -> Result<Vec<Vec2>, PcaError> {
        let pairs = self.eigen_pairs()?;
        Ok(project::reconstruct(self.centered_points()?, pairs, k))
    }

    fn not_ready(&self, required: Stage) -> PcaError {
        PcaError::StageNotReady {
            required,
            current: self.stage,
        }
    }
}
