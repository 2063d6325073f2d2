use std::fmt::Display;

use rand::Rng;
use tracing::debug;

use crate::{error::PcaError, vector::Vec2};

/// Stable handle for a point. Survives moves, never reused within a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(u64);

impl Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub id: PointId,
}

impl Point {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Tunables for the point lab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabConfig {
    /// Maximum distance for `delete_nearest` to hit a point.
    pub delete_radius: f64,
    /// Random points are drawn from `[-random_range, random_range)` on both axes.
    pub random_range: f64,
    /// Grid points are offset by up to this much on both axes.
    pub grid_jitter: f64,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            delete_radius: 0.5,
            random_range: 4.0,
            grid_jitter: 0.25,
        }
    }
}

const GRID: [f64; 5] = [-4.0, -2.0, 0.0, 2.0, 4.0];

/// Roughly a line of slope one with two points of noise.
pub const EXAMPLE_POINTS: [(f64, f64); 10] = [
    (-4.0, -3.0),
    (-3.0, -2.0),
    (-2.0, -1.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (1.0, 2.0),
    (2.0, 3.0),
    (3.0, 4.0),
    (-2.0, 2.0),
    (2.0, -2.0),
];

#[derive(Debug, Clone, Default)]
pub struct PointSet {
    points: Vec<Point>,
    next_id: u64,
    config: LabConfig,
}

impl PointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LabConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn add(&mut self, x: f64, y: f64) -> Point {
        let point = Point {
            x,
            y,
            id: PointId(self.next_id),
        };
        self.next_id += 1;
        self.points.push(point);
        debug!(id = %point.id, x, y, "added point");
        point
    }

    pub fn remove(&mut self, id: PointId) -> Result<Point, PcaError> {
        let index = self.index_of(id)?;
        let point = self.points.remove(index);
        debug!(%id, "removed point");
        Ok(point)
    }

    pub fn move_to(&mut self, id: PointId, x: f64, y: f64) -> Result<Point, PcaError> {
        let index = self.index_of(id)?;
        let point = &mut self.points[index];
        point.x = x;
        point.y = y;
        debug!(%id, x, y, "moved point");
        Ok(*point)
    }

    pub fn get(&self, id: PointId) -> Option<&Point> {
        self.points.iter().find(|p| p.id == id)
    }

    pub fn nearest(&self, x: f64, y: f64) -> Option<&Point> {
        let target = Vec2::new(x, y);
        let mut nearest = None;
        let mut min_distance = f64::INFINITY;
        for point in &self.points {
            let distance = target.distance(point.position());
            if distance < min_distance {
                min_distance = distance;
                nearest = Some(point);
            }
        }
        nearest
    }

    /// Removes the point closest to `(x, y)` if it lies inside the delete radius.
    pub fn delete_nearest(&mut self, x: f64, y: f64) -> Option<Point> {
        let target = Vec2::new(x, y);
        let id = self
            .nearest(x, y)
            .filter(|p| target.distance(p.position()) < self.config.delete_radius)
            .map(|p| p.id)?;
        self.remove(id).ok()
    }

    pub fn undo_last(&mut self) -> Option<Point> {
        let point = self.points.pop();
        if let Some(p) = &point {
            debug!(id = %p.id, "undid point");
        }
        point
    }

    pub fn clear(&mut self) {
        debug!(count = self.points.len(), "cleared points");
        self.points.clear();
    }

    pub fn add_random<R: Rng>(&mut self, count: usize, rng: &mut R) -> Vec<Point> {
        let range = self.config.random_range;
        (0..count)
            .map(|_| {
                if range > 0.0 {
                    let x = rng.gen_range(-range..range);
                    let y = rng.gen_range(-range..range);
                    self.add(x, y)
                } else {
                    self.add(0.0, 0.0)
                }
            })
            .collect()
    }

    /// A jittered 5x5 grid covering `[-4, 4]` on both axes.
    pub fn add_grid<R: Rng>(&mut self, rng: &mut R) -> Vec<Point> {
        let jitter = self.config.grid_jitter;
        let mut added = Vec::with_capacity(GRID.len() * GRID.len());
        for x in GRID {
            for y in GRID {
                let (dx, dy) = if jitter > 0.0 {
                    (rng.gen_range(-jitter..jitter), rng.gen_range(-jitter..jitter))
                } else {
                    (0.0, 0.0)
                };
                added.push(self.add(x + dx, y + dy));
            }
        }
        added
    }

    pub fn add_example(&mut self) -> Vec<Point> {
        EXAMPLE_POINTS
            .iter()
            .map(|&(x, y)| self.add(x, y))
            .collect()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn index_of(&self, id: PointId) -> Result<usize, PcaError> {
        self.points
            .iter()
            .position(|p| p.id == id)
            .ok_or(PcaError::UnknownPoint(id))
    }
}
