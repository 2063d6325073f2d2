use tracing::instrument;

use crate::{error::PcaError, points::Point, vector::Vec2};

#[derive(Debug, Clone, Default)]
pub struct MeanBuilder {
    sum_x: f64,
    sum_y: f64,
    len: usize,
}

impl MeanBuilder {
    pub fn new() -> Self {
        Self {
            sum_x: 0.0,
            sum_y: 0.0,
            len: 0,
        }
    }

    pub fn add_val(&mut self, val: Vec2) {
        self.sum_x += val.x;
        self.sum_y += val.y;
        self.len += 1;
    }

    pub fn build(&self) -> Result<Vec2, PcaError> {
        if self.len == 0 {
            return Err(PcaError::EmptyInput);
        }
        let n = self.len as f64;
        Ok(Vec2::new(self.sum_x / n, self.sum_y / n))
    }
}

/// Centroid of the points. Fails on an empty set.
#[instrument(level = "debug", skip_all, fields(n = points.len()))]
pub fn compute_mean(points: &[Point]) -> Result<Vec2, PcaError> {
    let mut builder = MeanBuilder::new();
    for point in points {
        builder.add_val(point.position());
    }
    builder.build()
}

/// Subtracts `mean` from every point, keeping ids.
pub fn center(points: &[Point], mean: Vec2) -> Vec<Point> {
    points
        .iter()
        .map(|p| Point {
            x: p.x - mean.x,
            y: p.y - mean.y,
            id: p.id,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::points::PointSet;

    #[test]
    fn test_mean_of_empty() {
        assert_eq!(compute_mean(&[]), Err(PcaError::EmptyInput));
    }

    #[test]
    fn test_mean_of_single_point() {
        let mut set = PointSet::new();
        set.add(2.5, -1.0);

        assert_eq!(compute_mean(set.points()).unwrap(), Vec2::new(2.5, -1.0));
    }

    #[test]
    fn test_mean_is_coordinate_average() {
        let mut set = PointSet::new();
        set.add(1.0, 2.0);
        set.add(3.0, 4.0);
        set.add(5.0, 9.0);

        assert_eq!(compute_mean(set.points()).unwrap(), Vec2::new(3.0, 5.0));
    }

    #[test]
    fn test_centered_mean_is_zero() {
        let mut set = PointSet::new();
        set.add_example();
        set.add(0.37, -8.1);
        let mean = compute_mean(set.points()).unwrap();
        let centered = center(set.points(), mean);
        let centered_mean = compute_mean(&centered).unwrap();

        assert_abs_diff_eq!(centered_mean.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(centered_mean.y, 0.0, epsilon = 1e-12);
        for (c, p) in centered.iter().zip(set.points()) {
            assert_eq!(c.id, p.id);
        }
    }
}
