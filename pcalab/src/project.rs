//! Projection onto principal components and the reconstruction back from them.
//!
//! Reconstruction error everywhere in this crate is the mean absolute
//! difference per element, so a 2D point contributes two elements and a face
//! contributes 64.

use tracing::instrument;

use crate::{
    eigen::EigenPair,
    error::PcaError,
    points::Point,
    vector::{self, Vec2},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub original: Point,
    /// Position along the principal component.
    pub coefficient: f64,
    pub reconstructed: Vec2,
}

/// Projects centered points onto `pc1` and maps them back onto its line.
#[instrument(level = "debug", skip(centered), fields(n = centered.len()))]
pub fn project(centered: &[Point], pc1: &EigenPair) -> Vec<Projection> {
    let axis = pc1.vector;
    centered
        .iter()
        .map(|point| {
            let coefficient = point.position().dot(axis);
            Projection {
                original: *point,
                coefficient,
                reconstructed: axis * coefficient,
            }
        })
        .collect()
}

/// Rebuilds centered points from their coordinates on the first `k` eigenvectors.
///
/// `k` is capped at the number of pairs, `k = 0` maps everything to the origin.
pub fn reconstruct(centered: &[Point], pairs: &[EigenPair], k: usize) -> Vec<Vec2> {
    let used = &pairs[..k.min(pairs.len())];
    centered
        .iter()
        .map(|point| {
            used.iter().fold(Vec2::ZERO, |acc, pair| {
                acc + pair.vector * point.position().dot(pair.vector)
            })
        })
        .collect()
}

/// Fraction of the total variance held by the `k` largest eigenvalues.
///
/// Expects `eigenvalues` sorted descending. Zero total variance gives 0.
pub fn explained_variance_ratio(eigenvalues: &[f64], k: usize) -> f64 {
    let total: f64 = eigenvalues.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let explained: f64 = eigenvalues.iter().take(k).sum();
    explained / total
}

pub fn reconstruction_error(original: &[f64], reconstructed: &[f64]) -> Result<f64, PcaError> {
    if original.len() != reconstructed.len() {
        return Err(PcaError::InvalidDimension {
            expected: original.len(),
            got: reconstructed.len(),
        });
    }
    if original.is_empty() {
        return Ok(0.0);
    }
    let total: f64 = vector::sub(original, reconstructed)
        .iter()
        .map(|d| d.abs())
        .sum();
    Ok(total / original.len() as f64)
}

/// Same metric as `reconstruction_error`, over the x and y of every projection.
pub fn point_reconstruction_error(projections: &[Projection]) -> f64 {
    let original: Vec<f64> = projections
        .iter()
        .flat_map(|p| [p.original.x, p.original.y])
        .collect();
    let reconstructed: Vec<f64> = projections
        .iter()
        .flat_map(|p| [p.reconstructed.x, p.reconstructed.y])
        .collect();
    // Both sides come from the same projections so the lengths always agree.
    reconstruction_error(&original, &reconstructed).unwrap_or(f64::NAN)
}

/// `mean + Σ coefficients[i] * eigenfaces[i]`, clamped to `[0, 1]` per element.
pub fn reconstruct_with_k_components<F: AsRef<[f64]>>(
    mean: &[f64],
    eigenfaces: &[F],
    coefficients: &[f64],
) -> Result<Vec<f64>, PcaError> {
    if eigenfaces.len() != coefficients.len() {
        return Err(PcaError::InvalidDimension {
            expected: eigenfaces.len(),
            got: coefficients.len(),
        });
    }

    let mut result = mean.to_vec();
    for (face, &coefficient) in eigenfaces.iter().zip(coefficients) {
        let face = face.as_ref();
        if face.len() != mean.len() {
            return Err(PcaError::InvalidDimension {
                expected: mean.len(),
                got: face.len(),
            });
        }
        result = vector::add(&result, &vector::scalar_mul(coefficient, face));
    }

    Ok(result.into_iter().map(|v| v.clamp(0.0, 1.0)).collect())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{agg, cov, eigen, points::PointSet};

    fn pipeline_parts(set: &PointSet) -> (Vec<Point>, [EigenPair; 2]) {
        let mean = agg::compute_mean(set.points()).unwrap();
        let centered = agg::center(set.points(), mean);
        let cov = cov::compute_covariance(&centered, centered.len()).unwrap();
        (centered, eigen::decompose(&cov))
    }

    #[test]
    fn test_projection_onto_axis() {
        let mut set = PointSet::new();
        set.add(3.0, 4.0);
        let pc1 = EigenPair {
            value: 1.0,
            vector: Vec2::new(1.0, 0.0),
        };
        let projections = project(set.points(), &pc1);

        assert_eq!(projections[0].coefficient, 3.0);
        assert_eq!(projections[0].reconstructed, Vec2::new(3.0, 0.0));
        assert_eq!(point_reconstruction_error(&projections), 2.0);
    }

    #[test]
    fn test_full_rank_reconstruction_is_lossless() {
        let mut set = PointSet::new();
        set.add_example();
        set.add(1.3, -0.7);
        let (centered, pairs) = pipeline_parts(&set);

        let rebuilt = reconstruct(&centered, &pairs, 2);
        for (p, r) in centered.iter().zip(&rebuilt) {
            assert_abs_diff_eq!(p.x, r.x, epsilon = 1e-10);
            assert_abs_diff_eq!(p.y, r.y, epsilon = 1e-10);
        }

        let original: Vec<f64> = centered.iter().flat_map(|p| [p.x, p.y]).collect();
        let flat: Vec<f64> = rebuilt.iter().flat_map(|r| [r.x, r.y]).collect();
        assert_abs_diff_eq!(reconstruction_error(&original, &flat).unwrap(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_single_component_matches_project() {
        let mut set = PointSet::new();
        set.add_example();
        let (centered, pairs) = pipeline_parts(&set);

        let rebuilt = reconstruct(&centered, &pairs, 1);
        let projections = project(&centered, &pairs[0]);
        for (r, p) in rebuilt.iter().zip(&projections) {
            assert_abs_diff_eq!(r.x, p.reconstructed.x, epsilon = 1e-12);
            assert_abs_diff_eq!(r.y, p.reconstructed.y, epsilon = 1e-12);
        }
        assert!(reconstruct(&centered, &pairs, 0).iter().all(|r| *r == Vec2::ZERO));
    }

    #[test]
    fn test_explained_variance_bounds() {
        let values = [3.0, 1.0];
        let ratios: Vec<f64> = (0..5).map(|k| explained_variance_ratio(&values, k)).collect();

        assert_eq!(ratios, vec![0.0, 0.75, 1.0, 1.0, 1.0]);
        assert_eq!(explained_variance_ratio(&[0.0, 0.0], 1), 0.0);
        assert_eq!(explained_variance_ratio(&[], 1), 0.0);
    }

    #[test]
    fn test_reconstruction_error_mismatch() {
        assert_eq!(
            reconstruction_error(&[1.0, 2.0], &[1.0]),
            Err(PcaError::InvalidDimension { expected: 2, got: 1 })
        );
        assert_eq!(reconstruction_error(&[], &[]), Ok(0.0));
        assert_eq!(reconstruction_error(&[1.0, 0.0], &[0.5, 0.5]), Ok(0.5));
    }

    #[test]
    fn test_reconstruct_with_components_clamps() {
        let mean = vec![0.5, 0.5, 0.5];
        let faces = vec![vec![1.0, 0.0, -1.0], vec![0.0, 0.2, 0.0]];

        let result = reconstruct_with_k_components(&mean, &faces, &[0.75, 1.0]).unwrap();
        assert_eq!(vector::round(&result, 6), vec![1.0, 0.7, 0.0]);

        let mean_only = reconstruct_with_k_components::<Vec<f64>>(&mean, &[], &[]).unwrap();
        assert_eq!(mean_only, mean);
    }

    #[test]
    fn test_reconstruct_with_components_shape_errors() {
        let mean = vec![0.5, 0.5];
        let faces = vec![vec![1.0, 0.0]];

        assert_eq!(
            reconstruct_with_k_components(&mean, &faces, &[1.0, 2.0]),
            Err(PcaError::InvalidDimension { expected: 1, got: 2 })
        );
        assert_eq!(
            reconstruct_with_k_components(&mean, &[vec![1.0]], &[1.0]),
            Err(PcaError::InvalidDimension { expected: 2, got: 1 })
        );
    }
}
