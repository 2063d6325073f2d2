//! Closed form eigen-decomposition of symmetric 2x2 matrices.
//!
//! For `[[a, b], [b, c]]` the eigenvalues are `(trace ± sqrt(trace² - 4 det)) / 2`.
//! Symmetry makes the discriminant non-negative, so only rounding can push it
//! below zero and it is clamped there. A covariance matrix is positive
//! semidefinite, so the smaller eigenvalue is floored at zero for the same
//! reason. The second eigenvector is the first one rotated by 90 degrees.

use tracing::instrument;

use crate::{cov::CovarianceMatrix, vector::Vec2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EigenPair {
    pub value: f64,
    /// Unit length.
    pub vector: Vec2,
}

/// Eigenpairs of `cov`, largest eigenvalue first.
#[instrument(level = "debug")]
pub fn decompose(cov: &CovarianceMatrix) -> [EigenPair; 2] {
    let trace = cov.trace();
    let discriminant = (trace * trace - 4.0 * cov.determinant()).max(0.0);
    let root = discriminant.sqrt();

    let major = (trace + root) / 2.0;
    let minor = ((trace - root) / 2.0).max(0.0);

    let v1 = if cov.cxy != 0.0 {
        // (cxy, major - cxx) is (1, (major - cxx) / cxy) scaled by cxy
        let v = Vec2::new(cov.cxy, major - cov.cxx).normalized();
        if v.x < 0.0 { v * -1.0 } else { v }
    } else if cov.cxx >= cov.cyy {
        Vec2::new(1.0, 0.0)
    } else {
        Vec2::new(0.0, 1.0)
    };

    [
        EigenPair {
            value: major,
            vector: v1,
        },
        EigenPair {
            value: minor,
            vector: v1.perpendicular(),
        },
    ]
}

pub fn eigenvalues(pairs: &[EigenPair]) -> Vec<f64> {
    pairs.iter().map(|p| p.value).collect()
}
