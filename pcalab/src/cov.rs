use tracing::instrument;

use crate::{error::PcaError, points::Point};

/// Symmetric 2x2 sample covariance `[[cxx, cxy], [cxy, cyy]]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CovarianceMatrix {
    pub cxx: f64,
    pub cxy: f64,
    pub cyy: f64,
}

impl CovarianceMatrix {
    pub fn new(cxx: f64, cxy: f64, cyy: f64) -> Self {
        Self { cxx, cxy, cyy }
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        match (row, col) {
            (0, 0) => self.cxx,
            (1, 1) => self.cyy,
            _ => self.cxy,
        }
    }

    pub fn rows(&self) -> [[f64; 2]; 2] {
        [[self.cxx, self.cxy], [self.cxy, self.cyy]]
    }

    pub fn trace(&self) -> f64 {
        self.cxx + self.cyy
    }

    pub fn determinant(&self) -> f64 {
        self.cxx * self.cyy - self.cxy * self.cxy
    }
}

/// Unbiased covariance of already centered points, divisor `n - 1`.
#[instrument(level = "debug", skip(centered))]
pub fn compute_covariance(centered: &[Point], n: usize) -> Result<CovarianceMatrix, PcaError> {
    if n < 2 {
        return Err(PcaError::InsufficientData { required: 2, got: n });
    }
    if centered.len() != n {
        return Err(PcaError::InvalidDimension {
            expected: n,
            got: centered.len(),
        });
    }

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for p in centered {
        sxx += p.x * p.x;
        sxy += p.x * p.y;
        syy += p.y * p.y;
    }

    let divisor = (n - 1) as f64;
    Ok(CovarianceMatrix::new(sxx / divisor, sxy / divisor, syy / divisor))
}
