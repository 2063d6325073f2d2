//! The 8x8 smiley face lab.
//!
//! Faces are 64 values in row-major order. The eigenfaces are fixed constants
//! (mouth, eyes and brows) rather than derived from the gallery, and every
//! operation here works on an explicit [`FaceBasis`] value supplied by the caller.

use std::{cmp::Ordering, fmt::Display};

use tracing::{debug, instrument};

use crate::{
    error::PcaError,
    linalg::{Matrix, MatrixError},
    project,
    vector,
};

pub const SIDE: usize = 8;
pub const FACE_LEN: usize = SIDE * SIDE;

/// Share of variance that `optimal_k` looks for unless told otherwise.
pub const DEFAULT_VARIANCE_TARGET: f64 = 0.85;

/// Coefficient similarity a synthesized face needs to count as a match.
pub const PASS_SIMILARITY: f64 = 0.8;

type Grid = [[f64; SIDE]; SIDE];

#[derive(Debug, Clone, PartialEq)]
pub struct FaceVector(Vec<f64>);

impl FaceVector {
    pub fn new(values: Vec<f64>) -> Result<Self, PcaError> {
        if values.len() != FACE_LEN {
            return Err(PcaError::InvalidDimension {
                expected: FACE_LEN,
                got: values.len(),
            });
        }
        Ok(Self(values))
    }

    pub fn from_rows(rows: &Grid) -> Self {
        Self(rows.iter().flatten().copied().collect())
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= SIDE || col >= SIDE {
            return None;
        }
        Some(self.0[row * SIDE + col])
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.0.chunks(SIDE)
    }

    pub fn round(&self, places: i32) -> Self {
        Self(vector::round(&self.0, places))
    }
}

impl AsRef<[f64]> for FaceVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Elementwise average of the gallery.
pub fn mean_face(gallery: &[FaceVector]) -> Result<FaceVector, PcaError> {
    if gallery.is_empty() {
        return Err(PcaError::EmptyInput);
    }
    let mut sum = vec![0.0; FACE_LEN];
    for face in gallery {
        sum = vector::add(&sum, face.values());
    }
    Ok(FaceVector(vector::scalar_mul(1.0 / gallery.len() as f64, &sum)))
}

/// Sample variance of each pixel across the gallery.
pub fn pixel_variance(gallery: &[FaceVector]) -> Result<FaceVector, PcaError> {
    if gallery.len() < 2 {
        return Err(PcaError::InsufficientData {
            required: 2,
            got: gallery.len(),
        });
    }
    let mean = mean_face(gallery)?;
    let mut sum = vec![0.0; FACE_LEN];
    for face in gallery {
        let diff = vector::sub(face.values(), mean.values());
        let squared: Vec<f64> = diff.iter().map(|d| d * d).collect();
        sum = vector::add(&sum, &squared);
    }
    Ok(FaceVector(vector::scalar_mul(1.0 / (gallery.len() - 1) as f64, &sum)))
}

/// `(row, col)` of the `count` pixels that vary most across the gallery,
/// largest first. Ties keep row-major order.
pub fn most_varying_pixels(
    gallery: &[FaceVector],
    count: usize,
) -> Result<Vec<(usize, usize)>, PcaError> {
    let variance = pixel_variance(gallery)?;
    let mut indexed: Vec<(usize, f64)> = variance.values().iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    Ok(indexed
        .into_iter()
        .take(count)
        .map(|(i, _)| (i / SIDE, i % SIDE))
        .collect())
}

/// Index of the gallery face nearest the mean face, by reconstruction error.
/// Ties go to the earlier face.
pub fn closest_to_mean(gallery: &[FaceVector]) -> Result<usize, PcaError> {
    let mean = mean_face(gallery)?;
    let mut closest = 0;
    let mut min_distance = f64::INFINITY;
    for (i, face) in gallery.iter().enumerate() {
        let distance = project::reconstruction_error(face.values(), mean.values())?;
        if distance < min_distance {
            min_distance = distance;
            closest = i;
        }
    }
    Ok(closest)
}

/// Similarity of two coefficient vectors in `[0, 1]`, 1 for identical.
pub fn coefficient_similarity(target: &[f64], coefficients: &[f64]) -> Result<f64, PcaError> {
    if target.len() != coefficients.len() {
        return Err(PcaError::InvalidDimension {
            expected: target.len(),
            got: coefficients.len(),
        });
    }
    if target.is_empty() {
        return Ok(1.0);
    }
    let diff: f64 = vector::sub(target, coefficients).iter().map(|d| d.abs()).sum();
    Ok((1.0 - diff / target.len() as f64).max(0.0))
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaceBasis {
    mean: FaceVector,
    eigenfaces: Vec<FaceVector>,
    /// Full spectrum, descending. May be longer than `eigenfaces`.
    eigenvalues: Vec<f64>,
    gallery_size: usize,
}

impl FaceBasis {
    pub fn new(
        mean: FaceVector,
        eigenfaces: Vec<FaceVector>,
        eigenvalues: Vec<f64>,
        gallery_size: usize,
    ) -> Result<Self, PcaError> {
        if eigenvalues.len() < eigenfaces.len() {
            return Err(PcaError::InvalidDimension {
                expected: eigenfaces.len(),
                got: eigenvalues.len(),
            });
        }
        Ok(Self {
            mean,
            eigenfaces,
            eigenvalues,
            gallery_size,
        })
    }

    /// Basis built from the built-in smiley gallery and eigenface constants.
    pub fn smiley() -> Result<Self, PcaError> {
        let gallery = Expression::gallery();
        let mean = mean_face(&gallery)?;
        let eigenfaces = EIGENFACES.iter().map(FaceVector::from_rows).collect();
        Self::new(mean, eigenfaces, EIGENVALUES.to_vec(), gallery.len())
    }

    pub fn mean(&self) -> &FaceVector {
        &self.mean
    }

    pub fn eigenfaces(&self) -> &[FaceVector] {
        &self.eigenfaces
    }

    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    pub fn components(&self) -> usize {
        self.eigenfaces.len()
    }

    /// Mean face plus the weighted eigenfaces. Takes between 1 and
    /// `components()` coefficients.
    pub fn synthesize_face(&self, coefficients: &[f64]) -> Result<FaceVector, PcaError> {
        if coefficients.is_empty() || coefficients.len() > self.components() {
            return Err(PcaError::InvalidDimension {
                expected: self.components(),
                got: coefficients.len(),
            });
        }
        let used = &self.eigenfaces[..coefficients.len()];
        let values = project::reconstruct_with_k_components(self.mean.values(), used, coefficients)?;
        Ok(FaceVector(values))
    }

    /// Least squares coefficients of `original - mean` on the first `k` eigenfaces.
    ///
    /// `k` may run up to the length of the spectrum; components past the last
    /// eigenface contribute nothing. The eigenfaces are not orthogonal, so this
    /// solves the normal equations `G c = E (original - mean)` with `G` their
    /// Gram matrix.
    #[instrument(level = "debug", skip(self, original))]
    pub fn project_coefficients(&self, original: &FaceVector, k: usize) -> Result<Vec<f64>, PcaError> {
        self.check_k(k)?;
        let used = &self.eigenfaces[..k.min(self.components())];
        if used.is_empty() {
            return Ok(Vec::new());
        }
        let diff = vector::sub(original.values(), self.mean.values());
        let rhs: Vec<f64> = used.iter().map(|face| vector::dot(face.values(), &diff)).collect();
        let coefficients = Matrix::gram(used)
            .and_then(|gram| gram.lu_decomp())
            .and_then(|lu| lu.solve_for_vec(&rhs))
            .map_err(|e| match e {
                MatrixError::NotInvertible => PcaError::DegenerateBasis,
                _ => PcaError::InvalidDimension {
                    expected: used.len(),
                    got: rhs.len(),
                },
            })?;
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(PcaError::DegenerateBasis);
        }
        debug!(?coefficients, "projected face");
        Ok(coefficients)
    }

    /// Reconstruction of `original` from its own coefficients on `k` eigenfaces.
    /// `k = 0` gives the mean face.
    pub fn reconstruct_face(&self, original: &FaceVector, k: usize) -> Result<FaceVector, PcaError> {
        let coefficients = self.project_coefficients(original, k)?;
        let values = project::reconstruct_with_k_components(
            self.mean.values(),
            &self.eigenfaces[..coefficients.len()],
            &coefficients,
        )?;
        Ok(FaceVector(values))
    }

    pub fn reconstruction_error(&self, original: &FaceVector, k: usize) -> Result<f64, PcaError> {
        let reconstructed = self.reconstruct_face(original, k)?;
        project::reconstruction_error(original.values(), reconstructed.values())
    }

    pub fn explained_variance(&self, k: usize) -> f64 {
        project::explained_variance_ratio(&self.eigenvalues, k)
    }

    /// Smallest `k` whose explained variance reaches `threshold`, searched over
    /// the whole spectrum.
    pub fn optimal_k(&self, threshold: f64) -> Option<usize> {
        (1..=self.eigenvalues.len()).find(|&k| self.explained_variance(k) >= threshold)
    }

    /// Percentage saved by storing the mean face and `k` coefficients instead
    /// of the raw gallery.
    pub fn compression_ratio(&self, k: usize) -> f64 {
        let original = (FACE_LEN * self.gallery_size) as f64;
        let compressed = (k + FACE_LEN) as f64;
        (1.0 - compressed / original) * 100.0
    }

    fn check_k(&self, k: usize) -> Result<(), PcaError> {
        if k > self.eigenvalues.len() {
            return Err(PcaError::InvalidDimension {
                expected: self.eigenvalues.len(),
                got: k,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expression {
    Happy,
    Smile,
    Laugh,
    Smirk,
    Sad,
    Surprised,
    Angry,
}

impl Expression {
    pub const GALLERY: [Expression; 5] = [
        Expression::Happy,
        Expression::Smile,
        Expression::Laugh,
        Expression::Smirk,
        Expression::Sad,
    ];

    pub const ALL: [Expression; 7] = [
        Expression::Happy,
        Expression::Smile,
        Expression::Laugh,
        Expression::Smirk,
        Expression::Sad,
        Expression::Surprised,
        Expression::Angry,
    ];

    pub fn face(&self) -> FaceVector {
        let rows = match self {
            Expression::Happy => &HAPPY,
            Expression::Smile => &SMILE,
            Expression::Laugh => &LAUGH,
            Expression::Smirk => &SMIRK,
            Expression::Sad => &SAD,
            Expression::Surprised => &SURPRISED,
            Expression::Angry => &ANGRY,
        };
        FaceVector::from_rows(rows)
    }

    pub fn gallery() -> Vec<FaceVector> {
        Self::GALLERY.iter().map(|e| e.face()).collect()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.to_string().eq_ignore_ascii_case(name.trim()))
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Expression::Happy => "happy",
            Expression::Smile => "smile",
            Expression::Laugh => "laugh",
            Expression::Smirk => "smirk",
            Expression::Sad => "sad",
            Expression::Surprised => "surprised",
            Expression::Angry => "angry",
        };
        write!(f, "{}", name)
    }
}

/// Faces the synthesis exercise asks for, as coefficients on the first three
/// eigenfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisTarget {
    SlightlyHappy,
    SlightlySad,
    Surprised,
    Neutral,
}

impl SynthesisTarget {
    pub fn coefficients(&self) -> [f64; 3] {
        match self {
            SynthesisTarget::SlightlyHappy => [0.3, -0.1, 0.05],
            SynthesisTarget::SlightlySad => [-0.2, 0.1, 0.2],
            SynthesisTarget::Surprised => [0.1, 0.4, -0.1],
            SynthesisTarget::Neutral => [0.0, 0.0, 0.0],
        }
    }

    pub fn similarity(&self, coefficients: &[f64]) -> Result<f64, PcaError> {
        coefficient_similarity(&self.coefficients(), coefficients)
    }

    pub fn is_match(&self, coefficients: &[f64]) -> Result<bool, PcaError> {
        Ok(self.similarity(coefficients)? >= PASS_SIMILARITY)
    }
}

pub const EIGENVALUES: [f64; 8] = [0.45, 0.25, 0.15, 0.08, 0.04, 0.02, 0.01, 0.00];

const HAPPY: Grid = [
    [0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    [1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0],
];

const SMILE: Grid = [
    [0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    [1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0],
];

const LAUGH: Grid = [
    [0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0],
];

const SMIRK: Grid = [
    [0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    [1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0],
];

const SAD: Grid = [
    [0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    [1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
];

const SURPRISED: Grid = [
    [0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0],
];

const ANGRY: Grid = [
    [0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    [1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0],
    [0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0],
    [0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0],
];

// Mouth, eyes, brows.
const EIGENFACES: [Grid; 3] = [
    [
        [0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00],
        [0.00, 0.00, 0.05, 0.10, 0.10, 0.05, 0.00, 0.00],
        [0.00, 0.10, 0.15, 0.20, 0.20, 0.15, 0.10, 0.00],
        [0.00, 0.15, 0.25, 0.40, 0.40, 0.25, 0.15, 0.00],
        [0.00, 0.15, 0.25, 0.40, 0.40, 0.25, 0.15, 0.00],
        [0.00, 0.10, 0.15, 0.20, 0.20, 0.15, 0.10, 0.00],
        [0.00, 0.00, 0.05, 0.10, 0.10, 0.05, 0.00, 0.00],
        [0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00],
    ],
    [
        [0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00],
        [0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00],
        [0.00, 0.20, 0.40, 0.10, 0.10, 0.40, 0.20, 0.00],
        [0.00, 0.10, 0.30, 0.00, 0.00, 0.30, 0.10, 0.00],
        [0.00, 0.10, 0.30, 0.00, 0.00, 0.30, 0.10, 0.00],
        [0.00, 0.20, 0.40, 0.10, 0.10, 0.40, 0.20, 0.00],
        [0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00],
        [0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00],
    ],
    [
        [0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00],
        [0.00, 0.15, 0.10, 0.05, 0.05, 0.10, 0.15, 0.00],
        [0.00, 0.30, 0.20, 0.10, 0.10, 0.20, 0.30, 0.00],
        [0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00],
        [0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00],
        [0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00],
        [0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00],
        [0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00],
    ],
];

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_face_vector_dimension() {
        assert_eq!(
            FaceVector::new(vec![0.0; 63]),
            Err(PcaError::InvalidDimension { expected: 64, got: 63 })
        );
        let face = FaceVector::new(vec![0.5; 64]).unwrap();
        assert_eq!(face.get(7, 7), Some(0.5));
        assert_eq!(face.get(8, 0), None);
        assert_eq!(face.rows().count(), 8);
    }

    #[test]
    fn test_mean_face_of_gallery() {
        let mean = mean_face(&Expression::gallery()).unwrap();

        // Outline is shared by every face.
        assert_abs_diff_eq!(mean.get(0, 2).unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(mean.get(0, 0), Some(0.0));
        // Left eye is open in four of five faces.
        assert_abs_diff_eq!(mean.get(2, 2).unwrap(), 0.8, epsilon = 1e-12);
        // Bottom outline gaps only in the sad face.
        assert_abs_diff_eq!(mean.get(7, 3).unwrap(), 0.8, epsilon = 1e-12);

        assert_eq!(mean_face(&[]), Err(PcaError::EmptyInput));
    }

    #[test]
    fn test_most_varying_pixels_skip_outline() {
        let gallery = Expression::gallery();
        let pixels = most_varying_pixels(&gallery, 3).unwrap();

        assert_eq!(pixels.len(), 3);
        for (row, col) in pixels {
            let values: Vec<f64> = gallery.iter().map(|f| f.get(row, col).unwrap()).collect();
            assert!(values.iter().any(|&v| v != values[0]));
        }
        assert!(most_varying_pixels(&gallery[..1], 3).is_err());
    }

    #[test]
    fn test_synthesize_mean_with_zero_coefficients() {
        let basis = FaceBasis::smiley().unwrap();
        let face = basis.synthesize_face(&[0.0, 0.0, 0.0]).unwrap();

        assert_eq!(&face, basis.mean());
    }

    #[test]
    fn test_synthesize_clamps() {
        let basis = FaceBasis::smiley().unwrap();
        let face = basis.synthesize_face(&[5.0]).unwrap();

        assert!(face.values().iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert_eq!(face.get(3, 3), Some(1.0));

        let dark = basis.synthesize_face(&[-5.0, -5.0]).unwrap();
        assert_eq!(dark.get(3, 3), Some(0.0));
    }

    #[test]
    fn test_synthesize_coefficient_count() {
        let basis = FaceBasis::smiley().unwrap();

        assert_eq!(
            basis.synthesize_face(&[]),
            Err(PcaError::InvalidDimension { expected: 3, got: 0 })
        );
        assert_eq!(
            basis.synthesize_face(&[0.1, 0.2, 0.3, 0.4]),
            Err(PcaError::InvalidDimension { expected: 3, got: 4 })
        );
    }

    fn unclamped(basis: &FaceBasis, coefficients: &[f64]) -> Vec<f64> {
        let mut values = basis.mean().values().to_vec();
        for (face, c) in basis.eigenfaces().iter().zip(coefficients) {
            values = vector::add(&values, &vector::scalar_mul(*c, face.values()));
        }
        values
    }

    #[test]
    fn test_projection_recovers_coefficients() {
        let basis = FaceBasis::smiley().unwrap();
        let coefficients = [0.1, -0.05, 0.08];
        let face = FaceVector::new(unclamped(&basis, &coefficients)).unwrap();
        let recovered = basis.project_coefficients(&face, 3).unwrap();

        assert_eq!(recovered.len(), 3);
        for (a, b) in recovered.iter().zip(coefficients) {
            assert_abs_diff_eq!(*a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_least_squares_residual_shrinks_with_k() {
        let basis = FaceBasis::smiley().unwrap();
        for expression in Expression::ALL {
            let face = expression.face();
            let residuals: Vec<f64> = (0..=3)
                .map(|k| {
                    let coefficients = basis.project_coefficients(&face, k).unwrap();
                    let approx = unclamped(&basis, &coefficients);
                    let diff = vector::sub(face.values(), &approx);
                    vector::dot(&diff, &diff)
                })
                .collect();
            for pair in residuals.windows(2) {
                assert!(pair[1] <= pair[0] + 1e-9, "{}: {:?}", expression, residuals);
            }
        }
    }

    #[test]
    fn test_reconstruction_error_of_gallery_face() {
        let basis = FaceBasis::smiley().unwrap();
        let face = Expression::Happy.face();

        // Happy differs from the mean by 0.2 on 16 pixels.
        assert_abs_diff_eq!(basis.reconstruction_error(&face, 0).unwrap(), 0.05, epsilon = 1e-12);
        for k in 1..=3 {
            let reconstructed = basis.reconstruct_face(&face, k).unwrap();
            assert!(reconstructed.values().iter().all(|&v| (0.0..=1.0).contains(&v)));
        }
    }

    #[test]
    fn test_clamped_error_can_grow_with_k() {
        // The fit minimises the unclamped squared residual, not the clamped
        // absolute error, so a gallery face can get worse as k grows.
        let basis = FaceBasis::smiley().unwrap();
        let face = Expression::Sad.face();
        let errors: Vec<f64> = (0..=3)
            .map(|k| basis.reconstruction_error(&face, k).unwrap())
            .collect();

        assert_abs_diff_eq!(errors[0], 0.06875, epsilon = 1e-12);
        assert_abs_diff_eq!(errors[1], 0.075568, epsilon = 1e-5);
        assert_abs_diff_eq!(errors[3], 0.076583, epsilon = 1e-5);
        assert!(errors[3] > errors[0]);
    }

    #[test]
    fn test_error_vanishes_inside_span() {
        // Mid grey mean keeps every reconstruction clear of the clamp.
        let eigenfaces: Vec<FaceVector> = EIGENFACES.iter().map(FaceVector::from_rows).collect();
        let mean = FaceVector::new(vec![0.5; FACE_LEN]).unwrap();
        let basis = FaceBasis::new(mean, eigenfaces, EIGENVALUES.to_vec(), 5).unwrap();
        let face = basis.synthesize_face(&[0.2, -0.3, 0.1]).unwrap();

        let full = basis.reconstruction_error(&face, 3).unwrap();
        assert_abs_diff_eq!(full, 0.0, epsilon = 1e-9);
        assert!(basis.reconstruction_error(&face, 0).unwrap() > full);
        assert!(basis.reconstruction_error(&face, 1).unwrap() > full);
    }

    #[test]
    fn test_reconstruct_with_zero_components_is_mean() {
        let basis = FaceBasis::smiley().unwrap();
        let face = basis.reconstruct_face(&Expression::Angry.face(), 0).unwrap();

        assert_eq!(&face, basis.mean());
        assert_eq!(
            basis.reconstruct_face(&Expression::Angry.face(), 9),
            Err(PcaError::InvalidDimension { expected: 8, got: 9 })
        );
    }

    #[test]
    fn test_optimal_k_can_be_reconstructed() {
        let basis = FaceBasis::smiley().unwrap();
        let face = Expression::Surprised.face();
        let k = basis.optimal_k(0.95).unwrap();
        assert_eq!(k, 5);

        // Only three eigenfaces exist, the rest of the spectrum adds nothing.
        let reconstructed = basis.reconstruct_face(&face, k).unwrap();
        assert_eq!(reconstructed, basis.reconstruct_face(&face, 3).unwrap());
        assert_eq!(basis.project_coefficients(&face, k).unwrap().len(), 3);
        assert_eq!(
            basis.reconstruction_error(&face, k).unwrap(),
            basis.reconstruction_error(&face, 3).unwrap()
        );
    }

    #[test]
    fn test_closest_to_mean() {
        let gallery = Expression::gallery();
        let index = closest_to_mean(&gallery).unwrap();

        // Happy sits 0.05 from the mean, every other face is further away.
        assert_eq!(Expression::GALLERY[index], Expression::Happy);
        assert_eq!(closest_to_mean(&[]), Err(PcaError::EmptyInput));
        assert_eq!(closest_to_mean(&gallery[1..2]).unwrap(), 0);
    }

    #[test]
    fn test_degenerate_basis() {
        let mean = FaceVector::new(vec![0.5; 64]).unwrap();
        let direction = FaceVector::new(vec![0.1; 64]).unwrap();
        let basis = FaceBasis::new(mean, vec![direction.clone(), direction], vec![0.6, 0.4], 5).unwrap();

        assert_eq!(
            basis.project_coefficients(&Expression::Happy.face(), 2),
            Err(PcaError::DegenerateBasis)
        );
    }

    #[test]
    fn test_variance_helpers() {
        let basis = FaceBasis::smiley().unwrap();

        assert_abs_diff_eq!(basis.explained_variance(1), 0.45, epsilon = 1e-12);
        assert_abs_diff_eq!(basis.explained_variance(3), 0.85, epsilon = 1e-12);
        assert_eq!(basis.explained_variance(0), 0.0);
        assert_eq!(basis.optimal_k(DEFAULT_VARIANCE_TARGET), Some(3));
        assert_eq!(basis.optimal_k(0.95), Some(5));
        assert_eq!(basis.optimal_k(1.5), None);
        assert_abs_diff_eq!(basis.compression_ratio(3), 79.0625, epsilon = 1e-9);

        for k in 0..10 {
            let ratio = basis.explained_variance(k);
            assert!((0.0..=1.0).contains(&ratio));
            assert!(basis.explained_variance(k + 1) >= ratio);
        }
    }

    #[test]
    fn test_synthesis_targets() {
        let target = SynthesisTarget::SlightlyHappy;

        assert_eq!(target.similarity(&[0.3, -0.1, 0.05]).unwrap(), 1.0);
        assert_abs_diff_eq!(
            target.similarity(&[0.0, 0.0, 0.0]).unwrap(),
            1.0 - 0.45 / 3.0,
            epsilon = 1e-12
        );
        assert_eq!(SynthesisTarget::Neutral.similarity(&[1.0, 1.0, 1.0]).unwrap(), 0.0);
        assert!(target.similarity(&[0.3]).is_err());
    }

    #[test]
    fn test_synthesis_match_threshold() {
        let target = SynthesisTarget::Surprised;

        assert!(target.is_match(&[0.1, 0.4, -0.1]).unwrap());
        assert!(target.is_match(&[0.2, 0.3, 0.0]).unwrap());
        assert!(!target.is_match(&[-0.2, 0.0, 0.0]).unwrap());
        assert!(target.is_match(&[0.1]).is_err());
    }

    #[test]
    fn test_expression_names() {
        assert_eq!(Expression::from_name("Surprised"), Some(Expression::Surprised));
        assert_eq!(Expression::from_name(" sad "), Some(Expression::Sad));
        assert_eq!(Expression::from_name("grumpy"), None);
    }
}
