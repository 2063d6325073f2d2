use std::{error::Error, fmt::Display};

/// Small dense row-major matrix. Only what the face lab needs to solve its
/// normal equations.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    elements: Vec<f64>,
    width: usize,
    height: usize,
}

impl Matrix {
    pub fn new(elements: Vec<f64>, height: usize, width: usize) -> Result<Self, MatrixError> {
        if elements.len() != width * height {
            return Err(MatrixError::SizeMismatch);
        }

        Ok(Self {
            elements,
            height,
            width,
        })
    }

    /// `G[i][j] = dot(vectors[i], vectors[j])`.
    pub fn gram<V: AsRef<[f64]>>(vectors: &[V]) -> Result<Self, MatrixError> {
        let n = vectors.len();
        let mut elements = vec![0.0; n * n];
        for i in 0..n {
            for j in i..n {
                let value = crate::vector::dot(vectors[i].as_ref(), vectors[j].as_ref());
                elements[i * n + j] = value;
                elements[j * n + i] = value;
            }
        }
        Self::new(elements, n, n)
    }

    pub fn identity(n: usize) -> Self {
        let mut elements = vec![0.0; n * n];
        for i in 0..n {
            elements[i * n + i] = 1.0;
        }
        Self {
            elements,
            width: n,
            height: n,
        }
    }

    pub fn set_unchecked(&mut self, row: usize, col: usize, value: f64) {
        self.elements[row * self.width + col] = value;
    }

    pub fn get_unchecked(&self, row: usize, col: usize) -> f64 {
        self.elements[row * self.width + col]
    }

    /// Doolittle LU without pivoting. Fine for the symmetric positive definite
    /// Gram matrices it is used on.
    pub fn lu_decomp(&self) -> Result<LU, MatrixError> {
        if self.width != self.height {
            return Err(MatrixError::NotSquare);
        }
        let n = self.width;
        let mut upper = self.clone();
        let mut lower = Matrix::identity(n);
        for i in 1..n {
            let pivot = upper.get_unchecked(i-1, i-1);
            if pivot == 0.0 || !pivot.is_finite() {
                return Err(MatrixError::NotInvertible);
            }
            for j in i..n {
                let adjustment = upper.get_unchecked(j, i-1) / pivot;
                lower.set_unchecked(j, i-1, adjustment);
                for col in 0..n {
                    let value = upper.get_unchecked(j, col) -
                        adjustment * upper.get_unchecked(i-1, col);
                    upper.set_unchecked(j, col, value);
                }
            }
        }
        Ok(LU {
            l: lower,
            u: upper,
            n,
        })
    }
}

pub struct LU {
    // Lower Triangular
    l: Matrix,
    // Upper Triangular
    u: Matrix,
    n: usize,
}

impl LU {
    /// Given an equation LUu = v where v is known,
    /// solve for u.
    /// A=LU must be invertible
    pub fn solve_for_vec(&self, v: &[f64]) -> Result<Vec<f64>, MatrixError> {
        if v.len() != self.n {
            return Err(MatrixError::SizeMismatch);
        }
        for i in 0..self.n {
            if self.u.get_unchecked(i, i) == 0.0 {
                return Err(MatrixError::NotInvertible)
            }
        }
        let mut l_result = vec![0.0; v.len()];
        for i in 0..v.len() {
            l_result[i] = v[i];
            for j in 0..i {
                l_result[i] -= l_result[j] * self.l.get_unchecked(i, j);
            }
            l_result[i] /= self.l.get_unchecked(i, i);
        }
        let mut u_result = vec![0.0; l_result.len()];
        for i in (0..l_result.len()).rev() {
            u_result[i] = l_result[i];
            for j in i+1..l_result.len() {
                u_result[i] -= u_result[j] * self.u.get_unchecked(i, j);
            }
            u_result[i] /= self.u.get_unchecked(i, i);
        }
        Ok(u_result)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatrixError {
    SizeMismatch,
    NotSquare,
    NotInvertible,
}

impl Display for MatrixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Error for MatrixError {}
