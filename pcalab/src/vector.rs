use std::ops::{Add, Mul, Sub};

/// A free 2D vector. Used for raw coordinates, the mean and eigenvectors.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn subtract(&self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }

    pub fn dot(&self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction. Zero in, NaN out.
    pub fn normalized(&self) -> Vec2 {
        let norm = self.norm();
        Vec2::new(self.x / norm, self.y / norm)
    }

    pub fn distance(&self, other: Vec2) -> f64 {
        self.subtract(other).norm()
    }

    /// The vector rotated a quarter turn counter-clockwise.
    pub fn perpendicular(&self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        self.subtract(rhs)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

// Slice versions for the fixed length face vectors. Callers check lengths,
// these zip and so stop at the shorter input.

pub fn dot(u: &[f64], v: &[f64]) -> f64 {
    u.iter()
        .zip(v.iter())
        .fold(0.0, |acc, (a, b)| acc + a * b)
}

pub fn norm(u: &[f64]) -> f64 {
    u.iter()
        .fold(0.0, |acc, a| acc + a * a)
        .sqrt()
}

pub fn add(u: &[f64], v: &[f64]) -> Vec<f64> {
    u.iter()
        .zip(v.iter())
        .map(|(a, b)| a + b)
        .collect()
}

pub fn sub(u: &[f64], v: &[f64]) -> Vec<f64> {
    u.iter()
        .zip(v.iter())
        .map(|(a, b)| a - b)
        .collect()
}

pub fn scalar_mul(a: f64, u: &[f64]) -> Vec<f64> {
    u.iter()
        .map(|b| a * b)
        .collect()
}

pub fn round(u: &[f64], places: i32) -> Vec<f64> {
    let shift = 10.0_f64.powi(places);
    u.iter()
        .map(|a| (a * shift).round() / shift)
        .collect()
}
