//! PCA teaching engine.
//!
//! Two labs share this crate: a 2D point cloud walked through mean, centering,
//! covariance, eigen-decomposition and projection (see [`pipeline::Pipeline`]),
//! and an 8x8 smiley face lab built on precomputed eigenfaces (see
//! [`face::FaceBasis`]). Everything is synchronous and owned by the caller.

pub mod agg;
pub mod cov;
pub mod eigen;
pub mod error;
pub mod face;
pub mod linalg;
pub mod pipeline;
pub mod points;
pub mod project;
pub mod table;
pub mod vector;

pub use error::PcaError;
pub use pipeline::{Pipeline, Stage};
pub use points::{LabConfig, Point, PointId, PointSet};
pub use vector::Vec2;
