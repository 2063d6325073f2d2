use std::{error::Error, fmt::Display};

use crate::{pipeline::Stage, points::PointId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PcaError {
    /// Mean requested on an empty point set.
    EmptyInput,
    InsufficientData {
        required: usize,
        got: usize,
    },
    /// A pipeline stage was read before it was computed.
    StageNotReady {
        required: Stage,
        current: Stage,
    },
    InvalidDimension {
        expected: usize,
        got: usize,
    },
    UnknownPoint(PointId),
    /// The eigenfaces supplied to a reconstruction are linearly dependent.
    DegenerateBasis,
}

impl Display for PcaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PcaError::EmptyInput => write!(f, "No points to work with, add some points first"),
            PcaError::InsufficientData { required, got } => {
                write!(f, "Need at least {} points, got {}", required, got)
            }
            PcaError::StageNotReady { required, current } => {
                write!(f, "Stage {:?} not reached yet (currently at {:?})", required, current)
            }
            PcaError::InvalidDimension { expected, got } => {
                write!(f, "Expected {} values, got {}", expected, got)
            }
            PcaError::UnknownPoint(id) => write!(f, "No point with id {}", id),
            PcaError::DegenerateBasis => write!(f, "Eigenfaces are linearly dependent"),
        }
    }
}

impl Error for PcaError {}
