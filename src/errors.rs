//! Validation errors raised at the mesh boundary.
//!
//! The boolean algebra itself never fails; degenerate pieces are dropped.
//! Only importing external data can be rejected.

use crate::float_types::Real;
use nalgebra::Point3;

/// All the possible validation issues we might encounter
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A face references a point index that does not exist
    #[error("(IndexOutOfRange) Face index {index} is out of range (points.len = {len})")]
    IndexOutOfRange { index: usize, len: usize },
    /// A polygon needs at least three vertices
    #[error("(TooFewPoints) A polygon needs at least 3 vertices, got {0}")]
    TooFewPoints(usize),
    /// The coordinate has a NaN or infinite component
    #[error("(InvalidCoordinate) The coordinate ({0}) has a NaN or infinite")]
    InvalidCoordinate(Point3<Real>),
}
