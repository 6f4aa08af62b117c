//! Value types: element dtype plus a static shape.
//!
//! Shapes are fully static; a rank-0 shape is a scalar. Axis facts treat a
//! scalar as a single degenerate dimension of extent 1, see [`ValueType::fact_rank`].

use smallvec::SmallVec;
use snafu::ensure;
use tilir_dtype::DType;

use crate::{Result, error::*};

/// Shape type - sequence of static extents.
///
/// Uses SmallVec with inline capacity of 4 to avoid heap allocation for
/// common tile ranks.
pub type Shape = SmallVec<[usize; 4]>;

/// Type of an IR value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValueType {
    pub dtype: DType,
    pub shape: Shape,
}

impl ValueType {
    pub fn scalar(dtype: DType) -> Self {
        Self { dtype, shape: Shape::new() }
    }

    pub fn tensor(dtype: DType, shape: &[usize]) -> Self {
        Self { dtype, shape: Shape::from_slice(shape) }
    }

    /// Same shape, different element type.
    pub fn with_dtype(&self, dtype: DType) -> Self {
        Self { dtype, shape: self.shape.clone() }
    }

    /// Same element type, different shape.
    pub fn with_shape(&self, shape: &[usize]) -> Self {
        Self { dtype: self.dtype.clone(), shape: Shape::from_slice(shape) }
    }

    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Number of dimensions an axis fact for this value carries (scalars have one).
    pub fn fact_rank(&self) -> usize {
        self.rank().max(1)
    }

    /// Static extent of dimension `dim` in fact space (1 for a scalar's only dimension).
    #[track_caller]
    pub fn extent(&self, dim: usize) -> i64 {
        if self.is_scalar() {
            assert_eq!(dim, 0, "scalar values have a single degenerate dimension");
            return 1;
        }
        self.shape[dim] as i64
    }

    /// Extents in fact space.
    pub fn fact_shape(&self) -> SmallVec<[i64; 4]> {
        (0..self.fact_rank()).map(|d| self.extent(d)).collect()
    }

    pub fn num_elements(&self) -> usize {
        self.shape.iter().product()
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_scalar() {
            return write!(f, "{}", self.dtype);
        }
        write!(f, "tensor<")?;
        for dim in &self.shape {
            write!(f, "{dim}x")?;
        }
        write!(f, "{}>", self.dtype)
    }
}

// =========================================================================
// Shape Validation
// =========================================================================

/// Check that no extent is zero.
pub fn validate_shape(shape: &[usize]) -> Result<Shape> {
    ensure!(shape.iter().all(|&s| s > 0), ZeroExtentSnafu { shape: Shape::from_slice(shape) });
    Ok(Shape::from_slice(shape))
}

/// Check that `src` can be broadcast to `target`: same rank, every source
/// extent either matches or is 1. A scalar broadcasts to anything.
pub fn validate_broadcast(src: &[usize], target: &[usize]) -> Result<()> {
    if src.is_empty() {
        return Ok(());
    }
    ensure!(
        src.len() == target.len() && src.iter().zip(target).all(|(&s, &t)| s == t || s == 1),
        BroadcastShapeMismatchSnafu { src: Shape::from_slice(src), target: Shape::from_slice(target) }
    );
    Ok(())
}
